//! # Game Systems
//!
//! Each system requires a fixed component set and is driven once per tick
//! by the [`GameLoop`](crate::GameLoop):
//!
//! | System | Requires | Phase |
//! |---|---|---|
//! | [`MovementSystem`] | Transform, RigidBody | update |
//! | [`AnimationSystem`] | Sprite, Animation | update |
//! | [`CollisionSystem`] | Transform, BoxCollider | update |
//! | [`RenderSystem`] | Transform, Sprite | render |
//! | [`RenderColliderSystem`] | Transform, BoxCollider | render (debug) |

mod animation;
mod collision;
mod movement;
mod render;
mod render_collider;

pub use animation::AnimationSystem;
pub use collision::CollisionSystem;
pub use movement::MovementSystem;
pub use render::{DrawCommand, RenderSystem};
pub use render_collider::{ColliderOutline, RenderColliderSystem, COLLIDER_COLOR};

use tessera_core::{EcsResult, Registry};

/// Registers the five game systems with `registry`.
///
/// # Errors
///
/// Fails if any of them is already registered or the registrar is full.
pub fn register_all(registry: &mut Registry) -> EcsResult<()> {
    let registrar = std::sync::Arc::clone(registry.registrar());
    registry.add_system(MovementSystem::new(&registrar)?)?;
    registry.add_system(RenderSystem::new(&registrar)?)?;
    registry.add_system(AnimationSystem::new(&registrar)?)?;
    registry.add_system(CollisionSystem::new(&registrar)?)?;
    registry.add_system(RenderColliderSystem::new(&registrar)?)?;
    Ok(())
}
