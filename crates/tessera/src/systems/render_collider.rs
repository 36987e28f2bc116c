//! Debug outlines for collision boxes.

use bytemuck::{Pod, Zeroable};
use tessera_core::{ComponentRegistrar, EcsResult, Registry, System, SystemCore};

use crate::components::{to_i32, BoxCollider, Rect, Transform};

/// RGBA used for every outline.
pub const COLLIDER_COLOR: [u8; 4] = [255, 0, 0, 255];

/// A rectangle outline to draw over the sprites.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Pod, Zeroable)]
pub struct ColliderOutline {
    /// Box in screen pixels.
    pub rect: Rect,
    /// RGBA.
    pub color: [u8; 4],
}

/// Emits a [`ColliderOutline`] per `Transform + BoxCollider` entity.
pub struct RenderColliderSystem {
    core: SystemCore,
}

impl RenderColliderSystem {
    /// Creates the system.
    ///
    /// # Errors
    ///
    /// Fails if the registrar is full.
    pub fn new(registrar: &ComponentRegistrar) -> EcsResult<Self> {
        Ok(Self {
            core: SystemCore::new(registrar)
                .with::<Transform>(registrar)?
                .with::<BoxCollider>(registrar)?,
        })
    }

    /// Outlines of every member's collision box.
    ///
    /// # Errors
    ///
    /// Propagates registry contract violations.
    #[allow(clippy::cast_possible_truncation)]
    pub fn outlines(&self, registry: &Registry) -> EcsResult<Vec<ColliderOutline>> {
        self.entities()
            .iter()
            .map(|&entity| {
                let transform = registry.get_component::<Transform>(entity)?;
                let collider = registry.get_component::<BoxCollider>(entity)?;
                let origin = transform.position + collider.offset;
                Ok(ColliderOutline {
                    rect: Rect::new(
                        origin.x as i32,
                        origin.y as i32,
                        to_i32(collider.width),
                        to_i32(collider.height),
                    ),
                    color: COLLIDER_COLOR,
                })
            })
            .collect()
    }
}

impl System for RenderColliderSystem {
    fn core(&self) -> &SystemCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut SystemCore {
        &mut self.core
    }
}
