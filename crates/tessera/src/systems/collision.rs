//! Pairwise AABB collision.

use tessera_core::{ComponentRegistrar, EcsResult, Entity, Registry, System, SystemCore};

use crate::components::{BoxCollider, Transform};

/// Tests every pair of `Transform + BoxCollider` entities and kills both
/// members of each overlapping pair.
///
/// Kills are staged: the pair stays in every member list until the next
/// barrier, so one pass sees the same set of colliders throughout.
pub struct CollisionSystem {
    core: SystemCore,
}

/// World-space box `(x, y, w, h)`.
#[derive(Clone, Copy, Debug)]
struct Aabb {
    x: f32,
    y: f32,
    w: f32,
    h: f32,
}

impl Aabb {
    #[allow(clippy::cast_precision_loss)]
    fn of(transform: &Transform, collider: &BoxCollider) -> Self {
        Self {
            x: transform.position.x + collider.offset.x,
            y: transform.position.y + collider.offset.y,
            w: collider.width as f32,
            h: collider.height as f32,
        }
    }

    fn overlaps(&self, other: &Self) -> bool {
        self.x < other.x + other.w
            && self.x + self.w > other.x
            && self.y < other.y + other.h
            && self.y + self.h > other.y
    }
}

impl CollisionSystem {
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

    /// Runs one collision pass and returns the overlapping pairs.
    ///
    /// An entity may appear in several pairs; killing it twice is harmless.
    ///
    /// # Errors
    ///
    /// Propagates registry contract violations.
    pub fn update(&self, registry: &mut Registry) -> EcsResult<Vec<(Entity, Entity)>> {
        let boxes = self
            .entities()
            .iter()
            .map(|&entity| {
                let transform = registry.get_component::<Transform>(entity)?;
                let collider = registry.get_component::<BoxCollider>(entity)?;
                Ok((entity, Aabb::of(transform, collider)))
            })
            .collect::<EcsResult<Vec<_>>>()?;

        let mut pairs = Vec::new();
        for (i, &(a, box_a)) in boxes.iter().enumerate() {
            for &(b, box_b) in &boxes[i + 1..] {
                if box_a.overlaps(&box_b) {
                    tracing::info!(entity_a = %a, entity_b = %b, "entity {a} is colliding with entity {b}");
                    pairs.push((a, b));
                }
            }
        }

        for &(a, b) in &pairs {
            registry.kill_entity(a)?;
            registry.kill_entity(b)?;
        }
        Ok(pairs)
    }
}

impl System for CollisionSystem {
    fn core(&self) -> &SystemCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut SystemCore {
        &mut self.core
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::Vec2;
    use tessera_core::EntityState;

    fn collider_at(registry: &mut Registry, x: f32, y: f32) -> Entity {
        let e = registry.create_entity();
        registry.add_component(e, Transform::at(Vec2::new(x, y))).unwrap();
        registry.add_component(e, BoxCollider::new(32, 32)).unwrap();
        e
    }

    fn run(registry: &mut Registry) -> Vec<(Entity, Entity)> {
        registry
            .system_scope::<CollisionSystem, _, _>(|system, registry| system.update(registry))
            .unwrap()
            .unwrap()
    }

    #[test]
    fn test_aabb_edges_touching_do_not_overlap() {
        let a = Aabb { x: 0.0, y: 0.0, w: 32.0, h: 32.0 };
        let touching = Aabb { x: 32.0, y: 0.0, w: 32.0, h: 32.0 };
        let inside = Aabb { x: 31.0, y: 31.0, w: 32.0, h: 32.0 };
        assert!(!a.overlaps(&touching));
        assert!(a.overlaps(&inside));
        assert!(inside.overlaps(&a));
    }

    #[test]
    fn test_offset_applies_to_each_box() {
        let transform = Transform::at(Vec2::new(10.0, 10.0));
        let collider = BoxCollider::new(8, 8).with_offset(Vec2::new(0.0, 100.0));
        let aabb = Aabb::of(&transform, &collider);
        assert!((aabb.y - 110.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_overlapping_pair_is_killed_after_barrier() {
        let mut registry = Registry::new();
        let system = CollisionSystem::new(registry.registrar()).unwrap();
        registry.add_system(system).unwrap();

        let a = collider_at(&mut registry, 0.0, 0.0);
        let b = collider_at(&mut registry, 20.0, 10.0);
        let far = collider_at(&mut registry, 500.0, 500.0);
        registry.update();

        let pairs = run(&mut registry);
        assert_eq!(pairs, vec![(a, b)]);
        assert_eq!(registry.entity_state(a), EntityState::PendingRemove);
        assert_eq!(registry.entity_state(far), EntityState::Live);
        // Still members until the barrier.
        assert_eq!(registry.system_entities::<CollisionSystem>().unwrap().len(), 3);

        registry.update();
        assert_eq!(registry.system_entities::<CollisionSystem>().unwrap(), vec![far]);
        assert!(run(&mut registry).is_empty());
    }

    #[test]
    fn test_entity_in_two_pairs() {
        let mut registry = Registry::new();
        let system = CollisionSystem::new(registry.registrar()).unwrap();
        registry.add_system(system).unwrap();

        collider_at(&mut registry, 0.0, 0.0);
        collider_at(&mut registry, 16.0, 0.0);
        collider_at(&mut registry, 40.0, 0.0);
        registry.update();

        assert_eq!(run(&mut registry).len(), 2);
        registry.update();
        assert_eq!(registry.alive_count(), 0);
    }
}
