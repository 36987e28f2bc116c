//! Velocity integration.

use tessera_core::{ComponentRegistrar, EcsResult, Registry, System, SystemCore};

use crate::components::{RigidBody, Transform};

/// Moves every `Transform + RigidBody` entity by `velocity * dt`.
pub struct MovementSystem {
    core: SystemCore,
}

impl MovementSystem {
    /// Creates the system.
    ///
    /// # Errors
    ///
    /// Fails if the registrar is full.
    pub fn new(registrar: &ComponentRegistrar) -> EcsResult<Self> {
        Ok(Self {
            core: SystemCore::new(registrar)
                .with::<Transform>(registrar)?
                .with::<RigidBody>(registrar)?,
        })
    }

    /// Integrates one step of `dt` seconds.
    ///
    /// # Errors
    ///
    /// Propagates registry contract violations.
    pub fn update(&self, registry: &mut Registry, dt: f64) -> EcsResult<()> {
        #[allow(clippy::cast_possible_truncation)]
        let dt = dt as f32;
        for &entity in self.entities() {
            let velocity = registry.get_component::<RigidBody>(entity)?.velocity;
            registry.get_component_mut::<Transform>(entity)?.position += velocity * dt;
        }
        Ok(())
    }
}

impl System for MovementSystem {
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

    #[test]
    fn test_moves_by_velocity_times_delta() {
        let mut registry = Registry::new();
        let system = MovementSystem::new(registry.registrar()).unwrap();
        registry.add_system(system).unwrap();

        let e = registry.create_entity();
        registry
            .add_component(e, Transform::at(Vec2::new(10.0, 100.0)))
            .unwrap();
        registry
            .add_component(e, RigidBody::new(Vec2::new(-30.0, 4.0)))
            .unwrap();
        registry.update();

        registry
            .system_scope::<MovementSystem, _, _>(|system, registry| system.update(registry, 0.5))
            .unwrap()
            .unwrap();

        let position = registry.get_component::<Transform>(e).unwrap().position;
        assert_eq!(position, Vec2::new(-5.0, 102.0));
    }
}
