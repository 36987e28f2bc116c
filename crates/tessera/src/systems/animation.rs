//! Sprite-sheet frame stepping.

use tessera_core::{ComponentRegistrar, EcsResult, Registry, System, SystemCore};

use crate::components::{to_i32, Animation, Sprite};

/// Picks the frame of every `Sprite + Animation` entity from the game clock.
///
/// `frame = (now - start) * rate / 1000`, wrapped by `num_frames` when
/// looping and held on the last frame otherwise. The sprite's source rect
/// slides along X by `frame * width`.
pub struct AnimationSystem {
    core: SystemCore,
}

impl AnimationSystem {
    /// Creates the system.
    ///
    /// # Errors
    ///
    /// Fails if the registrar is full.
    pub fn new(registrar: &ComponentRegistrar) -> EcsResult<Self> {
        Ok(Self {
            core: SystemCore::new(registrar)
                .with::<Sprite>(registrar)?
                .with::<Animation>(registrar)?,
        })
    }

    /// Advances every member to the frame for `now_ms`.
    ///
    /// # Errors
    ///
    /// Propagates registry contract violations.
    pub fn update(&self, registry: &mut Registry, now_ms: u64) -> EcsResult<()> {
        for &entity in self.entities() {
            let animation = registry.get_component_mut::<Animation>(entity)?;
            let frame = frame_at(animation, now_ms);
            animation.current_frame = frame;

            let sprite = registry.get_component_mut::<Sprite>(entity)?;
            sprite.src_rect.x = to_i32(frame).saturating_mul(to_i32(sprite.width));
        }
        Ok(())
    }
}

impl System for AnimationSystem {
    fn core(&self) -> &SystemCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut SystemCore {
        &mut self.core
    }
}

/// Frame index of `animation` at `now_ms`.
fn frame_at(animation: &Animation, now_ms: u64) -> u32 {
    let frames = u64::from(animation.num_frames.max(1));
    let elapsed = now_ms.saturating_sub(animation.start_time_ms);
    let raw = elapsed.saturating_mul(u64::from(animation.frame_speed_rate)) / 1000;
    let frame = if animation.is_loop {
        raw % frames
    } else {
        raw.min(frames - 1)
    };
    // Bounded by num_frames, which is a u32.
    u32::try_from(frame).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::AssetId;

    #[test]
    fn test_frame_formula() {
        // Chopper: 2 frames at 15 fps.
        let chopper = Animation::new(2, 15, true, 0);
        assert_eq!(frame_at(&chopper, 0), 0);
        assert_eq!(frame_at(&chopper, 66), 0);
        assert_eq!(frame_at(&chopper, 67), 1);
        assert_eq!(frame_at(&chopper, 134), 0);

        // Radar: 8 frames at 5 fps, started late.
        let radar = Animation::new(8, 5, true, 1_000);
        assert_eq!(frame_at(&radar, 500), 0);
        assert_eq!(frame_at(&radar, 2_400), 7);
        assert_eq!(frame_at(&radar, 2_600), 0);
    }

    #[test]
    fn test_non_looping_holds_last_frame() {
        let once = Animation::new(4, 10, false, 0);
        assert_eq!(frame_at(&once, 250), 2);
        assert_eq!(frame_at(&once, 10_000), 3);
    }

    #[test]
    fn test_updates_source_rect() {
        let mut registry = Registry::new();
        let system = AnimationSystem::new(registry.registrar()).unwrap();
        registry.add_system(system).unwrap();

        let e = registry.create_entity();
        registry
            .add_component(e, Sprite::new(AssetId(0), 64, 64, 1))
            .unwrap();
        registry.add_component(e, Animation::new(8, 5, true, 0)).unwrap();
        registry.update();

        registry
            .system_scope::<AnimationSystem, _, _>(|system, registry| system.update(registry, 600))
            .unwrap()
            .unwrap();

        assert_eq!(registry.get_component::<Animation>(e).unwrap().current_frame, 3);
        assert_eq!(registry.get_component::<Sprite>(e).unwrap().src_rect.x, 192);
    }
}
