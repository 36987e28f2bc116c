//! # Sprite Rendering
//!
//! Builds the frame's draw list. No GPU work happens here: the list is
//! plain `Pod` data that a backend can upload as-is via [`DrawCommand::as_bytes`].

use bytemuck::{Pod, Zeroable};
use tessera_core::{ComponentRegistrar, EcsResult, Registry, System, SystemCore};

use crate::assets::AssetId;
use crate::components::{Rect, Sprite, Transform};

/// One textured quad, in draw order.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct DrawCommand {
    /// Texture to sample.
    pub asset: AssetId,
    /// Sort key; lower first.
    pub z_index: i32,
    /// Source region in the texture.
    pub src: Rect,
    /// Destination on screen: position, size times scale.
    pub dst: Rect,
    /// Rotation in degrees.
    pub rotation: f32,
}

impl DrawCommand {
    /// Raw bytes of a draw list.
    #[must_use]
    pub fn as_bytes(commands: &[Self]) -> &[u8] {
        bytemuck::cast_slice(commands)
    }
}

/// Emits a [`DrawCommand`] per `Transform + Sprite` entity, sorted by
/// `z_index`. Entities sharing a z-index keep member-list order.
pub struct RenderSystem {
    core: SystemCore,
}

impl RenderSystem {
    /// Creates the system.
    ///
    /// # Errors
    ///
    /// Fails if the registrar is full.
    pub fn new(registrar: &ComponentRegistrar) -> EcsResult<Self> {
        Ok(Self {
            core: SystemCore::new(registrar)
                .with::<Transform>(registrar)?
                .with::<Sprite>(registrar)?,
        })
    }

    /// Builds this frame's sorted draw list.
    ///
    /// # Errors
    ///
    /// Propagates registry contract violations.
    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    pub fn draw_list(&self, registry: &Registry) -> EcsResult<Vec<DrawCommand>> {
        let mut commands = Vec::with_capacity(self.entities().len());

        for &entity in self.entities() {
            let transform = registry.get_component::<Transform>(entity)?;
            let sprite = registry.get_component::<Sprite>(entity)?;

            commands.push(DrawCommand {
                asset: sprite.asset,
                z_index: sprite.z_index,
                src: sprite.src_rect,
                dst: Rect::new(
                    transform.position.x as i32,
                    transform.position.y as i32,
                    (sprite.width as f32 * transform.scale.x) as i32,
                    (sprite.height as f32 * transform.scale.y) as i32,
                ),
                rotation: transform.rotation as f32,
            });
        }

        commands.sort_by_key(|command| command.z_index);
        Ok(commands)
    }
}

impl System for RenderSystem {
    fn core(&self) -> &SystemCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut SystemCore {
        &mut self.core
    }
}
