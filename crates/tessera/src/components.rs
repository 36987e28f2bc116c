//! # Game Components
//!
//! Plain-data records attached to entities. Geometry types are `Pod` so they
//! can be copied straight into upload buffers.

use std::ops::{Add, AddAssign, Mul};

use bytemuck::{Pod, Zeroable};
use tessera_core::Component;

use crate::assets::AssetId;

// =============================================================================
// Geometry
// =============================================================================

/// 2D vector in world pixels.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct Vec2 {
    /// X coordinate.
    pub x: f32,
    /// Y coordinate.
    pub y: f32,
}

impl Vec2 {
    /// Origin.
    pub const ZERO: Self = Self::new(0.0, 0.0);
    /// Unit scale.
    pub const ONE: Self = Self::new(1.0, 1.0);

    /// Creates a vector.
    #[inline]
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl Add for Vec2 {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vec2 {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Mul<f32> for Vec2 {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: f32) -> Self {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

/// Integer pixel rectangle.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Pod, Zeroable)]
pub struct Rect {
    /// Left edge.
    pub x: i32,
    /// Top edge.
    pub y: i32,
    /// Width.
    pub w: i32,
    /// Height.
    pub h: i32,
}

impl Rect {
    /// Creates a rectangle.
    #[inline]
    #[must_use]
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }
}

// =============================================================================
// Components
// =============================================================================

/// Placement on screen.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    /// Top-left corner in world pixels.
    pub position: Vec2,
    /// Per-axis scale applied to the sprite size.
    pub scale: Vec2,
    /// Rotation in degrees, clockwise.
    pub rotation: f64,
}

impl Transform {
    /// Creates a transform.
    #[must_use]
    pub const fn new(position: Vec2, scale: Vec2, rotation: f64) -> Self {
        Self {
            position,
            scale,
            rotation,
        }
    }

    /// Unscaled, unrotated transform at `position`.
    #[must_use]
    pub const fn at(position: Vec2) -> Self {
        Self::new(position, Vec2::ONE, 0.0)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::at(Vec2::ZERO)
    }
}

impl Component for Transform {}

/// Linear motion.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RigidBody {
    /// Pixels per second.
    pub velocity: Vec2,
}

impl RigidBody {
    /// Creates a body moving at `velocity`.
    #[must_use]
    pub const fn new(velocity: Vec2) -> Self {
        Self { velocity }
    }
}

impl Component for RigidBody {}

/// Textured quad.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Sprite {
    /// Texture to sample.
    pub asset: AssetId,
    /// Width in source pixels.
    pub width: u32,
    /// Height in source pixels.
    pub height: u32,
    /// Draw order; lower is drawn first.
    pub z_index: i32,
    /// Region of the texture to sample.
    pub src_rect: Rect,
}

impl Sprite {
    /// Sprite sampling the top-left `width x height` region of `asset`.
    #[must_use]
    pub fn new(asset: AssetId, width: u32, height: u32, z_index: i32) -> Self {
        Self::with_source(asset, width, height, z_index, 0, 0)
    }

    /// Sprite sampling the region at `(src_x, src_y)`.
    #[must_use]
    pub fn with_source(
        asset: AssetId,
        width: u32,
        height: u32,
        z_index: i32,
        src_x: i32,
        src_y: i32,
    ) -> Self {
        Self {
            asset,
            width,
            height,
            z_index,
            src_rect: Rect::new(src_x, src_y, to_i32(width), to_i32(height)),
        }
    }
}

impl Component for Sprite {}

/// Sprite-sheet animation along the X axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Animation {
    /// Frames in the strip.
    pub num_frames: u32,
    /// Frame shown this tick.
    pub current_frame: u32,
    /// Frames per second.
    pub frame_speed_rate: u32,
    /// Wrap around after the last frame; otherwise hold it.
    pub is_loop: bool,
    /// Game clock at which the animation started, in milliseconds.
    pub start_time_ms: u64,
}

impl Animation {
    /// Creates an animation starting at `start_time_ms`.
    #[must_use]
    pub const fn new(num_frames: u32, frame_speed_rate: u32, is_loop: bool, start_time_ms: u64) -> Self {
        Self {
            num_frames,
            current_frame: 0,
            frame_speed_rate,
            is_loop,
            start_time_ms,
        }
    }
}

impl Default for Animation {
    fn default() -> Self {
        Self::new(1, 1, true, 0)
    }
}

impl Component for Animation {}

/// Axis-aligned collision box.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BoxCollider {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Offset from the transform position.
    pub offset: Vec2,
}

impl BoxCollider {
    /// Box anchored at the transform position.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            offset: Vec2::ZERO,
        }
    }

    /// Builder: shift the box by `offset`.
    #[must_use]
    pub const fn with_offset(mut self, offset: Vec2) -> Self {
        self.offset = offset;
        self
    }
}

impl Component for BoxCollider {}

/// Saturating `u32 -> i32` for pixel sizes.
#[inline]
pub(crate) fn to_i32(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}
