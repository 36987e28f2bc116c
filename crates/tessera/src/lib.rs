//! # Tessera
//!
//! A 2D top-down demo on the `tessera_core` ECS: a jungle tilemap, an
//! animated chopper and radar, and a tank and truck that drive into each
//! other.
//!
//! ## Crate Structure
//!
//! - [`components`]: plain-data records (Transform, RigidBody, Sprite, ...)
//! - [`systems`]: movement, animation, collision and the two render systems
//! - [`level`]: tilemap parsing and level 1 spawning
//! - [`game_loop`]: fixed-order tick and render orchestration
//!
//! ## Example
//!
//! ```rust,no_run
//! use tessera::{GameConfig, GameLoop, level::JUNGLE_MAP};
//!
//! let mut game = GameLoop::new(GameConfig::default())?;
//! game.load_level_one(JUNGLE_MAP)?;
//! game.run_frames(600)?;
//! # Ok::<(), tessera::GameError>(())
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::pedantic)]

pub mod assets;
pub mod components;
pub mod config;
pub mod error;
pub mod game_loop;
pub mod level;
pub mod systems;

/// Re-export the ECS core.
pub use tessera_core as ecs;

pub use assets::{AssetCatalog, AssetId};
pub use components::{Animation, BoxCollider, Rect, RigidBody, Sprite, Transform, Vec2};
pub use config::GameConfig;
pub use error::{GameError, GameResult};
pub use game_loop::{FrameStats, FrameStatsAccumulator, GameLoop, RenderFrame, TickReport};
