//! # Game Configuration
//!
//! ```toml
//! target_fps = 60
//! max_delta_seconds = 0.1
//! debug_colliders = true
//!
//! [registry]
//! max_component_types = 32
//! ```

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use tessera_core::RegistryConfig;

use crate::error::{GameError, GameResult};

/// Configuration for the game loop and level 1.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GameConfig {
    /// Target frames per second. Fixes the headless step size.
    pub target_fps: u32,
    /// Longest delta a single tick may integrate, in seconds.
    pub max_delta_seconds: f64,
    /// Emit collider outlines when rendering.
    pub debug_colliders: bool,
    /// Tile edge in source-texture pixels.
    pub tile_size: u32,
    /// Scale applied to every tile on screen.
    pub tile_scale: f32,
    /// Tilemap rows.
    pub map_rows: usize,
    /// Tilemap columns.
    pub map_cols: usize,
    /// Window width in pixels. Used for HUD placement.
    pub window_width: u32,
    /// Window height in pixels.
    pub window_height: u32,
    /// Registry sizing.
    pub registry: RegistryConfig,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            target_fps: 60,
            max_delta_seconds: 0.1,
            debug_colliders: false,
            tile_size: 32,
            tile_scale: 2.0,
            map_rows: 20,
            map_cols: 25,
            window_width: 800,
            window_height: 600,
            registry: RegistryConfig::default(),
        }
    }
}

impl GameConfig {
    /// Parses and validates a configuration from TOML text.
    ///
    /// # Errors
    ///
    /// [`GameError::Config`] on malformed TOML or out-of-range values.
    pub fn from_toml_str(text: &str) -> GameResult<Self> {
        let config: Self = toml::from_str(text).map_err(|e| GameError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and validates a configuration file.
    ///
    /// # Errors
    ///
    /// [`GameError::Io`] if the file cannot be read, otherwise as
    /// [`from_toml_str`](Self::from_toml_str).
    pub fn load(path: impl AsRef<Path>) -> GameResult<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        tracing::info!(path = %path.as_ref().display(), "loading game config");
        Self::from_toml_str(&text)
    }

    /// Checks value ranges.
    ///
    /// # Errors
    ///
    /// [`GameError::Config`] naming the offending key.
    pub fn validate(&self) -> GameResult<()> {
        if self.target_fps == 0 {
            return Err(GameError::Config("target_fps must be positive".into()));
        }
        if !(self.max_delta_seconds > 0.0) {
            return Err(GameError::Config("max_delta_seconds must be positive".into()));
        }
        if self.tile_size == 0 || !(self.tile_scale > 0.0) {
            return Err(GameError::Config("tile_size and tile_scale must be positive".into()));
        }
        if self.map_rows == 0 || self.map_cols == 0 {
            return Err(GameError::Config("map_rows and map_cols must be positive".into()));
        }
        self.registry.validate()?;
        Ok(())
    }

    /// Fixed step for headless runs: `1 / target_fps` seconds.
    #[must_use]
    pub fn fixed_delta(&self) -> f64 {
        1.0 / f64::from(self.target_fps)
    }

    /// Wall-clock budget of one frame.
    #[must_use]
    pub fn frame_budget(&self) -> Duration {
        Duration::from_secs_f64(self.fixed_delta())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_level_one() {
        let config = GameConfig::default();
        assert_eq!(config.map_rows * config.map_cols, 500);
        assert_eq!(config.tile_size, 32);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_nested_registry_table() {
        let config = GameConfig::from_toml_str(
            "debug_colliders = true\n[registry]\ninitial_entity_capacity = 512\n",
        )
        .unwrap();
        assert!(config.debug_colliders);
        assert_eq!(config.registry.initial_entity_capacity, 512);
        assert_eq!(config.registry.max_component_types, 32);
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(GameConfig::from_toml_str("target_fps = 0").is_err());
        assert!(GameConfig::from_toml_str("max_delta_seconds = -1.0").is_err());
        assert!(matches!(
            GameConfig::from_toml_str("[registry]\nmax_component_types = 0"),
            Err(GameError::Ecs(_))
        ));
    }

    #[test]
    fn test_frame_budget() {
        let config = GameConfig::default();
        assert_eq!(config.frame_budget().as_micros(), 16_666);
    }
}
