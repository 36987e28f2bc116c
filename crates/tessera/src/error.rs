//! # Game Error Types

use thiserror::Error;

use tessera_core::EcsError;

/// Errors raised while loading or running the game.
#[derive(Error, Debug)]
pub enum GameError {
    /// A registry contract violation.
    #[error(transparent)]
    Ecs(#[from] EcsError),

    /// A tilemap token could not be read.
    #[error("tilemap error at row {row}, column {col}: {reason}")]
    MapParse {
        /// Zero-based tile row.
        row: usize,
        /// Zero-based tile column.
        col: usize,
        /// What was wrong with the token.
        reason: String,
    },

    /// The tilemap does not hold `rows * cols` tiles.
    #[error("tilemap holds {found} tiles, expected {expected}")]
    MapSize {
        /// Tiles required by the configuration.
        expected: usize,
        /// Tiles found in the map text.
        found: usize,
    },

    /// A texture name was used before being registered.
    #[error("unknown asset: {0}")]
    UnknownAsset(String),

    /// Invalid game configuration.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Reading a config or map file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for game operations.
pub type GameResult<T> = Result<T, GameError>;
