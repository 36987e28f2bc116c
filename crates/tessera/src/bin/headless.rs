//! # Tessera Headless Runner
//!
//! Loads level 1 and ticks it at the configured rate without a window.
//!
//! ```bash
//! # Defaults, 600 frames (10 s of game time)
//! tessera-headless
//!
//! # Custom config and frame count, with per-entity logs
//! RUST_LOG=tessera_core=debug tessera-headless game.toml 1200
//! ```

use std::process::ExitCode;

use tessera::level::JUNGLE_MAP;
use tessera::{GameConfig, GameLoop, GameResult};
use tracing_subscriber::EnvFilter;

/// Frames run when none are given.
const DEFAULT_FRAMES: u64 = 600;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "headless run failed");
            ExitCode::FAILURE
        }
    }
}

fn run() -> GameResult<()> {
    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(path) => GameConfig::load(path)?,
        None => GameConfig::default(),
    };
    let frames = match args.next() {
        Some(text) => text
            .parse()
            .map_err(|_| tessera::GameError::Config(format!("invalid frame count: {text}")))?,
        None => DEFAULT_FRAMES,
    };

    tracing::info!(
        target_fps = config.target_fps,
        frames,
        debug_colliders = config.debug_colliders,
        "starting headless run"
    );

    let mut game = GameLoop::new(config)?;
    let level = game.load_level_one(JUNGLE_MAP)?;
    game.run_frames(frames)?;

    let registry = game.registry();
    tracing::info!(
        alive = registry.alive_count(),
        tank_alive = registry.is_alive(level.tank),
        truck_alive = registry.is_alive(level.truck),
        clock_ms = game.clock_ms(),
        "headless run finished"
    );
    game.stats().log_summary();
    Ok(())
}
