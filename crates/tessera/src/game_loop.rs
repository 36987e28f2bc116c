//! # Tessera Game Loop
//!
//! ```text
//! Frame N:
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │ 1. BARRIER                                                          │
//! │    └─ registry.update(): promote, re-match, recycle                 │
//! │                                                                     │
//! │ 2. UPDATE (fixed order)                                             │
//! │    ├─ Movement   position += velocity * dt                          │
//! │    ├─ Animation  frame from the game clock                          │
//! │    └─ Collision  overlapping pairs are killed (staged)              │
//! │                                                                     │
//! │ 3. RENDER                                                           │
//! │    ├─ Sprite draw list, sorted by z-index                           │
//! │    └─ Collider outlines (debug only)                                │
//! │                                                                     │
//! │ 4. END FRAME                                                        │
//! │    └─ Record timings, warn on budget overrun                        │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Entities killed in step 2 are still drawn in step 3 of the same frame;
//! they disappear at the next barrier.

use std::time::Instant;

use tessera_core::{Entity, Registry};

use crate::assets::AssetCatalog;
use crate::config::GameConfig;
use crate::error::GameResult;
use crate::level::{self, Level};
use crate::systems::{
    self, AnimationSystem, ColliderOutline, CollisionSystem, DrawCommand, MovementSystem,
    RenderColliderSystem, RenderSystem,
};

/// Frame timing statistics.
#[derive(Clone, Copy, Debug, Default)]
pub struct FrameStats {
    /// Total frame time in microseconds.
    pub total_us: u64,
    /// Barrier time in microseconds.
    pub barrier_us: u64,
    /// Update systems time in microseconds.
    pub systems_us: u64,
    /// Render time in microseconds.
    pub render_us: u64,
    /// Frame number.
    pub frame: u64,
    /// Colliding pairs found this frame.
    pub collisions: u32,
}

/// Outcome of one [`GameLoop::tick`].
#[derive(Clone, Debug, Default)]
pub struct TickReport {
    /// Frame number of this tick.
    pub frame: u64,
    /// Delta actually integrated, after clamping.
    pub delta_seconds: f64,
    /// Pairs killed by the collision system.
    pub collisions: Vec<(Entity, Entity)>,
    /// Barrier time in microseconds.
    pub barrier_us: u64,
    /// Update systems time in microseconds.
    pub systems_us: u64,
}

/// Everything to draw for one frame.
#[derive(Clone, Debug, Default)]
pub struct RenderFrame {
    /// Sprites in draw order.
    pub sprites: Vec<DrawCommand>,
    /// Collider outlines; empty unless debug colliders are on.
    pub colliders: Vec<ColliderOutline>,
}

/// The main game loop orchestrator.
///
/// Owns the registry and asset catalog, advances the game clock, and calls
/// the systems in their fixed order.
pub struct GameLoop {
    /// The ECS registry.
    registry: Registry,
    /// Texture names.
    assets: AssetCatalog,
    /// Configuration.
    config: GameConfig,
    /// Frame counter.
    frame_count: u64,
    /// Game clock in milliseconds: the sum of clamped deltas.
    clock_ms: f64,
    /// Accumulated frame statistics.
    stats_accumulator: FrameStatsAccumulator,
}

impl GameLoop {
    /// Creates a game loop with the five game systems registered.
    ///
    /// # Errors
    ///
    /// Invalid configuration or a full registrar.
    pub fn new(config: GameConfig) -> GameResult<Self> {
        config.validate()?;
        let mut registry = Registry::with_config(config.registry.clone())?;
        systems::register_all(&mut registry)?;

        Ok(Self {
            registry,
            assets: AssetCatalog::new(),
            config,
            frame_count: 0,
            clock_ms: 0.0,
            stats_accumulator: FrameStatsAccumulator::new(),
        })
    }

    /// Replaces the current world with level 1 built from `map`.
    ///
    /// Systems stay registered. The new entities join them at the next tick.
    ///
    /// # Errors
    ///
    /// Map errors and registry contract violations.
    pub fn load_level_one(&mut self, map: &str) -> GameResult<Level> {
        let now_ms = self.clock_ms();
        self.registry.clear();
        self.assets.clear();
        level::register_textures(&mut self.assets);
        level::load_level_one(&mut self.registry, &self.assets, &self.config, map, now_ms)
    }

    /// Runs one update tick of `delta_seconds`.
    ///
    /// The delta is clamped to `[0, max_delta_seconds]` so a long pause does
    /// not teleport anything.
    ///
    /// # Errors
    ///
    /// Registry contract violations raised by a system.
    pub fn tick(&mut self, delta_seconds: f64) -> GameResult<TickReport> {
        let dt = if delta_seconds.is_finite() {
            delta_seconds.clamp(0.0, self.config.max_delta_seconds)
        } else {
            0.0
        };
        self.clock_ms += dt * 1000.0;
        let now_ms = self.clock_ms();

        let start = Instant::now();
        self.registry.update();
        let barrier_done = Instant::now();

        self.registry
            .system_scope::<MovementSystem, _, _>(|system, registry| system.update(registry, dt))??;
        self.registry
            .system_scope::<AnimationSystem, _, _>(|system, registry| system.update(registry, now_ms))??;
        let collisions = self
            .registry
            .system_scope::<CollisionSystem, _, _>(|system, registry| system.update(registry))??;
        let systems_done = Instant::now();

        let report = TickReport {
            frame: self.frame_count,
            delta_seconds: dt,
            collisions,
            barrier_us: micros(barrier_done - start),
            systems_us: micros(systems_done - barrier_done),
        };
        tracing::trace!(frame = report.frame, dt, "tick");
        Ok(report)
    }

    /// Builds the draw lists for the current state.
    ///
    /// # Errors
    ///
    /// Registry contract violations raised by a render system.
    pub fn render(&self) -> GameResult<RenderFrame> {
        let sprites = self
            .registry
            .get_system::<RenderSystem>()?
            .draw_list(&self.registry)?;

        let colliders = if self.config.debug_colliders {
            self.registry
                .get_system::<RenderColliderSystem>()?
                .outlines(&self.registry)?
        } else {
            Vec::new()
        };

        Ok(RenderFrame { sprites, colliders })
    }

    /// Ends the current frame.
    ///
    /// Records timing and prepares for next frame.
    pub fn end_frame(&mut self, stats: FrameStats) {
        self.frame_count += 1;
        let budget_us = micros(self.config.frame_budget());
        self.stats_accumulator.record(stats, budget_us);

        if stats.total_us > budget_us {
            tracing::warn!(
                frame = stats.frame,
                total_ms = stats.total_us as f64 / 1000.0,
                budget_ms = budget_us as f64 / 1000.0,
                "frame exceeded budget"
            );
        }
    }

    /// Runs `frames` full frames at the fixed step `1 / target_fps`.
    ///
    /// No sleeping: the loop runs as fast as it can, which is what a
    /// headless simulation wants.
    ///
    /// # Errors
    ///
    /// The first error raised by a tick or a render.
    pub fn run_frames(&mut self, frames: u64) -> GameResult<()> {
        let dt = self.config.fixed_delta();

        for _ in 0..frames {
            let frame_start = Instant::now();
            let report = self.tick(dt)?;

            let render_start = Instant::now();
            let frame = self.render()?;
            let render_us = micros(render_start.elapsed());
            tracing::trace!(sprites = frame.sprites.len(), "frame rendered");

            self.end_frame(FrameStats {
                total_us: micros(frame_start.elapsed()),
                barrier_us: report.barrier_us,
                systems_us: report.systems_us,
                render_us,
                frame: report.frame,
                collisions: u32::try_from(report.collisions.len()).unwrap_or(u32::MAX),
            });
        }
        Ok(())
    }

    /// Returns the current frame count.
    #[inline]
    #[must_use]
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Game clock in whole milliseconds.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn clock_ms(&self) -> u64 {
        self.clock_ms as u64
    }

    /// The registry.
    #[must_use]
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// The registry, mutably.
    pub fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    /// The texture catalog.
    #[must_use]
    pub fn assets(&self) -> &AssetCatalog {
        &self.assets
    }

    /// The configuration.
    #[must_use]
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Returns the accumulated statistics.
    #[must_use]
    pub fn stats(&self) -> &FrameStatsAccumulator {
        &self.stats_accumulator
    }
}

/// Accumulator for frame statistics.
#[derive(Clone, Debug)]
pub struct FrameStatsAccumulator {
    /// Total frames recorded.
    pub frames_recorded: u64,
    /// Sum of total frame times.
    pub total_us_sum: u64,
    /// Sum of barrier times.
    pub barrier_us_sum: u64,
    /// Sum of update system times.
    pub systems_us_sum: u64,
    /// Sum of render times.
    pub render_us_sum: u64,
    /// Min frame time.
    pub min_frame_us: u64,
    /// Max frame time.
    pub max_frame_us: u64,
    /// Frames that exceeded budget.
    pub frames_over_budget: u64,
    /// Colliding pairs seen.
    pub collisions: u64,
}

impl FrameStatsAccumulator {
    /// Creates a new accumulator.
    #[must_use]
    pub fn new() -> Self {
        Self {
            frames_recorded: 0,
            total_us_sum: 0,
            barrier_us_sum: 0,
            systems_us_sum: 0,
            render_us_sum: 0,
            min_frame_us: u64::MAX,
            max_frame_us: 0,
            frames_over_budget: 0,
            collisions: 0,
        }
    }

    /// Records a frame's statistics against a budget in microseconds.
    pub fn record(&mut self, stats: FrameStats, budget_us: u64) {
        self.frames_recorded += 1;
        self.total_us_sum += stats.total_us;
        self.barrier_us_sum += stats.barrier_us;
        self.systems_us_sum += stats.systems_us;
        self.render_us_sum += stats.render_us;
        self.min_frame_us = self.min_frame_us.min(stats.total_us);
        self.max_frame_us = self.max_frame_us.max(stats.total_us);
        self.collisions += u64::from(stats.collisions);

        if stats.total_us > budget_us {
            self.frames_over_budget += 1;
        }
    }

    /// Returns average frame time in milliseconds.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn avg_frame_ms(&self) -> f64 {
        if self.frames_recorded == 0 {
            return 0.0;
        }
        (self.total_us_sum as f64 / self.frames_recorded as f64) / 1000.0
    }

    /// Returns average FPS.
    #[must_use]
    pub fn avg_fps(&self) -> f64 {
        let avg_ms = self.avg_frame_ms();
        if avg_ms <= 0.0 {
            return 0.0;
        }
        1000.0 / avg_ms
    }

    /// Returns the fraction of frames over budget.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn over_budget_ratio(&self) -> f64 {
        if self.frames_recorded == 0 {
            return 0.0;
        }
        self.frames_over_budget as f64 / self.frames_recorded as f64
    }

    /// Logs a summary of the statistics.
    #[allow(clippy::cast_precision_loss)]
    pub fn log_summary(&self) {
        let per_frame = |sum: u64| {
            if self.frames_recorded == 0 {
                0.0
            } else {
                (sum as f64 / self.frames_recorded as f64) / 1000.0
            }
        };
        let min_ms = if self.frames_recorded == 0 {
            0.0
        } else {
            self.min_frame_us as f64 / 1000.0
        };

        tracing::info!(
            frames = self.frames_recorded,
            avg_ms = self.avg_frame_ms(),
            avg_fps = self.avg_fps(),
            min_ms,
            max_ms = self.max_frame_us as f64 / 1000.0,
            "frame timing"
        );
        tracing::info!(
            barrier_ms = per_frame(self.barrier_us_sum),
            systems_ms = per_frame(self.systems_us_sum),
            render_ms = per_frame(self.render_us_sum),
            over_budget = self.frames_over_budget,
            over_budget_pct = self.over_budget_ratio() * 100.0,
            collisions = self.collisions,
            "frame breakdown"
        );
    }
}

impl Default for FrameStatsAccumulator {
    fn default() -> Self {
        Self::new()
    }
}

/// Saturating microseconds of a duration.
fn micros(duration: std::time::Duration) -> u64 {
    u64::try_from(duration.as_micros()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{RigidBody, Sprite, Transform, Vec2};
    use crate::level::JUNGLE_MAP;

    #[test]
    fn test_game_loop_creation() {
        let game_loop = GameLoop::new(GameConfig::default()).unwrap();
        assert_eq!(game_loop.frame_count(), 0);
        assert_eq!(game_loop.registry().system_count(), 5);
    }

    #[test]
    fn test_delta_is_clamped() {
        let mut game_loop = GameLoop::new(GameConfig::default()).unwrap();
        assert!((game_loop.tick(5.0).unwrap().delta_seconds - 0.1).abs() < f64::EPSILON);
        assert!(game_loop.tick(-1.0).unwrap().delta_seconds.abs() < f64::EPSILON);
        assert!(game_loop.tick(f64::NAN).unwrap().delta_seconds.abs() < f64::EPSILON);
        assert_eq!(game_loop.clock_ms(), 100);
    }

    #[test]
    fn test_level_entities_join_on_first_tick() {
        let mut game_loop = GameLoop::new(GameConfig::default()).unwrap();
        game_loop.load_level_one(JUNGLE_MAP).unwrap();
        assert!(game_loop.render().unwrap().sprites.is_empty());

        game_loop.tick(0.0).unwrap();
        let frame = game_loop.render().unwrap();
        assert_eq!(frame.sprites.len(), 504);
        assert!(frame.colliders.is_empty());

        // Tiles first, truck (z 4) last.
        assert_eq!(frame.sprites[0].z_index, 0);
        assert_eq!(frame.sprites[503].z_index, 4);
    }

    #[test]
    fn test_debug_colliders() {
        let config = GameConfig {
            debug_colliders: true,
            ..GameConfig::default()
        };
        let mut game_loop = GameLoop::new(config).unwrap();
        game_loop.load_level_one(JUNGLE_MAP).unwrap();
        game_loop.tick(0.0).unwrap();

        assert_eq!(game_loop.render().unwrap().colliders.len(), 2);
    }

    #[test]
    fn test_tick_moves_entities() {
        let mut game_loop = GameLoop::new(GameConfig::default()).unwrap();
        let registry = game_loop.registry_mut();
        let e = registry.create_entity();
        registry.add_component(e, Transform::at(Vec2::new(1.0, 1.0))).unwrap();
        registry.add_component(e, RigidBody::new(Vec2::new(2.0, 0.0))).unwrap();
        registry.add_component(e, Sprite::default()).unwrap();

        game_loop.tick(0.1).unwrap();
        let position = game_loop.registry().get_component::<Transform>(e).unwrap().position;
        assert!((position.x - 1.2).abs() < 1e-5);
    }

    #[test]
    fn test_run_frames_records_stats() {
        let mut game_loop = GameLoop::new(GameConfig::default()).unwrap();
        game_loop.load_level_one(JUNGLE_MAP).unwrap();
        game_loop.run_frames(10).unwrap();

        assert_eq!(game_loop.frame_count(), 10);
        assert_eq!(game_loop.stats().frames_recorded, 10);
        assert_eq!(game_loop.clock_ms(), 166);
    }

    #[test]
    fn test_stats_accumulator() {
        let mut acc = FrameStatsAccumulator::new();

        for i in 0..100 {
            acc.record(
                FrameStats {
                    total_us: 10_000 + (i * 100),
                    barrier_us: 1000,
                    systems_us: 5000,
                    render_us: 2000,
                    frame: i,
                    collisions: 0,
                },
                16_666,
            );
        }

        assert_eq!(acc.frames_recorded, 100);
        assert!(acc.avg_fps() > 50.0);
        assert!(acc.avg_fps() < 100.0);
        assert_eq!(acc.frames_over_budget, 33);
    }
}
