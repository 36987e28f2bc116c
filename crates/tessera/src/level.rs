//! # Level Loading
//!
//! ## Tilemap Format
//!
//! One token per tile, row-major, separated by commas and/or line breaks.
//! Each token is two digits `YX`: the tile's row and column in the tile
//! sheet.
//!
//! ```text
//! 21,22,20,04
//! 10,11,10,04
//! ```

use tessera_core::{Entity, Registry};

use crate::assets::{AssetCatalog, AssetId};
use crate::components::{Animation, BoxCollider, RigidBody, Sprite, Transform, Vec2};
use crate::config::GameConfig;
use crate::error::{GameError, GameResult};

/// The jungle tilemap of level 1.
pub const JUNGLE_MAP: &str = include_str!("../assets/jungle.map");

/// Source cell of one tile in the tile sheet.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TileRef {
    /// Sheet row.
    pub sheet_row: u8,
    /// Sheet column.
    pub sheet_col: u8,
}

/// Parses `text` into exactly `rows * cols` tiles.
///
/// # Errors
///
/// [`GameError::MapParse`] for a malformed token,
/// [`GameError::MapSize`] if the tile count is off.
pub fn parse_tilemap(text: &str, rows: usize, cols: usize) -> GameResult<Vec<TileRef>> {
    let expected = rows * cols;
    let mut tiles = Vec::with_capacity(expected);

    let tokens = text
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|token| !token.is_empty());

    for (i, token) in tokens.enumerate() {
        let (row, col) = (i / cols, i % cols);
        let bytes = token.as_bytes();
        if bytes.len() != 2 || !bytes.iter().all(u8::is_ascii_digit) {
            return Err(GameError::MapParse {
                row,
                col,
                reason: format!("expected two digits, found {token:?}"),
            });
        }
        tiles.push(TileRef {
            sheet_row: bytes[0] - b'0',
            sheet_col: bytes[1] - b'0',
        });
    }

    if tiles.len() != expected {
        return Err(GameError::MapSize {
            expected,
            found: tiles.len(),
        });
    }
    Ok(tiles)
}

/// Handles of the named entities of level 1.
#[derive(Clone, Debug)]
pub struct Level {
    /// Background tiles, row-major.
    pub tiles: Vec<Entity>,
    /// Animated, stationary.
    pub chopper: Entity,
    /// Animated HUD element pinned to the top-right corner.
    pub radar: Entity,
    /// Drives left, collides with the truck.
    pub tank: Entity,
    /// Drives right, collides with the tank.
    pub truck: Entity,
}

/// Registers the level 1 textures.
pub fn register_textures(assets: &mut AssetCatalog) {
    assets.add_texture("tank-image", "./assets/images/tank-panther-right.png");
    assets.add_texture("truck-image", "./assets/images/truck-ford-right.png");
    assets.add_texture("chopper-image", "./assets/images/chopper.png");
    assets.add_texture("radar-image", "./assets/images/radar.png");
    assets.add_texture("tilemap-image", "./assets/tilemaps/jungle.png");
}

/// Spawns level 1 from `map` into `registry`.
///
/// Entities are staged; they join systems at the next barrier.
///
/// # Errors
///
/// Map errors, unknown textures and registry contract violations.
pub fn load_level_one(
    registry: &mut Registry,
    assets: &AssetCatalog,
    config: &GameConfig,
    map: &str,
    now_ms: u64,
) -> GameResult<Level> {
    let tile_map = parse_tilemap(map, config.map_rows, config.map_cols)?;
    let tiles = spawn_tiles(registry, assets.texture("tilemap-image")?, config, &tile_map)?;

    let chopper = spawn_actor(
        registry,
        Vec2::new(10.0, 100.0),
        Vec2::ZERO,
        Sprite::new(assets.texture("chopper-image")?, 32, 32, 1),
    )?;
    registry.add_component(chopper, Animation::new(2, 15, true, now_ms))?;

    #[allow(clippy::cast_precision_loss)]
    let radar_x = config.window_width as f32 - 74.0;
    let radar = spawn_actor(
        registry,
        Vec2::new(radar_x, 10.0),
        Vec2::ZERO,
        Sprite::new(assets.texture("radar-image")?, 64, 64, 1),
    )?;
    registry.add_component(radar, Animation::new(8, 5, true, now_ms))?;

    let tank = spawn_actor(
        registry,
        Vec2::new(500.0, 10.0),
        Vec2::new(-30.0, 0.0),
        Sprite::new(assets.texture("tank-image")?, 32, 32, 3),
    )?;
    registry.add_component(tank, BoxCollider::new(32, 32))?;

    let truck = spawn_actor(
        registry,
        Vec2::new(10.0, 10.0),
        Vec2::new(20.0, 0.0),
        Sprite::new(assets.texture("truck-image")?, 32, 32, 4),
    )?;
    registry.add_component(truck, BoxCollider::new(32, 32))?;

    tracing::info!(tiles = tiles.len(), "level 1 loaded");
    Ok(Level {
        tiles,
        chopper,
        radar,
        tank,
        truck,
    })
}

#[allow(clippy::cast_precision_loss)]
fn spawn_tiles(
    registry: &mut Registry,
    sheet: AssetId,
    config: &GameConfig,
    tile_map: &[TileRef],
) -> GameResult<Vec<Entity>> {
    let step = config.tile_scale * config.tile_size as f32;
    let size = i32::try_from(config.tile_size)
        .map_err(|_| GameError::Config("tile_size exceeds i32::MAX".into()))?;

    tile_map
        .iter()
        .enumerate()
        .map(|(i, tile)| -> GameResult<Entity> {
            let (row, col) = (i / config.map_cols, i % config.map_cols);
            let tile_entity = registry.create_entity();
            registry.add_component(
                tile_entity,
                Transform::new(
                    Vec2::new(col as f32 * step, row as f32 * step),
                    Vec2::new(config.tile_scale, config.tile_scale),
                    0.0,
                ),
            )?;
            registry.add_component(
                tile_entity,
                Sprite::with_source(
                    sheet,
                    config.tile_size,
                    config.tile_size,
                    0,
                    i32::from(tile.sheet_col) * size,
                    i32::from(tile.sheet_row) * size,
                ),
            )?;
            Ok(tile_entity)
        })
        .collect()
}

fn spawn_actor(
    registry: &mut Registry,
    position: Vec2,
    velocity: Vec2,
    sprite: Sprite,
) -> GameResult<Entity> {
    let entity = registry.create_entity();
    let mut view = registry.entity_mut(entity)?;
    view.add_component(Transform::at(position))?
        .add_component(RigidBody::new(velocity))?
        .add_component(sprite)?;
    Ok(entity)
}
