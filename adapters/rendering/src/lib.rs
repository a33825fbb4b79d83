#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Transience adapters.

use anyhow::{Context, Result as AnyResult};
use glam::Vec2;
use std::{error::Error, fmt};
use transience_core::{ItemKind, MapContext, Position, Tile, TileKind};
use transience_system_visibility::entity_can_see;
use transience_world::{query, World};

/// Output surface capable of drawing single glyphs.
pub trait Presenter {
    /// Draws `glyph` at `screen_position`.
    ///
    /// When `center_anchored` is set the position marks the centre of the
    /// glyph, otherwise its top-left corner.
    fn render(
        &mut self,
        glyph: char,
        screen_position: Vec2,
        center_anchored: bool,
    ) -> AnyResult<()>;
}

/// Maps tile coordinates onto screen space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    origin: Vec2,
    tile_length: f32,
}

impl Viewport {
    /// Creates a viewport whose tile `(0, 0)` starts at `origin`.
    ///
    /// Returns an error when `tile_length` is not a positive finite length.
    pub fn new(origin: Vec2, tile_length: f32) -> Result<Self, RenderingError> {
        if !tile_length.is_finite() || tile_length <= 0.0 {
            return Err(RenderingError::InvalidTileLength { tile_length });
        }

        Ok(Self {
            origin,
            tile_length,
        })
    }

    /// Side length of a tile in screen units.
    #[must_use]
    pub const fn tile_length(&self) -> f32 {
        self.tile_length
    }

    /// Top-left corner of the tile.
    #[must_use]
    pub fn tile_origin(&self, position: Position) -> Vec2 {
        let tile = Vec2::new(position.x() as f32, position.y() as f32);
        self.origin + tile * self.tile_length
    }

    /// Centre of the tile.
    #[must_use]
    pub fn tile_center(&self, position: Position) -> Vec2 {
        self.tile_origin(position) + Vec2::splat(self.tile_length * 0.5)
    }
}

/// Character drawn for a tile; item stacks take precedence over terrain.
#[must_use]
pub fn tile_glyph(tile: &Tile) -> char {
    if let Some(stack) = tile.items() {
        return match stack.item() {
            ItemKind::Coin => '$',
            ItemKind::Potion => '!',
            ItemKind::Arrow => '/',
        };
    }

    match tile.kind() {
        TileKind::Wall => '#',
        TileKind::Floor => '.',
        TileKind::Space => ' ',
    }
}

/// Draws every set tile of the map, columns outermost.
///
/// Returns the number of glyphs drawn.
pub fn render_terrain(
    world: &World,
    viewport: &Viewport,
    presenter: &mut dyn Presenter,
) -> AnyResult<usize> {
    let map = query::map(world);
    let bounds = map.bounds();
    let mut rendered = 0;

    for x in bounds.min_x..=bounds.max_x {
        for y in bounds.min_y..=bounds.max_y {
            let position = Position::new(x, y);
            let Some(tile) = map.tile_at(position) else {
                continue;
            };
            presenter
                .render(tile_glyph(tile), viewport.tile_origin(position), false)
                .with_context(|| format!("failed to draw tile at ({x}, {y})"))?;
            rendered += 1;
        }
    }

    Ok(rendered)
}

/// Draws every entity the player can see, in registry order.
///
/// Without a player every entity is drawn. Returns the number of glyphs drawn.
pub fn render_frame(
    world: &World,
    viewport: &Viewport,
    presenter: &mut dyn Presenter,
) -> AnyResult<usize> {
    let player = query::player(world).map(|entity| entity.id());
    let mut rendered = 0;

    for entity in query::registry(world).iter() {
        let visible = player.map_or(true, |player| entity_can_see(world, player, entity.id()));
        if !visible {
            continue;
        }

        let position = entity.position();
        presenter
            .render(entity.kind().glyph(), viewport.tile_center(position), true)
            .with_context(|| format!("failed to draw entity {}", entity.id().get()))?;
        rendered += 1;
    }

    Ok(rendered)
}

/// Errors that can occur when constructing rendering descriptors.
#[derive(Debug, PartialEq)]
pub enum RenderingError {
    /// Tiles must have a positive finite side length.
    InvalidTileLength {
        /// Provided length that failed validation.
        tile_length: f32,
    },
}

impl fmt::Display for RenderingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidTileLength { tile_length } => {
                write!(
                    f,
                    "tile_length must be positive and finite (received {tile_length})"
                )
            }
        }
    }
}

impl Error for RenderingError {}
