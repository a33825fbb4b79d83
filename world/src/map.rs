//! Tile map backing the world.

use transience_core::{GridError, MapBounds, MapContext, Position, Tile};

use crate::GridBuffer;

/// Terrain of the current level.
#[derive(Clone, Debug, PartialEq)]
pub struct Map {
    grid: GridBuffer<Tile>,
}

impl Map {
    /// Wraps an existing tile grid.
    #[must_use]
    pub fn new(grid: GridBuffer<Tile>) -> Self {
        Self { grid }
    }

    /// Floor-filled room enclosed by a one-tile wall border.
    #[must_use]
    pub fn bordered(width: u32, height: u32) -> Self {
        let mut grid = GridBuffer::filled(width, height, Tile::FLOOR);
        let last_column = i32::try_from(width).unwrap_or(i32::MAX) - 1;
        let last_row = i32::try_from(height).unwrap_or(i32::MAX) - 1;
        for x in 0..=last_column {
            for y in 0..=last_row {
                if x == 0 || y == 0 || x == last_column || y == last_row {
                    let _ = grid.set(Tile::WALL, x, y);
                }
            }
        }
        Self { grid }
    }

    /// Read access to the tile grid.
    #[must_use]
    pub fn grid(&self) -> &GridBuffer<Tile> {
        &self.grid
    }

    /// Mutable access to the tile grid, used while preparing a level.
    pub fn grid_mut(&mut self) -> &mut GridBuffer<Tile> {
        &mut self.grid
    }

    /// Replaces the tile at `position`.
    pub fn set_tile(&mut self, tile: Tile, position: Position) -> Result<(), GridError> {
        self.grid.set(tile, position.x(), position.y())
    }
}

impl MapContext for Map {
    fn tile_at(&self, position: Position) -> Option<&Tile> {
        self.grid.get(position.x(), position.y())
    }

    fn is_passable(&self, position: Position) -> bool {
        self.tile_at(position).map_or(false, Tile::is_passable)
    }

    fn bounds(&self) -> MapBounds {
        let max_x = i32::try_from(self.grid.width()).unwrap_or(i32::MAX) - 1;
        let max_y = i32::try_from(self.grid.height()).unwrap_or(i32::MAX) - 1;
        MapBounds::new(0, 0, max_x, max_y)
    }
}
