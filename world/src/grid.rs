//! Dense two-dimensional cell storage with random placement helpers.

use tracing::debug;
use transience_core::{
    GridError, ItemKind, ItemStack, Position, RandomSource, Similar, Tile, SCATTER_ROLL_CEILING,
};

/// Width×height array of optional cells.
#[derive(Clone, Debug, PartialEq)]
pub struct GridBuffer<T> {
    width: u32,
    height: u32,
    cells: Vec<Option<T>>,
}

impl<T: Clone> GridBuffer<T> {
    /// Creates a grid whose cells are all unset.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            cells: vec![None; capacity(width, height)],
        }
    }

    /// Creates a grid with every cell set to `cell`.
    #[must_use]
    pub fn filled(width: u32, height: u32, cell: T) -> Self {
        Self {
            width,
            height,
            cells: vec![Some(cell); capacity(width, height)],
        }
    }
}

impl<T> GridBuffer<T> {
    /// Number of columns.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Number of rows.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Cell stored at `(x, y)`; `None` when unset or out of range.
    #[must_use]
    pub fn get(&self, x: i32, y: i32) -> Option<&T> {
        self.index(x, y)
            .and_then(|index| self.cells.get(index))
            .and_then(Option::as_ref)
    }

    /// Stores `cell` at `(x, y)`.
    pub fn set(&mut self, cell: T, x: i32, y: i32) -> Result<(), GridError> {
        let index = self.index(x, y).ok_or(GridError::OutOfBounds { x, y })?;
        let slot = self
            .cells
            .get_mut(index)
            .ok_or(GridError::OutOfBounds { x, y })?;
        *slot = Some(cell);
        Ok(())
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        let column = u32::try_from(x).ok()?;
        let row = u32::try_from(y).ok()?;
        if column < self.width && row < self.height {
            let row = usize::try_from(row).ok()?;
            let column = usize::try_from(column).ok()?;
            let width = usize::try_from(self.width).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }

    fn last_column(&self) -> i32 {
        i32::try_from(self.width.saturating_sub(1)).unwrap_or(i32::MAX)
    }

    fn last_row(&self) -> i32 {
        i32::try_from(self.height.saturating_sub(1)).unwrap_or(i32::MAX)
    }

    fn draw_position(&self, rng: &mut dyn RandomSource) -> Position {
        let x = rng.next_in_range(0, self.last_column());
        let y = rng.next_in_range(0, self.last_row());
        Position::new(x, y)
    }

    fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl<T: Similar> GridBuffer<T> {
    /// Iterates over every position holding a cell similar to `matching`,
    /// columns outermost.
    pub fn positions_matching<'a>(
        &'a self,
        matching: &'a T,
    ) -> impl Iterator<Item = Position> + 'a {
        let columns = self.last_column();
        let rows = self.last_row();
        let populated = !self.is_empty();
        (0..=columns)
            .filter(move |_| populated)
            .flat_map(move |x| (0..=rows).map(move |y| Position::new(x, y)))
            .filter(move |position| self.matches(*position, matching))
    }

    /// Draws uniform positions until one holds a cell similar to `matching`.
    ///
    /// The grid must contain at least one matching cell, otherwise this never
    /// returns. Prefer [`GridBuffer::random_loc`] unless that precondition has
    /// already been established.
    pub fn random_loc_unbounded(&self, matching: &T, rng: &mut dyn RandomSource) -> Position {
        loop {
            let position = self.draw_position(rng);
            if self.matches(position, matching) {
                return position;
            }
        }
    }

    /// Picks a uniformly random position holding a cell similar to `matching`.
    ///
    /// Up to `max_attempts` uniform draws are made over the whole grid. If all
    /// of them miss, the choice is made uniformly among the matching cells
    /// found by a full scan.
    pub fn random_loc(
        &self,
        matching: &T,
        rng: &mut dyn RandomSource,
        max_attempts: u32,
    ) -> Result<Position, GridError> {
        if self.is_empty() {
            return Err(GridError::NoMatchingTile);
        }

        for _ in 0..max_attempts {
            let position = self.draw_position(rng);
            if self.matches(position, matching) {
                return Ok(position);
            }
        }

        let candidates: Vec<Position> = self.positions_matching(matching).collect();
        let last = match candidates.len().checked_sub(1) {
            Some(last) => last,
            None => return Err(GridError::NoMatchingTile),
        };
        let drawn = rng.next_in_range(0, i32::try_from(last).unwrap_or(i32::MAX));
        let index = usize::try_from(drawn).unwrap_or(0).min(last);
        Ok(candidates[index])
    }

    fn matches(&self, position: Position, matching: &T) -> bool {
        self.get(position.x(), position.y())
            .map_or(false, |cell| cell.similar(matching))
    }
}

impl GridBuffer<Tile> {
    /// Scatters stacks of `item` over cells similar to `matching`.
    ///
    /// Cells are visited columns outermost. Each eligible cell (set, similar
    /// to `matching`, no stack yet) receives a stack when a `1..=1000` roll is
    /// at most `rarity_per_mille`. A stack has a limit of `amount` and holds
    /// `amount + 1` units. Scattering halts once the number of placed stacks
    /// equals the effective maximum amount.
    pub fn scatter(
        &mut self,
        item: ItemKind,
        matching: &Tile,
        min: i32,
        max: i32,
        rarity_per_mille: i32,
        rng: &mut dyn RandomSource,
    ) {
        let cmax = max.max(min).max(1);
        let cmin = max.min(min).max(1);
        let mut placed = 0;

        for x in 0..=self.last_column() {
            for y in 0..=self.last_row() {
                let Some(tile) = self.get(x, y).copied() else {
                    continue;
                };
                if !tile.similar(matching) || tile.has_items() {
                    continue;
                }

                let chance = rng.next_in_range(1, SCATTER_ROLL_CEILING);
                if chance > rarity_per_mille {
                    continue;
                }

                let amount = if cmax == cmin {
                    cmin
                } else {
                    rng.next_in_range(cmin, cmax)
                };
                let limit = u32::try_from(amount).unwrap_or(1);
                let mut stack = ItemStack::with_limit(item, limit);
                for _ in 0..=limit {
                    stack.push_unit();
                }

                if self.set(tile.with_items(stack), x, y).is_err() {
                    continue;
                }
                placed += 1;
                if placed == cmax {
                    debug!(?item, placed, "scatter reached its cap");
                    return;
                }
            }
        }

        debug!(?item, placed, "scatter finished");
    }
}

fn capacity(width: u32, height: u32) -> usize {
    let capacity_u64 = u64::from(width) * u64::from(height);
    usize::try_from(capacity_u64).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_range_access_is_guarded() {
        let mut grid = GridBuffer::filled(2, 2, Tile::FLOOR);
        assert!(grid.get(-1, 0).is_none());
        assert!(grid.get(2, 0).is_none());
        assert_eq!(
            grid.set(Tile::WALL, 0, 2),
            Err(GridError::OutOfBounds { x: 0, y: 2 })
        );
    }

    #[test]
    fn new_grid_cells_are_unset() {
        let grid: GridBuffer<Tile> = GridBuffer::new(3, 2);
        assert_eq!(grid.width(), 3);
        assert_eq!(grid.height(), 2);
        assert!(grid.get(1, 1).is_none());
    }

    #[test]
    fn set_then_get_addresses_the_same_cell() {
        let mut grid = GridBuffer::filled(4, 3, Tile::FLOOR);
        grid.set(Tile::WALL, 3, 1).expect("in range");
        assert_eq!(grid.get(3, 1), Some(&Tile::WALL));
        assert_eq!(grid.get(1, 3), None);
        assert_eq!(grid.get(1, 1), Some(&Tile::FLOOR));
    }

    #[test]
    fn positions_matching_visits_columns_first() {
        let mut grid = GridBuffer::filled(2, 2, Tile::WALL);
        grid.set(Tile::FLOOR, 1, 0).expect("in range");
        grid.set(Tile::FLOOR, 0, 1).expect("in range");
        let found: Vec<Position> = grid.positions_matching(&Tile::FLOOR).collect();
        assert_eq!(found, vec![Position::new(0, 1), Position::new(1, 0)]);
    }

    #[test]
    fn empty_grid_reports_no_match() {
        let grid: GridBuffer<Tile> = GridBuffer::new(0, 0);
        let mut rng = transience_core::SequenceSource::default();
        assert_eq!(
            grid.random_loc(&Tile::FLOOR, &mut rng, 8),
            Err(GridError::NoMatchingTile)
        );
    }
}
