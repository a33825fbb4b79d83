#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Line-of-sight checks between entities.
//!
//! Aligned pairs are checked exhaustively along their shared row or column.
//! Every other pair is checked by sampling a single cell per intermediate
//! column on the line joining the two points, rounding the line's height up.
//! The sampling is coarse: walls the line merely grazes, or walls a steep line
//! crosses between two sampled cells, do not block sight.
//! The slope is kept fractional rather than truncated to a whole number.

use transience_core::{EntityId, MapContext, Position, TileKind};
use transience_world::{query, World};

/// Reports whether an observer at `from` can see `to` on the provided map.
#[must_use]
pub fn can_see(map: &dyn MapContext, from: Position, to: Position) -> bool {
    if from.y() == to.y() {
        let row = from.y();
        return !strictly_between(from.x(), to.x()).any(|x| is_wall(map, Position::new(x, row)));
    }

    if from.x() == to.x() {
        let column = from.x();
        return !strictly_between(from.y(), to.y())
            .any(|y| is_wall(map, Position::new(column, y)));
    }

    let slope =
        (f64::from(to.y()) - f64::from(from.y())) / (f64::from(to.x()) - f64::from(from.x()));
    let intercept = f64::from(to.y()) - f64::from(to.x()) * slope;

    !strictly_between(from.x(), to.x()).any(|x| {
        let y = (f64::from(x) * slope + intercept).ceil();
        is_wall(map, Position::new(x, y as i32))
    })
}

/// Reports whether entity `observer` can see entity `target`.
///
/// Unknown entities see nothing and cannot be seen.
#[must_use]
pub fn entity_can_see(world: &World, observer: EntityId, target: EntityId) -> bool {
    match (query::entity(world, observer), query::entity(world, target)) {
        (Some(observer), Some(target)) => {
            can_see(query::map(world), observer.position(), target.position())
        }
        _ => false,
    }
}

fn strictly_between(a: i32, b: i32) -> std::ops::Range<i32> {
    let (low, high) = if a <= b { (a, b) } else { (b, a) };
    low.saturating_add(1)..high
}

fn is_wall(map: &dyn MapContext, position: Position) -> bool {
    map.tile_at(position)
        .map_or(false, |tile| tile.kind() == TileKind::Wall)
}
