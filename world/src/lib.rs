#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Transience.

mod entity;
mod grid;
mod map;
mod registry;

pub use entity::Entity;
pub use grid::GridBuffer;
pub use map::Map;
pub use registry::EntityRegistry;

use tracing::{debug, trace, warn};
use transience_core::{Command, EntityId, Event, MapContext, Tile};

/// Represents the authoritative simulation state: terrain plus live entities.
#[derive(Clone, Debug)]
pub struct World {
    map: Map,
    registry: EntityRegistry,
    game_over: bool,
}

impl World {
    /// Creates a world over the provided map with no entities.
    #[must_use]
    pub fn new(map: Map) -> Self {
        Self {
            map,
            registry: EntityRegistry::new(),
            game_over: false,
        }
    }

    fn remove_and_clean(&mut self, entity: EntityId, out_events: &mut Vec<Event>) {
        let Some(target) = self.registry.get(entity) else {
            trace!(entity = entity.get(), "remove-and-clean of unknown entity ignored");
            return;
        };

        if target.is_player() {
            self.game_over = true;
            debug!(player = entity.get(), "player died, requesting end of game");
            out_events.push(Event::GameOverRequested { player: entity });
            return;
        }

        let Some(removed) = self.registry.remove(entity) else {
            return;
        };
        let position = removed.position();
        debug!(
            entity = entity.get(),
            x = position.x(),
            y = position.y(),
            "entity removed"
        );
        out_events.push(Event::EntityRemoved { entity, position });

        // The reset cell is diagonally up-left of the death cell.
        let reset = position.offset(-1, -1);
        match self.map.set_tile(Tile::SPACE, reset) {
            Ok(()) => out_events.push(Event::TileReset { position: reset }),
            Err(error) => warn!(%error, "skipped tile reset"),
        }
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::SpawnEntity {
            blueprint,
            position,
        } => {
            let bounds = world.map.bounds();
            let entity = world.registry.insert(blueprint, position, bounds);
            debug!(
                entity = entity.get(),
                x = position.x(),
                y = position.y(),
                "entity spawned"
            );
            out_events.push(Event::EntitySpawned { entity, position });
        }
        Command::MoveEntity {
            entity,
            delta_x,
            delta_y,
        } => {
            let Some(actor) = world.registry.get_mut(entity) else {
                return;
            };
            let from = actor.position();
            if actor.move_by(delta_x, delta_y, &world.map) {
                out_events.push(Event::EntityMoved {
                    entity,
                    from,
                    to: actor.position(),
                });
            } else {
                let attempted = actor.preview_move(delta_x, delta_y);
                trace!(entity = entity.get(), "move blocked");
                out_events.push(Event::MoveBlocked { entity, attempted });
            }
        }
        Command::DamageEntity { entity, amount } => {
            if let Some(target) = world.registry.get_mut(entity) {
                target.damage(amount);
                out_events.push(Event::EntityDamaged {
                    entity,
                    amount,
                    health: target.health(),
                });
            }
        }
        Command::HealEntity { entity, amount } => {
            if let Some(target) = world.registry.get_mut(entity) {
                target.heal(amount);
                out_events.push(Event::EntityHealed {
                    entity,
                    amount,
                    health: target.health(),
                });
            }
        }
        Command::SetMaxHealth { entity, max_health } => {
            if let Some(target) = world.registry.get_mut(entity) {
                target.set_max_health(max_health);
                out_events.push(Event::MaxHealthChanged {
                    entity,
                    max_health: target.max_health(),
                    health: target.health(),
                });
            }
        }
        Command::AwardExperience { entity, amount } => {
            let total = world
                .registry
                .get_mut(entity)
                .and_then(|target| target.award_experience(amount));
            if let Some(total) = total {
                out_events.push(Event::ExperienceAwarded {
                    entity,
                    amount,
                    total,
                });
            }
        }
        Command::RemoveAndClean { entity } => world.remove_and_clean(entity, out_events),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use transience_core::{EntityId, MapContext, Position, Tile};

    use super::{Entity, EntityRegistry, Map, World};

    /// Provides read-only access to the terrain.
    #[must_use]
    pub fn map(world: &World) -> &Map {
        &world.map
    }

    /// Provides read-only access to the live entities.
    #[must_use]
    pub fn registry(world: &World) -> &EntityRegistry {
        &world.registry
    }

    /// Looks up a live entity.
    #[must_use]
    pub fn entity(world: &World, id: EntityId) -> Option<&Entity> {
        world.registry.get(id)
    }

    /// The player entity, if one is registered.
    #[must_use]
    pub fn player(world: &World) -> Option<&Entity> {
        world.registry.player()
    }

    /// Every other entity within `radius` of `id`, in registry order.
    #[must_use]
    pub fn within_range(world: &World, id: EntityId, radius: f64) -> Vec<EntityId> {
        world.registry.within_range(id, radius)
    }

    /// Tile stored at the position.
    #[must_use]
    pub fn tile_at(world: &World, position: Position) -> Option<&Tile> {
        world.map.tile_at(position)
    }

    /// Reports whether the end-of-game signal has been raised.
    #[must_use]
    pub fn is_game_over(world: &World) -> bool {
        world.game_over
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use transience_core::{EntityBlueprint, MonsterKind, Position};

    #[test]
    fn spawn_records_map_bounds_on_entity() {
        let mut world = World::new(Map::bordered(6, 4));
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::SpawnEntity {
                blueprint: EntityBlueprint::monster(MonsterKind::Rat),
                position: Position::new(2, 2),
            },
            &mut events,
        );

        let entity = query::registry(&world).iter().next().expect("spawned");
        assert_eq!(entity.bounds(), query::map(&world).bounds());
        assert_eq!(
            events,
            vec![Event::EntitySpawned {
                entity: entity.id(),
                position: Position::new(2, 2),
            }]
        );
    }

    #[test]
    fn commands_for_unknown_entities_are_silent() {
        let mut world = World::new(Map::bordered(3, 3));
        let mut events = Vec::new();
        let ghost = EntityId::new(42);
        for command in [
            Command::MoveEntity {
                entity: ghost,
                delta_x: 1,
                delta_y: 0,
            },
            Command::DamageEntity {
                entity: ghost,
                amount: 3,
            },
            Command::RemoveAndClean { entity: ghost },
        ] {
            apply(&mut world, command, &mut events);
        }
        assert!(events.is_empty());
        assert!(!query::is_game_over(&world));
    }
}
