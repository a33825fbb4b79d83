//! Ordered set of live entities and identifier allocation.

use transience_core::{EntityBlueprint, EntityId, MapBounds, Position};

use crate::Entity;

/// Live entities on the current map, kept in insertion order.
#[derive(Clone, Debug, Default)]
pub struct EntityRegistry {
    entities: Vec<Entity>,
    next_id: u32,
}

impl EntityRegistry {
    /// Creates an empty registry with a reset identifier counter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(
        &mut self,
        blueprint: EntityBlueprint,
        position: Position,
        bounds: MapBounds,
    ) -> EntityId {
        let id = EntityId::new(self.next_id);
        self.next_id = self.next_id.saturating_add(1);
        self.entities
            .push(Entity::from_blueprint(id, blueprint, position, bounds));
        id
    }

    pub(crate) fn remove(&mut self, id: EntityId) -> Option<Entity> {
        let index = self.index_of(id)?;
        Some(self.entities.remove(index))
    }

    /// Number of live entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Reports whether no entity is alive.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Iterates over entities in registry order.
    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter()
    }

    /// Looks up an entity by identifier.
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.iter().find(|entity| entity.id() == id)
    }

    pub(crate) fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.iter_mut().find(|entity| entity.id() == id)
    }

    /// Reports whether the entity is registered.
    #[must_use]
    pub fn contains(&self, id: EntityId) -> bool {
        self.index_of(id).is_some()
    }

    /// Splits the registry into the player and everyone else, preserving
    /// registry order. When several players exist the last one wins.
    #[must_use]
    pub fn partition_player(&self) -> (Option<EntityId>, Vec<EntityId>) {
        let mut player = None;
        let mut others = Vec::with_capacity(self.entities.len());
        for entity in &self.entities {
            if entity.is_player() {
                player = Some(entity.id());
            } else {
                others.push(entity.id());
            }
        }
        (player, others)
    }

    /// The player entity, if present.
    #[must_use]
    pub fn player(&self) -> Option<&Entity> {
        self.entities.iter().rev().find(|entity| entity.is_player())
    }

    /// Every other entity within `radius` of `id`, in registry order.
    ///
    /// Returns an empty list when `id` is not registered.
    #[must_use]
    pub fn within_range(&self, id: EntityId, radius: f64) -> Vec<EntityId> {
        let Some(origin) = self.get(id) else {
            return Vec::new();
        };
        self.entities
            .iter()
            .filter(|entity| entity.id() != id)
            .filter(|entity| origin.distance_to_entity(entity) <= radius)
            .map(Entity::id)
            .collect()
    }

    fn index_of(&self, id: EntityId) -> Option<usize> {
        self.entities.iter().position(|entity| entity.id() == id)
    }
}
