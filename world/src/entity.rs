//! Positional, movement and health model shared by every actor.

use transience_core::{
    EntityBlueprint, EntityId, EntityKind, MapBounds, MapContext, MonsterKind, PlayerState,
    Position, MAX_LEVEL,
};

/// Actor living on the map: the player or a monster.
#[derive(Clone, Debug, PartialEq)]
pub struct Entity {
    id: EntityId,
    kind: EntityKind,
    position: Position,
    bounds: MapBounds,
    level: u32,
    max_level: u32,
    health: i32,
    initial_health: i32,
    max_health: i32,
    floor: i32,
}

impl Entity {
    pub(crate) fn from_blueprint(
        id: EntityId,
        blueprint: EntityBlueprint,
        position: Position,
        bounds: MapBounds,
    ) -> Self {
        let max_health = blueprint.max_health.max(1);
        Self {
            id,
            kind: blueprint.kind,
            position,
            bounds,
            level: blueprint.level,
            max_level: MAX_LEVEL,
            health: blueprint.health.clamp(0, max_health),
            initial_health: blueprint.initial_health.clamp(0, max_health),
            max_health,
            floor: blueprint.floor,
        }
    }

    /// Identifier allocated by the registry.
    #[must_use]
    pub const fn id(&self) -> EntityId {
        self.id
    }

    /// Variant of the entity.
    #[must_use]
    pub const fn kind(&self) -> &EntityKind {
        &self.kind
    }

    /// Reports whether this is the distinguished player entity.
    #[must_use]
    pub const fn is_player(&self) -> bool {
        matches!(self.kind, EntityKind::Player(_))
    }

    /// Species of the entity when it is a monster.
    #[must_use]
    pub const fn monster_kind(&self) -> Option<MonsterKind> {
        match self.kind {
            EntityKind::Monster(kind) => Some(kind),
            EntityKind::Player(_) => None,
        }
    }

    /// Player-only state, when this is the player.
    #[must_use]
    pub const fn player_state(&self) -> Option<&PlayerState> {
        match &self.kind {
            EntityKind::Player(state) => Some(state),
            EntityKind::Monster(_) => None,
        }
    }

    /// Cell currently occupied.
    #[must_use]
    pub const fn position(&self) -> Position {
        self.position
    }

    /// Euclidean distance from the entity to `position`.
    #[must_use]
    pub fn distance_to(&self, position: Position) -> f64 {
        self.position.distance_to(position)
    }

    /// Euclidean distance between two entities.
    #[must_use]
    pub fn distance_to_entity(&self, other: &Entity) -> f64 {
        self.distance_to(other.position)
    }

    /// Reports whether the entity stands exactly on `position`.
    #[must_use]
    pub fn intersects(&self, position: Position) -> bool {
        self.position == position
    }

    /// Movement bounds recorded for the entity. They are not applied by moves.
    #[must_use]
    pub const fn bounds(&self) -> MapBounds {
        self.bounds
    }

    /// Replaces the recorded movement bounds.
    pub fn set_bounds(&mut self, bounds: MapBounds) {
        self.bounds = bounds;
    }

    /// Cell the entity would occupy after moving by the deltas.
    #[must_use]
    pub const fn preview_move(&self, delta_x: i32, delta_y: i32) -> Position {
        self.position.offset(delta_x, delta_y)
    }

    /// Moves by the deltas when the destination is passable.
    ///
    /// Returns `false` and leaves the entity untouched otherwise.
    pub fn move_by(&mut self, delta_x: i32, delta_y: i32, map: &dyn MapContext) -> bool {
        let destination = self.preview_move(delta_x, delta_y);
        if !map.is_passable(destination) {
            return false;
        }
        self.position = destination;
        true
    }

    /// Current level.
    #[must_use]
    pub const fn level(&self) -> u32 {
        self.level
    }

    /// Sets the level without consulting [`Entity::max_level`].
    pub fn set_level(&mut self, level: u32) {
        self.level = level;
    }

    /// Conceptual level ceiling.
    #[must_use]
    pub const fn max_level(&self) -> u32 {
        self.max_level
    }

    /// Floor the entity lives on.
    #[must_use]
    pub const fn floor(&self) -> i32 {
        self.floor
    }

    /// Moves the entity to another floor.
    pub fn set_floor(&mut self, floor: i32) {
        self.floor = floor;
    }

    /// Current health.
    #[must_use]
    pub const fn health(&self) -> i32 {
        self.health
    }

    /// Health recorded at spawn.
    #[must_use]
    pub const fn initial_health(&self) -> i32 {
        self.initial_health
    }

    /// Health ceiling.
    #[must_use]
    pub const fn max_health(&self) -> i32 {
        self.max_health
    }

    /// Sets health, clamped into `0..=max_health`.
    pub fn set_health(&mut self, health: i32) {
        self.health = health.clamp(0, self.max_health);
    }

    /// Changes the ceiling (at least 1) and pulls health under it.
    pub fn set_max_health(&mut self, max_health: i32) {
        self.max_health = max_health.max(1);
        self.health = self.health.clamp(0, self.max_health);
        self.initial_health = self.initial_health.clamp(0, self.max_health);
    }

    /// Restores health, never exceeding the ceiling.
    pub fn heal(&mut self, amount: i32) {
        self.set_health(self.health.saturating_add(amount));
    }

    /// Removes health, never dropping below zero.
    pub fn damage(&mut self, amount: i32) {
        self.set_health(self.health.saturating_sub(amount));
    }

    /// Reports whether health is exhausted.
    #[must_use]
    pub const fn is_dead(&self) -> bool {
        self.health <= 0
    }

    /// Credits experience to the player. Monsters ignore it.
    ///
    /// Returns the new total for the player.
    pub fn award_experience(&mut self, amount: u32) -> Option<u32> {
        match &mut self.kind {
            EntityKind::Player(state) => {
                state.experience = state.experience.saturating_add(amount);
                Some(state.experience)
            }
            EntityKind::Monster(_) => None,
        }
    }
}
