#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Transience simulation.
//!
//! This crate defines the vocabulary that connects the authoritative world,
//! the pure systems, and the adapters. Callers describe mutations with
//! [`Command`] values, the world executes them through its `apply` entry point
//! and reports what happened as [`Event`] values. Randomness and map lookups
//! are abstracted behind [`RandomSource`] and [`MapContext`] so every system
//! can be driven deterministically from tests.

mod random;

pub use random::{ChaChaSource, RandomSource, SequenceSource};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fixed reach used by single-target weapons regardless of their own range.
pub const SINGLE_TARGET_RANGE: f64 = std::f64::consts::SQRT_2;

/// Default reach recorded on freshly forged melee weapons.
pub const DEFAULT_MELEE_RANGE: f32 = std::f32::consts::SQRT_2;

/// Default reach recorded on freshly forged ranged weapons (√5).
pub const DEFAULT_RANGED_RANGE: f32 = 2.236_068;

/// Conceptual level ceiling for entities. Not enforced by level setters.
pub const MAX_LEVEL: u32 = 30;

/// Upper bound of the per-mille roll used when scattering items.
pub const SCATTER_ROLL_CEILING: i32 = 1_000;

/// Number of random draws attempted before a placement falls back to a scan.
pub const DEFAULT_PLACEMENT_ATTEMPTS: u32 = 4_096;

/// Failures reported by grid operations.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum GridError {
    /// The requested coordinate lies outside the grid.
    #[error("cell ({x}, {y}) lies outside the grid")]
    OutOfBounds {
        /// Requested column.
        x: i32,
        /// Requested row.
        y: i32,
    },
    /// No cell on the grid matches the requested tile kind.
    #[error("no cell on the grid matches the requested tile")]
    NoMatchingTile,
}

/// Integer coordinate of a single map cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    x: i32,
    y: i32,
}

impl Position {
    /// Creates a new position.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Column of the position.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Row of the position.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    /// Returns the position displaced by the provided deltas.
    #[must_use]
    pub const fn offset(self, delta_x: i32, delta_y: i32) -> Self {
        Self {
            x: self.x.saturating_add(delta_x),
            y: self.y.saturating_add(delta_y),
        }
    }

    /// Euclidean distance between two positions.
    #[must_use]
    pub fn distance_to(self, other: Position) -> f64 {
        let dx = f64::from(other.x) - f64::from(self.x);
        let dy = f64::from(other.y) - f64::from(self.y);
        (dx * dx + dy * dy).sqrt()
    }
}

/// Inclusive rectangle describing the playable area of a map.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct MapBounds {
    /// Smallest addressable column.
    pub min_x: i32,
    /// Largest addressable column.
    pub max_x: i32,
    /// Smallest addressable row.
    pub min_y: i32,
    /// Largest addressable row.
    pub max_y: i32,
}

impl MapBounds {
    /// Creates bounds from explicit corners.
    #[must_use]
    pub const fn new(min_x: i32, min_y: i32, max_x: i32, max_y: i32) -> Self {
        Self {
            min_x,
            max_x,
            min_y,
            max_y,
        }
    }

    /// Reports whether the position lies inside the bounds.
    #[must_use]
    pub const fn contains(&self, position: Position) -> bool {
        position.x >= self.min_x
            && position.x <= self.max_x
            && position.y >= self.min_y
            && position.y <= self.max_y
    }
}

/// Terrain classification of a tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TileKind {
    /// Impassable terrain that blocks line of sight.
    Wall,
    /// Empty ground left behind when an entity is cleaned up.
    Space,
    /// Regular walkable floor.
    Floor,
}

/// Kinds of items that may lie in stacks on the map.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    /// Currency.
    Coin,
    /// Healing draught.
    Potion,
    /// Ammunition for ranged weapons.
    Arrow,
}

/// A pile of identical items resting on a tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ItemStack {
    item: ItemKind,
    limit: u32,
    units: u32,
}

impl ItemStack {
    /// Creates an empty stack that nominally holds `limit` units.
    #[must_use]
    pub const fn with_limit(item: ItemKind, limit: u32) -> Self {
        Self {
            item,
            limit,
            units: 0,
        }
    }

    /// Adds a single unit to the stack. The limit is not enforced.
    pub fn push_unit(&mut self) {
        self.units = self.units.saturating_add(1);
    }

    /// Kind of item held by the stack.
    #[must_use]
    pub const fn item(&self) -> ItemKind {
        self.item
    }

    /// Nominal capacity of the stack.
    #[must_use]
    pub const fn limit(&self) -> u32 {
        self.limit
    }

    /// Number of units currently held.
    #[must_use]
    pub const fn units(&self) -> u32 {
        self.units
    }
}

/// Logical equality used by grid lookups, as opposed to structural identity.
pub trait Similar {
    /// Reports whether `self` and `other` are the same kind of cell.
    fn similar(&self, other: &Self) -> bool;
}

/// Immutable terrain marker for a single map cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Tile {
    kind: TileKind,
    items: Option<ItemStack>,
}

impl Tile {
    /// Bare wall tile.
    pub const WALL: Tile = Tile::new(TileKind::Wall);
    /// Bare empty tile.
    pub const SPACE: Tile = Tile::new(TileKind::Space);
    /// Bare floor tile.
    pub const FLOOR: Tile = Tile::new(TileKind::Floor);

    /// Creates a tile of the provided kind without items.
    #[must_use]
    pub const fn new(kind: TileKind) -> Self {
        Self { kind, items: None }
    }

    /// Returns a copy of the tile carrying the provided stack.
    #[must_use]
    pub const fn with_items(self, stack: ItemStack) -> Self {
        Self {
            kind: self.kind,
            items: Some(stack),
        }
    }

    /// Terrain kind of the tile.
    #[must_use]
    pub const fn kind(&self) -> TileKind {
        self.kind
    }

    /// Stack resting on the tile, if any.
    #[must_use]
    pub const fn items(&self) -> Option<&ItemStack> {
        self.items.as_ref()
    }

    /// Reports whether a stack rests on the tile.
    #[must_use]
    pub const fn has_items(&self) -> bool {
        self.items.is_some()
    }

    /// Reports whether entities may stand on the tile.
    #[must_use]
    pub fn is_passable(&self) -> bool {
        self.kind != TileKind::Wall
    }
}

impl Similar for Tile {
    fn similar(&self, other: &Self) -> bool {
        self.kind == other.kind
    }
}

/// Read access to the map consumed by movement and visibility.
pub trait MapContext {
    /// Tile stored at the position, or `None` for unset or out-of-range cells.
    fn tile_at(&self, position: Position) -> Option<&Tile>;

    /// Reports whether an entity may move onto the position.
    fn is_passable(&self, position: Position) -> bool;

    /// Playable area of the map.
    fn bounds(&self) -> MapBounds;
}

/// Unique identifier assigned to an entity by the registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(u32);

impl EntityId {
    /// Creates a new entity identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Species of hostile entities.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MonsterKind {
    /// Weak vermin.
    Rat,
    /// Common foot soldier.
    Goblin,
    /// Sturdy undead.
    Skeleton,
}

impl MonsterKind {
    /// Experience granted for a melee kill.
    #[must_use]
    pub const fn experience_reward(self) -> u32 {
        match self {
            Self::Rat => 2,
            Self::Goblin => 5,
            Self::Skeleton => 9,
        }
    }

    /// Inclusive experience range drawn from for a ranged kill.
    #[must_use]
    pub const fn experience_range(self) -> (u32, u32) {
        match self {
            Self::Rat => (1, 3),
            Self::Goblin => (3, 7),
            Self::Skeleton => (6, 12),
        }
    }

    /// Health a freshly spawned monster starts with.
    #[must_use]
    pub const fn base_health(self) -> i32 {
        match self {
            Self::Rat => 6,
            Self::Goblin => 15,
            Self::Skeleton => 25,
        }
    }

    /// Character used to represent the monster.
    #[must_use]
    pub const fn glyph(self) -> char {
        match self {
            Self::Rat => 'r',
            Self::Goblin => 'g',
            Self::Skeleton => 's',
        }
    }
}

/// Defensive equipment carried by the player.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Shield {
    block_per_mille: u32,
}

impl Shield {
    /// Shield that never blocks.
    pub const NONE: Shield = Shield { block_per_mille: 0 };

    /// Creates a shield blocking `block_per_mille` out of every thousand shots.
    #[must_use]
    pub const fn new(block_per_mille: u32) -> Self {
        let block_per_mille = if block_per_mille > SCATTER_ROLL_CEILING as u32 {
            SCATTER_ROLL_CEILING as u32
        } else {
            block_per_mille
        };
        Self { block_per_mille }
    }

    /// Block chance expressed per mille.
    #[must_use]
    pub const fn block_per_mille(&self) -> u32 {
        self.block_per_mille
    }

    /// Reports whether an incoming ranged attack gets through the shield.
    ///
    /// Certain outcomes do not consume randomness.
    pub fn would_hit(&self, rng: &mut dyn RandomSource) -> bool {
        match self.block_per_mille {
            0 => true,
            chance if chance >= SCATTER_ROLL_CEILING as u32 => false,
            chance => {
                let roll = rng.next_in_range(1, SCATTER_ROLL_CEILING);
                i64::from(roll) > i64::from(chance)
            }
        }
    }
}

/// Player-specific state carried by the player entity.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct PlayerState {
    /// Experience accumulated from kills.
    pub experience: u32,
    /// Shield consulted by ranged attacks against the player.
    pub shield: Shield,
}

/// Closed set of entity variants.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EntityKind {
    /// The distinguished player character.
    Player(PlayerState),
    /// A hostile creature.
    Monster(MonsterKind),
}

impl EntityKind {
    /// Character used to represent entities of this kind.
    #[must_use]
    pub const fn glyph(&self) -> char {
        match self {
            Self::Player(_) => '@',
            Self::Monster(kind) => kind.glyph(),
        }
    }
}

/// Health given to entities without a more specific value.
pub const DEFAULT_HEALTH: i32 = 25;

/// Maximum health given to entities without a more specific value.
pub const DEFAULT_MAX_HEALTH: i32 = 30;

/// Template describing an entity before it is placed into the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EntityBlueprint {
    /// Variant of the entity.
    pub kind: EntityKind,
    /// Health at spawn.
    pub health: i32,
    /// Health recorded as the entity's starting value.
    pub initial_health: i32,
    /// Health ceiling.
    pub max_health: i32,
    /// Starting level.
    pub level: u32,
    /// Floor the entity lives on.
    pub floor: i32,
}

impl EntityBlueprint {
    /// Creates a blueprint with default statistics.
    #[must_use]
    pub const fn new(kind: EntityKind) -> Self {
        Self {
            kind,
            health: DEFAULT_HEALTH,
            initial_health: DEFAULT_HEALTH,
            max_health: DEFAULT_MAX_HEALTH,
            level: 1,
            floor: 0,
        }
    }

    /// Blueprint for the player carrying the provided shield.
    #[must_use]
    pub const fn player(shield: Shield) -> Self {
        Self::new(EntityKind::Player(PlayerState {
            experience: 0,
            shield,
        }))
    }

    /// Blueprint for a monster using the species' base health.
    #[must_use]
    pub const fn monster(kind: MonsterKind) -> Self {
        let health = kind.base_health();
        Self {
            kind: EntityKind::Monster(kind),
            health,
            initial_health: health,
            max_health: health,
            level: 1,
            floor: 0,
        }
    }

    /// Overrides the starting and maximum health.
    #[must_use]
    pub const fn with_health(mut self, health: i32, max_health: i32) -> Self {
        self.health = health;
        self.initial_health = health;
        self.max_health = max_health;
        self
    }

    /// Places the entity on the provided floor.
    #[must_use]
    pub const fn on_floor(mut self, floor: i32) -> Self {
        self.floor = floor;
        self
    }
}

/// Families of weapons.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeaponKind {
    /// Close-quarters weapon; the attack hook applies all damage.
    Melee,
    /// Projectile weapon; damage is applied before the attack hook and may be
    /// stopped by the player's shield.
    Ranged,
}

/// Per-weapon behaviour fired whenever an attack connects.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttackEffect {
    /// Deals the weapon's damage output to the target.
    Strike,
    /// Deals the weapon's damage output and heals the wielder by the same amount.
    Drain,
    /// Does nothing beyond what the weapon family already applied.
    Inert,
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Places a new entity on the map and appends it to the registry.
    SpawnEntity {
        /// Template of the entity to create.
        blueprint: EntityBlueprint,
        /// Cell the entity occupies after spawning.
        position: Position,
    },
    /// Attempts to displace an entity by the provided deltas.
    MoveEntity {
        /// Entity attempting to move.
        entity: EntityId,
        /// Horizontal displacement.
        delta_x: i32,
        /// Vertical displacement.
        delta_y: i32,
    },
    /// Lowers an entity's health.
    DamageEntity {
        /// Entity receiving damage.
        entity: EntityId,
        /// Amount of damage dealt.
        amount: i32,
    },
    /// Raises an entity's health.
    HealEntity {
        /// Entity being healed.
        entity: EntityId,
        /// Amount of health restored.
        amount: i32,
    },
    /// Changes an entity's health ceiling.
    SetMaxHealth {
        /// Entity whose ceiling changes.
        entity: EntityId,
        /// New ceiling.
        max_health: i32,
    },
    /// Grants experience to the player.
    AwardExperience {
        /// Entity receiving experience.
        entity: EntityId,
        /// Experience granted.
        amount: u32,
    },
    /// Handles an entity's death: ends the game for the player, otherwise
    /// evicts the entity and resets its map cell.
    RemoveAndClean {
        /// Entity to clean up.
        entity: EntityId,
    },
}

/// Events broadcast by the world and systems after processing actions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Confirms that an entity entered the world.
    EntitySpawned {
        /// Identifier assigned to the entity.
        entity: EntityId,
        /// Cell the entity occupies.
        position: Position,
    },
    /// Confirms that an entity moved.
    EntityMoved {
        /// Entity that moved.
        entity: EntityId,
        /// Cell occupied before moving.
        from: Position,
        /// Cell occupied after moving.
        to: Position,
    },
    /// Reports that a move targeted an impassable cell.
    MoveBlocked {
        /// Entity that attempted to move.
        entity: EntityId,
        /// Cell the entity tried to enter.
        attempted: Position,
    },
    /// Reports a health reduction.
    EntityDamaged {
        /// Entity that was hurt.
        entity: EntityId,
        /// Requested damage.
        amount: i32,
        /// Health after clamping.
        health: i32,
    },
    /// Reports a health increase.
    EntityHealed {
        /// Entity that was healed.
        entity: EntityId,
        /// Requested amount.
        amount: i32,
        /// Health after clamping.
        health: i32,
    },
    /// Reports a change of health ceiling.
    MaxHealthChanged {
        /// Entity whose ceiling changed.
        entity: EntityId,
        /// Ceiling after clamping.
        max_health: i32,
        /// Health after clamping.
        health: i32,
    },
    /// Confirms experience was credited to the player.
    ExperienceAwarded {
        /// Entity credited.
        entity: EntityId,
        /// Experience granted.
        amount: u32,
        /// Total experience after the award.
        total: u32,
    },
    /// Reports that a weapon's attack hook fired against a target.
    AttackLanded {
        /// Wielder of the weapon, absent for unowned weapons.
        attacker: Option<EntityId>,
        /// Entity struck.
        target: EntityId,
        /// Weapon family used.
        weapon: WeaponKind,
        /// Hook that fired.
        effect: AttackEffect,
    },
    /// Reports that the player's shield stopped a ranged attack.
    AttackBlocked {
        /// Wielder of the weapon, absent for unowned weapons.
        attacker: Option<EntityId>,
        /// Entity whose shield blocked.
        target: EntityId,
    },
    /// Reports a weapon use that found nothing to hit.
    WeaponUseWasted {
        /// Wielder of the weapon, absent for unowned weapons.
        attacker: Option<EntityId>,
        /// Use counter after compensation.
        times_used: i32,
    },
    /// Confirms that a non-player entity left the world.
    EntityRemoved {
        /// Entity evicted from the registry.
        entity: EntityId,
        /// Cell the entity occupied when it died.
        position: Position,
    },
    /// Confirms that a map cell was reset to empty space.
    TileReset {
        /// Cell that was reset.
        position: Position,
    },
    /// Signals that the player died and the session must end.
    GameOverRequested {
        /// The player entity.
        player: EntityId,
    },
}
