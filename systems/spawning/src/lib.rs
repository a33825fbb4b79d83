#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Level population: item scattering and entity placement.

use tracing::debug;
use transience_core::{
    Command, EntityBlueprint, GridError, ItemKind, MonsterKind, RandomSource, Shield, Tile,
    DEFAULT_PLACEMENT_ATTEMPTS,
};
use transience_world::{query, Map, World};

/// Number of monsters of one kind placed when a level is populated.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MonsterGroup {
    /// Species to spawn.
    pub kind: MonsterKind,
    /// How many to spawn.
    pub count: u32,
}

/// Parameters of a single [`transience_world::GridBuffer::scatter`] pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScatterRule {
    /// Item placed in each stack.
    pub item: ItemKind,
    /// Tile the stacks are placed on.
    pub on: Tile,
    /// Lower bound of a stack's amount.
    pub min: i32,
    /// Upper bound of a stack's amount, also the number of stacks placed.
    pub max: i32,
    /// Chance per eligible cell, out of 1000.
    pub rarity_per_mille: i32,
}

/// Configuration parameters required to construct the spawning system.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    spawn_tile: Tile,
    player_shield: Shield,
    monsters: Vec<MonsterGroup>,
    scatter: Vec<ScatterRule>,
    placement_attempts: u32,
}

impl Config {
    /// Creates a configuration that spawns an unshielded player, no monsters
    /// and no items on tiles similar to `spawn_tile`.
    #[must_use]
    pub fn new(spawn_tile: Tile) -> Self {
        Self {
            spawn_tile,
            player_shield: Shield::NONE,
            monsters: Vec::new(),
            scatter: Vec::new(),
            placement_attempts: DEFAULT_PLACEMENT_ATTEMPTS,
        }
    }

    /// Equips the spawned player with `shield`.
    #[must_use]
    pub fn with_player_shield(mut self, shield: Shield) -> Self {
        self.player_shield = shield;
        self
    }

    /// Appends a group of `count` monsters of the provided species.
    #[must_use]
    pub fn with_monsters(mut self, kind: MonsterKind, count: u32) -> Self {
        self.monsters.push(MonsterGroup { kind, count });
        self
    }

    /// Appends an item scatter pass.
    #[must_use]
    pub fn with_scatter(mut self, rule: ScatterRule) -> Self {
        self.scatter.push(rule);
        self
    }

    /// Caps the uniform draws made per placement before scanning the map.
    #[must_use]
    pub fn with_placement_attempts(mut self, attempts: u32) -> Self {
        self.placement_attempts = attempts;
        self
    }
}

/// System that prepares a level before play starts.
#[derive(Debug)]
pub struct Spawning {
    config: Config,
}

impl Spawning {
    /// Creates a new spawning system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Applies every configured scatter rule to the map, in order.
    pub fn scatter_items(&self, map: &mut Map, rng: &mut dyn RandomSource) {
        for rule in &self.config.scatter {
            map.grid_mut().scatter(
                rule.item,
                &rule.on,
                rule.min,
                rule.max,
                rule.rarity_per_mille,
                rng,
            );
        }
    }

    /// Builds the command placing `blueprint` on a random tile similar to `on`.
    pub fn spawn(
        &self,
        blueprint: EntityBlueprint,
        on: &Tile,
        world: &World,
        rng: &mut dyn RandomSource,
    ) -> Result<Command, GridError> {
        let position = query::map(world)
            .grid()
            .random_loc(on, rng, self.config.placement_attempts)?;
        Ok(Command::SpawnEntity {
            blueprint,
            position,
        })
    }

    /// Emits spawn commands for the player, unless one already exists, followed
    /// by every monster group in configuration order.
    ///
    /// Locations are drawn against the current world, so entities may share a
    /// cell.
    pub fn populate(
        &self,
        world: &World,
        rng: &mut dyn RandomSource,
        out: &mut Vec<Command>,
    ) -> Result<(), GridError> {
        let on = self.config.spawn_tile;

        if query::player(world).is_none() {
            let player = EntityBlueprint::player(self.config.player_shield);
            out.push(self.spawn(player, &on, world, rng)?);
        }

        for group in &self.config.monsters {
            for _ in 0..group.count {
                let monster = EntityBlueprint::monster(group.kind);
                out.push(self.spawn(monster, &on, world, rng)?);
            }
            debug!(kind = ?group.kind, count = group.count, "monster group placed");
        }

        Ok(())
    }
}
