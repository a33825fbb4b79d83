use std::{fs, path::Path};

use anyhow::{ensure, Context, Result};
use serde::Deserialize;
use transience_core::{
    AttackEffect, EntityId, ItemKind, MonsterKind, Shield, Tile, TileKind, WeaponKind,
    SCATTER_ROLL_CEILING,
};
use transience_system_combat::Weapon;
use transience_system_spawning::{Config, ScatterRule};

/// Smallest room that still has a floor tile inside its wall ring.
const MIN_ROOM_SIDE: u32 = 3;

/// Session description loaded from a TOML file; every field is optional.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct Scenario {
    pub(crate) seed: u64,
    pub(crate) turns: u32,
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) spawn_on: TileKind,
    pub(crate) placement_attempts: Option<u32>,
    pub(crate) player: PlayerSection,
    pub(crate) monster_weapon: WeaponSection,
    pub(crate) monsters: Vec<MonsterSection>,
    pub(crate) scatter: Vec<ScatterSection>,
}

impl Default for Scenario {
    fn default() -> Self {
        Self {
            seed: 0x7a45_51ce,
            turns: 40,
            width: 24,
            height: 12,
            spawn_on: TileKind::Floor,
            placement_attempts: None,
            player: PlayerSection::default(),
            monster_weapon: WeaponSection::default(),
            monsters: vec![
                MonsterSection {
                    kind: MonsterKind::Rat,
                    count: 3,
                },
                MonsterSection {
                    kind: MonsterKind::Goblin,
                    count: 2,
                },
                MonsterSection {
                    kind: MonsterKind::Skeleton,
                    count: 1,
                },
            ],
            scatter: vec![
                ScatterSection {
                    item: ItemKind::Coin,
                    on: TileKind::Floor,
                    min: 1,
                    max: 3,
                    rarity_per_mille: 40,
                },
                ScatterSection {
                    item: ItemKind::Potion,
                    on: TileKind::Floor,
                    min: 1,
                    max: 1,
                    rarity_per_mille: 10,
                },
                ScatterSection {
                    item: ItemKind::Arrow,
                    on: TileKind::Floor,
                    min: 2,
                    max: 5,
                    rarity_per_mille: 20,
                },
            ],
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct PlayerSection {
    pub(crate) shield_per_mille: u32,
    pub(crate) weapon: WeaponSection,
}

impl Default for PlayerSection {
    fn default() -> Self {
        Self {
            shield_per_mille: 150,
            weapon: WeaponSection {
                damage: 4,
                ..WeaponSection::default()
            },
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct WeaponSection {
    pub(crate) kind: WeaponKind,
    pub(crate) damage: i32,
    pub(crate) swing_range: f32,
    pub(crate) effect: Option<AttackEffect>,
}

impl Default for WeaponSection {
    fn default() -> Self {
        Self {
            kind: WeaponKind::Melee,
            damage: 1,
            swing_range: 0.0,
            effect: None,
        }
    }
}

impl WeaponSection {
    /// Builds a weapon wielded by `owner`.
    pub(crate) fn forge(&self, owner: EntityId) -> Weapon {
        let base = match self.kind {
            WeaponKind::Melee => Weapon::melee(Some(owner)),
            WeaponKind::Ranged => Weapon::ranged(Some(owner)),
        };
        let weapon = base
            .with_damage(self.damage)
            .with_swing_range(self.swing_range);
        match self.effect {
            Some(effect) => weapon.with_effect(effect),
            None => weapon,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct MonsterSection {
    pub(crate) kind: MonsterKind,
    pub(crate) count: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct ScatterSection {
    pub(crate) item: ItemKind,
    pub(crate) on: TileKind,
    pub(crate) min: i32,
    pub(crate) max: i32,
    pub(crate) rarity_per_mille: i32,
}

impl Scenario {
    /// Reads a scenario file.
    ///
    /// Validation is left to the caller so command-line overrides can be
    /// layered on first.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read scenario at {}", path.display()))?;
        Self::parse(&contents)
            .with_context(|| format!("invalid scenario in {}", path.display()))
    }

    /// Parses scenario TOML contents.
    pub(crate) fn parse(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("failed to parse scenario toml contents")
    }

    /// Checks the invariants the session relies on.
    pub(crate) fn validate(&self) -> Result<()> {
        ensure!(
            self.width >= MIN_ROOM_SIDE && self.height >= MIN_ROOM_SIDE,
            "room must be at least {MIN_ROOM_SIDE}x{MIN_ROOM_SIDE}, got {}x{}",
            self.width,
            self.height
        );
        ensure!(
            self.spawn_on != TileKind::Wall,
            "entities cannot spawn inside walls"
        );
        ensure!(
            self.player.shield_per_mille <= SCATTER_ROLL_CEILING as u32,
            "shield block chance {} exceeds {SCATTER_ROLL_CEILING}",
            self.player.shield_per_mille
        );
        Ok(())
    }

    /// Level population settings for the spawning system.
    pub(crate) fn spawning_config(&self) -> Config {
        let mut config = Config::new(Tile::new(self.spawn_on))
            .with_player_shield(Shield::new(self.player.shield_per_mille));
        if let Some(attempts) = self.placement_attempts {
            config = config.with_placement_attempts(attempts);
        }
        for group in &self.monsters {
            config = config.with_monsters(group.kind, group.count);
        }
        for rule in &self.scatter {
            config = config.with_scatter(ScatterRule {
                item: rule.item,
                on: Tile::new(rule.on),
                min: rule.min,
                max: rule.max,
                rarity_per_mille: rule.rarity_per_mille,
            });
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        let scenario = Scenario::parse("").expect("empty file parses");
        scenario.validate().expect("defaults are valid");
        assert_eq!(scenario, Scenario::default());
    }

    #[test]
    fn sections_override_defaults() {
        let scenario = Scenario::parse(
            r#"
seed = 9
width = 10
height = 6

[player]
shield_per_mille = 1000

[player.weapon]
kind = "ranged"
damage = 7
effect = "drain"

[[monsters]]
kind = "skeleton"
count = 4

[[scatter]]
item = "arrow"
on = "floor"
min = 2
max = 2
rarity_per_mille = 500
"#,
        )
        .expect("valid scenario");

        assert_eq!(scenario.seed, 9);
        assert_eq!(scenario.turns, Scenario::default().turns);
        assert_eq!(
            scenario.monsters,
            vec![MonsterSection {
                kind: MonsterKind::Skeleton,
                count: 4,
            }]
        );
        assert_eq!(scenario.scatter.len(), 1);

        let weapon = scenario.player.weapon.forge(EntityId::new(0));
        assert_eq!(weapon.kind(), WeaponKind::Ranged);
        assert_eq!(weapon.damage_output(), 7);
        assert_eq!(weapon.effect(), AttackEffect::Drain);
        assert_eq!(weapon.owner(), Some(EntityId::new(0)));
    }

    #[test]
    fn weapon_effect_defaults_to_family_hook() {
        let weapon = WeaponSection {
            kind: WeaponKind::Ranged,
            ..WeaponSection::default()
        }
        .forge(EntityId::new(1));
        assert_eq!(weapon.effect(), AttackEffect::Inert);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let error = Scenario::parse("sede = 3").expect_err("typo must fail");
        assert!(format!("{error:#}").contains("sede"));
    }

    #[test]
    fn degenerate_rooms_are_rejected() {
        let parse = |contents: &str| Scenario::parse(contents).expect("well-formed toml");
        assert!(parse("width = 2").validate().is_err());
        assert!(parse("spawn_on = \"wall\"").validate().is_err());
        assert!(parse("[player]\nshield_per_mille = 1001").validate().is_err());
    }

    #[test]
    fn undersized_files_parse_until_validated() {
        let mut scenario = Scenario::parse("width = 2").expect("well-formed toml");
        scenario.width = 6;
        assert!(scenario.validate().is_ok());
    }
}
