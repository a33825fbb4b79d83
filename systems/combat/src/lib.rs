#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Weapon resolution for melee and ranged attacks.
//!
//! Every mutation flows through [`transience_world::apply`], so the events
//! emitted here interleave with the world's own confirmations in the order
//! the attack unfolds.

mod weapon;

pub use weapon::Weapon;

use tracing::{debug, trace};
use transience_core::{
    AttackEffect, Command, EntityId, Event, RandomSource, WeaponKind, SINGLE_TARGET_RANGE,
};
use transience_world::{self as world, query, Entity, World};

/// Combat system that reuses a scratch buffer for target partitioning.
#[derive(Debug, Default)]
pub struct Combat {
    targets: Vec<EntityId>,
}

impl Combat {
    /// Creates a combat system with an empty scratch buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses the weapon once: counts the use and resolves it.
    pub fn use_weapon(
        &mut self,
        world: &mut World,
        weapon: &mut Weapon,
        rng: &mut dyn RandomSource,
        out_events: &mut Vec<Event>,
    ) {
        weapon.record_use();
        self.on_item_use(world, weapon, rng, out_events);
    }

    /// Resolves a weapon use against the live registry.
    ///
    /// Player-wielded weapons scan the other entities; monster-wielded weapons
    /// always go straight for the player, even when they could swing.
    pub fn on_item_use(
        &mut self,
        world: &mut World,
        weapon: &mut Weapon,
        rng: &mut dyn RandomSource,
        out_events: &mut Vec<Event>,
    ) {
        let Some(owner) = weapon.owner() else {
            trace!("unowned weapon used");
            return;
        };
        let Some(player) = query::player(world).map(Entity::id) else {
            return;
        };
        let owner_is_player = query::entity(world, owner).map_or(false, Entity::is_player);

        if !owner_is_player {
            attack_player(world, weapon, player, out_events);
            return;
        }

        self.targets.clear();
        self.targets.extend(
            query::registry(world)
                .iter()
                .filter(|entity| !entity.is_player())
                .map(Entity::id),
        );
        let targets = std::mem::take(&mut self.targets);
        if weapon.is_swing_weapon() {
            swing(world, weapon, &targets, rng, out_events);
        } else {
            attack_closest(world, weapon, &targets, rng, out_events);
        }
        self.targets = targets;
    }
}

/// Attacks a single target with the weapon's family rules.
///
/// Melee fires the hook unconditionally. Ranged applies the weapon's damage
/// before the hook, and a player target first gets a chance to block with
/// its shield. Monsters slain by the player grant experience and are cleaned
/// up.
pub fn attack(
    world: &mut World,
    weapon: &Weapon,
    target: EntityId,
    rng: &mut dyn RandomSource,
    out_events: &mut Vec<Event>,
) {
    let Some(shield) = query::entity(world, target)
        .map(|entity| entity.player_state().map(|state| state.shield))
    else {
        trace!(target = target.get(), "attack on unknown entity ignored");
        return;
    };

    match weapon.kind() {
        WeaponKind::Melee => fire_hook(world, weapon, target, out_events),
        WeaponKind::Ranged => {
            if let Some(shield) = shield {
                if !shield.would_hit(rng) {
                    debug!(target = target.get(), "shield blocked ranged attack");
                    out_events.push(Event::AttackBlocked {
                        attacker: weapon.owner(),
                        target,
                    });
                    return;
                }
            }
            world::apply(
                world,
                Command::DamageEntity {
                    entity: target,
                    amount: weapon.damage_output(),
                },
                out_events,
            );
            fire_hook(world, weapon, target, out_events);
        }
    }

    settle_kill(world, weapon, target, rng, out_events);
}

/// Damages the player directly when the wielder is close enough.
///
/// Swing weapons reach as far as their swing range, everything else reaches
/// the single-target range. Neither the hook nor the shield is involved. A
/// player left dead is handed to remove-and-clean.
pub fn attack_player(
    world: &mut World,
    weapon: &Weapon,
    player: EntityId,
    out_events: &mut Vec<Event>,
) {
    let view: &World = world;
    let distance = match (
        weapon.owner().and_then(|owner| query::entity(view, owner)),
        query::entity(view, player),
    ) {
        (Some(owner), Some(target)) => Some(owner.distance_to_entity(target)),
        _ => None,
    };

    if let Some(distance) = distance {
        if distance <= reach(weapon) {
            world::apply(
                world,
                Command::DamageEntity {
                    entity: player,
                    amount: weapon.damage_output(),
                },
                out_events,
            );
        }
    }

    if query::entity(world, player).map_or(false, Entity::is_dead) {
        world::apply(world, Command::RemoveAndClean { entity: player }, out_events);
    }
}

/// Attacks the first candidate, in order, within the single-target range.
///
/// The use is refunded when nobody is in reach.
pub fn attack_closest(
    world: &mut World,
    weapon: &mut Weapon,
    candidates: &[EntityId],
    rng: &mut dyn RandomSource,
    out_events: &mut Vec<Event>,
) {
    let view: &World = world;
    let closest = weapon
        .owner()
        .and_then(|owner| query::entity(view, owner))
        .and_then(|owner| {
            candidates.iter().copied().find(|&candidate| {
                query::entity(view, candidate).map_or(false, |target| {
                    owner.distance_to_entity(target) <= SINGLE_TARGET_RANGE
                })
            })
        });

    match closest {
        Some(target) => attack(world, weapon, target, rng, out_events),
        None => waste(weapon, out_events),
    }
}

/// Attacks every candidate within the weapon's swing range.
///
/// The use is refunded when the weapon cannot swing or there is nobody to
/// swing at.
pub fn swing(
    world: &mut World,
    weapon: &mut Weapon,
    candidates: &[EntityId],
    rng: &mut dyn RandomSource,
    out_events: &mut Vec<Event>,
) {
    if !weapon.is_swing_weapon() || candidates.is_empty() {
        waste(weapon, out_events);
        return;
    }
    let view: &World = world;
    let Some(origin) = weapon
        .owner()
        .and_then(|owner| query::entity(view, owner))
        .map(Entity::position)
    else {
        waste(weapon, out_events);
        return;
    };

    let swing_range = f64::from(weapon.swing_range());
    for &candidate in candidates {
        let in_reach = query::entity(world, candidate)
            .map_or(false, |target| target.distance_to(origin) <= swing_range);
        if in_reach {
            attack(world, weapon, candidate, rng, out_events);
        }
    }
}

fn reach(weapon: &Weapon) -> f64 {
    if weapon.is_swing_weapon() {
        f64::from(weapon.swing_range())
    } else {
        SINGLE_TARGET_RANGE
    }
}

fn fire_hook(world: &mut World, weapon: &Weapon, target: EntityId, out_events: &mut Vec<Event>) {
    let damage = weapon.damage_output();
    match weapon.effect() {
        AttackEffect::Strike => world::apply(
            world,
            Command::DamageEntity {
                entity: target,
                amount: damage,
            },
            out_events,
        ),
        AttackEffect::Drain => {
            world::apply(
                world,
                Command::DamageEntity {
                    entity: target,
                    amount: damage,
                },
                out_events,
            );
            if let Some(owner) = weapon.owner() {
                world::apply(
                    world,
                    Command::HealEntity {
                        entity: owner,
                        amount: damage,
                    },
                    out_events,
                );
            }
        }
        AttackEffect::Inert => {}
    }
    out_events.push(Event::AttackLanded {
        attacker: weapon.owner(),
        target,
        weapon: weapon.kind(),
        effect: weapon.effect(),
    });
}

fn settle_kill(
    world: &mut World,
    weapon: &Weapon,
    target: EntityId,
    rng: &mut dyn RandomSource,
    out_events: &mut Vec<Event>,
) {
    let Some(kind) = query::entity(world, target)
        .filter(|entity| entity.is_dead())
        .and_then(Entity::monster_kind)
    else {
        return;
    };
    let view: &World = world;
    let Some(owner) = weapon
        .owner()
        .filter(|&owner| query::entity(view, owner).map_or(false, Entity::is_player))
    else {
        return;
    };

    let reward = match weapon.kind() {
        WeaponKind::Melee => kind.experience_reward(),
        WeaponKind::Ranged => {
            let (low, high) = kind.experience_range();
            let roll = rng.next_in_range(
                i32::try_from(low).unwrap_or(i32::MAX),
                i32::try_from(high).unwrap_or(i32::MAX),
            );
            u32::try_from(roll).unwrap_or(low)
        }
    };

    debug!(target = target.get(), reward, "monster slain by the player");
    world::apply(
        world,
        Command::AwardExperience {
            entity: owner,
            amount: reward,
        },
        out_events,
    );
    world::apply(world, Command::RemoveAndClean { entity: target }, out_events);
}

fn waste(weapon: &mut Weapon, out_events: &mut Vec<Event>) {
    let times_used = weapon.refund_use();
    trace!(times_used, "weapon use wasted");
    out_events.push(Event::WeaponUseWasted {
        attacker: weapon.owner(),
        times_used,
    });
}
