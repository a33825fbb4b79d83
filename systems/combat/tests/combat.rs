use transience_core::{
    AttackEffect, Command, EntityBlueprint, EntityId, Event, MonsterKind, Position,
    SequenceSource, Shield, WeaponKind,
};
use transience_system_combat::{attack, attack_closest, attack_player, swing, Combat, Weapon};
use transience_world::{self as world, query, Map, World};

fn arena() -> World {
    World::new(Map::bordered(12, 12))
}

fn spawn(world: &mut World, blueprint: EntityBlueprint, x: i32, y: i32) -> EntityId {
    let mut events = Vec::new();
    world::apply(
        world,
        Command::SpawnEntity {
            blueprint,
            position: Position::new(x, y),
        },
        &mut events,
    );
    match events.as_slice() {
        [Event::EntitySpawned { entity, .. }] => *entity,
        other => panic!("unexpected spawn events: {other:?}"),
    }
}

fn health(world: &World, id: EntityId) -> i32 {
    query::entity(world, id).expect("entity alive").health()
}

fn rat() -> EntityBlueprint {
    EntityBlueprint::monster(MonsterKind::Rat)
}

fn landed(events: &[Event]) -> Vec<EntityId> {
    events
        .iter()
        .filter_map(|event| match event {
            Event::AttackLanded { target, .. } => Some(*target),
            _ => None,
        })
        .collect()
}

#[test]
fn attack_closest_hits_only_first_candidate_in_reach() {
    let mut world = arena();
    let player = spawn(&mut world, EntityBlueprint::player(Shield::NONE), 3, 3);
    let beside = spawn(&mut world, rat(), 4, 3);
    let diagonal = spawn(&mut world, rat(), 4, 4);
    let mut sword = Weapon::melee(Some(player));
    let mut rng = SequenceSource::default();
    let mut events = Vec::new();

    attack_closest(&mut world, &mut sword, &[beside, diagonal], &mut rng, &mut events);

    assert_eq!(health(&world, beside), 5);
    assert_eq!(health(&world, diagonal), 6);
    assert_eq!(
        events,
        vec![
            Event::EntityDamaged {
                entity: beside,
                amount: 1,
                health: 5,
            },
            Event::AttackLanded {
                attacker: Some(player),
                target: beside,
                weapon: WeaponKind::Melee,
                effect: AttackEffect::Strike,
            },
        ]
    );
    assert_eq!(sword.times_used(), 0);
}

#[test]
fn attack_closest_refunds_use_when_nobody_is_adjacent() {
    let mut world = arena();
    let player = spawn(&mut world, EntityBlueprint::player(Shield::NONE), 3, 3);
    let far = spawn(&mut world, rat(), 5, 3);
    let mut sword = Weapon::melee(Some(player)).with_range(10.0);
    let mut rng = SequenceSource::default();
    let mut events = Vec::new();

    attack_closest(&mut world, &mut sword, &[far], &mut rng, &mut events);

    assert_eq!(health(&world, far), 6, "nominal range never extends reach");
    assert_eq!(
        events,
        vec![Event::WeaponUseWasted {
            attacker: Some(player),
            times_used: -1,
        }]
    );
}

#[test]
fn swing_hits_every_candidate_within_swing_range() {
    let mut world = arena();
    let player = spawn(&mut world, EntityBlueprint::player(Shield::NONE), 2, 5);
    let near = spawn(&mut world, rat(), 3, 5);
    let edge = spawn(&mut world, rat(), 4, 5);
    let far = spawn(&mut world, rat(), 5, 5);
    let mut axe = Weapon::melee(Some(player)).with_swing_range(2.0);
    let mut rng = SequenceSource::default();
    let mut events = Vec::new();

    swing(&mut world, &mut axe, &[near, edge, far], &mut rng, &mut events);

    assert_eq!(health(&world, near), 5);
    assert_eq!(health(&world, edge), 5);
    assert_eq!(health(&world, far), 6);
    assert_eq!(landed(&events), vec![near, edge]);
    assert_eq!(axe.times_used(), 0);
}

#[test]
fn swing_without_area_or_candidates_is_wasted() {
    let mut world = arena();
    let player = spawn(&mut world, EntityBlueprint::player(Shield::NONE), 2, 5);
    let near = spawn(&mut world, rat(), 3, 5);
    let mut rng = SequenceSource::default();
    let mut events = Vec::new();

    let mut dagger = Weapon::melee(Some(player));
    swing(&mut world, &mut dagger, &[near], &mut rng, &mut events);
    let mut axe = Weapon::melee(Some(player)).with_swing_range(2.0);
    swing(&mut world, &mut axe, &[], &mut rng, &mut events);

    assert_eq!(health(&world, near), 6);
    assert_eq!(dagger.times_used(), -1);
    assert_eq!(axe.times_used(), -1);
    assert!(landed(&events).is_empty());
}

#[test]
fn shield_block_stops_ranged_damage_and_hook() {
    let mut world = arena();
    let player = spawn(&mut world, EntityBlueprint::player(Shield::new(500)), 3, 3);
    let archer = spawn(&mut world, EntityBlueprint::monster(MonsterKind::Skeleton), 6, 3);
    let bow = Weapon::ranged(Some(archer))
        .with_damage(4)
        .with_effect(AttackEffect::Strike);
    let mut rng = SequenceSource::new(vec![500]);
    let mut events = Vec::new();

    attack(&mut world, &bow, player, &mut rng, &mut events);

    assert_eq!(health(&world, player), 25);
    assert_eq!(
        events,
        vec![Event::AttackBlocked {
            attacker: Some(archer),
            target: player,
        }]
    );
}

#[test]
fn shield_miss_lets_ranged_damage_and_hook_through() {
    let mut world = arena();
    let player = spawn(&mut world, EntityBlueprint::player(Shield::new(500)), 3, 3);
    let archer = spawn(&mut world, EntityBlueprint::monster(MonsterKind::Skeleton), 6, 3);
    let bow = Weapon::ranged(Some(archer)).with_damage(4);
    let mut rng = SequenceSource::new(vec![501]);
    let mut events = Vec::new();

    attack(&mut world, &bow, player, &mut rng, &mut events);

    assert_eq!(health(&world, player), 21);
    assert_eq!(
        events,
        vec![
            Event::EntityDamaged {
                entity: player,
                amount: 4,
                health: 21,
            },
            Event::AttackLanded {
                attacker: Some(archer),
                target: player,
                weapon: WeaponKind::Ranged,
                effect: AttackEffect::Inert,
            },
        ]
    );
    assert!(!query::is_game_over(&world), "ranged attacks never end the game");
}

#[test]
fn melee_kill_awards_fixed_experience_and_cleans_up() {
    let mut world = arena();
    let player = spawn(&mut world, EntityBlueprint::player(Shield::NONE), 3, 3);
    let victim = spawn(&mut world, rat(), 4, 4);
    let sword = Weapon::melee(Some(player)).with_damage(10);
    let mut rng = SequenceSource::default();
    let mut events = Vec::new();

    attack(&mut world, &sword, victim, &mut rng, &mut events);

    assert_eq!(
        events,
        vec![
            Event::EntityDamaged {
                entity: victim,
                amount: 10,
                health: 0,
            },
            Event::AttackLanded {
                attacker: Some(player),
                target: victim,
                weapon: WeaponKind::Melee,
                effect: AttackEffect::Strike,
            },
            Event::ExperienceAwarded {
                entity: player,
                amount: 2,
                total: 2,
            },
            Event::EntityRemoved {
                entity: victim,
                position: Position::new(4, 4),
            },
            Event::TileReset {
                position: Position::new(3, 3),
            },
        ]
    );
    assert!(query::entity(&world, victim).is_none());
}

#[test]
fn ranged_kill_rolls_experience_within_monster_range() {
    let mut world = arena();
    let player = spawn(&mut world, EntityBlueprint::player(Shield::NONE), 3, 3);
    let goblin = spawn(&mut world, EntityBlueprint::monster(MonsterKind::Goblin), 7, 3);
    let bow = Weapon::ranged(Some(player)).with_damage(50);
    let mut rng = SequenceSource::new(vec![5]);
    let mut events = Vec::new();

    attack(&mut world, &bow, goblin, &mut rng, &mut events);

    assert!(events.contains(&Event::ExperienceAwarded {
        entity: player,
        amount: 5,
        total: 5,
    }));
    assert!(query::entity(&world, goblin).is_none());
    assert_eq!(rng.remaining(), 0);
}

#[test]
fn kills_by_monsters_grant_nothing_and_leave_the_corpse() {
    let mut world = arena();
    spawn(&mut world, EntityBlueprint::player(Shield::NONE), 8, 8);
    let goblin = spawn(&mut world, EntityBlueprint::monster(MonsterKind::Goblin), 3, 3);
    let victim = spawn(&mut world, rat(), 4, 3);
    let club = Weapon::melee(Some(goblin)).with_damage(100);
    let mut rng = SequenceSource::default();
    let mut events = Vec::new();

    attack(&mut world, &club, victim, &mut rng, &mut events);

    let corpse = query::entity(&world, victim).expect("still registered");
    assert!(corpse.is_dead());
    assert!(!events
        .iter()
        .any(|event| matches!(event, Event::ExperienceAwarded { .. })));
}

#[test]
fn drain_heals_the_wielder() {
    let mut world = arena();
    let player = spawn(
        &mut world,
        EntityBlueprint::player(Shield::NONE).with_health(10, 30),
        3,
        3,
    );
    let victim = spawn(&mut world, EntityBlueprint::monster(MonsterKind::Skeleton), 4, 3);
    let blade = Weapon::melee(Some(player))
        .with_damage(3)
        .with_effect(AttackEffect::Drain);
    let mut rng = SequenceSource::default();
    let mut events = Vec::new();

    attack(&mut world, &blade, victim, &mut rng, &mut events);

    assert_eq!(health(&world, victim), 22);
    assert_eq!(health(&world, player), 13);
}

#[test]
fn attack_player_bypasses_shield_and_ends_game_on_death() {
    let mut world = arena();
    let player = spawn(
        &mut world,
        EntityBlueprint::player(Shield::new(1_000)).with_health(5, 30),
        3,
        3,
    );
    let goblin = spawn(&mut world, EntityBlueprint::monster(MonsterKind::Goblin), 4, 4);
    let club = Weapon::melee(Some(goblin)).with_damage(5);
    let mut events = Vec::new();

    attack_player(&mut world, &club, player, &mut events);

    assert_eq!(
        events,
        vec![
            Event::EntityDamaged {
                entity: player,
                amount: 5,
                health: 0,
            },
            Event::GameOverRequested { player },
        ]
    );
    assert!(query::is_game_over(&world));
    assert!(query::entity(&world, player).is_some());
}

#[test]
fn monster_weapons_always_go_for_the_player() {
    let mut world = arena();
    let player = spawn(&mut world, EntityBlueprint::player(Shield::NONE), 3, 3);
    let goblin = spawn(&mut world, EntityBlueprint::monster(MonsterKind::Goblin), 5, 3);
    let bystander = spawn(&mut world, rat(), 6, 3);
    let mut combat = Combat::new();
    let mut rng = SequenceSource::default();
    let mut events = Vec::new();

    let mut flail = Weapon::melee(Some(goblin)).with_swing_range(3.0);
    combat.use_weapon(&mut world, &mut flail, &mut rng, &mut events);
    assert_eq!(health(&world, player), 24);
    assert_eq!(health(&world, bystander), 6);

    let mut dagger = Weapon::melee(Some(goblin)).with_range(5.0);
    combat.use_weapon(&mut world, &mut dagger, &mut rng, &mut events);
    assert_eq!(health(&world, player), 24, "distance 2 is beyond single-target reach");
    assert_eq!(dagger.times_used(), 1, "monster uses are never refunded");
    assert!(landed(&events).is_empty());
}

#[test]
fn player_weapons_scan_everyone_else() {
    let mut world = arena();
    let first = spawn(&mut world, rat(), 4, 3);
    let player = spawn(&mut world, EntityBlueprint::player(Shield::NONE), 3, 3);
    let second = spawn(&mut world, rat(), 3, 4);
    let mut combat = Combat::new();
    let mut rng = SequenceSource::default();
    let mut events = Vec::new();

    let mut sword = Weapon::melee(Some(player));
    combat.use_weapon(&mut world, &mut sword, &mut rng, &mut events);
    assert_eq!(landed(&events), vec![first]);
    assert_eq!(sword.times_used(), 1);

    events.clear();
    let mut axe = Weapon::melee(Some(player)).with_swing_range(1.0);
    combat.use_weapon(&mut world, &mut axe, &mut rng, &mut events);
    assert_eq!(landed(&events), vec![first, second]);
    assert_eq!(health(&world, player), 25);
}

#[test]
fn wasted_player_use_nets_out() {
    let mut world = arena();
    let player = spawn(&mut world, EntityBlueprint::player(Shield::NONE), 3, 3);
    spawn(&mut world, rat(), 8, 8);
    let mut combat = Combat::new();
    let mut sword = Weapon::melee(Some(player));
    let mut rng = SequenceSource::default();
    let mut events = Vec::new();

    combat.use_weapon(&mut world, &mut sword, &mut rng, &mut events);
    combat.use_weapon(&mut world, &mut sword, &mut rng, &mut events);

    assert_eq!(sword.times_used(), 0);
    assert_eq!(
        events.last(),
        Some(&Event::WeaponUseWasted {
            attacker: Some(player),
            times_used: 0,
        })
    );
}

#[test]
fn uses_without_owner_or_player_do_nothing() {
    let mut world = arena();
    let goblin = spawn(&mut world, EntityBlueprint::monster(MonsterKind::Goblin), 3, 3);
    spawn(&mut world, rat(), 4, 3);
    let mut combat = Combat::new();
    let mut rng = SequenceSource::default();
    let mut events = Vec::new();

    let mut stray = Weapon::melee(None).with_swing_range(5.0);
    combat.use_weapon(&mut world, &mut stray, &mut rng, &mut events);
    let mut club = Weapon::melee(Some(goblin));
    combat.use_weapon(&mut world, &mut club, &mut rng, &mut events);

    assert!(events.is_empty());
    assert_eq!(stray.times_used(), 1);
    assert_eq!(club.times_used(), 1);
}
