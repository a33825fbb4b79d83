#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays a Transience session in the terminal.

mod scenario;
mod text;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use glam::Vec2;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use transience_core::{ChaChaSource, Command, Event, RandomSource};
use transience_rendering::{render_frame, render_terrain, Viewport};
use transience_system_combat::{Combat, Weapon};
use transience_system_spawning::Spawning;
use transience_world::{self as world, query, Entity, Map, World};

use crate::{scenario::Scenario, text::TextFrame};

/// Plays a seeded Transience session and prints every turn as text.
#[derive(Debug, Parser)]
#[command(name = "transience", version, about)]
struct Args {
    /// Seed of the session's random source.
    #[arg(long)]
    seed: Option<u64>,
    /// Maximum number of turns to play.
    #[arg(long)]
    turns: Option<u32>,
    /// Room width in tiles, walls included.
    #[arg(long)]
    width: Option<u32>,
    /// Room height in tiles, walls included.
    #[arg(long)]
    height: Option<u32>,
    /// TOML scenario describing monsters, items and weapons.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Log filter directive; falls back to `RUST_LOG`, then `info`.
    #[arg(long, value_name = "FILTER")]
    log: Option<String>,
}

/// Entry point for the Transience command-line interface.
fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.log.as_deref())?;

    let mut scenario = match &args.config {
        Some(path) => Scenario::load(path)?,
        None => Scenario::default(),
    };
    apply_overrides(&mut scenario, &args);
    scenario.validate().context("invalid session parameters")?;

    play(&scenario)
}

fn init_tracing(directive: Option<&str>) -> Result<()> {
    let filter = match directive {
        Some(directive) => EnvFilter::try_new(directive)
            .with_context(|| format!("invalid log filter `{directive}`"))?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
    Ok(())
}

fn apply_overrides(scenario: &mut Scenario, args: &Args) {
    if let Some(seed) = args.seed {
        scenario.seed = seed;
    }
    if let Some(turns) = args.turns {
        scenario.turns = turns;
    }
    if let Some(width) = args.width {
        scenario.width = width;
    }
    if let Some(height) = args.height {
        scenario.height = height;
    }
}

fn play(scenario: &Scenario) -> Result<()> {
    let mut rng = ChaChaSource::seeded(scenario.seed);
    let spawning = Spawning::new(scenario.spawning_config());

    let mut map = Map::bordered(scenario.width, scenario.height);
    spawning.scatter_items(&mut map, &mut rng);
    let mut world = World::new(map);

    let mut commands = Vec::new();
    spawning
        .populate(&world, &mut rng, &mut commands)
        .context("failed to populate the level")?;
    let mut events = Vec::new();
    for command in commands {
        world::apply(&mut world, command, &mut events);
    }

    let player = query::player(&world)
        .map(Entity::id)
        .context("level has no player")?;
    let mut player_weapon = scenario.player.weapon.forge(player);
    let mut monster_weapons: Vec<Weapon> = query::registry(&world)
        .iter()
        .filter(|entity| !entity.is_player())
        .map(|entity| scenario.monster_weapon.forge(entity.id()))
        .collect();
    info!(
        seed = scenario.seed,
        monsters = monster_weapons.len(),
        "session started"
    );

    let viewport = Viewport::new(Vec2::ZERO, 1.0)?;
    let mut combat = Combat::new();

    for turn in 1..=scenario.turns {
        events.clear();
        combat.use_weapon(&mut world, &mut player_weapon, &mut rng, &mut events);

        monster_weapons.retain(|weapon| {
            weapon
                .owner()
                .map_or(false, |owner| query::entity(&world, owner).is_some())
        });
        for weapon in &mut monster_weapons {
            if query::is_game_over(&world) {
                break;
            }
            let Some(owner) = weapon.owner() else {
                continue;
            };
            let delta_x = rng.next_in_range(-1, 1);
            let delta_y = rng.next_in_range(-1, 1);
            world::apply(
                &mut world,
                Command::MoveEntity {
                    entity: owner,
                    delta_x,
                    delta_y,
                },
                &mut events,
            );
            combat.use_weapon(&mut world, weapon, &mut rng, &mut events);
        }

        report(turn, &events);
        print_frame(&world, &viewport, scenario)
            .with_context(|| format!("failed to draw turn {turn}"))?;

        if query::is_game_over(&world) {
            info!(turn, "the player has fallen");
            return Ok(());
        }
        if monster_weapons.is_empty() {
            info!(turn, "every monster has been slain");
            return Ok(());
        }
    }

    info!(turns = scenario.turns, "turn limit reached");
    Ok(())
}

fn report(turn: u32, events: &[Event]) {
    for event in events {
        match event {
            Event::ExperienceAwarded { amount, total, .. } => {
                info!(turn, amount, total, "experience gained");
            }
            Event::EntityRemoved { entity, .. } => {
                info!(turn, entity = entity.get(), "monster slain");
            }
            Event::AttackBlocked { .. } => info!(turn, "shield held"),
            other => debug!(turn, ?other, "event"),
        }
    }
}

fn print_frame(world: &World, viewport: &Viewport, scenario: &Scenario) -> Result<()> {
    let mut frame = TextFrame::new(scenario.width, scenario.height);
    let _ = render_terrain(world, viewport, &mut frame)?;
    let _ = render_frame(world, viewport, &mut frame)?;

    let status = query::player(world)
        .map(|player| {
            let experience = player
                .player_state()
                .map_or(0, |state| state.experience);
            format!(
                "hp {}/{}  xp {}  monsters {}",
                player.health(),
                player.max_health(),
                experience,
                query::registry(world).len().saturating_sub(1)
            )
        })
        .unwrap_or_default();
    println!("{frame}{status}\n");
    Ok(())
}
