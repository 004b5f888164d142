//! Proximity Combat - skirmish driver
//!
//! Runs two combatants toward each other, lets them fight until one falls,
//! revives the loser and prints the resulting event log.

use std::path::PathBuf;

use clap::Parser;

use proximity_combat::core::config::CombatConfig;
use proximity_combat::core::error::Result;
use proximity_combat::core::types::{EntityId, Position};
use proximity_combat::simulation::{EventKind, SimulationEvent, World};

/// Headless skirmish between two combatants
#[derive(Parser, Debug)]
#[command(name = "proximity-combat")]
#[command(about = "Run a scripted skirmish and print tracker and lifecycle events")]
struct Args {
    /// TOML config file (defaults are used when omitted)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of frames to simulate
    #[arg(long, default_value_t = 900)]
    frames: u64,

    /// Seconds per frame
    #[arg(long, default_value_t = 1.0 / 30.0)]
    dt: f32,

    /// Emit one JSON object per event instead of text
    #[arg(long)]
    json: bool,

    /// Seed for idle look-around
    #[arg(long, default_value_t = 7)]
    seed: u64,
}

/// Walking speed toward the opponent (units per second)
const APPROACH_SPEED: f32 = 3.0;
/// Stop closing in once this near
const ENGAGE_DISTANCE: f32 = 1.5;
/// Seconds between attacks
const ATTACK_INTERVAL: f32 = 1.0;
/// Seconds a fallen combatant stays down before being revived
const REVIVE_AFTER: f32 = 3.0;

struct Fighter {
    id: EntityId,
    attack_timer: f32,
    down_for: f32,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "proximity_combat=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => CombatConfig::load(path)?,
        None => CombatConfig::default(),
    };
    config.validate()?;

    tracing::info!(frames = args.frames, dt = args.dt, seed = args.seed, "Starting skirmish");

    let mut world = World::new(config, args.seed);
    let mut fighters = Vec::new();
    for (name, x) in [("knight", -12.0), ("raider", 12.0)] {
        let id = world.spawn_combatant(name, Position::new(x, 0.0, 0.0), 0);
        world.spawn_part(id, format!("{name}-hurtbox"), Position::new(0.0, 1.0, 0.0), 3)?;
        fighters.push(Fighter {
            id,
            attack_timer: 0.0,
            down_for: 0.0,
        });
    }

    for _ in 0..args.frames {
        step_fighters(&mut world, &mut fighters, args.dt)?;
        for event in world.tick(args.dt) {
            print_event(&event, args.json)?;
        }
    }

    for event in world.drain_events() {
        print_event(&event, args.json)?;
    }
    world.shutdown();
    for event in world.drain_events() {
        print_event(&event, args.json)?;
    }

    tracing::info!("Skirmish finished");
    Ok(())
}

/// Scripted behaviour: close in, swing on a cadence, get back up after a while
fn step_fighters(world: &mut World, fighters: &mut [Fighter], dt: f32) -> Result<()> {
    for i in 0..fighters.len() {
        let id = fighters[i].id;
        let opponent = fighters[(i + 1) % fighters.len()].id;
        let Some(me) = world.combatant(id) else {
            continue;
        };

        if me.is_dead() {
            fighters[i].down_for += dt;
            if fighters[i].down_for >= REVIVE_AFTER {
                fighters[i].down_for = 0.0;
                world.revive(id, Some(50.0))?;
            }
            continue;
        }

        let (Some(own), Some(other)) = (world.position_of(id), world.position_of(opponent)) else {
            continue;
        };
        let gap = other - own;
        if gap.length() > ENGAGE_DISTANCE {
            let step = gap.normalize() * (APPROACH_SPEED * dt).min(gap.length() - ENGAGE_DISTANCE);
            world.move_to(id, own + step)?;
        }

        fighters[i].attack_timer += dt;
        if fighters[i].attack_timer >= ATTACK_INTERVAL {
            fighters[i].attack_timer = 0.0;
            world.attack_hit(id)?;
        }
    }
    Ok(())
}

fn print_event(event: &SimulationEvent, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string(event)?);
        return Ok(());
    }
    let detail = match &event.kind {
        EventKind::Tracker(e) => format!("{e:?}"),
        EventKind::Health(e) => format!("{e:?}"),
        EventKind::Lifecycle(e) => format!("{e:?}"),
        EventKind::Looked(dir) => format!("looks around (yaw {:.0}, pitch {:.0})", dir.yaw, dir.pitch),
        EventKind::Despawned => "despawned".to_string(),
    };
    println!("[{:>5}] {:<8} {}", event.frame, event.name, detail);
    Ok(())
}
