// CLI entry point for the headless navigation sim.
//
// Loads a level and a config, spawns actors, optionally sends them all to a
// goal, runs the sim for a number of ticks and prints the final actor
// states as JSON on stdout. Logging goes to stderr and is controlled by
// `RUST_LOG` (default `info`).
//
// Usage:
//   navsim [OPTIONS]
//     --level <FILE>             Level JSON (default: built-in 3x3 demo level)
//     --config <FILE>            Config JSON (default: built-in config)
//     --seed <N>                 PRNG seed (default: 42)
//     --ticks <N>                Ticks to run (default: 600)
//     --spawn <KIND>:<X>,<Y>,<Z> Spawn an actor (repeatable)
//     --goal <X>,<Y>,<Z>         Send every spawned actor here

use std::path::PathBuf;

use boxnav_sim::command::{SimAction, SimCommand};
use boxnav_sim::config::NavConfig;
use boxnav_sim::error::NavError;
use boxnav_sim::nav_box::{Interval, NavBox};
use boxnav_sim::sim::NavSim;
use boxnav_sim::types::{ActorKind, BoxId, Position, SECTOR_SIZE};
use boxnav_sim::world::{NavWorld, SectorWorld};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

struct Options {
    level: Option<PathBuf>,
    config: Option<PathBuf>,
    seed: u64,
    ticks: u64,
    spawns: Vec<(String, Position)>,
    goal: Option<Position>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            level: None,
            config: None,
            seed: 42,
            ticks: 600,
            spawns: Vec::new(),
            goal: None,
        }
    }
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let options = parse_args();
    if let Err(e) = run(options) {
        eprintln!("navsim: {e}");
        std::process::exit(1);
    }
}

fn run(options: Options) -> Result<(), NavError> {
    let world = match &options.level {
        Some(path) => SectorWorld::load(path)?,
        None => demo_level(),
    };
    let config = match &options.config {
        Some(path) => NavConfig::load(path)?,
        None => NavConfig::default(),
    };
    info!(
        boxes = world.boxes.len(),
        width = world.width,
        depth = world.depth,
        seed = options.seed,
        "level loaded"
    );

    let mut spawns = Vec::with_capacity(options.spawns.len());
    for (name, position) in &options.spawns {
        let kind =
            ActorKind::from_name(name).ok_or_else(|| NavError::UnknownKind(name.clone()))?;
        if world.box_at(*position).is_none() {
            return Err(NavError::PositionInvalid(*position));
        }
        spawns.push(SimCommand {
            tick: 1,
            action: SimAction::SpawnActor {
                kind,
                position: *position,
            },
        });
    }
    if let Some(goal) = options.goal {
        if world.box_at(goal).is_none() {
            return Err(NavError::PositionInvalid(goal));
        }
    }

    let mut sim = NavSim::new(world, config, options.seed);
    let mut events = sim.step(&spawns, 1).events;

    if let Some(position) = options.goal {
        let goals: Vec<SimCommand> = sim
            .actors
            .keys()
            .map(|&actor_id| SimCommand {
                tick: 2,
                action: SimAction::SetGoal { actor_id, position },
            })
            .collect();
        events.extend(sim.step(&goals, 2).events);
    }
    events.extend(sim.step(&[], options.ticks.max(sim.tick)).events);

    for event in &events {
        debug!(tick = event.tick, kind = ?event.kind, "event");
    }
    info!(
        tick = sim.tick,
        actors = sim.actors.len(),
        events = events.len(),
        "run finished"
    );

    println!("{}", serde_json::to_string_pretty(&sim.actors)?);
    Ok(())
}

/// Nine sector-sized boxes in a 3x3 grid, the middle one raised a quarter
/// sector, each overlapping its four neighbors.
fn demo_level() -> SectorWorld {
    let size = 3;
    let mut boxes = Vec::new();
    for sz in 0..size {
        for sx in 0..size {
            let floor = if sx == 1 && sz == 1 { -SECTOR_SIZE / 4 } else { 0 };
            let x = Interval::new(sx * SECTOR_SIZE, sx * SECTOR_SIZE + SECTOR_SIZE - 1);
            let z = Interval::new(sz * SECTOR_SIZE, sz * SECTOR_SIZE + SECTOR_SIZE - 1);
            boxes.push(NavBox::new(floor, x, z));
        }
    }
    for sz in 0..size {
        for sx in 0..size {
            let index = (sx + sz * size) as usize;
            let neighbors = [(sx - 1, sz), (sx + 1, sz), (sx, sz - 1), (sx, sz + 1)];
            for (nx, nz) in neighbors {
                if (0..size).contains(&nx) && (0..size).contains(&nz) {
                    boxes[index].overlaps.push(BoxId((nx + nz * size) as u32));
                }
            }
        }
    }
    SectorWorld::from_boxes(boxes, 2 * SECTOR_SIZE)
}

/// Parse `x,y,z`.
fn parse_position(s: &str) -> Option<Position> {
    let mut parts = s.split(',').map(|p| p.trim().parse::<i32>());
    let (Some(Ok(x)), Some(Ok(y)), Some(Ok(z)), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return None;
    };
    Some(Position::new(x, y, z))
}

/// Parse `kind:x,y,z`. The kind name is checked once the run starts.
fn parse_spawn(s: &str) -> Option<(String, Position)> {
    let (kind, position) = s.split_once(':')?;
    Some((kind.to_string(), parse_position(position)?))
}

/// Parse command-line arguments into `Options`. Uses simple
/// `std::env::args()` matching.
fn parse_args() -> Options {
    let mut options = Options::default();
    let args: Vec<String> = std::env::args().collect();
    let mut i = 1;

    while i < args.len() {
        match args[i].as_str() {
            "--level" => {
                i += 1;
                options.level = Some(args.get(i).map(PathBuf::from).unwrap_or_else(|| {
                    eprintln!("--level requires a file path");
                    std::process::exit(1);
                }));
            }
            "--config" => {
                i += 1;
                options.config = Some(args.get(i).map(PathBuf::from).unwrap_or_else(|| {
                    eprintln!("--config requires a file path");
                    std::process::exit(1);
                }));
            }
            "--seed" => {
                i += 1;
                options.seed = args.get(i).and_then(|s| s.parse().ok()).unwrap_or_else(|| {
                    eprintln!("--seed requires a valid number");
                    std::process::exit(1);
                });
            }
            "--ticks" => {
                i += 1;
                options.ticks = args.get(i).and_then(|s| s.parse().ok()).unwrap_or_else(|| {
                    eprintln!("--ticks requires a valid number");
                    std::process::exit(1);
                });
            }
            "--spawn" => {
                i += 1;
                let spawn = args.get(i).and_then(|s| parse_spawn(s)).unwrap_or_else(|| {
                    eprintln!("--spawn requires <kind>:<x>,<y>,<z>");
                    std::process::exit(1);
                });
                options.spawns.push(spawn);
            }
            "--goal" => {
                i += 1;
                options.goal = Some(args.get(i).and_then(|s| parse_position(s)).unwrap_or_else(|| {
                    eprintln!("--goal requires <x>,<y>,<z>");
                    std::process::exit(1);
                }));
            }
            "--help" | "-h" => {
                print_usage();
                std::process::exit(0);
            }
            other => {
                eprintln!("Unknown argument: {other}");
                print_usage();
                std::process::exit(1);
            }
        }
        i += 1;
    }

    options
}

fn print_usage() {
    println!("Usage: navsim [OPTIONS]");
    println!();
    println!("Options:");
    println!("  --level <FILE>             Level JSON (default: built-in 3x3 demo level)");
    println!("  --config <FILE>            Config JSON (default: built-in config)");
    println!("  --seed <N>                 PRNG seed (default: 42)");
    println!("  --ticks <N>                Ticks to run (default: 600)");
    println!("  --spawn <KIND>:<X>,<Y>,<Z> Spawn an actor (repeatable)");
    println!("                             Kinds: wolf, bear, raptor, bat, crocodile");
    println!("  --goal <X>,<Y>,<Z>         Send every spawned actor here");
    println!("  --help, -h                 Show this help");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_spawn_argument() {
        assert_eq!(
            parse_spawn("bat:100,-400,2000"),
            Some(("bat".to_string(), Position::new(100, -400, 2000)))
        );
        assert_eq!(parse_spawn("wolf:1,2"), None);
        assert_eq!(parse_spawn("wolf"), None);
        assert_eq!(parse_position("1,2,3,4"), None);
    }

    #[test]
    fn unknown_kind_fails_the_run() {
        let options = Options {
            spawns: vec![("dragon".to_string(), Position::new(500, 0, 500))],
            ticks: 1,
            ..Options::default()
        };
        assert!(matches!(run(options), Err(NavError::UnknownKind(name)) if name == "dragon"));
    }

    #[test]
    fn goal_outside_level_fails_the_run() {
        let options = Options {
            goal: Some(Position::new(-10, 0, 0)),
            ticks: 1,
            ..Options::default()
        };
        assert!(matches!(run(options), Err(NavError::PositionInvalid(_))));
    }

    #[test]
    fn demo_level_is_valid() {
        let world = demo_level();
        world.validate().unwrap();
        assert_eq!(world.boxes().len(), 9);
        assert_eq!(world.nav_box(BoxId(4)).overlaps.len(), 4);
    }
}
