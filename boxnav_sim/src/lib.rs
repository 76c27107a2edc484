// boxnav_sim — box-graph navigation for game actors.
//
// This crate contains the navigation core and a headless actor sim around
// it: the level model (axis-aligned boxes over a sector grid), the bounded
// incremental reachability search, waypoint computation, the per-tick
// creature motion integrator and the command/event tick loop.
//
// Module overview:
// - `types.rs`:      Position, Angle, Rotation, BoxId/ZoneId/ActorId, ActorKind.
// - `nav_box.rs`:    Interval, NavBox, per-column zone tags and the zone selector.
// - `world.rs`:      NavWorld trait + SectorWorld, the JSON level format.
// - `profile.rs`:    ActorProfile (data-driven movement capabilities) + CapabilityProvider.
// - `config.rs`:     NavConfig — all tunable parameters and per-kind profiles.
// - `pathfinder.rs`: PathFinder — bounded search, target/waypoint computation.
// - `creature.rs`:   Creature kinematic state, lifecycle states, AI brain.
// - `motion.rs`:     One tick of movement: collision shove, blocking, vertical motion.
// - `command.rs`:    SimCommand / SimAction — all sim mutations.
// - `event.rs`:      Narrative SimEvents.
// - `sim.rs`:        NavSim, the tick loop and save/load.
// - `error.rs`:      NavError for recoverable load and validation failures.
// - `prng`:          Re-exported from `boxnav_prng` — xoshiro256++ PRNG with SplitMix64 seeding.
//
// The `navsim` binary (`main.rs`) runs the sim headless from the command
// line.
//
// **Critical constraint: determinism.** The simulation is a pure function:
// `(state, commands) -> (new_state, events)`. All randomness comes from a
// seeded xoshiro256++ PRNG (re-exported from `boxnav_prng`). No `HashMap`, no
// system time, no OS entropy. Use `BTreeMap` for ordered collections.

pub mod command;
pub mod config;
pub mod creature;
pub mod error;
pub mod event;
pub mod motion;
pub mod nav_box;
pub mod pathfinder;
pub use boxnav_prng as prng;
pub mod profile;
pub mod sim;
pub mod types;
pub mod world;
