// Actor simulation state and tick loop.
//
// `NavSim` owns every navigating actor, the PRNG, the config and the level.
// The sim is a pure function: `(state, commands) -> (new_state, events)`.
//
// ## Tick loop
//
// `step()` advances one tick at a time up to the target tick. Each tick it
// first applies the commands scheduled for it (in slice order), then updates
// every actor in `ActorId` order:
//
//   1. `Paused` actors are skipped and keep their search state.
//   2. `Restarted` actors get a fresh `CreatureBrain` built from their
//      profile and become `Active`.
//   3. `Deactivated` actors that still hold a brain take the terminal path
//      once; after that they are inert.
//   4. `Active` actors pick a target (their commanded goal, or a random
//      box while wandering), ask their `PathFinder` for the next waypoint,
//      set their speed to `min(walk_speed, horizontal distance)`, turn
//      toward the waypoint and integrate one tick of movement.
//
// Actors marked for removal are dropped at the end of the tick.
//
// The actor being updated is taken out of the map for the duration of its
// update, so the actors that precede it (`actors.range(..id)`) are exactly
// the ones that already moved this tick and may block it.
//
// ## Search prewarming
//
// `prewarm_searches()` runs one bounded `search_path()` round for every
// actor in parallel. Each actor's `PathFinder` is owned by that actor and
// the level is shared immutably, so the result is independent of thread
// scheduling.
//
// ## Save/load
//
// `NavSim` derives serde. The level (`world`) is `#[serde(skip)]`: it is
// loaded separately and re-attached by `from_json()`, which also checks that
// every box id stored in a saved `PathFinder` exists in that level.
//
// See also: `command.rs` for `SimCommand`, `event.rs` for `SimEvent`,
// `creature.rs` for `Creature`, `pathfinder.rs` for the search,
// `motion.rs` for movement, `config.rs` for `NavConfig`.
//
// **Critical constraint: determinism.** All state mutations flow through
// `SimCommand`. All randomness comes from the sim's `GameRng`. No external
// input (system time, thread state, etc.) may influence the simulation.

use crate::command::{SimAction, SimCommand};
use crate::config::NavConfig;
use crate::creature::{ActorState, Creature, CreatureBrain};
use crate::error::NavError;
use crate::event::{SimEvent, SimEventKind};
use crate::motion::{self, MotionOutcome};
use crate::pathfinder::PathFinder;
use crate::prng::GameRng;
use crate::profile::CapabilityProvider;
use crate::types::{ActorId, ActorKind, Angle, Position};
use crate::world::{NavWorld, SectorWorld};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// Top-level navigation state.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NavSim {
    /// Current simulation tick.
    pub tick: u64,

    pub rng: GameRng,

    pub config: NavConfig,

    /// All actors, keyed by id. Iteration order is update order.
    pub actors: BTreeMap<ActorId, Creature>,

    next_actor_id: u32,

    /// World-wide room-swap toggle, mirrored into `world`.
    pub rooms_swapped: bool,

    #[serde(skip)]
    pub world: SectorWorld,
}

/// Output of a `step()` call.
#[derive(Clone, Debug, Default)]
pub struct StepResult {
    /// Narrative events emitted during this step.
    pub events: Vec<SimEvent>,
}

impl NavSim {
    /// A sim on `world` with no actors.
    pub fn new(world: SectorWorld, config: NavConfig, seed: u64) -> Self {
        let rooms_swapped = world.rooms_swapped();
        Self {
            tick: 0,
            rng: GameRng::new(seed),
            config,
            actors: BTreeMap::new(),
            next_actor_id: 0,
            rooms_swapped,
            world,
        }
    }

    /// Apply a batch of commands and advance the sim to the target tick.
    ///
    /// Commands must be sorted by tick. A command is applied on the first
    /// tick at or after its own; commands with tick > `target_tick` are
    /// ignored (caller error).
    pub fn step(&mut self, commands: &[SimCommand], target_tick: u64) -> StepResult {
        let mut events = Vec::new();
        let mut cmd_idx = 0;

        while self.tick < target_tick {
            self.tick += 1;

            while cmd_idx < commands.len() && commands[cmd_idx].tick <= self.tick {
                let cmd = &commands[cmd_idx];
                cmd_idx += 1;
                self.apply_command(cmd, &mut events);
            }

            self.update_actors(&mut events);
        }

        StepResult { events }
    }

    fn apply_command(&mut self, cmd: &SimCommand, events: &mut Vec<SimEvent>) {
        match &cmd.action {
            SimAction::SpawnActor { kind, position } => {
                self.spawn_actor(*kind, *position, events);
            }
            SimAction::SetGoal { actor_id, position } => {
                self.set_goal(*actor_id, *position, events);
            }
            SimAction::ClearGoal { actor_id } => {
                if let Some(actor) = self.actors.get_mut(actor_id) {
                    actor.goal = None;
                }
            }
            SimAction::Pause { actor_id } => {
                if let Some(actor) = self.actors.get_mut(actor_id) {
                    if actor.state == ActorState::Active {
                        actor.state = ActorState::Paused;
                        actor.speed = 0;
                    }
                }
            }
            SimAction::Resume { actor_id } => {
                if let Some(actor) = self.actors.get_mut(actor_id) {
                    if actor.state == ActorState::Paused {
                        actor.state = ActorState::Active;
                    }
                }
            }
            SimAction::Restart { actor_id } => {
                if let Some(actor) = self.actors.get_mut(actor_id) {
                    if matches!(actor.state, ActorState::Active | ActorState::Paused) {
                        actor.state = ActorState::Restarted;
                    }
                }
            }
            SimAction::Deactivate { actor_id } => {
                if let Some(actor) = self.actors.get_mut(actor_id) {
                    if actor.state != ActorState::MarkedForRemoval {
                        actor.state = ActorState::Deactivated;
                    }
                }
            }
            SimAction::Remove { actor_id } => {
                if let Some(actor) = self.actors.get_mut(actor_id) {
                    actor.state = ActorState::MarkedForRemoval;
                }
            }
            SimAction::SetRoomsSwapped { swapped } => {
                self.set_rooms_swapped(*swapped, events);
            }
        }
    }

    fn spawn_actor(&mut self, kind: ActorKind, position: Position, events: &mut Vec<SimEvent>) {
        let tick = self.tick;
        let reject = |events: &mut Vec<SimEvent>| {
            warn!(?kind, %position, "spawn rejected");
            events.push(SimEvent {
                tick,
                kind: SimEventKind::SpawnRejected { kind, position },
            });
        };

        let Some(profile) = self.config.profile(kind) else {
            reject(events);
            return;
        };
        let Some(box_id) = self.world.box_at(position) else {
            reject(events);
            return;
        };
        let Some(brain) = build_brain(&self.world, &self.config, kind, position) else {
            reject(events);
            return;
        };

        let id = ActorId(self.next_actor_id);
        self.next_actor_id += 1;

        let floor = self.world.nav_box(box_id).floor;
        let mut actor = Creature::new(id, kind, profile, position, floor);
        let quarter_turn = Angle::from_degrees(90).0 as i32;
        actor.rotation.yaw = Angle(self.rng.rand15_signed(quarter_turn) as i16);
        actor.brain = Some(brain);
        self.actors.insert(id, actor);

        info!(%id, ?kind, %position, %box_id, "actor spawned");
        events.push(SimEvent {
            tick,
            kind: SimEventKind::ActorSpawned {
                actor_id: id,
                kind,
                box_id,
            },
        });
    }

    fn set_goal(&mut self, actor_id: ActorId, position: Position, events: &mut Vec<SimEvent>) {
        let box_id = self.world.box_at(position);
        let actor = self
            .actors
            .get_mut(&actor_id)
            .filter(|a| {
                matches!(
                    a.state,
                    ActorState::Active | ActorState::Paused | ActorState::Restarted
                )
            });
        match (actor, box_id) {
            (Some(actor), Some(box_id)) => {
                debug!(%actor_id, %position, %box_id, "goal set");
                actor.goal = Some(position);
            }
            _ => {
                warn!(%actor_id, %position, "goal rejected");
                events.push(SimEvent {
                    tick: self.tick,
                    kind: SimEventKind::GoalRejected { actor_id, position },
                });
            }
        }
    }

    fn set_rooms_swapped(&mut self, swapped: bool, events: &mut Vec<SimEvent>) {
        if self.rooms_swapped == swapped {
            return;
        }
        self.rooms_swapped = swapped;
        self.world.set_rooms_swapped(swapped);

        // Zones changed: every search episode in progress is stale.
        for brain in self.actors.values_mut().filter_map(|a| a.brain.as_mut()) {
            brain.path_finder.reset_search();
        }

        info!(swapped, "rooms swapped");
        events.push(SimEvent {
            tick: self.tick,
            kind: SimEventKind::RoomsSwapped { swapped },
        });
    }

    fn update_actors(&mut self, events: &mut Vec<SimEvent>) {
        let ids: Vec<ActorId> = self.actors.keys().copied().collect();
        for id in ids {
            let Some(mut actor) = self.actors.remove(&id) else {
                continue;
            };
            let earlier = self.actors.range(..id).map(|(_, c)| c);
            update_actor(
                &self.world,
                &self.config,
                &mut self.rng,
                &mut actor,
                earlier,
                self.tick,
                events,
            );
            self.actors.insert(id, actor);
        }

        let removed: Vec<ActorId> = self
            .actors
            .values()
            .filter(|a| a.state == ActorState::MarkedForRemoval)
            .map(|a| a.id)
            .collect();
        for actor_id in removed {
            self.actors.remove(&actor_id);
            info!(%actor_id, "actor removed");
            events.push(SimEvent {
                tick: self.tick,
                kind: SimEventKind::ActorRemoved { actor_id },
            });
        }
    }

    /// Run one bounded search round for every actor, in parallel. Returns the
    /// total number of boxes expanded.
    pub fn prewarm_searches(&mut self) -> usize {
        let world = &self.world;
        self.actors
            .par_iter_mut()
            .filter_map(|(_, actor)| actor.brain.as_mut())
            .map(|brain| brain.path_finder.search_path(world))
            .sum()
    }

    /// Serialize the sim state (without the level) to JSON.
    pub fn to_json(&self) -> Result<String, NavError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Restore a sim from JSON and attach `world`.
    ///
    /// Fails if any saved search state refers to a box `world` does not
    /// have.
    pub fn from_json(json: &str, world: SectorWorld) -> Result<Self, NavError> {
        let mut sim: NavSim = serde_json::from_str(json)?;
        let box_count = world.boxes().len();
        for brain in sim.actors.values().filter_map(|a| a.brain.as_ref()) {
            brain.path_finder.validate_boxes(box_count)?;
        }
        sim.world = world;
        sim.world.set_rooms_swapped(sim.rooms_swapped);
        Ok(sim)
    }
}

/// A fresh brain for an actor of `kind` standing at `position`, or `None`
/// when the kind has no profile or the position is outside every box.
fn build_brain(
    world: &SectorWorld,
    config: &NavConfig,
    kind: ActorKind,
    position: Position,
) -> Option<CreatureBrain> {
    let profile = config.profile(kind)?;
    let box_id = world.box_at(position)?;
    let mut path_finder = PathFinder::new(profile, config.waypoint_margin);
    path_finder.collect_boxes(world, box_id);
    Some(CreatureBrain::new(path_finder, position))
}

fn deactivated(actor: &Creature, tick: u64, events: &mut Vec<SimEvent>) {
    info!(actor_id = %actor.id, position = %actor.position, "actor deactivated");
    events.push(SimEvent {
        tick,
        kind: SimEventKind::ActorDeactivated {
            actor_id: actor.id,
            position: actor.position,
        },
    });
}

fn update_actor<'a>(
    world: &SectorWorld,
    config: &NavConfig,
    rng: &mut GameRng,
    actor: &mut Creature,
    earlier: impl IntoIterator<Item = &'a Creature>,
    tick: u64,
    events: &mut Vec<SimEvent>,
) {
    match actor.state {
        ActorState::Paused | ActorState::MarkedForRemoval => return,
        ActorState::Deactivated => {
            if actor.brain.is_some() {
                motion::animate_creature(world, config, actor, earlier, Angle::ZERO, Angle::ZERO);
                deactivated(actor, tick, events);
            }
            return;
        }
        ActorState::Restarted => {
            debug!(actor_id = %actor.id, "rebuilding AI state");
            actor.brain = build_brain(world, config, actor.kind, actor.position);
            actor.state = ActorState::Active;
        }
        ActorState::Active => {}
    }

    let (Some(profile), Some(current_box)) =
        (config.profile(actor.kind), world.box_at(actor.position))
    else {
        warn!(actor_id = %actor.id, position = %actor.position, "actor outside every box");
        actor.tear_down();
        deactivated(actor, tick, events);
        return;
    };
    let Some(brain) = actor.brain.as_mut() else {
        return;
    };
    let pf = &mut brain.path_finder;

    match actor.goal.and_then(|goal| world.box_at(goal).map(|b| (goal, b))) {
        Some((goal, goal_box)) => pf.set_target(world, goal, goal_box),
        None => {
            if pf.target_box().is_none_or(|b| b == current_box) {
                pf.set_random_search_target(world, rng, current_box);
            }
        }
    }
    if pf.target_box().is_none() {
        actor.speed = 0;
        return;
    }

    let had_route = brain.waypoint.route_complete;
    let waypoint = pf.calculate_target(world, rng, actor.position, current_box);
    brain.waypoint = waypoint;
    if waypoint.route_complete && !had_route {
        if let Some(target_box) = pf.target_box() {
            debug!(actor_id = %actor.id, %target_box, "route found");
            events.push(SimEvent {
                tick,
                kind: SimEventKind::RouteFound {
                    actor_id: actor.id,
                    target_box,
                },
            });
        }
    }

    let distance = actor.position.horizontal_distance_squared(waypoint.position).isqrt();
    actor.speed = distance.min(profile.walk_speed as i64) as i32;

    let turn = motion::rotate_towards_target(actor, Angle::from_degrees(profile.turn_rate_degrees));
    match motion::animate_creature(world, config, actor, earlier, turn, turn) {
        MotionOutcome::Moved => {}
        MotionOutcome::Blocked => {
            events.push(SimEvent {
                tick,
                kind: SimEventKind::ActorBlocked { actor_id: actor.id },
            });
        }
        MotionOutcome::Deactivated => deactivated(actor, tick, events),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nav_box::{Interval, NavBox};
    use crate::types::BoxId;

    /// Three sector-aligned boxes in a row along X, all at floor 0.
    fn corridor() -> SectorWorld {
        let mut boxes: Vec<NavBox> = (0..3)
            .map(|i| {
                let x = Interval::new(i * 1024, i * 1024 + 1023);
                NavBox::new(0, x, Interval::new(0, 1023))
            })
            .collect();
        for i in 0..3u32 {
            if i > 0 {
                boxes[i as usize].overlaps.push(BoxId(i - 1));
            }
            if i < 2 {
                boxes[i as usize].overlaps.push(BoxId(i + 1));
            }
        }
        SectorWorld::from_boxes(boxes, 2048)
    }

    /// Default config with nimble turning, so tests converge quickly.
    fn test_config() -> NavConfig {
        let mut config = NavConfig::default();
        for profile in config.profiles.values_mut() {
            profile.turn_rate_degrees = 45;
        }
        config
    }

    fn test_sim() -> NavSim {
        NavSim::new(corridor(), test_config(), 42)
    }

    fn spawn(kind: ActorKind, position: Position) -> SimCommand {
        SimCommand {
            tick: 1,
            action: SimAction::SpawnActor { kind, position },
        }
    }

    fn at(tick: u64, action: SimAction) -> SimCommand {
        SimCommand { tick, action }
    }

    #[test]
    fn step_advances_tick() {
        let mut sim = test_sim();
        sim.step(&[], 100);
        assert_eq!(sim.tick, 100);
    }

    #[test]
    fn spawn_inside_box() {
        let mut sim = test_sim();
        let result = sim.step(&[spawn(ActorKind::Wolf, Position::new(500, 0, 500))], 1);

        assert_eq!(sim.actors.len(), 1);
        let actor = &sim.actors[&ActorId(0)];
        assert!(actor.brain.is_some());
        assert_eq!(actor.brain.as_ref().unwrap().path_finder.boxes().len(), 3);
        assert!(result.events.iter().any(|e| matches!(
            e.kind,
            SimEventKind::ActorSpawned {
                actor_id: ActorId(0),
                box_id: BoxId(0),
                ..
            }
        )));
    }

    #[test]
    fn spawn_outside_world_is_rejected() {
        let mut sim = test_sim();
        let result = sim.step(&[spawn(ActorKind::Wolf, Position::new(-500, 0, 500))], 1);
        assert!(sim.actors.is_empty());
        assert!(
            result
                .events
                .iter()
                .any(|e| matches!(e.kind, SimEventKind::SpawnRejected { .. }))
        );
    }

    #[test]
    fn goal_outside_world_is_rejected() {
        let mut sim = test_sim();
        let cmds = [
            spawn(ActorKind::Wolf, Position::new(500, 0, 500)),
            at(
                1,
                SimAction::SetGoal {
                    actor_id: ActorId(0),
                    position: Position::new(500, 0, 5000),
                },
            ),
        ];
        let result = sim.step(&cmds, 1);
        assert_eq!(sim.actors[&ActorId(0)].goal, None);
        assert!(
            result
                .events
                .iter()
                .any(|e| matches!(e.kind, SimEventKind::GoalRejected { .. }))
        );
    }

    #[test]
    fn wanderer_picks_a_target() {
        let mut sim = test_sim();
        sim.step(&[spawn(ActorKind::Bear, Position::new(500, 0, 500))], 1);
        let brain = sim.actors[&ActorId(0)].brain.as_ref().unwrap();
        assert!(brain.path_finder.target_box().is_some());
    }

    #[test]
    fn walker_reaches_goal() {
        let mut sim = test_sim();
        let goal = Position::new(2700, 0, 500);
        let cmds = [
            spawn(ActorKind::Wolf, Position::new(300, 0, 500)),
            at(
                1,
                SimAction::SetGoal {
                    actor_id: ActorId(0),
                    position: goal,
                },
            ),
        ];
        let result = sim.step(&cmds, 300);

        let actor = &sim.actors[&ActorId(0)];
        assert_eq!(actor.state, ActorState::Active);
        assert!(
            actor.position.horizontal_distance_squared(goal) < 64 * 64,
            "wolf stopped at {}",
            actor.position
        );
        assert!(
            result
                .events
                .iter()
                .any(|e| matches!(e.kind, SimEventKind::RouteFound { .. }))
        );
    }

    #[test]
    fn pause_freezes_actor() {
        let mut sim = test_sim();
        let cmds = [
            spawn(ActorKind::Wolf, Position::new(300, 0, 500)),
            at(
                1,
                SimAction::SetGoal {
                    actor_id: ActorId(0),
                    position: Position::new(2700, 0, 500),
                },
            ),
        ];
        sim.step(&cmds, 5);
        sim.step(&[at(6, SimAction::Pause { actor_id: ActorId(0) })], 6);
        let frozen = sim.actors[&ActorId(0)].position;
        sim.step(&[], 20);
        assert_eq!(sim.actors[&ActorId(0)].position, frozen);
        assert_eq!(sim.actors[&ActorId(0)].state, ActorState::Paused);

        sim.step(&[at(21, SimAction::Resume { actor_id: ActorId(0) })], 30);
        assert_ne!(sim.actors[&ActorId(0)].position, frozen);
    }

    #[test]
    fn deactivate_tears_down() {
        let mut sim = test_sim();
        sim.step(&[spawn(ActorKind::Wolf, Position::new(500, 0, 500))], 1);
        let result = sim.step(&[at(2, SimAction::Deactivate { actor_id: ActorId(0) })], 2);

        let actor = &sim.actors[&ActorId(0)];
        assert_eq!(actor.state, ActorState::Deactivated);
        assert!(actor.is_dead());
        assert!(!actor.collidable);
        assert!(actor.brain.is_none());
        assert!(
            result
                .events
                .iter()
                .any(|e| matches!(e.kind, SimEventKind::ActorDeactivated { .. }))
        );

        // Restart does not revive a deactivated actor.
        sim.step(&[at(3, SimAction::Restart { actor_id: ActorId(0) })], 3);
        assert!(sim.actors[&ActorId(0)].brain.is_none());
    }

    #[test]
    fn remove_drops_actor_at_end_of_tick() {
        let mut sim = test_sim();
        sim.step(&[spawn(ActorKind::Wolf, Position::new(500, 0, 500))], 1);
        let result = sim.step(&[at(2, SimAction::Remove { actor_id: ActorId(0) })], 2);
        assert!(sim.actors.is_empty());
        assert!(
            result
                .events
                .iter()
                .any(|e| e.kind == SimEventKind::ActorRemoved { actor_id: ActorId(0) })
        );
    }

    #[test]
    fn restart_rebuilds_brain() {
        let mut sim = test_sim();
        sim.step(&[spawn(ActorKind::Wolf, Position::new(500, 0, 500))], 1);
        sim.step(&[at(2, SimAction::Restart { actor_id: ActorId(0) })], 2);
        let actor = &sim.actors[&ActorId(0)];
        assert_eq!(actor.state, ActorState::Active);
        let brain = actor.brain.as_ref().unwrap();
        assert_eq!(brain.path_finder.boxes().len(), 3);
    }

    #[test]
    fn rooms_swap_resets_searches() {
        let mut sim = test_sim();
        sim.step(&[spawn(ActorKind::Wolf, Position::new(500, 0, 500))], 1);
        let result = sim.step(&[at(2, SimAction::SetRoomsSwapped { swapped: true })], 2);
        assert!(sim.rooms_swapped);
        assert!(sim.world.rooms_swapped());
        assert!(
            result
                .events
                .iter()
                .any(|e| e.kind == SimEventKind::RoomsSwapped { swapped: true })
        );
    }

    #[test]
    fn prewarm_advances_searches() {
        let mut sim = test_sim();
        sim.step(&[spawn(ActorKind::Wolf, Position::new(500, 0, 500))], 1);
        {
            let actor = sim.actors.get_mut(&ActorId(0)).unwrap();
            let pf = &mut actor.brain.as_mut().unwrap().path_finder;
            pf.set_target_box(BoxId(2));
            pf.reset_search();
        }
        assert_eq!(sim.prewarm_searches(), 3);
        let pf = &sim.actors[&ActorId(0)].brain.as_ref().unwrap().path_finder;
        assert_eq!(pf.is_reachable(BoxId(0)), Some(true));
        assert_eq!(pf.get_next_path_box(BoxId(0)), Some(BoxId(1)));
    }

    #[test]
    fn determinism_same_seed_same_state() {
        let cmds = [
            spawn(ActorKind::Wolf, Position::new(300, 0, 500)),
            spawn(ActorKind::Bat, Position::new(1500, -400, 500)),
            spawn(ActorKind::Bear, Position::new(2500, 0, 300)),
        ];
        let mut a = test_sim();
        let mut b = test_sim();
        a.step(&cmds, 200);
        b.step(&cmds, 200);
        assert_eq!(a.to_json().unwrap(), b.to_json().unwrap());
    }

    #[test]
    fn serialization_roundtrip_continues_identically() {
        let cmds = [
            spawn(ActorKind::Wolf, Position::new(300, 0, 500)),
            spawn(ActorKind::Raptor, Position::new(2500, 0, 300)),
        ];
        let mut sim = test_sim();
        sim.step(&cmds, 50);

        let json = sim.to_json().unwrap();
        let mut restored = NavSim::from_json(&json, corridor()).unwrap();
        assert_eq!(restored.to_json().unwrap(), json);

        sim.step(&[], 120);
        restored.step(&[], 120);
        assert_eq!(sim.to_json().unwrap(), restored.to_json().unwrap());
    }

    #[test]
    fn from_json_rejects_unknown_boxes() {
        let mut sim = test_sim();
        sim.step(&[spawn(ActorKind::Wolf, Position::new(500, 0, 500))], 1);
        let json = sim.to_json().unwrap();

        let tiny = SectorWorld::from_boxes(
            vec![NavBox::new(0, Interval::new(0, 1023), Interval::new(0, 1023))],
            2048,
        );
        let err = NavSim::from_json(&json, tiny).unwrap_err();
        assert!(matches!(err, NavError::UnknownBox(_)));
    }

    #[test]
    fn from_json_rejects_invalid_json() {
        assert!(NavSim::from_json("not valid json {{{", corridor()).is_err());
    }
}
