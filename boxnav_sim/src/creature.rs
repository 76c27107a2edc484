// Actor kinematic state and lifecycle.
//
// Every navigating actor is a `Creature`: kinematic state (position,
// rotation, speed, cached floor), body data copied from its profile at
// spawn (collision radius, height), health, a lifecycle `ActorState`, an
// optional commanded goal, and its AI state (`CreatureBrain`). The brain
// holds the actor's `PathFinder` and last waypoint and is dropped when the
// actor is deactivated; a deactivated actor never navigates again.
//
// See also: `motion.rs` which integrates one tick of movement, `sim.rs`
// which owns creatures and drives the per-tick control flow,
// `pathfinder.rs` for `PathFinder` and `Waypoint`.

use crate::pathfinder::{PathFinder, Waypoint};
use crate::profile::ActorProfile;
use crate::types::{ActorId, ActorKind, DEAD_HEALTH, Position, Rotation};
use serde::{Deserialize, Serialize};

/// Lifecycle state of an actor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActorState {
    /// Navigates every tick.
    Active,
    /// Skipped until resumed; keeps its search state.
    Paused,
    /// Rebuilds its AI state on its next tick, then becomes `Active`.
    Restarted,
    /// Terminal. The AI state is torn down on the next tick if still present.
    Deactivated,
    /// Dropped from the sim at the end of the current tick.
    MarkedForRemoval,
}

/// Per-actor AI state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatureBrain {
    pub path_finder: PathFinder,
    /// Where the actor is currently heading.
    pub waypoint: Waypoint,
}

impl CreatureBrain {
    /// A brain with no route yet, holding position at `position`.
    pub fn new(path_finder: PathFinder, position: Position) -> Self {
        Self {
            path_finder,
            waypoint: Waypoint {
                position,
                route_complete: false,
            },
        }
    }
}

/// A navigating actor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Creature {
    pub id: ActorId,
    pub kind: ActorKind,
    pub state: ActorState,
    pub position: Position,
    pub rotation: Rotation,
    /// Forward speed in world units per tick.
    pub speed: i32,
    pub collision_radius: i32,
    pub height: i32,
    /// Floor height under the actor as of the end of its last tick.
    pub floor: i32,
    pub health: i32,
    pub collidable: bool,
    /// Commanded destination; `None` means wander.
    pub goal: Option<Position>,
    pub brain: Option<CreatureBrain>,
}

impl Creature {
    /// A live, idle creature standing at `position` on `floor`.
    pub fn new(
        id: ActorId,
        kind: ActorKind,
        profile: &ActorProfile,
        position: Position,
        floor: i32,
    ) -> Self {
        Self {
            id,
            kind,
            state: ActorState::Active,
            position,
            rotation: Rotation::default(),
            speed: 0,
            collision_radius: profile.collision_radius,
            height: profile.height,
            floor,
            health: 1000,
            collidable: true,
            goal: None,
            brain: None,
        }
    }

    pub fn is_dead(&self) -> bool {
        self.health <= 0
    }

    /// The deactivation terminal path: dead, not collidable, AI discarded.
    pub fn tear_down(&mut self) {
        self.health = DEAD_HEALTH;
        self.collidable = false;
        self.speed = 0;
        self.brain = None;
        if self.state != ActorState::MarkedForRemoval {
            self.state = ActorState::Deactivated;
        }
    }
}
