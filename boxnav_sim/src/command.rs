// Commands that mutate simulation state.
//
// All external mutations to the navigation sim go through `SimCommand`.
// The sim is a pure function `(state, commands) -> (new_state, events)`;
// commands are the input, scheduled for a specific tick.
//
// A `SimCommand` carries a `tick` (when to apply) and a `SimAction`.
// Current actions:
// - `SpawnActor` — place a creature of any kind at a world position. The
//   position must lie inside a box; otherwise the spawn is rejected.
// - `SetGoal` / `ClearGoal` — send an actor to a position, or let it wander.
// - `Pause` / `Resume` — suspend an actor without losing its search state.
// - `Restart` — rebuild an actor's AI state from its profile.
// - `Deactivate` — send an actor down the terminal path.
// - `Remove` — drop an actor from the sim at the end of the tick.
// - `SetRoomsSwapped` — flip the world-wide room-swap toggle.
//
// See also: `sim.rs` for `apply_command()` which dispatches these,
// `event.rs` for what the sim reports back.
//
// **Critical constraint: determinism.** Commands are the sole external input
// to the sim.

use crate::types::{ActorId, ActorKind, Position};
use serde::{Deserialize, Serialize};

/// A command targeting a specific simulation tick.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimCommand {
    pub tick: u64,
    pub action: SimAction,
}

/// The specific action a command performs.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SimAction {
    SpawnActor { kind: ActorKind, position: Position },
    /// Navigate to `position`. Rejected when no box contains it.
    SetGoal { actor_id: ActorId, position: Position },
    ClearGoal { actor_id: ActorId },
    Pause { actor_id: ActorId },
    Resume { actor_id: ActorId },
    Restart { actor_id: ActorId },
    Deactivate { actor_id: ActorId },
    Remove { actor_id: ActorId },
    SetRoomsSwapped { swapped: bool },
}
