// Narrative events emitted by the navigation sim.
//
// `NavSim::step()` returns the events produced while processing commands
// and ticking actors, for logs, debugging overlays and tests. Events are
// output only; the sim never reads them back. The per-tick control flow is
// driven by the tick loop itself, not by an event queue.
//
// See also: `sim.rs` which emits these, `command.rs` for the inputs.
//
// **Critical constraint: determinism.** Events are emitted in command
// order, then in `ActorId` order within a tick.

use crate::types::{ActorId, ActorKind, BoxId, Position};
use serde::{Deserialize, Serialize};

/// An event emitted during a step, stamped with its tick.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimEvent {
    pub tick: u64,
    pub kind: SimEventKind,
}

/// Types of events the sim reports.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SimEventKind {
    ActorSpawned {
        actor_id: ActorId,
        kind: ActorKind,
        box_id: BoxId,
    },
    /// The spawn position lies outside every box, or the kind has no profile.
    SpawnRejected { kind: ActorKind, position: Position },
    /// The goal lies outside every box, or the actor is unknown or inert.
    GoalRejected { actor_id: ActorId, position: Position },
    /// A complete route to the actor's target box became known.
    RouteFound { actor_id: ActorId, target_box: BoxId },
    /// Another actor was in the way this tick.
    ActorBlocked { actor_id: ActorId },
    ActorDeactivated { actor_id: ActorId, position: Position },
    ActorRemoved { actor_id: ActorId },
    RoomsSwapped { swapped: bool },
}
