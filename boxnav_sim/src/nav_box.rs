// Navigation boxes and zone selection.
//
// A `NavBox` is a convex, axis-aligned cell of walkable space: a floor
// height, a closed X interval and a closed Z interval, the list of boxes it
// overlaps (its neighbors in the box graph), and the zone it belongs to
// under each movement configuration. Boxes live in a flat arena owned by
// the world and are addressed by `BoxId`; nothing in the navigation core
// holds a reference into the arena across ticks.
//
// Zones partition the box graph into islands that a given kind of actor
// can move between. There are six zone columns: three movement classes
// (ground with a small step, ground with a large step, flying) times the
// world-wide "rooms swapped" toggle. `ZoneKey::select()` picks the column;
// the toggle is always passed in explicitly, never read from global state.
//
// See also: `world.rs` for the arena and the sector lookup, `pathfinder.rs`
// for the search that walks `overlaps`.
//
// **Critical constraint: determinism.** Overlap lists are ordered and the
// search visits them in stored order.

use crate::types::{BoxId, QUARTER_SECTOR, ZoneId};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

// ---------------------------------------------------------------------------
// Interval
// ---------------------------------------------------------------------------

/// A closed integer range `[min, max]` along one horizontal axis.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Interval {
    pub min: i32,
    pub max: i32,
}

impl Interval {
    pub const fn new(min: i32, max: i32) -> Self {
        Self { min, max }
    }

    pub fn is_ordered(self) -> bool {
        self.min <= self.max
    }

    pub fn contains(self, v: i32) -> bool {
        self.min <= v && v <= self.max
    }

    pub fn size(self) -> i32 {
        self.max - self.min
    }

    pub fn mid(self) -> i32 {
        self.min + self.size() / 2
    }

    /// Shrink both ends by `margin`. An interval too small to shrink that
    /// far collapses onto its midpoint, so the result is always ordered and
    /// always inside `self`.
    pub fn narrowed(self, margin: i32) -> Self {
        if self.size() < 2 * margin {
            let mid = self.mid();
            return Self::new(mid, mid);
        }
        Self::new(self.min + margin, self.max - margin)
    }

    /// Overlap of two intervals. May be inverted when they are disjoint.
    pub fn intersect(self, other: Self) -> Self {
        Self::new(self.min.max(other.min), self.max.min(other.max))
    }

    /// Clamp without checking order: below `min` gives `min`, above `max`
    /// gives `max`.
    pub fn clamp(self, v: i32) -> i32 {
        if v < self.min {
            self.min
        } else if v > self.max {
            self.max
        } else {
            v
        }
    }
}

// ---------------------------------------------------------------------------
// Zones
// ---------------------------------------------------------------------------

/// Movement class used to choose a zone column.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ZoneColumn {
    /// Ground actors that climb at most a quarter sector.
    GroundLowStep,
    /// Ground actors that climb more than a quarter sector.
    GroundHighStep,
    Fly,
}

/// Selects one of the six zone identifiers stored on every box.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ZoneKey {
    pub rooms_swapped: bool,
    pub column: ZoneColumn,
}

impl ZoneKey {
    /// The zone column for an actor with the given capabilities, under the
    /// given room-swap state.
    pub fn select(rooms_swapped: bool, flying: bool, step: i32) -> Self {
        let column = if flying {
            ZoneColumn::Fly
        } else if step <= QUARTER_SECTOR {
            ZoneColumn::GroundLowStep
        } else {
            ZoneColumn::GroundHighStep
        };
        Self {
            rooms_swapped,
            column,
        }
    }
}

/// The three zone identifiers of a box under one room-swap state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneSet {
    pub ground_low_step: ZoneId,
    pub ground_high_step: ZoneId,
    pub fly: ZoneId,
}

impl ZoneSet {
    /// The same zone for every movement class.
    pub const fn uniform(zone: ZoneId) -> Self {
        Self {
            ground_low_step: zone,
            ground_high_step: zone,
            fly: zone,
        }
    }

    fn get(&self, column: ZoneColumn) -> ZoneId {
        match column {
            ZoneColumn::GroundLowStep => self.ground_low_step,
            ZoneColumn::GroundHighStep => self.ground_high_step,
            ZoneColumn::Fly => self.fly,
        }
    }
}

// ---------------------------------------------------------------------------
// NavBox
// ---------------------------------------------------------------------------

/// A convex navigable cell.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavBox {
    /// Floor height (Y points down).
    pub floor: i32,
    pub x: Interval,
    pub z: Interval,
    /// Neighboring boxes, in the order the search visits them.
    pub overlaps: SmallVec<[BoxId; 8]>,
    /// Zone ids: `zones[0]` normal, `zones[1]` with rooms swapped.
    pub zones: [ZoneSet; 2],
    /// Permanently impassable for actors that respect it.
    #[serde(default)]
    pub blocked: bool,
    /// Can become impassable at runtime (doors, traps).
    #[serde(default)]
    pub blockable: bool,
}

impl NavBox {
    /// A box in zone 0 for every configuration, with no neighbors.
    pub fn new(floor: i32, x: Interval, z: Interval) -> Self {
        Self {
            floor,
            x,
            z,
            overlaps: SmallVec::new(),
            zones: [ZoneSet::default(); 2],
            blocked: false,
            blockable: false,
        }
    }

    pub fn zone(&self, key: ZoneKey) -> ZoneId {
        self.zones[usize::from(key.rooms_swapped)].get(key.column)
    }

    /// True if the horizontal point `(x, z)` lies inside both intervals.
    pub fn contains_xz(&self, x: i32, z: i32) -> bool {
        self.x.contains(x) && self.z.contains(z)
    }
}
