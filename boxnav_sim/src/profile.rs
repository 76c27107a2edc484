// Actor profiles — data-driven movement capabilities per creature kind.
//
// All movement differences between creature kinds (wolves, bats, raptors,
// etc.) are expressed as data in `ActorProfile`, keyed by `ActorKind` in
// the nav config. The sim uses a single `Creature` type and reads the
// kind's profile at spawn and restart time; there is no code branching on
// the kind itself.
//
// `CapabilityProvider` is the seam through which the navigation core asks
// "what can this kind of actor do?". `NavConfig` implements it; tests can
// supply their own tables.
//
// See also: `config.rs` where the profile table lives, `pathfinder.rs`
// which copies step/drop/fly and the visit flags out of a profile, and
// `motion.rs` which reads the collision radius and body height.
//
// **Critical constraint: determinism.** Profiles are part of the config
// and must be identical for any two runs expected to match.

use crate::types::{ActorKind, QUARTER_SECTOR, SECTOR_SIZE};
use serde::{Deserialize, Serialize};

/// Data-driven movement parameters for a creature kind.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorProfile {
    /// Horizontal clearance kept from sector edges the actor cannot enter.
    pub collision_radius: i32,

    /// Body height, used for ceiling clearance while flying.
    pub height: i32,

    /// Maximum climb between adjacent boxes (positive: floor may be up to
    /// this much higher, i.e. smaller Y).
    pub step: i32,

    /// Maximum descent between adjacent boxes, as a non-positive number.
    pub drop: i32,

    /// Vertical speed while flying; 0 for ground actors.
    pub fly: i32,

    pub cannot_visit_blocked: bool,
    pub cannot_visit_blockable: bool,

    /// Forward speed in world units per tick.
    pub walk_speed: i32,

    /// Maximum yaw change per tick, in degrees.
    pub turn_rate_degrees: i32,

    /// Test the ceiling at foot height instead of head height (swimmers
    /// hugging the water surface).
    #[serde(default)]
    pub ignores_ceiling_clearance: bool,
}

impl ActorProfile {
    /// A ground-bound walker that climbs one quarter sector and drops up to
    /// a full sector.
    pub fn walker(collision_radius: i32, walk_speed: i32, turn_rate_degrees: i32) -> Self {
        Self {
            collision_radius,
            height: 512,
            step: QUARTER_SECTOR,
            drop: -SECTOR_SIZE,
            fly: 0,
            cannot_visit_blocked: true,
            cannot_visit_blockable: false,
            walk_speed,
            turn_rate_degrees,
            ignores_ceiling_clearance: false,
        }
    }

    /// A flyer: no step or drop restriction worth speaking of.
    pub fn flyer(collision_radius: i32, fly: i32, walk_speed: i32) -> Self {
        Self {
            collision_radius,
            height: 128,
            step: 20 * SECTOR_SIZE,
            drop: -20 * SECTOR_SIZE,
            fly,
            cannot_visit_blocked: true,
            cannot_visit_blockable: false,
            walk_speed,
            turn_rate_degrees: 20,
            ignores_ceiling_clearance: false,
        }
    }

    pub fn is_flying(&self) -> bool {
        self.fly != 0
    }
}

/// Maps a creature kind to its movement capabilities.
pub trait CapabilityProvider {
    fn profile(&self, kind: ActorKind) -> Option<&ActorProfile>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    struct Table(BTreeMap<ActorKind, ActorProfile>);

    impl CapabilityProvider for Table {
        fn profile(&self, kind: ActorKind) -> Option<&ActorProfile> {
            self.0.get(&kind)
        }
    }

    #[test]
    fn walker_is_grounded() {
        let p = ActorProfile::walker(300, 40, 3);
        assert!(!p.is_flying());
        assert!(p.drop < 0 && p.step > 0);
    }

    #[test]
    fn flyer_is_flying() {
        assert!(ActorProfile::flyer(100, 16, 20).is_flying());
    }

    #[test]
    fn provider_misses_unknown_kind() {
        let mut table = BTreeMap::new();
        table.insert(ActorKind::Wolf, ActorProfile::walker(341, 30, 2));
        let table = Table(table);
        assert_eq!(table.profile(ActorKind::Wolf).map(|p| p.collision_radius), Some(341));
        assert!(table.profile(ActorKind::Bat).is_none());
    }
}
