// Data-driven navigation configuration.
//
// All tunable navigation parameters live here in `NavConfig`, loaded from
// JSON at startup. The sim never hard-codes a tuning constant; it reads
// from the config, so balancing does not need a rebuild.
//
// Per-kind movement capabilities (step, drop, fly speed, collision radius,
// walk speed, turn rate) live in `ActorProfile` entries keyed by
// `ActorKind` in the `profiles` map — see `profile.rs`. `NavConfig`
// implements `CapabilityProvider` over that map.
//
// See also: `sim.rs` which owns the `NavConfig` as part of `NavSim`,
// `motion.rs` which reads the fall, tilt and pitch parameters.
//
// **Critical constraint: determinism.** Config values feed directly into
// simulation logic. Two runs only match if their configs match.

use crate::error::NavError;
use crate::profile::{ActorProfile, CapabilityProvider};
use crate::types::ActorKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Top-level navigation configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavConfig {
    /// Inset from box edges used when clamping waypoints, in world units.
    pub waypoint_margin: i32,

    /// Largest downward step a grounded actor takes per tick when its floor
    /// is below it. Larger gaps are covered over several ticks.
    pub max_fall_per_tick: i32,

    /// Multiplier from the requested tilt to the target roll.
    pub tilt_gain: i32,

    /// Largest roll change per tick, in degrees.
    pub max_tilt_step_degrees: i32,

    /// Largest pitch change per tick for flyers, in degrees.
    pub pitch_step_degrees: i32,

    /// Movement capabilities per creature kind.
    pub profiles: BTreeMap<ActorKind, ActorProfile>,
}

impl NavConfig {
    /// Parse a config from JSON.
    pub fn from_json(json: &str) -> Result<Self, NavError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a JSON config file.
    pub fn load(path: &Path) -> Result<Self, NavError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}

impl CapabilityProvider for NavConfig {
    fn profile(&self, kind: ActorKind) -> Option<&ActorProfile> {
        self.profiles.get(&kind)
    }
}

impl Default for NavConfig {
    fn default() -> Self {
        let mut profiles = BTreeMap::new();
        profiles.insert(ActorKind::Wolf, ActorProfile::walker(341, 40, 3));
        profiles.insert(ActorKind::Bear, ActorProfile::walker(341, 30, 2));
        profiles.insert(
            ActorKind::Raptor,
            ActorProfile {
                step: 512,
                ..ActorProfile::walker(341, 60, 4)
            },
        );
        profiles.insert(ActorKind::Bat, ActorProfile::flyer(102, 16, 20));
        profiles.insert(
            ActorKind::Crocodile,
            ActorProfile {
                height: 256,
                turn_rate_degrees: 3,
                ignores_ceiling_clearance: true,
                ..ActorProfile::flyer(409, 16, 24)
            },
        );

        Self {
            waypoint_margin: 205,
            max_fall_per_tick: 64,
            tilt_gain: 8,
            max_tilt_step_degrees: 3,
            pitch_step_degrees: 1,
            profiles,
        }
    }
}
