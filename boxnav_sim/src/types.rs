// Core types shared across the navigation core.
//
// Defines world positions (`Position`), 16-bit binary angles (`Angle`),
// the facing octant (`Axis`), and the compact integer identifiers for boxes,
// zones and actors. All types derive `Serialize` and `Deserialize` for
// save/load.
//
// Coordinate conventions:
// - X and Z span the horizontal plane; Y points **down** (a larger Y is
//   lower). Floor and ceiling heights follow the same convention, so "the
//   higher of two floors" is the one with the smaller Y.
// - One sector is `SECTOR_SIZE` units wide; sectors tile the XZ plane.
// - Angles are binary: 65536 units per full turn, yaw 0 faces +Z and
//   yaw +90° faces +X.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

// ---------------------------------------------------------------------------
// Length constants
// ---------------------------------------------------------------------------

/// Width of one sector in world units.
pub const SECTOR_SIZE: i32 = 1024;

/// A quarter sector, the classic single "click" of floor height.
pub const QUARTER_SECTOR: i32 = SECTOR_SIZE / 4;

/// Health assigned to an actor torn down by the deactivation path.
pub const DEAD_HEALTH: i32 = -16384;

// ---------------------------------------------------------------------------
// Spatial types
// ---------------------------------------------------------------------------

/// A position in world units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Return a copy shifted by the given deltas.
    pub const fn moved(self, dx: i32, dy: i32, dz: i32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.z + dz)
    }

    /// Squared 3D distance, in `i64` so that level-sized coordinates cannot
    /// overflow.
    pub fn distance_squared(self, other: Self) -> i64 {
        let dx = (self.x - other.x) as i64;
        let dy = (self.y - other.y) as i64;
        let dz = (self.z - other.z) as i64;
        dx * dx + dy * dy + dz * dz
    }

    /// Squared distance in the XZ plane.
    pub fn horizontal_distance_squared(self, other: Self) -> i64 {
        let dx = (self.x - other.x) as i64;
        let dz = (self.z - other.z) as i64;
        dx * dx + dz * dz
    }

    /// Sector column containing this position.
    pub fn sector_x(self) -> i32 {
        self.x.div_euclid(SECTOR_SIZE)
    }

    /// Sector row containing this position.
    pub fn sector_z(self) -> i32 {
        self.z.div_euclid(SECTOR_SIZE)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

// ---------------------------------------------------------------------------
// Angles
// ---------------------------------------------------------------------------

/// Units per full turn of a binary angle.
const ANGLE_UNITS_PER_TURN: i64 = 1 << 16;

/// A binary angle: 65536 units per full turn, wrapping on overflow.
///
/// Differences of two angles are themselves angles in `[-180°, 180°)`, which
/// is what the steering code compares against.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Angle(pub i16);

impl Angle {
    pub const ZERO: Self = Self(0);

    /// Convert whole degrees to a binary angle.
    pub const fn from_degrees(degrees: i32) -> Self {
        let units = degrees as i64 * ANGLE_UNITS_PER_TURN / 360;
        Self(units as i16)
    }

    /// Heading of the vector `(dx, dz)`: 0 along +Z, +90° along +X.
    ///
    /// For pitch, pass the vertical delta as `dx` and the forward distance
    /// as `dz`.
    pub fn from_atan(dx: i32, dz: i32) -> Self {
        if dx == 0 && dz == 0 {
            return Self::ZERO;
        }
        let radians = (dx as f64).atan2(dz as f64);
        let units = (radians * ANGLE_UNITS_PER_TURN as f64 / std::f64::consts::TAU).round();
        Self(units as i64 as i16)
    }

    pub fn to_radians(self) -> f64 {
        self.0 as f64 * std::f64::consts::TAU / ANGLE_UNITS_PER_TURN as f64
    }

    pub fn sin(self) -> f64 {
        self.to_radians().sin()
    }

    pub fn cos(self) -> f64 {
        self.to_radians().cos()
    }

    /// Clamp a relative angle into `[-limit, limit]`.
    pub fn clamp_abs(self, limit: Angle) -> Self {
        let limit = limit.0.saturating_abs();
        Self(self.0.clamp(-limit, limit))
    }

    /// The axis this heading points closest to.
    pub fn axis(self) -> Axis {
        let deg45 = Self::from_degrees(45).0;
        let deg135 = Self::from_degrees(135).0;
        match self.0 {
            a if (-deg45..=deg45).contains(&a) => Axis::PosZ,
            a if a > deg45 && a <= deg135 => Axis::PosX,
            a if a < -deg45 && a >= -deg135 => Axis::NegX,
            _ => Axis::NegZ,
        }
    }
}

impl Add for Angle {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self(self.0.wrapping_add(rhs.0))
    }
}

impl AddAssign for Angle {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sub for Angle {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self(self.0.wrapping_sub(rhs.0))
    }
}

impl SubAssign for Angle {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl Neg for Angle {
    type Output = Self;
    fn neg(self) -> Self {
        Self(self.0.wrapping_neg())
    }
}

/// The world axis a heading is closest to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Axis {
    PosZ,
    PosX,
    NegZ,
    NegX,
}

/// Yaw, pitch and roll of an actor.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rotation {
    /// Rotation about the lateral axis (nose up/down).
    pub pitch: Angle,
    /// Heading in the XZ plane.
    pub yaw: Angle,
    /// Bank about the forward axis.
    pub roll: Angle,
}

// ---------------------------------------------------------------------------
// Compact identifiers
// ---------------------------------------------------------------------------

/// Stable index of a box in the world's box arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BoxId(pub u32);

impl BoxId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for BoxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "box#{}", self.0)
    }
}

/// Zone identifier. Boxes with equal zone ids under the same `ZoneKey` are
/// mutually reachable for that movement configuration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ZoneId(pub u16);

/// Identifier of an actor in the simulation. Assigned sequentially; the
/// ordering doubles as the per-tick processing order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ActorId(pub u32);

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "actor#{}", self.0)
    }
}

/// Creature archetypes. Behavior differences come from `ActorProfile` data
/// in the config, never from code branching on the kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ActorKind {
    Wolf,
    Bear,
    Raptor,
    Bat,
    Crocodile,
}

impl ActorKind {
    /// Parse the name used on the command line (`wolf`, `bat`, ...).
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "wolf" => Some(Self::Wolf),
            "bear" => Some(Self::Bear),
            "raptor" => Some(Self::Raptor),
            "bat" => Some(Self::Bat),
            "crocodile" => Some(Self::Crocodile),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn angle_from_degrees() {
        assert_eq!(Angle::from_degrees(90).0, 16384);
        assert_eq!(Angle::from_degrees(-90).0, -16384);
        assert_eq!(Angle::from_degrees(180).0, i16::MIN);
        assert_eq!(Angle::from_degrees(1).0, 182);
    }

    #[test]
    fn angle_arithmetic_wraps() {
        let a = Angle::from_degrees(170) + Angle::from_degrees(20);
        assert!(a.0 < 0, "170 + 20 should wrap to a negative heading");
        let back = Angle::from_degrees(10) - Angle::from_degrees(20);
        assert_eq!(back.0, -Angle::from_degrees(10).0);
    }

    #[test]
    fn angle_from_atan_headings() {
        assert_eq!(Angle::from_atan(0, 100), Angle::ZERO);
        assert_eq!(Angle::from_atan(100, 0), Angle::from_degrees(90));
        assert_eq!(Angle::from_atan(-100, 0), Angle::from_degrees(-90));
        assert_eq!(Angle::from_atan(0, 0), Angle::ZERO);
    }

    #[test]
    fn angle_axis_octants() {
        assert_eq!(Angle::from_degrees(0).axis(), Axis::PosZ);
        assert_eq!(Angle::from_degrees(30).axis(), Axis::PosZ);
        assert_eq!(Angle::from_degrees(90).axis(), Axis::PosX);
        assert_eq!(Angle::from_degrees(-90).axis(), Axis::NegX);
        assert_eq!(Angle::from_degrees(180).axis(), Axis::NegZ);
        assert_eq!(Angle::from_degrees(-170).axis(), Axis::NegZ);
    }

    #[test]
    fn clamp_abs_is_symmetric() {
        let limit = Angle::from_degrees(3);
        assert_eq!(Angle::from_degrees(10).clamp_abs(limit), limit);
        assert_eq!(Angle::from_degrees(-10).clamp_abs(limit), -limit);
        assert_eq!(Angle::from_degrees(2).clamp_abs(limit), Angle::from_degrees(2));
    }

    #[test]
    fn position_sector_lookup_handles_negatives() {
        let p = Position::new(-1, 0, 2048);
        assert_eq!(p.sector_x(), -1);
        assert_eq!(p.sector_z(), 2);
    }

    #[test]
    fn position_distances() {
        let a = Position::new(0, 0, 0);
        let b = Position::new(3, 12, 4);
        assert_eq!(a.distance_squared(b), 169);
        assert_eq!(a.horizontal_distance_squared(b), 25);
    }

    #[test]
    fn actor_kind_from_name() {
        assert_eq!(ActorKind::from_name("Wolf"), Some(ActorKind::Wolf));
        assert_eq!(ActorKind::from_name("bat"), Some(ActorKind::Bat));
        assert_eq!(ActorKind::from_name("dragon"), None);
    }

    #[test]
    fn box_id_serialization_roundtrip() {
        let id = BoxId(17);
        let json = serde_json::to_string(&id).unwrap();
        let restored: BoxId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, restored);
    }
}
