// Per-actor incremental search over the box graph.
//
// A `PathFinder` owns one actor's navigation state: the goal (`target` and
// `target_box`), the candidate box subset (`boxes`), and the state of an
// in-progress reachability search (`reachable`, `edges`, `expansions`).
//
// The search runs *outward from the target box*. `set_target_box()` starts
// a new episode by marking the target reachable and queueing it; every
// `search_path()` call then expands at most `MAX_EXPANSIONS` boxes in FIFO
// order. When a neighbor is found reachable, `edges[neighbor] = current`
// is recorded, so following `edges` from any reached box leads to the
// target. This is a breadth-first reachability flood, not a shortest-path
// search: there is no distance metric and no priority queue. Work per call
// is bounded, so many actors can search in the same tick and convergence
// is spread over several ticks.
//
// `calculate_target()` turns the partial search into the next waypoint. It
// walks `edges` from the actor's box toward the target, narrowing a corridor
// of X/Z intervals and a set of still-legal move directions, and stops at
// the first box the actor's position cannot be projected into. Reaching the
// target box snaps free axes to the target; a broken chain scatters the
// free axes randomly inside the last box. All clamps stay `margin` units
// away from box edges.
//
// The persisted fields of `PathFinder` are exactly its serde fields; a
// round trip reproduces search progress.
//
// See also: `world.rs` for the `NavWorld` trait queried here, `nav_box.rs`
// for zones and intervals, `motion.rs` which consumes the waypoint,
// `sim.rs` which drives one `PathFinder` per actor.
//
// **Critical constraint: determinism.** All maps are `BTreeMap`, the queue
// is FIFO, and the only randomness comes from the caller's `GameRng`.

use crate::error::NavError;
use crate::nav_box::{Interval, NavBox, ZoneKey};
use crate::prng::GameRng;
use crate::profile::ActorProfile;
use crate::types::{BoxId, Position, SECTOR_SIZE};
use crate::world::NavWorld;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};

/// Boxes expanded per `search_path()` call.
pub const MAX_EXPANSIONS: usize = 15;

/// Height above the floor at which flyers aim for wander and fallback
/// waypoints.
pub const FLY_WANDER_CLEARANCE: i32 = 384;

const CAN_MOVE_X_POS: u8 = 0x01;
const CAN_MOVE_X_NEG: u8 = 0x02;
const CAN_MOVE_Z_POS: u8 = 0x04;
const CAN_MOVE_Z_NEG: u8 = 0x08;
const CAN_MOVE_ALL: u8 = CAN_MOVE_X_POS | CAN_MOVE_X_NEG | CAN_MOVE_Z_POS | CAN_MOVE_Z_NEG;
const CAN_MOVE_X: u8 = CAN_MOVE_X_POS | CAN_MOVE_X_NEG;
const CAN_MOVE_Z: u8 = CAN_MOVE_Z_POS | CAN_MOVE_Z_NEG;

/// The next point an actor should walk toward.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Waypoint {
    pub position: Position,
    /// True when a complete route to the target box is known, or when the
    /// waypoint is the first half of a two-step detour along such a route.
    pub route_complete: bool,
}

/// One actor's navigation goal and search state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathFinder {
    /// `edges[b]` is the next box from `b` toward the target.
    edges: BTreeMap<BoxId, BoxId>,
    /// Boxes in the actor's zone, candidates for random targets.
    boxes: Vec<BoxId>,
    /// Boxes whose neighbors still need examining.
    expansions: VecDeque<BoxId>,
    reachable: BTreeMap<BoxId, bool>,
    pub cannot_visit_blockable: bool,
    pub cannot_visit_blocked: bool,
    /// Largest climb between boxes.
    pub step: i32,
    /// Largest descent between boxes (non-positive).
    pub drop: i32,
    /// Vertical speed; non-zero means flying.
    pub fly: i32,
    target_box: Option<BoxId>,
    target: Position,
    /// Inset from box edges for every clamp.
    pub margin: i32,
}

impl PathFinder {
    /// A pathfinder with the capabilities of `profile` and no target.
    pub fn new(profile: &ActorProfile, margin: i32) -> Self {
        Self {
            edges: BTreeMap::new(),
            boxes: Vec::new(),
            expansions: VecDeque::new(),
            reachable: BTreeMap::new(),
            cannot_visit_blockable: profile.cannot_visit_blockable,
            cannot_visit_blocked: profile.cannot_visit_blocked,
            step: profile.step,
            drop: profile.drop,
            fly: profile.fly,
            target_box: None,
            target: Position::default(),
            margin,
        }
    }

    pub fn is_flying(&self) -> bool {
        self.fly != 0
    }

    /// Whether this actor may enter the box at all.
    pub fn can_visit(&self, b: &NavBox) -> bool {
        !(self.cannot_visit_blocked && b.blocked) && !(self.cannot_visit_blockable && b.blockable)
    }

    /// This actor's zone column under the given room-swap state.
    pub fn zone_key(&self, rooms_swapped: bool) -> ZoneKey {
        ZoneKey::select(rooms_swapped, self.is_flying(), self.step)
    }

    /// The next box from `b` toward the target, if the search has linked it.
    pub fn get_next_path_box(&self, b: BoxId) -> Option<BoxId> {
        self.edges.get(&b).copied()
    }

    pub fn target_box(&self) -> Option<BoxId> {
        self.target_box
    }

    pub fn target(&self) -> Position {
        self.target
    }

    pub fn boxes(&self) -> &[BoxId] {
        &self.boxes
    }

    pub fn edges(&self) -> &BTreeMap<BoxId, BoxId> {
        &self.edges
    }

    pub fn reachable(&self) -> &BTreeMap<BoxId, bool> {
        &self.reachable
    }

    pub fn expansions(&self) -> &VecDeque<BoxId> {
        &self.expansions
    }

    /// `Some(true)`/`Some(false)` once the search has classified `b`.
    pub fn is_reachable(&self, b: BoxId) -> Option<bool> {
        self.reachable.get(&b).copied()
    }

    /// True while the current episode still has boxes to expand.
    pub fn is_searching(&self) -> bool {
        !self.expansions.is_empty()
    }

    /// Point the search at `b`. Starts a new episode unless `b` already is
    /// the target box.
    pub fn set_target_box(&mut self, b: BoxId) {
        if self.target_box == Some(b) {
            return;
        }
        self.target_box = Some(b);
        self.reset_search();
    }

    /// Set the goal position and its box.
    ///
    /// Panics if `position` is outside `b`.
    pub fn set_target<W: NavWorld + ?Sized>(&mut self, world: &W, position: Position, b: BoxId) {
        assert!(
            world.nav_box(b).contains_xz(position.x, position.z),
            "target {position} is outside target {b}"
        );
        self.target = position;
        self.set_target_box(b);
    }

    /// Throw away search progress and start over from the target box.
    pub fn reset_search(&mut self) {
        self.edges.clear();
        self.reachable.clear();
        self.expansions.clear();
        if let Some(target_box) = self.target_box {
            self.reachable.insert(target_box, true);
            self.expansions.push_back(target_box);
        }
    }

    /// Rebuild the candidate subset: every box sharing `reference`'s zone in
    /// either room-swap state.
    pub fn collect_boxes<W: NavWorld + ?Sized>(&mut self, world: &W, reference: BoxId) {
        let normal = self.zone_key(false);
        let swapped = self.zone_key(true);
        let reference = world.nav_box(reference);
        let normal_zone = reference.zone(normal);
        let swapped_zone = reference.zone(swapped);

        self.boxes.clear();
        self.boxes.extend(
            world
                .boxes()
                .iter()
                .enumerate()
                .filter(|(_, b)| b.zone(normal) == normal_zone || b.zone(swapped) == swapped_zone)
                .map(|(i, _)| BoxId(i as u32)),
        );
    }

    /// Pick a random box from the candidate subset as the new target.
    ///
    /// The draw is rejected (returning `false`, target unchanged) when the
    /// box is outside `current_box`'s zone or not visitable; callers retry on
    /// a later tick.
    pub fn set_random_search_target<W: NavWorld + ?Sized>(
        &mut self,
        world: &W,
        rng: &mut GameRng,
        current_box: BoxId,
    ) -> bool {
        if self.boxes.is_empty() {
            return false;
        }
        let index = rng.rand15_scaled(self.boxes.len() as i32) as usize;
        let candidate = self.boxes[index];

        let key = self.zone_key(world.rooms_swapped());
        let b = world.nav_box(candidate);
        if b.zone(key) != world.nav_box(current_box).zone(key) || !self.can_visit(b) {
            return false;
        }

        let x = scatter(b.x, self.margin, rng);
        let z = scatter(b.z, self.margin, rng);
        let y = if self.is_flying() {
            b.floor - FLY_WANDER_CLEARANCE
        } else {
            b.floor
        };
        self.target = Position::new(x, y, z);
        self.set_target_box(candidate);
        true
    }

    fn set_reachable(&mut self, b: BoxId, reachable: bool) {
        self.reachable.insert(b, reachable);
        if !self.expansions.contains(&b) {
            self.expansions.push_back(b);
        }
    }

    /// Expand up to `MAX_EXPANSIONS` queued boxes. Returns the number of
    /// boxes expanded.
    pub fn search_path<W: NavWorld + ?Sized>(&mut self, world: &W) -> usize {
        let key = self.zone_key(world.rooms_swapped());

        let mut rounds = 0;
        while rounds < MAX_EXPANSIONS {
            let Some(current) = self.expansions.pop_front() else {
                break;
            };
            rounds += 1;

            let current_box = world.nav_box(current);
            let zone = current_box.zone(key);
            let current_reachable = self.is_reachable(current).unwrap_or(false);

            for &successor in &current_box.overlaps {
                if successor == current {
                    continue;
                }
                let successor_box = world.nav_box(successor);
                if successor_box.zone(key) != zone {
                    continue;
                }
                let height_diff = successor_box.floor - current_box.floor;
                if height_diff > self.step || height_diff < self.drop {
                    continue;
                }

                let known = self.is_reachable(successor);
                if !current_reachable {
                    // Unreachable spreads only into undecided boxes.
                    if known.is_none() {
                        self.set_reachable(successor, false);
                    }
                    continue;
                }
                if known == Some(true) {
                    continue;
                }

                let visitable = self.can_visit(successor_box);
                if visitable {
                    assert!(
                        !self.edges.contains_key(&successor),
                        "cycle in pathfinder graph detected"
                    );
                    self.edges.insert(successor, current);
                }
                self.set_reachable(successor, visitable);
            }
        }
        rounds
    }

    /// Advance the search, then derive the next waypoint from `start_pos`
    /// in `start_box` toward the target.
    ///
    /// Panics if no target box is set, if the target is outside the target
    /// box, or if `start_pos` is outside `start_box`.
    pub fn calculate_target<W: NavWorld + ?Sized>(
        &mut self,
        world: &W,
        rng: &mut GameRng,
        start_pos: Position,
        start_box: BoxId,
    ) -> Waypoint {
        let Some(target_box) = self.target_box else {
            panic!("calculate_target called without a target box");
        };
        assert!(
            world.nav_box(target_box).contains_xz(self.target.x, self.target.z),
            "target {} is outside target {target_box}",
            self.target
        );
        assert!(
            world.nav_box(start_box).contains_xz(start_pos.x, start_pos.z),
            "start {start_pos} is outside start {start_box}"
        );
        self.search_path(world);

        let margin = self.margin;
        let mut move_target = start_pos;
        let mut here = start_box;
        let mut x_range = Interval::new(0, 0);
        let mut z_range = Interval::new(0, 0);
        let mut detour = false;
        let mut move_dirs = CAN_MOVE_ALL;

        let done = |position: Position| Waypoint {
            position,
            route_complete: true,
        };

        loop {
            let b = world.nav_box(here);
            let floor = if self.is_flying() {
                b.floor - SECTOR_SIZE
            } else {
                b.floor
            };
            move_target.y = move_target.y.min(floor);

            if b.contains_xz(start_pos.x, start_pos.z) {
                x_range = b.x;
                z_range = b.z;
            } else {
                if start_pos.z < b.z.min {
                    if move_dirs & CAN_MOVE_Z_NEG != 0 && b.x.contains(start_pos.x) {
                        move_target.z = move_target.z.max(b.z.min + margin);
                        if detour {
                            return done(move_target);
                        }
                        x_range = x_range.intersect(b.x);
                        move_dirs = CAN_MOVE_Z_NEG;
                    } else if detour || move_dirs != CAN_MOVE_Z_NEG {
                        move_target.z = z_range.max - margin;
                        if detour || move_dirs != CAN_MOVE_ALL {
                            return done(move_target);
                        }
                        detour = true;
                    }
                } else if start_pos.z > b.z.max {
                    if move_dirs & CAN_MOVE_Z_POS != 0 && b.x.contains(start_pos.x) {
                        move_target.z = move_target.z.min(b.z.max - margin);
                        if detour {
                            return done(move_target);
                        }
                        x_range = x_range.intersect(b.x);
                        move_dirs = CAN_MOVE_Z_POS;
                    } else if detour || move_dirs != CAN_MOVE_Z_POS {
                        move_target.z = z_range.min + margin;
                        if detour || move_dirs != CAN_MOVE_ALL {
                            return done(move_target);
                        }
                        detour = true;
                    }
                }

                if start_pos.x < b.x.min {
                    if move_dirs & CAN_MOVE_X_NEG != 0 && b.z.contains(start_pos.z) {
                        move_target.x = move_target.x.max(b.x.min + margin);
                        if detour {
                            return done(move_target);
                        }
                        z_range = z_range.intersect(b.z);
                        move_dirs = CAN_MOVE_X_NEG;
                    } else if detour || move_dirs != CAN_MOVE_X_NEG {
                        move_target.x = x_range.max - margin;
                        if detour || move_dirs != CAN_MOVE_ALL {
                            return done(move_target);
                        }
                        detour = true;
                    }
                } else if start_pos.x > b.x.max {
                    if move_dirs & CAN_MOVE_X_POS != 0 && b.z.contains(start_pos.z) {
                        move_target.x = move_target.x.min(b.x.max - margin);
                        if detour {
                            return done(move_target);
                        }
                        z_range = z_range.intersect(b.z);
                        move_dirs = CAN_MOVE_X_POS;
                    } else if detour || move_dirs != CAN_MOVE_X_POS {
                        move_target.x = x_range.min + margin;
                        if detour || move_dirs != CAN_MOVE_ALL {
                            return done(move_target);
                        }
                        detour = true;
                    }
                }
            }

            if here == target_box {
                if move_dirs & CAN_MOVE_Z != 0 {
                    move_target.z = self.target.z;
                } else if !detour {
                    move_target.z = b.z.narrowed(margin).clamp(move_target.z);
                }
                if move_dirs & CAN_MOVE_X != 0 {
                    move_target.x = self.target.x;
                } else if !detour {
                    move_target.x = b.x.narrowed(margin).clamp(move_target.x);
                }
                assert!(
                    b.contains_xz(move_target.x, move_target.z),
                    "waypoint {move_target} is outside target {here}"
                );
                move_target.y = self.target.y;
                return done(move_target);
            }

            match self.get_next_path_box(here) {
                Some(next) if self.can_visit(world.nav_box(next)) => here = next,
                _ => break,
            }
        }

        // Chain broken: wander somewhere inside the last box reached.
        let b = world.nav_box(here);
        if move_dirs & CAN_MOVE_Z != 0 {
            move_target.z = scatter(b.z, margin, rng);
        } else if !detour {
            move_target.z = b.z.narrowed(margin).clamp(move_target.z);
        }
        if move_dirs & CAN_MOVE_X != 0 {
            move_target.x = scatter(b.x, margin, rng);
        } else if !detour {
            move_target.x = b.x.narrowed(margin).clamp(move_target.x);
        }
        assert!(
            b.contains_xz(move_target.x, move_target.z),
            "waypoint {move_target} is outside {here}"
        );
        move_target.y = if self.is_flying() {
            b.floor - FLY_WANDER_CLEARANCE
        } else {
            b.floor
        };

        Waypoint {
            position: move_target,
            route_complete: false,
        }
    }

    /// Check that every box this pathfinder refers to exists in a world of
    /// `box_count` boxes.
    pub fn validate_boxes(&self, box_count: usize) -> Result<(), NavError> {
        let known = |b: BoxId| {
            if b.index() < box_count {
                Ok(())
            } else {
                Err(NavError::UnknownBox(b))
            }
        };
        for (&from, &to) in &self.edges {
            known(from)?;
            known(to)?;
        }
        for &b in self.boxes.iter().chain(&self.expansions).chain(self.reachable.keys()) {
            known(b)?;
        }
        if let Some(b) = self.target_box {
            known(b)?;
        }
        Ok(())
    }
}

/// A random coordinate in the margin-inset span of `interval`, or its
/// midpoint when the inset span is empty.
fn scatter(interval: Interval, margin: i32, rng: &mut GameRng) -> i32 {
    let span = interval.size() - 2 * margin;
    if span <= 0 {
        return interval.mid();
    }
    rng.rand15_scaled(span) + interval.min + margin
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nav_box::ZoneSet;
    use crate::types::ZoneId;
    use crate::world::SectorWorld;

    /// `n` boxes in a row along X, each `width` wide, linked to their
    /// neighbors.
    fn chain(n: usize, width: i32) -> SectorWorld {
        let mut boxes: Vec<NavBox> = (0..n as i32)
            .map(|i| {
                NavBox::new(
                    0,
                    Interval::new(i * width, (i + 1) * width - 1),
                    Interval::new(0, width - 1),
                )
            })
            .collect();
        for i in 0..n {
            if i > 0 {
                boxes[i].overlaps.push(BoxId(i as u32 - 1));
            }
            if i + 1 < n {
                boxes[i].overlaps.push(BoxId(i as u32 + 1));
            }
        }
        SectorWorld::from_boxes(boxes, 2048)
    }

    fn walker() -> PathFinder {
        PathFinder::new(&ActorProfile::walker(100, 30, 3), 100)
    }

    fn center(world: &SectorWorld, b: BoxId) -> Position {
        let nb = world.nav_box(b);
        Position::new(nb.x.mid(), nb.floor, nb.z.mid())
    }

    #[test]
    fn set_target_box_starts_episode() {
        let world = chain(3, 1000);
        let mut pf = walker();
        pf.set_target(&world, center(&world, BoxId(2)), BoxId(2));
        assert_eq!(pf.is_reachable(BoxId(2)), Some(true));
        assert_eq!(pf.expansions().iter().copied().collect::<Vec<_>>(), vec![BoxId(2)]);
        assert!(pf.edges().is_empty());

        pf.search_path(&world);
        let progress = pf.clone();
        pf.set_target_box(BoxId(2));
        assert_eq!(pf, progress, "re-targeting the same box must keep progress");

        pf.set_target_box(BoxId(0));
        assert!(pf.edges().is_empty());
        assert_eq!(pf.is_reachable(BoxId(2)), None);
    }

    #[test]
    fn search_grows_outward_from_target() {
        let world = chain(4, 1000);
        let mut pf = walker();
        pf.set_target(&world, center(&world, BoxId(3)), BoxId(3));
        assert_eq!(pf.search_path(&world), 4);
        assert!(!pf.is_searching());
        assert_eq!(pf.get_next_path_box(BoxId(0)), Some(BoxId(1)));
        assert_eq!(pf.get_next_path_box(BoxId(1)), Some(BoxId(2)));
        assert_eq!(pf.get_next_path_box(BoxId(2)), Some(BoxId(3)));
        assert_eq!(pf.get_next_path_box(BoxId(3)), None);
        assert_eq!(pf.search_path(&world), 0);
    }

    #[test]
    fn climb_beyond_step_is_not_linked() {
        let mut world = chain(2, 1000);
        // Box 0 lies 512 below box 1; reaching box 1 would mean climbing 512.
        world.boxes[0].floor = 512;
        let mut pf = walker();
        pf.set_target(&world, center(&world, BoxId(1)), BoxId(1));
        pf.search_path(&world);
        assert_eq!(pf.get_next_path_box(BoxId(0)), None);
        assert_eq!(pf.is_reachable(BoxId(0)), None);

        // A 512 drop from box 0 into box 1 is fine.
        world.boxes[0].floor = -512;
        let mut pf = walker();
        pf.set_target(&world, center(&world, BoxId(1)), BoxId(1));
        pf.search_path(&world);
        assert_eq!(pf.get_next_path_box(BoxId(0)), Some(BoxId(1)));
    }

    #[test]
    fn other_zones_are_not_searched() {
        let mut world = chain(2, 1000);
        world.boxes[0].zones[0] = ZoneSet::uniform(ZoneId(1));
        let mut pf = walker();
        pf.set_target(&world, center(&world, BoxId(1)), BoxId(1));
        pf.search_path(&world);
        assert_eq!(pf.is_reachable(BoxId(0)), None);

        // Same boxes, but the swapped column joins them.
        world.set_rooms_swapped(true);
        pf.reset_search();
        pf.search_path(&world);
        assert_eq!(pf.get_next_path_box(BoxId(0)), Some(BoxId(1)));
    }

    #[test]
    fn blocked_box_spreads_unreachable() {
        let mut world = chain(3, 1000);
        world.boxes[1].blocked = true;
        let mut pf = walker();
        pf.set_target(&world, center(&world, BoxId(2)), BoxId(2));
        assert_eq!(pf.search_path(&world), 3);
        assert_eq!(pf.is_reachable(BoxId(1)), Some(false));
        assert_eq!(pf.is_reachable(BoxId(0)), Some(false));
        assert!(pf.edges().is_empty());

        pf.cannot_visit_blocked = false;
        pf.reset_search();
        pf.search_path(&world);
        assert_eq!(pf.get_next_path_box(BoxId(0)), Some(BoxId(1)));
    }

    #[test]
    fn blockable_policy() {
        let mut world = chain(1, 1000);
        world.boxes[0].blockable = true;
        let mut pf = walker();
        assert!(pf.can_visit(&world.boxes[0]));
        pf.cannot_visit_blockable = true;
        assert!(!pf.can_visit(&world.boxes[0]));
    }

    #[test]
    fn collect_boxes_matches_either_swap_state() {
        let mut world = chain(3, 1000);
        world.boxes[1].zones[0] = ZoneSet::uniform(ZoneId(1));
        world.boxes[2].zones = [ZoneSet::uniform(ZoneId(1)); 2];
        let mut pf = walker();
        pf.collect_boxes(&world, BoxId(0));
        assert_eq!(pf.boxes(), &[BoxId(0), BoxId(1)]);
    }

    #[test]
    fn random_search_target_lands_inside_inset_box() {
        let world = chain(1, 1000);
        let mut pf = walker();
        pf.collect_boxes(&world, BoxId(0));
        let mut rng = GameRng::new(5);
        for _ in 0..200 {
            assert!(pf.set_random_search_target(&world, &mut rng, BoxId(0)));
            let t = pf.target();
            assert!((100..=899).contains(&t.x), "x {}", t.x);
            assert!((100..=899).contains(&t.z), "z {}", t.z);
            assert_eq!(t.y, 0);
            assert_eq!(pf.target_box(), Some(BoxId(0)));
        }
    }

    #[test]
    fn random_search_target_skips_unvisitable_boxes() {
        let mut world = chain(2, 1000);
        world.boxes[1].blocked = true;
        let mut pf = walker();
        pf.collect_boxes(&world, BoxId(0));
        let mut rng = GameRng::new(77);
        let mut accepted = 0;
        for _ in 0..100 {
            if pf.set_random_search_target(&world, &mut rng, BoxId(0)) {
                accepted += 1;
            }
            assert_ne!(pf.target_box(), Some(BoxId(1)));
        }
        assert!(accepted > 0);
    }

    #[test]
    fn flyer_wanders_above_the_floor() {
        let world = chain(1, 1000);
        let mut pf = PathFinder::new(&ActorProfile::flyer(100, 16, 20), 100);
        pf.collect_boxes(&world, BoxId(0));
        let mut rng = GameRng::new(9);
        assert!(pf.set_random_search_target(&world, &mut rng, BoxId(0)));
        assert_eq!(pf.target().y, -FLY_WANDER_CLEARANCE);
    }

    #[test]
    fn scatter_collapses_on_narrow_interval() {
        let mut rng = GameRng::new(1);
        assert_eq!(scatter(Interval::new(0, 150), 100, &mut rng), 75);
    }

    #[test]
    fn target_box_itself_completes_route() {
        let world = chain(1, 1000);
        let mut pf = walker();
        let goal = Position::new(800, 0, 300);
        pf.set_target(&world, goal, BoxId(0));
        let mut rng = GameRng::new(3);
        let wp = pf.calculate_target(&world, &mut rng, Position::new(200, 0, 200), BoxId(0));
        assert!(wp.route_complete);
        assert_eq!(wp.position, goal);
    }

    #[test]
    #[should_panic(expected = "outside start")]
    fn start_outside_start_box_panics() {
        let world = chain(2, 1000);
        let mut pf = walker();
        pf.set_target(&world, center(&world, BoxId(1)), BoxId(1));
        let mut rng = GameRng::new(3);
        pf.calculate_target(&world, &mut rng, Position::new(1500, 0, 500), BoxId(0));
    }

    #[test]
    #[should_panic(expected = "outside target")]
    fn target_outside_target_box_panics() {
        let world = chain(2, 1000);
        let mut pf = walker();
        pf.set_target(&world, center(&world, BoxId(0)), BoxId(1));
    }

    #[test]
    #[should_panic(expected = "without a target box")]
    fn calculate_target_needs_a_target() {
        let world = chain(1, 1000);
        let mut pf = walker();
        let mut rng = GameRng::new(3);
        pf.calculate_target(&world, &mut rng, Position::new(500, 0, 500), BoxId(0));
    }

    #[test]
    fn validate_boxes_catches_dangling_ids() {
        let world = chain(3, 1000);
        let mut pf = walker();
        pf.set_target(&world, center(&world, BoxId(2)), BoxId(2));
        pf.search_path(&world);
        assert!(pf.validate_boxes(3).is_ok());
        assert!(matches!(pf.validate_boxes(2), Err(NavError::UnknownBox(BoxId(2)))));
    }
}
