// One tick of creature movement.
//
// `animate_creature()` advances an actor along its heading and then makes
// the result legal:
//
// 1. If the move left the actor's box for one it cannot enter (no box, too
//    high a climb, too deep a drop, another zone), the actor is pushed back
//    to the edge of the sector it came from, `collision_radius` inside.
// 2. Within the sector, any edge closer than `collision_radius` that
//    borders forbidden space shoves the actor back toward the sector
//    interior. Single-axis corrections win; a pure corner case is settled
//    by the axis the actor is facing.
// 3. If another actor processed earlier this tick is active, moving and
//    within reach, the whole move is undone.
// 4. Vertical motion: flyers climb or dive toward the waypoint at their
//    fly speed, bounded by floor and ceiling; walkers ease down onto their
//    floor at most `max_fall_per_tick` per tick and snap up instantly.
//
// A move that ends outside every box, or an actor that was deactivated from
// outside, takes the terminal path: position restored, actor dead and not
// collidable, AI state discarded.
//
// `rotate_towards_target()` is the steering half: it turns the actor toward
// its waypoint by at most the turn rate for this tick.
//
// See also: `pathfinder.rs` for the waypoint and the visit policy,
// `creature.rs` for the state being mutated, `sim.rs` for the per-tick
// driver.
//
// **Critical constraint: determinism.** Only integer positions are
// stored; the single floating-point step (projecting speed onto the
// heading) is rounded immediately.

use crate::config::NavConfig;
use crate::creature::{ActorState, Creature, CreatureBrain};
use crate::pathfinder::PathFinder;
use crate::profile::CapabilityProvider;
use crate::types::{Angle, Axis, Position, SECTOR_SIZE};
use crate::world::NavWorld;
use serde::{Deserialize, Serialize};

/// Result of one `animate_creature()` call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MotionOutcome {
    Moved,
    /// Another actor was in the way; the actor did not move this tick.
    Blocked,
    /// The actor took the terminal path and lost its AI state.
    Deactivated,
}

/// Turn toward the waypoint by at most `max_turn`. Returns the turn applied.
///
/// A target behind the actor and closer than its turning circle halves the
/// turn rate so the actor swings wide instead of orbiting.
pub fn rotate_towards_target(actor: &mut Creature, max_turn: Angle) -> Angle {
    let Some(brain) = actor.brain.as_ref() else {
        return Angle::ZERO;
    };
    if actor.speed == 0 || max_turn.0 == 0 {
        return Angle::ZERO;
    }

    let target = brain.waypoint.position;
    let dx = target.x - actor.position.x;
    let dz = target.z - actor.position.z;
    let turn = Angle::from_atan(dx, dz) - actor.rotation.yaw;

    let mut max_turn = Angle(max_turn.0.saturating_abs());
    let quarter = Angle::from_degrees(90).0;
    if turn.0 < -quarter || turn.0 > quarter {
        let turning_radius = actor.speed as i64 * quarter as i64 / max_turn.0 as i64;
        let dist_sq = dx as i64 * dx as i64 + dz as i64 * dz as i64;
        if dist_sq < turning_radius * turning_radius {
            max_turn = Angle(max_turn.0 / 2);
        }
    }

    let turn = turn.clamp_abs(max_turn);
    actor.rotation.yaw += turn;
    turn
}

/// Whether an actor standing on `current_floor` must not move to `pos`.
pub fn is_position_out_of_reach<W: NavWorld + ?Sized>(
    world: &W,
    path_finder: &PathFinder,
    pos: Position,
    current_floor: i32,
    next_floor: i32,
) -> bool {
    let Some(box_id) = world.box_at(pos) else {
        return true;
    };
    let b = world.nav_box(box_id);
    if !path_finder.can_visit(b) {
        return true;
    }

    let step_height = current_floor - b.floor;
    if step_height > path_finder.step || step_height < path_finder.drop {
        return true;
    }
    if step_height < -path_finder.step && b.floor > next_floor {
        return true;
    }

    path_finder.is_flying() && pos.y > path_finder.fly + b.floor
}

/// Whether an active, moving actor among `others` is within `actor`'s
/// collision radius.
pub fn any_moving_enabled_object_in_reach<'a>(
    actor: &Creature,
    others: impl IntoIterator<Item = &'a Creature>,
) -> bool {
    let r = actor.collision_radius as i64;
    others.into_iter().any(|other| {
        other.id != actor.id
            && other.state == ActorState::Active
            && other.speed != 0
            && other.position.distance_squared(actor.position) < r * r
    })
}

/// Move the actor `speed` units along its yaw.
fn advance(actor: &mut Creature) {
    let yaw = actor.rotation.yaw;
    let speed = actor.speed as f64;
    actor.position.x += (yaw.sin() * speed).round() as i32;
    actor.position.z += (yaw.cos() * speed).round() as i32;
}

/// Integrate one tick of movement for `actor`.
///
/// `earlier` are the actors already processed this tick; only they can
/// block this one. When the actor is shoved off a wall, `angle` is added to
/// the yaw and the roll eases toward `tilt`.
pub fn animate_creature<'a, W: NavWorld + ?Sized>(
    world: &W,
    config: &NavConfig,
    actor: &mut Creature,
    earlier: impl IntoIterator<Item = &'a Creature>,
    angle: Angle,
    tilt: Angle,
) -> MotionOutcome {
    let Some(brain) = actor.brain.take() else {
        return if actor.state == ActorState::Deactivated {
            MotionOutcome::Deactivated
        } else {
            MotionOutcome::Blocked
        };
    };

    let outcome = integrate(world, config, actor, &brain, earlier, angle, tilt);
    if outcome == MotionOutcome::Deactivated {
        actor.tear_down();
    } else {
        actor.brain = Some(brain);
    }
    outcome
}

fn integrate<'a, W: NavWorld + ?Sized>(
    world: &W,
    config: &NavConfig,
    actor: &mut Creature,
    brain: &CreatureBrain,
    earlier: impl IntoIterator<Item = &'a Creature>,
    angle: Angle,
    tilt: Angle,
) -> MotionOutcome {
    let pf = &brain.path_finder;
    let old = actor.position;
    let start_box = world.box_at(old);

    advance(actor);

    if actor.state == ActorState::Deactivated {
        if world.box_at(actor.position).is_none() {
            actor.position = old;
        }
        return MotionOutcome::Deactivated;
    }
    let Some(start_box) = start_box else {
        actor.position = old;
        return MotionOutcome::Deactivated;
    };

    let key = pf.zone_key(world.rooms_swapped());
    let start = world.nav_box(start_box);
    let start_zone = start.zone(key);

    // Left the box for somewhere forbidden: back to the old sector's edge.
    let leaves_box = world.box_at(actor.position).is_none_or(|b| {
        let b = world.nav_box(b);
        let height_diff = start.floor - b.floor;
        height_diff > pf.step || height_diff < pf.drop || b.zone(key) != start_zone
    });
    if leaves_box {
        let r = actor.collision_radius;
        let sector_start = |l: i32| l.div_euclid(SECTOR_SIZE) * SECTOR_SIZE;
        let shove_min = |l: i32| sector_start(l) + r;
        let shove_max = |l: i32| sector_start(l) + SECTOR_SIZE - 1 - r;

        let pos = &mut actor.position;
        if pos.sector_x() < old.sector_x() {
            pos.x = shove_min(old.x);
        } else if pos.sector_x() > old.sector_x() {
            pos.x = shove_max(old.x);
        }
        if pos.sector_z() < old.sector_z() {
            pos.z = shove_min(old.z);
        } else if pos.sector_z() > old.sector_z() {
            pos.z = shove_max(old.z);
        }
    }
    let Some(sector_box) = world.box_at(actor.position) else {
        actor.position = old;
        return MotionOutcome::Deactivated;
    };

    // Keep the collision radius clear of forbidden neighbors.
    let floor = world.nav_box(sector_box).floor;
    let next_floor = pf
        .get_next_path_box(sector_box)
        .map_or(floor, |next| world.nav_box(next).floor);
    let cannot_move_to =
        |pos: Position| is_position_out_of_reach(world, pf, pos, floor, next_floor);

    let base = actor.position;
    let r = actor.collision_radius;
    let edge = |in_sector: i32| {
        if in_sector < r {
            Some((true, r - in_sector))
        } else if in_sector > SECTOR_SIZE - r {
            Some((false, SECTOR_SIZE - r - in_sector))
        } else {
            None
        }
    };
    let reach = |negative: bool| if negative { -r } else { r };
    let x_edge = edge(base.x.rem_euclid(SECTOR_SIZE));
    let z_edge = edge(base.z.rem_euclid(SECTOR_SIZE));

    let (mut move_x, mut move_z) = (0, 0);
    if let Some((z_neg, z_limit)) = z_edge {
        let z_probe = base.moved(0, 0, reach(z_neg));
        if cannot_move_to(z_probe) {
            move_z = z_limit;
        }
        if let Some((x_neg, x_limit)) = x_edge {
            if cannot_move_to(base.moved(reach(x_neg), 0, 0)) {
                move_x = x_limit;
            } else if move_z == 0 && cannot_move_to(z_probe.moved(reach(x_neg), 0, 0)) {
                if corner_prefers_x(actor.rotation.yaw.axis(), x_neg, z_neg) {
                    move_x = x_limit;
                } else {
                    move_z = z_limit;
                }
            }
        }
    } else if let Some((x_neg, x_limit)) = x_edge {
        if cannot_move_to(base.moved(reach(x_neg), 0, 0)) {
            move_x = x_limit;
        }
    }

    actor.position = actor.position.moved(move_x, 0, move_z);
    if move_x != 0 || move_z != 0 {
        actor.rotation.yaw += angle;
        ease_roll(actor, config, tilt);
    }

    if any_moving_enabled_object_in_reach(actor, earlier) {
        actor.position = old;
        return MotionOutcome::Blocked;
    }

    if pf.is_flying() {
        fly(world, config, actor, pf, brain.waypoint.position, old)
    } else {
        walk(world, config, actor, old)
    }
}

/// Which axis to correct when only the diagonal corner probe is blocked.
fn corner_prefers_x(facing: Axis, x_neg: bool, z_neg: bool) -> bool {
    match (x_neg, z_neg) {
        (true, _) => matches!(facing, Axis::NegZ | Axis::PosX),
        (false, true) => matches!(facing, Axis::NegZ | Axis::NegX),
        (false, false) => matches!(facing, Axis::PosZ | Axis::NegX),
    }
}

fn ease_roll(actor: &mut Creature, config: &NavConfig, tilt: Angle) {
    let target = (tilt.0 as i32 * config.tilt_gain).clamp(i16::MIN as i32, i16::MAX as i32);
    let step = Angle::from_degrees(config.max_tilt_step_degrees).0 as i32;
    let roll = actor.rotation.roll.0 as i32;
    let delta = (target - roll).clamp(-step, step);
    actor.rotation.roll = Angle((roll + delta) as i16);
}

fn fly<W: NavWorld + ?Sized>(
    world: &W,
    config: &NavConfig,
    actor: &mut Creature,
    pf: &PathFinder,
    waypoint: Position,
    old: Position,
) -> MotionOutcome {
    let (Some(floor), Some(ceiling)) =
        (world.floor_at(actor.position), world.ceiling_at(actor.position))
    else {
        actor.position = old;
        return MotionOutcome::Deactivated;
    };

    let mut move_y = (waypoint.y - actor.position.y).clamp(-pf.fly, pf.fly);
    let pos = &mut actor.position;
    if pos.y + move_y > floor {
        if pos.y > floor {
            // Already under the floor: back out and climb.
            pos.x = old.x;
            pos.z = old.z;
            move_y = -pf.fly;
        } else {
            pos.y = floor;
            move_y = 0;
        }
    } else {
        let ignores_ceiling = config
            .profile(actor.kind)
            .is_some_and(|p| p.ignores_ceiling_clearance);
        let head = if ignores_ceiling { 0 } else { actor.height };
        if pos.y - head + move_y < ceiling {
            if pos.y - head < ceiling {
                pos.x = old.x;
                pos.z = old.z;
                move_y = pf.fly;
            } else {
                move_y = 0;
            }
        }
    }
    pos.y += move_y;

    if world.box_at(actor.position).is_none() {
        actor.position = old;
        return MotionOutcome::Deactivated;
    }
    if let Some(floor) = world.floor_at(actor.position) {
        actor.floor = floor;
    }

    let target_pitch = if actor.speed != 0 {
        Angle::from_atan(-move_y, actor.speed)
    } else {
        Angle::ZERO
    };
    let step = Angle::from_degrees(config.pitch_step_degrees).0 as i32;
    let pitch = actor.rotation.pitch.0 as i32;
    let target = target_pitch.0 as i32;
    actor.rotation.pitch = if target < pitch - step {
        Angle((pitch - step) as i16)
    } else if target > pitch + step {
        Angle((pitch + step) as i16)
    } else {
        target_pitch
    };

    MotionOutcome::Moved
}

fn walk<W: NavWorld + ?Sized>(
    world: &W,
    config: &NavConfig,
    actor: &mut Creature,
    old: Position,
) -> MotionOutcome {
    let floor = actor.floor;
    let pos = &mut actor.position;
    if pos.y > floor {
        pos.y = floor;
    } else if floor - pos.y > config.max_fall_per_tick {
        pos.y += config.max_fall_per_tick;
    } else if pos.y < floor {
        pos.y = floor;
    }
    actor.rotation.pitch = Angle::ZERO;

    if world.box_at(actor.position).is_none() {
        actor.position = old;
        return MotionOutcome::Deactivated;
    }
    if let Some(floor) = world.floor_at(actor.position) {
        actor.floor = floor;
    }
    MotionOutcome::Moved
}
