//! Shared integration steps applied by the chassis variants.
//!
//! Every function here is a transform of [`Movement`] driven by the brain's
//! [`DesiredMovement`] and the chassis limits. Nothing in this module looks
//! at terrain.

use glam::{Vec2, Vec3};

use crate::actor::Movement;
use crate::chassis::Chassis;
use crate::constants::{
    FRICTION_BASE, HEADING_SNAP_EPSILON, MAX_FRAME_SECONDS, ORBIT_SPEED_THRESHOLD,
    SPEED_CLAMP_BLEND_RATE,
};
use crate::intent::DesiredMovement;
use crate::vector_math::{normalize_angle, normalize_or, z_rotation_from_direction};

/// Fraction of velocity kept after `dt` seconds at `friction`.
///
/// `friction` runs from 0 (no decay) to 1 (everything gone). In between the
/// decay is `k^dt` with `k = 1e-10^friction`, so friction 1.0 would leave 10%
/// of the speed after a tenth of a second.
///
/// # Examples
///
/// ```
/// use lille_motion::chassis::friction_decay;
/// assert_eq!(friction_decay(0.5, 0.0), 1.0);
/// assert_eq!(friction_decay(1.0, 0.1), 0.0);
/// assert!(friction_decay(0.2, 0.1) > friction_decay(0.4, 0.1));
/// ```
#[must_use]
pub fn friction_decay(friction: f32, dt: f32) -> f32 {
    if dt <= 0.0 || friction.is_nan() || friction <= 0.0 {
        return 1.0;
    }
    if friction >= 1.0 {
        return 0.0;
    }
    FRICTION_BASE.powf(friction).powf(dt)
}

fn signum_or_zero(value: f32) -> f32 {
    if value == 0.0 {
        0.0
    } else {
        value.signum()
    }
}

/// Applies horizontal intent for hovering chassis.
///
/// A direction request accelerates along the facing (unless a rotation is
/// also requested or the chassis has no facing); a target request steers
/// toward the target, braking inside the stopping distance and cancelling
/// sideways drift so the actor does not orbit. With auto-turn set and no
/// rotation request the heading is turned toward the direction of travel.
/// Finally horizontal speed over the limit is blended back toward it.
pub fn apply_desired_velocity_for_hover(
    movement: &mut Movement,
    desired: &mut DesiredMovement,
    chassis: &Chassis,
    dt: f32,
) {
    debug_assert!(dt <= MAX_FRAME_SECONDS, "frame of {dt}s is too long for the speed blend");

    if desired.coasting_horizontally() {
        return;
    }

    let accel = desired.max_linear_acceleration;
    let mut velocity = movement.velocity;
    let mut desired_facing = movement.facing();

    if let Some(direction) = desired.desired_velocity {
        if desired.desired_rotation_angle.is_some() || !chassis.has_facing_direction {
            velocity += direction * accel * dt;
        } else {
            let facing = movement.facing();
            velocity += direction.dot(facing) * facing * accel * dt;
        }
        desired_facing = direction;
    }

    if let Some(target) = desired.desired_target_location {
        let offset = target - movement.position;
        let distance = Vec2::new(offset.x, offset.y).length();
        let to_target = if distance > 0.0 {
            Vec3::new(offset.x / distance, offset.y / distance, 0.0)
        } else {
            Vec3::ZERO
        };
        desired_facing = to_target;
        velocity = steer_toward(velocity, to_target, distance, desired.max_speed, accel, dt);
    }

    let rotation_requested =
        desired.desired_rotation_angle.is_some() || desired.desired_rotation_rate.is_some();
    if desired.auto_turn && !rotation_requested {
        let facing = normalize_or(
            Vec3::new(desired_facing.x, desired_facing.y, 0.0),
            movement.facing(),
        );
        let heading = z_rotation_from_direction(facing);
        if normalize_angle(heading - movement.rotation_z).abs() < HEADING_SNAP_EPSILON {
            movement.rotation_z_rate = 0.0;
        } else {
            desired.set_desired_rotation_angle(
                heading,
                chassis.calc_turn_speed(),
                chassis.calc_turn_acceleration(),
            );
        }
    }

    let horizontal = Vec2::new(velocity.x, velocity.y);
    let speed = horizontal.length();
    if speed > desired.max_speed {
        let clamped = horizontal * (desired.max_speed / speed);
        let blended = horizontal.lerp(clamped, dt * SPEED_CLAMP_BLEND_RATE);
        velocity.x = blended.x;
        velocity.y = blended.y;
    }

    movement.velocity = velocity;
}

fn steer_toward(
    velocity: Vec3,
    to_target: Vec3,
    distance: f32,
    max_speed: f32,
    accel: f32,
    dt: f32,
) -> Vec3 {
    let speed = velocity.length();
    let stopping_distance = if accel > 0.0 {
        0.5 * speed * speed / accel
    } else {
        f32::INFINITY
    };
    let max_delta = accel * dt;

    if distance <= stopping_distance {
        return if speed > max_delta {
            velocity * ((speed - max_delta) / speed)
        } else {
            Vec3::ZERO
        };
    }

    if speed <= ORBIT_SPEED_THRESHOLD {
        return velocity + to_target * max_delta;
    }

    // Cancel drift across the line to the target before pushing along it.
    let right = to_target.cross(Vec3::Z);
    let speed_right = right.dot(velocity);
    let fraction = if max_delta > 0.0 {
        (speed_right.abs() / max_delta).min(1.0)
    } else {
        0.0
    };
    let mut steered = velocity - signum_or_zero(speed_right) * fraction * right * max_delta;
    steered += to_target * max_delta;

    let steered_speed = steered.length();
    if steered_speed > max_speed && steered_speed > 0.0 {
        steered *= max_speed / steered_speed;
    }
    steered
}

/// Applies heading intent.
///
/// A heading request turns along the shortest signed arc, braking once the
/// remaining angle is within stopping range and otherwise accelerating by at
/// most half the remaining angle per frame. A rate request spins toward the
/// requested rate. With no request the turn rate decays to zero. The rate is
/// always clamped before the heading is integrated once.
pub fn apply_desired_rotation(
    movement: &mut Movement,
    desired: &DesiredMovement,
    chassis: &Chassis,
    dt: f32,
) {
    let mut rate = movement.rotation_z_rate;
    let accel = desired.max_rotational_acceleration;

    if desired.desired_rotation_angle.is_some() || desired.desired_rotation_rate.is_some() {
        if let Some(target) = desired.desired_rotation_angle {
            let delta = normalize_angle(target - movement.rotation_z);
            if accel > 0.0 {
                let radians_to_stop = rate * rate / accel;
                if radians_to_stop >= delta.abs() {
                    let step = accel * dt;
                    if step >= rate.abs() {
                        rate = 0.0;
                    } else {
                        rate -= signum_or_zero(rate) * step;
                    }
                } else {
                    let step = (accel * dt).min(delta.abs() / 2.0);
                    rate += signum_or_zero(delta) * step;
                }
            }
        }
        if let Some(target_rate) = desired.desired_rotation_rate {
            let step = accel * dt;
            rate = if target_rate > rate {
                (rate + step).min(target_rate)
            } else {
                (rate - step).max(target_rate)
            };
        }
    } else {
        let step = chassis.calc_turn_acceleration() * dt;
        rate = if rate > 0.0 {
            (rate - step).max(0.0)
        } else {
            (rate + step).min(0.0)
        };
    }

    let limit = desired.max_rotation_rate.abs();
    rate = rate.clamp(-limit, limit);
    movement.rotation_z_rate = rate;
    movement.rotation_z += rate * dt;
}

/// Applies vertical intent for flying chassis.
///
/// A vertical speed request accelerates in its sign's direction; an altitude
/// request accelerates toward the altitude and brakes inside the stopping
/// distance.
pub fn apply_desired_vertical_movement(movement: &mut Movement, desired: &DesiredMovement, dt: f32) {
    if desired.coasting_vertically() {
        return;
    }
    let accel = desired.max_vertical_acceleration;
    let mut vz = movement.velocity.z;

    if let Some(speed) = desired.desired_vertical_speed {
        vz += signum_or_zero(speed) * accel * dt;
    }

    if let Some(altitude) = desired.desired_altitude {
        let delta = altitude - movement.altitude();
        let stopping_distance = if accel > 0.0 {
            0.5 * vz * vz / accel
        } else {
            f32::INFINITY
        };
        if delta.abs() > stopping_distance {
            vz += signum_or_zero(delta) * accel * dt;
        } else {
            let step = accel * dt;
            vz = if vz.abs() > step {
                vz * ((vz.abs() - step) / vz.abs())
            } else {
                0.0
            };
        }
    }

    if desired.max_vertical_speed > 0.0 {
        vz = vz.clamp(-desired.max_vertical_speed, desired.max_vertical_speed);
    }
    movement.velocity.z = vz;
}

/// Applies ground friction.
///
/// While coasting horizontally, travel across the facing decays faster than
/// travel along it, and backward travel decays fastest. Chassis without a
/// facing use the direction of travel. When the brain is driving and
/// `apply_vertical` is off, friction only bites over the speed limit.
/// Vertical coasting decays the vertical speed when `apply_vertical` is on.
pub fn apply_friction(
    movement: &mut Movement,
    desired: &DesiredMovement,
    has_facing: bool,
    friction: f32,
    dt: f32,
    apply_vertical: bool,
) {
    if friction <= 0.0 {
        return;
    }
    let damping = friction_decay(friction, dt);
    let mut velocity = movement.velocity;

    if desired.coasting_horizontally() {
        velocity.x *= damping;
        velocity.y *= damping;

        let facing = if has_facing {
            movement.facing()
        } else {
            normalize_or(Vec3::new(velocity.x, velocity.y, 0.0), Vec3::ZERO)
        };
        let right = Vec3::new(facing.y, -facing.x, 0.0);
        let along = velocity.dot(facing);
        let across = velocity.dot(right);
        let damping_sq = damping * damping;

        let forward_scale = if along < 0.0 { damping_sq } else { 1.0 };
        let horizontal = along * forward_scale * facing + across * damping_sq * right;
        velocity.x = horizontal.x;
        velocity.y = horizontal.y;
    } else if !apply_vertical
        && desired.max_speed > 0.0
        && movement.speed() > desired.max_speed
    {
        velocity.x *= damping;
        velocity.y *= damping;
    }

    if apply_vertical && desired.coasting_vertically() {
        velocity.z *= damping;
    }
    movement.velocity = velocity;
}
