//! Per-variant chassis behaviour.
//!
//! Each [`ChassisVariant`] maps to one static [`VariantBehaviour`] row: a few
//! capability flags plus the hooks the pipeline calls before and after
//! collision testing, and the response to hitting the ground from above.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::actor::{Actor, ActorState};
use crate::chassis::kinematics::{
    apply_desired_rotation, apply_desired_velocity_for_hover, apply_desired_vertical_movement,
    apply_friction, friction_decay,
};
use crate::collision::{
    collide_with_ground, max_feeler_altitude, terrain_altitude_and_normal_from_feelers,
};
use crate::constants::{
    DEFAULT_MASS, DOUBLE_JUMP_APEX_SPEED, DOUBLE_JUMP_BOOST, FLOAT_DEPTH, HOVER_FALL_THRESHOLD,
    HOVER_GROUND_DAMPING, HOVER_LIFT_MULTIPLIER, MIN_MASS, PROP_BURIED_LIMIT,
    PROP_GROUND_FRICTION, PROP_GROUND_SLACK, PROP_REST_LIFT, SAUCER_CRUISE_RATE,
    SAUCER_SLOPE_PUSH, SETTLE_FRAMES, SETTLE_SPEED_SQ, SLOPE_MIN_SPEED, TUMBLE_XY_BLEND,
    WATER_DRAG_RATE,
};
use crate::terrain::TerrainOracle;
use crate::time::FrameTime;
use crate::vector_math::{horizontal_length, lerp, reflect};

/// Per-frame hook run before or after collision testing.
pub type UpdateHook = fn(&mut Actor, &dyn TerrainOracle, &FrameTime);

/// Response to hitting the ground from above: terrain height, ground
/// normal and frame length.
pub type BounceHook = fn(&mut Actor, &dyn TerrainOracle, f32, Vec3, f32);

/// Movement profile families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChassisVariant {
    /// Hovers at its edit height above the floor; can jump.
    #[default]
    Hover,
    /// Flies at a cruising altitude with no facing direction.
    Saucer,
    /// Falls, floats and bounces under gravity.
    DynamicProp,
}

/// Capability flags and hooks for one chassis variant.
#[derive(Debug)]
pub struct VariantBehaviour {
    /// Can move sideways relative to its facing.
    pub supports_strafing: bool,
    /// Has a front.
    pub has_facing_direction: bool,
    /// Only reports terrain and water actually touched.
    pub terrain_on_contact: bool,
    /// Integration before collision testing.
    pub pre_collision: UpdateHook,
    /// Vertical response after collision testing.
    pub post_collision: UpdateHook,
    /// Response to hitting the ground from above.
    pub bounce_off_ground: BounceHook,
}

static HOVER: VariantBehaviour = VariantBehaviour {
    supports_strafing: true,
    has_facing_direction: true,
    terrain_on_contact: false,
    pre_collision: hover_pre_collision,
    post_collision: no_post_collision,
    bounce_off_ground: bounce_vertical,
};

static SAUCER: VariantBehaviour = VariantBehaviour {
    supports_strafing: true,
    has_facing_direction: false,
    terrain_on_contact: false,
    pre_collision: saucer_pre_collision,
    post_collision: saucer_post_collision,
    bounce_off_ground: saucer_bounce,
};

static DYNAMIC_PROP: VariantBehaviour = VariantBehaviour {
    supports_strafing: false,
    has_facing_direction: true,
    terrain_on_contact: true,
    pre_collision: prop_pre_collision,
    post_collision: prop_post_collision,
    bounce_off_ground: prop_bounce,
};

impl ChassisVariant {
    /// The behaviour row for this variant.
    #[must_use]
    pub fn behaviour(self) -> &'static VariantBehaviour {
        match self {
            Self::Hover => &HOVER,
            Self::Saucer => &SAUCER,
            Self::DynamicProp => &DYNAMIC_PROP,
        }
    }
}

/// Runs the variant's integration step; called before collision testing.
pub fn pre_collision_test_update(actor: &mut Actor, oracle: &dyn TerrainOracle, time: &FrameTime) {
    (actor.chassis.behaviour().pre_collision)(actor, oracle, time);
}

/// Runs the variant's vertical response; called after collision testing.
/// Never moves the actor horizontally.
pub fn post_collision_test_update(actor: &mut Actor, oracle: &dyn TerrainOracle, time: &FrameTime) {
    (actor.chassis.behaviour().post_collision)(actor, oracle, time);
}

fn no_post_collision(_actor: &mut Actor, _oracle: &dyn TerrainOracle, _time: &FrameTime) {}

fn apply_external_force(actor: &mut Actor, dt: f32) {
    let Some(force) = actor.desired.external_force else {
        return;
    };
    let mass = if actor.body.mass > MIN_MASS {
        actor.body.mass
    } else {
        DEFAULT_MASS
    };
    actor.movement.velocity += force / mass * dt;
}

fn top_of(actor: &Actor, position: Vec3) -> Vec3 {
    Vec3::new(position.x, position.y, position.z + actor.body.top_offset)
}

/// Default ground response: flips a falling actor's vertical speed.
fn bounce_vertical(actor: &mut Actor, _oracle: &dyn TerrainOracle, _height: f32, _normal: Vec3, _dt: f32) {
    if actor.movement.altitude() <= 0.0 {
        return;
    }
    let velocity = &mut actor.movement.velocity;
    if velocity.z < 0.0 {
        velocity.z = -velocity.z * actor.body.restitution;
    }
}

// Hover ----------------------------------------------------------------------

fn can_jump(actor: &Actor, now: f64) -> bool {
    let rate = actor.chassis.limits.jump_rate;
    rate > 0.0 && now - actor.chassis.jump.last_jump_time >= 1.0 / f64::from(rate)
}

fn hover_pre_collision(actor: &mut Actor, oracle: &dyn TerrainOracle, time: &FrameTime) {
    if actor.held {
        return;
    }
    let dt = time.dt;
    let now = time.total_seconds;

    if actor.state == ActorState::Active {
        if actor.chassis.allow_brain_movement {
            apply_desired_velocity_for_hover(&mut actor.movement, &mut actor.desired, &actor.chassis, dt);
            apply_desired_rotation(&mut actor.movement, &actor.desired, &actor.chassis, dt);
        }
        apply_external_force(actor, dt);
        apply_friction(
            &mut actor.movement,
            &actor.desired,
            actor.chassis.has_facing_direction,
            actor.body.friction,
            dt,
            false,
        );

        let mut velocity = actor.movement.velocity;
        actor.movement.position.x += velocity.x * dt;
        actor.movement.position.y += velocity.y * dt;

        let may_jump = can_jump(actor, now);
        let jump = &mut actor.chassis.jump;
        if jump.jump && may_jump {
            if jump.landing && !jump.double_jumping {
                if velocity.z.abs() < DOUBLE_JUMP_APEX_SPEED {
                    jump.double_jumping = true;
                    velocity.z += DOUBLE_JUMP_BOOST * jump.effective_jump_strength;
                }
            } else if !jump.landing && !jump.jumping {
                jump.start_jump_animation = true;
                jump.jumping = true;
                jump.jump_start_time = now;
            }
        }
        jump.jump = false;

        if jump.jumping && now > jump.jump_start_time + f64::from(actor.chassis.limits.pre_jump_delay) {
            velocity.z += jump.effective_jump_strength;
            jump.jumping = false;
            jump.landing = true;
            jump.last_jump_time = now;
        }
        actor.movement.velocity = velocity;
        actor.chassis.moving = horizontal_length(velocity) > 0.0;
    }

    hover_lift(actor, oracle, dt);
}

/// Balances gravity against lift toward the edit height above the floor.
fn hover_lift(actor: &mut Actor, oracle: &dyn TerrainOracle, dt: f32) {
    let prev_position = actor.movement.prev_position;
    let mut position = actor.movement.position;
    let mut velocity = actor.movement.velocity;
    let gravity = actor.chassis.limits.gravity;

    let water = oracle.water_base(prev_position);
    let (terrain, terrain_normal) = terrain_altitude_and_normal_from_feelers(actor, oracle);
    let goal = actor.body.edit_height();

    let over_water = actor.body.stay_above_water && water > terrain;
    let surface = if over_water { water } else { terrain };
    let floor = (surface != 0.0 && position.z - actor.body.min_height >= HOVER_FALL_THRESHOLD)
        .then_some(surface);
    let current = floor.map(|f| position.z - f);

    let jump = &mut actor.chassis.jump;
    if jump.landing {
        let pre_land = actor.chassis.limits.pre_land_delay;
        if current.is_some_and(|h| h + velocity.z * pre_land < goal) {
            jump.start_land_animation = true;
            jump.landing = false;
            jump.double_jumping = false;
        }
    }

    let lift = match current {
        Some(h) => {
            let ratio = goal / h;
            let balance = if ratio.is_nan() { 0.0 } else { ratio } * -gravity + gravity;
            if balance > 0.0 {
                let cap = actor.chassis.limits.max_linear_acceleration
                    * actor.chassis.modifiers.linear_acceleration;
                HOVER_LIFT_MULTIPLIER * balance.min(cap).max(0.0)
            } else {
                balance.max(gravity.min(0.0))
            }
        }
        None => gravity,
    };
    velocity.z *= 1.0 - dt;
    velocity.z += lift * dt;

    if let Some(h) = current {
        if lift > 0.0 && gravity < 0.0 {
            // Never overshoot the goal: cap at the speed a fall from it reaches.
            let t = (2.0 * (goal - h) / gravity).abs().sqrt();
            velocity.z = velocity.z.min(-t * gravity);
        }
        if h < 0.0 {
            position.z -= h;
            velocity.z = velocity.z.abs() * actor.body.restitution * HOVER_GROUND_DAMPING;
        }
    }

    if !over_water && actor.chassis.moving {
        let edit = actor.body.edit_height();
        let factor = match current {
            Some(h) if h > edit * 2.0 => 0.0,
            Some(h) if h > edit => actor.chassis.slope_attenuation * (1.0 - (h - edit) / edit),
            Some(_) => actor.chassis.slope_attenuation,
            None => 0.0,
        };
        if factor > 0.0 {
            let drop = prev_position.z - position.z;
            let speed = (2.0 * gravity * drop).abs().sqrt().max(SLOPE_MIN_SPEED);
            let downhill = Vec3::new(terrain_normal.x, terrain_normal.y, 0.0);
            velocity += factor * speed * downhill;
        }
    }

    position.z += velocity.z * dt;
    actor.movement.velocity = velocity;
    actor.movement.position = position;
}

// Saucer ---------------------------------------------------------------------

fn saucer_pre_collision(actor: &mut Actor, oracle: &dyn TerrainOracle, time: &FrameTime) {
    if actor.state != ActorState::Active {
        return;
    }
    let dt = time.dt;
    let water = oracle.water_base(actor.movement.position);

    if actor.chassis.allow_brain_movement {
        apply_desired_velocity_for_hover(&mut actor.movement, &mut actor.desired, &actor.chassis, dt);
        apply_desired_vertical_movement(&mut actor.movement, &actor.desired, dt);
    }
    collide_with_ground(actor, oracle);
    apply_external_force(actor, dt);
    apply_friction(
        &mut actor.movement,
        &actor.desired,
        actor.chassis.has_facing_direction,
        actor.body.friction,
        dt,
        true,
    );
    let velocity = actor.movement.velocity;
    actor.movement.position += velocity * dt;
    actor.chassis.moving = horizontal_length(velocity) > 0.0;

    if water > 0.0 || !actor.body.stay_above_water {
        let normal = oracle.normal(actor.movement.position);
        if normal.z < actor.chassis.slope_threshold {
            actor.movement.velocity.x += normal.x * SAUCER_SLOPE_PUSH * dt;
            actor.movement.velocity.y += normal.y * SAUCER_SLOPE_PUSH * dt;
        }
    }
}

fn saucer_post_collision(actor: &mut Actor, oracle: &dyn TerrainOracle, time: &FrameTime) {
    let dt = time.dt;
    let position = actor.movement.position;
    let edit = actor.body.edit_height();

    let mut cruise = actor.chassis.cruise_altitude.unwrap_or_else(|| {
        let ground = oracle.height(top_of(actor, position)) + edit;
        if actor.body.stay_above_water {
            ground.max(oracle.water_height(position) + edit)
        } else {
            ground
        }
    });
    if !actor.desired.coasting_vertically() {
        if let Some(altitude) = actor.desired.desired_altitude {
            cruise = altitude;
        }
        if actor.desired.desired_vertical_speed.is_some() {
            cruise = actor.movement.altitude();
        }
    }
    actor.chassis.cruise_altitude = Some(cruise);

    let water = oracle.water_base(position);
    let frame = actor.chassis.probe_frame(
        position,
        actor.movement.facing(),
        actor.body.top_offset,
        actor.body.rescale,
    );
    let terrain = max_feeler_altitude(&actor.chassis, &frame, oracle);
    let base = if actor.body.stay_above_water {
        terrain.max(water)
    } else {
        terrain
    };
    let goal = (base + edit).max(cruise);
    actor.chassis.target_altitude = 0.0;

    if actor.movement.altitude() < terrain {
        (actor.chassis.behaviour().bounce_off_ground)(actor, oracle, terrain, Vec3::Z, dt);
    }
    let altitude = lerp(actor.movement.altitude(), goal, SAUCER_CRUISE_RATE * dt);
    actor.movement.set_altitude(altitude);
}

/// Saucers keep their upward speed and mirror out of the ground.
fn saucer_bounce(actor: &mut Actor, oracle: &dyn TerrainOracle, height: f32, normal: Vec3, dt: f32) {
    bounce_vertical(actor, oracle, height, normal, dt);
    let altitude = actor.movement.altitude();
    if altitude < height {
        actor.movement.set_altitude(2.0 * height - altitude);
    }
}

// Dynamic prop ---------------------------------------------------------------

fn prop_is_simulated(actor: &Actor) -> bool {
    (actor.state == ActorState::Active || actor.state.is_corpse()) && actor.chassis.moving
}

fn prop_pre_collision(actor: &mut Actor, oracle: &dyn TerrainOracle, time: &FrameTime) {
    let dt = time.dt;
    if !prop_is_simulated(actor) {
        if actor.state != ActorState::Active
            && !actor.held
            && !actor.state.is_corpse()
            && !actor.chassis.moving
        {
            let ground = oracle.height(top_of(actor, actor.movement.position));
            actor.movement.set_altitude(ground + actor.body.edit_height());
        }
        return;
    }

    let gravity = actor.chassis.limits.gravity;
    let density = actor.chassis.limits.density;
    let mut position = actor.movement.position;
    let mut velocity = actor.movement.velocity;
    actor.chassis.floating = false;
    actor.chassis.in_water = false;

    if oracle.water_base(position) > 0.0 {
        let surface = oracle.water_height(position);
        if surface > 0.0 {
            actor.chassis.in_water = true;
        }
        if position.z < surface {
            if density > 1.0 {
                velocity.z += (1.0 - 1.0 / density) * gravity * dt;
            } else {
                velocity.z -= (1.0 - density) * gravity * dt;
                if surface - position.z < FLOAT_DEPTH {
                    actor.chassis.floating = true;
                }
            }
            velocity = velocity.lerp(Vec3::ZERO, WATER_DRAG_RATE * dt);
        } else {
            velocity.z += gravity * dt;
        }
    } else {
        velocity.z += gravity * dt;
    }

    actor.movement.velocity = velocity;
    apply_external_force(actor, dt);
    velocity = actor.movement.velocity;
    position.x += velocity.x * dt;
    position.y += velocity.y * dt;
    actor.movement.position = position;

    if actor.chassis.allow_brain_movement {
        apply_desired_rotation(&mut actor.movement, &actor.desired, &actor.chassis, dt);
    }
}

fn prop_post_collision(actor: &mut Actor, oracle: &dyn TerrainOracle, time: &FrameTime) {
    let dt = time.dt;
    if !prop_is_simulated(actor) || actor.tweak_immobile {
        if actor.state == ActorState::Active {
            let ground = oracle.height(top_of(actor, actor.movement.position));
            let min_height = actor.body.min_height;
            if ground > 0.0 && actor.movement.altitude() - min_height < ground {
                actor.movement.set_altitude(ground + min_height + PROP_REST_LIFT);
            }
        }
        return;
    }

    let min_height = actor.body.min_height;
    let (ground, normal) = terrain_altitude_and_normal_from_feelers(actor, oracle);
    let start_z = actor.movement.position.z;
    let over_before = ground > 0.0 && start_z - min_height + PROP_GROUND_SLACK >= ground;

    let dz = actor.movement.velocity.z * dt;
    let end_z = start_z + dz;
    actor.movement.position.z = end_z;
    if !over_before {
        return;
    }

    let clearance = end_z - min_height;
    let over_after = ground >= 0.0 && clearance >= ground && clearance > PROP_BURIED_LIMIT;
    if over_after {
        return;
    }

    actor.movement.position.z = start_z;
    (actor.chassis.behaviour().bounce_off_ground)(actor, oracle, ground, normal, dt);
    let below = actor.movement.position.z - min_height - ground;
    if below < 0.0 {
        actor.movement.position.z -= below - PROP_REST_LIFT;
    }
}

/// Props land on the ground, split their velocity about the ground normal
/// and count down to rest.
fn prop_bounce(actor: &mut Actor, oracle: &dyn TerrainOracle, height: f32, normal: Vec3, dt: f32) {
    let gravity = actor.chassis.limits.gravity;
    let restitution = actor.body.restitution;
    let mut position = actor.movement.position;
    let mut velocity = actor.movement.velocity;

    let rest_z = height + actor.body.min_height;
    let dz = rest_z - position.z;
    position.z = rest_z;
    if velocity.z < 0.0 {
        // Undo this frame's gravity. A prop that gravity alone pushed into
        // the ground is resting, not bouncing.
        velocity.z = (velocity.z - gravity * dt).min(0.0);
    }

    let slope_speed = (2.0 * gravity * dz).abs().sqrt();
    let slope = oracle.normal(position);
    velocity += 0.5 * slope_speed * Vec3::new(slope.x, slope.y, 0.0);

    let into_ground = velocity.dot(normal);
    if into_ground < 0.0 {
        if actor.chassis.tumbles && actor.body.friction == 0.0 {
            let sideways = restitution + (1.0 - restitution) * TUMBLE_XY_BLEND;
            velocity.x *= sideways;
            velocity.y *= sideways;
            velocity.z *= restitution;
            velocity = reflect(velocity, normal);
        } else {
            let decay = friction_decay(PROP_GROUND_FRICTION, dt);
            let mut along = into_ground * normal;
            let mut tangent = velocity - along;
            along *= restitution;
            tangent *= decay;
            if actor.state == ActorState::Squashed {
                along *= restitution;
                tangent *= decay;
            }
            velocity = tangent - along;
        }
    }

    let chassis = &mut actor.chassis;
    if velocity.length_squared() < SETTLE_SPEED_SQ {
        if chassis.settle_count >= SETTLE_FRAMES {
            chassis.moving = false;
        } else {
            chassis.settle_count += 1;
        }
    } else {
        chassis.settle_count = 0;
    }

    actor.movement.velocity = velocity;
    actor.movement.position = position;
}
