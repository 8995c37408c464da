//! Convenience constructors for actors and terrain used in tests.

use glam::Vec3;
use lille_motion::{Actor, ActorId, Chassis, ChassisVariant, GridTerrain};

/// Material tag used by every fixture terrain.
pub const GROUND_MATERIAL: u16 = 1;

/// A flat 8x8 grid at `height`.
///
/// Height zero means "no terrain", so floors meant to be at the origin use a
/// small positive height instead.
///
/// # Examples
/// ```
/// use lille_motion::TerrainOracle;
/// use test_utils::physics::flat_ground;
/// let ground = flat_ground(2.0);
/// assert_eq!(ground.height(glam::Vec3::new(1.0, 1.0, 5.0)), 2.0);
/// ```
#[must_use]
pub fn flat_ground(height: f32) -> GridTerrain {
    GridTerrain::flat(8, 8, height, GROUND_MATERIAL)
}

/// A dynamic prop at `position` moving at `velocity`.
///
/// Gravity is switched off and the waist sits at the base so scenarios can
/// reason about a single bounce.
#[must_use]
pub fn weightless_prop(id: u32, position: Vec3, velocity: Vec3) -> Actor {
    let mut chassis = Chassis::new(ChassisVariant::DynamicProp);
    chassis.limits.gravity = 0.0;
    let mut actor = Actor::new(ActorId(id), position, chassis);
    actor.movement.velocity = velocity;
    actor.body.waist_offset = 0.0;
    actor
}

/// A hover that ignores its brain and feels no gravity, so it glides in a
/// straight line until it hits something.
#[must_use]
pub fn glider(id: u32, position: Vec3, velocity: Vec3) -> Actor {
    let mut chassis = Chassis::new(ChassisVariant::Hover);
    chassis.limits.gravity = 0.0;
    chassis.allow_brain_movement = false;
    let mut actor = Actor::new(ActorId(id), position, chassis);
    actor.movement.velocity = velocity;
    actor
}

/// An actor with only the fields the two-body resolver reads filled in.
///
/// # Examples
/// ```
/// use glam::Vec3;
/// use test_utils::physics::ball;
/// let a = ball(1, Vec3::X, 2.0, 1.0);
/// assert_eq!(a.body.mass, 2.0);
/// ```
#[must_use]
pub fn ball(id: u32, velocity: Vec3, mass: f32, restitution: f32) -> Actor {
    let mut actor = Actor::new(ActorId(id), Vec3::ZERO, Chassis::default());
    actor.movement.velocity = velocity;
    actor.body.mass = mass;
    actor.body.restitution = restitution;
    actor
}
