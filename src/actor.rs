//! Actor state owned by the movement core.
//!
//! An [`Actor`] bundles the kinematic state the chassis integrates, the
//! brain's intent for this frame, and the body properties the collision
//! code needs (mass, restitution, friction, collision sphere and heights).

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::chassis::{Chassis, Constraints};
use crate::constants::DEFAULT_MASS;
use crate::intent::DesiredMovement;
use crate::vector_math::direction_from_z_rotation;

/// Stable identifier for an actor within one simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct ActorId(pub u32);

/// Lifecycle state of an actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorState {
    /// Simulated normally.
    #[default]
    Active,
    /// Not simulated.
    Inactive,
    /// Frozen in place.
    Paused,
    /// Dead; props keep falling.
    Dead,
    /// Squashed; props keep falling.
    Squashed,
}

impl ActorState {
    /// Dead and squashed actors still fall and bounce.
    #[must_use]
    pub const fn is_corpse(self) -> bool {
        matches!(self, Self::Dead | Self::Squashed)
    }
}

/// Kinematic state integrated each frame.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Movement {
    /// Position of the actor's base.
    pub position: Vec3,
    /// Position committed by the previous frame.
    pub prev_position: Vec3,
    /// Velocity in units per second.
    pub velocity: Vec3,
    /// Heading around +Z in radians.
    pub rotation_z: f32,
    /// Heading rate in radians per second.
    pub rotation_z_rate: f32,
    /// Driven by a player rather than a brain.
    pub user_controlled: bool,
}

impl Movement {
    /// Unit facing direction derived from the heading.
    #[must_use]
    pub fn facing(&self) -> Vec3 {
        direction_from_z_rotation(self.rotation_z)
    }

    /// Height of the actor's base.
    #[must_use]
    pub const fn altitude(&self) -> f32 {
        self.position.z
    }

    /// Sets the height of the actor's base.
    pub fn set_altitude(&mut self, altitude: f32) {
        self.position.z = altitude;
    }

    /// Current speed.
    #[must_use]
    pub fn speed(&self) -> f32 {
        self.velocity.length()
    }
}

/// Physical properties of an actor's body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BodyProperties {
    /// Mass used in two-body exchanges and external forces.
    pub mass: f32,
    /// Coefficient of restitution in `0..=1`.
    pub restitution: f32,
    /// Friction in `0..=1`; see [`crate::chassis::friction_decay`].
    pub friction: f32,
    /// Scale relative to the canonical actor size.
    pub rescale: f32,
    /// Height above the base that terrain must exceed to count as a wall.
    pub waist_offset: f32,
    /// Height above the base where probes sample.
    pub top_offset: f32,
    /// Distance from the base down to the lowest point of the body.
    pub min_height: f32,
    /// Hover height set in the editor.
    pub default_edit_height: f32,
    /// Brain-driven adjustment on top of the edit height.
    pub height_offset: f32,
    /// Collision sphere centre relative to the base.
    pub collision_center: Vec3,
    /// Collision sphere radius before scaling.
    pub collision_radius: f32,
    /// Treat water as the floor when hovering.
    pub stay_above_water: bool,
}

impl Default for BodyProperties {
    fn default() -> Self {
        Self {
            mass: DEFAULT_MASS,
            restitution: 0.5,
            friction: 0.0,
            rescale: 1.0,
            waist_offset: 0.5,
            top_offset: 0.0,
            min_height: 0.0,
            default_edit_height: 0.0,
            height_offset: 0.0,
            collision_center: Vec3::ZERO,
            collision_radius: 0.5,
            stay_above_water: false,
        }
    }
}

impl BodyProperties {
    /// Target hover height above the floor.
    #[must_use]
    pub fn edit_height(&self) -> f32 {
        self.default_edit_height + self.height_offset
    }

    /// Collision radius after scaling.
    #[must_use]
    pub fn world_collision_radius(&self) -> f32 {
        self.collision_radius * self.rescale
    }
}

/// A simulated actor.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Actor {
    /// Identifier used in events and contacts.
    pub id: ActorId,
    /// Kinematic state.
    pub movement: Movement,
    /// This frame's intent.
    pub desired: DesiredMovement,
    /// Movement profile and per-frame terrain state.
    pub chassis: Chassis,
    /// Physical properties.
    pub body: BodyProperties,
    /// Lifecycle state.
    pub state: ActorState,
    /// Locked in place by the editor.
    pub tweak_immobile: bool,
    /// Held by another actor; terrain walls and glass are ignored.
    pub held: bool,
}

impl Actor {
    /// An active actor at `position` with the given chassis.
    #[must_use]
    pub fn new(id: ActorId, position: Vec3, chassis: Chassis) -> Self {
        let mut desired = DesiredMovement::default();
        desired.refresh_limits(&chassis);
        Self {
            id,
            movement: Movement {
                position,
                prev_position: position,
                ..Movement::default()
            },
            desired,
            chassis,
            ..Self::default()
        }
    }

    /// World-space centre of the collision sphere.
    #[must_use]
    pub fn world_collision_center(&self) -> Vec3 {
        self.movement.position + self.body.collision_center * self.body.rescale
    }

    /// Immobile actors never move in two-body collisions.
    #[must_use]
    pub fn is_immobile(&self) -> bool {
        self.tweak_immobile
            || self.chassis.fixed_position
            || self.chassis.constraints.contains(Constraints::IMMOBILE)
    }

    /// Probe heights and previous samples become stale after a teleport.
    pub fn teleport(&mut self, position: Vec3) {
        self.movement.position = position;
        self.movement.prev_position = position;
        self.chassis.activate();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn facing_tracks_heading() {
        let movement = Movement {
            rotation_z: std::f32::consts::FRAC_PI_2,
            ..Movement::default()
        };
        let facing = movement.facing();
        assert_relative_eq!(facing.x, 0.0, epsilon = 1e-6);
        assert_relative_eq!(facing.y, 1.0, epsilon = 1e-6);
    }

    #[test]
    fn immobile_from_any_source() {
        let mut actor = Actor::default();
        assert!(!actor.is_immobile());
        actor.chassis.constraints |= Constraints::IMMOBILE;
        assert!(actor.is_immobile());
        actor.chassis.constraints = Constraints::empty();
        actor.tweak_immobile = true;
        assert!(actor.is_immobile());
    }

    #[test]
    fn collision_center_scales() {
        let mut actor = Actor::new(ActorId(1), Vec3::new(1.0, 0.0, 2.0), Chassis::default());
        actor.body.collision_center = Vec3::new(0.0, 0.0, 0.5);
        actor.body.rescale = 2.0;
        assert_eq!(actor.world_collision_center(), Vec3::new(1.0, 0.0, 3.0));
    }
}
