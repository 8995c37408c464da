//! Brain-authored movement intent.
//!
//! The brain fills in [`DesiredMovement`] each frame; the kinematics consume
//! it and the pipeline clears it once the frame is committed. The `max_*`
//! limits are refreshed from the chassis before every frame so brains only
//! ever see values already scaled by the chassis modifiers.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::chassis::Chassis;

/// Per-frame intent plus the limits it is applied with.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DesiredMovement {
    /// Direction to accelerate in. Not required to be unit length.
    pub desired_velocity: Option<Vec3>,
    /// World position to move toward.
    pub desired_target_location: Option<Vec3>,
    /// Heading to turn to, in radians around +Z.
    pub desired_rotation_angle: Option<f32>,
    /// Turn rate to spin up to, in radians per second.
    pub desired_rotation_rate: Option<f32>,
    /// Signed vertical speed request; only the sign is used.
    pub desired_vertical_speed: Option<f32>,
    /// Absolute altitude to settle at.
    pub desired_altitude: Option<f32>,
    /// Turn toward the direction of travel when no rotation is requested.
    pub auto_turn: bool,
    /// External force applied this frame, divided by mass.
    pub external_force: Option<Vec3>,

    /// Horizontal speed limit.
    pub max_speed: f32,
    /// Horizontal acceleration limit.
    pub max_linear_acceleration: f32,
    /// Turn rate limit.
    pub max_rotation_rate: f32,
    /// Turn acceleration limit.
    pub max_rotational_acceleration: f32,
    /// Vertical speed limit.
    pub max_vertical_speed: f32,
    /// Vertical acceleration limit.
    pub max_vertical_acceleration: f32,
}

impl DesiredMovement {
    /// True when no horizontal movement is requested.
    #[must_use]
    pub const fn coasting_horizontally(&self) -> bool {
        self.desired_velocity.is_none() && self.desired_target_location.is_none()
    }

    /// True when no vertical movement is requested.
    #[must_use]
    pub const fn coasting_vertically(&self) -> bool {
        self.desired_vertical_speed.is_none() && self.desired_altitude.is_none()
    }

    /// Requests a heading together with the turn limits to reach it with.
    pub fn set_desired_rotation_angle(&mut self, angle: f32, rate: f32, acceleration: f32) {
        self.desired_rotation_angle = Some(angle);
        self.max_rotation_rate = rate;
        self.max_rotational_acceleration = acceleration;
    }

    /// Copies the chassis limits, scaled by its modifiers.
    pub fn refresh_limits(&mut self, chassis: &Chassis) {
        let limits = &chassis.limits;
        let modifiers = &chassis.modifiers;
        self.max_speed = limits.max_speed * modifiers.movement_speed;
        self.max_linear_acceleration = limits.max_linear_acceleration * modifiers.linear_acceleration;
        self.max_rotation_rate = chassis.calc_turn_speed();
        self.max_rotational_acceleration = chassis.calc_turn_acceleration();
        self.max_vertical_speed = limits.max_vertical_speed * modifiers.movement_speed;
        self.max_vertical_acceleration =
            limits.max_vertical_acceleration * modifiers.linear_acceleration;
    }

    /// Drops every request, keeping the limits.
    pub fn clear_intent(&mut self) {
        self.desired_velocity = None;
        self.desired_target_location = None;
        self.desired_rotation_angle = None;
        self.desired_rotation_rate = None;
        self.desired_vertical_speed = None;
        self.desired_altitude = None;
        self.external_force = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coasting_follows_requests() {
        let mut desired = DesiredMovement::default();
        assert!(desired.coasting_horizontally());
        assert!(desired.coasting_vertically());

        desired.desired_target_location = Some(Vec3::X);
        desired.desired_altitude = Some(3.0);
        assert!(!desired.coasting_horizontally());
        assert!(!desired.coasting_vertically());

        desired.clear_intent();
        assert!(desired.coasting_horizontally());
        assert!(desired.coasting_vertically());
    }

    #[test]
    fn refresh_scales_by_modifiers() {
        let mut chassis = Chassis::default();
        chassis.limits.max_speed = 4.0;
        chassis.modifiers.movement_speed = 0.5;
        chassis.limits.max_rotation_rate = 2.0;
        chassis.modifiers.turning_speed = 3.0;

        let mut desired = DesiredMovement::default();
        desired.refresh_limits(&chassis);
        assert_eq!(desired.max_speed, 2.0);
        assert_eq!(desired.max_rotation_rate, 6.0);
    }
}
