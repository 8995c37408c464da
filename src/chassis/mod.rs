//! Chassis state and per-variant movement behaviour.
//!
//! A [`Chassis`] holds the tuning limits, capability flags, jump sub-state,
//! brain constraints and probes for one actor. The variant tag selects a row
//! of [`variant::VariantBehaviour`] that supplies the per-frame hooks; the
//! shared integration steps live in [`kinematics`].

pub mod kinematics;
pub mod variant;

use glam::Vec3;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::collision::CollisionContact;
use crate::constants::{DEFAULT_DENSITY, DEFAULT_GRAVITY};
use crate::probe::{ProbeFrame, TerrainProbe};
use crate::terrain::TerrainOracle;

pub use kinematics::friction_decay;
pub use variant::{ChassisVariant, VariantBehaviour};

/// Speed, acceleration and gravity limits for a chassis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChassisLimits {
    /// Horizontal speed limit in metres per second.
    pub max_speed: f32,
    /// Horizontal acceleration limit.
    pub max_linear_acceleration: f32,
    /// Braking limit; zero or negative falls back to the acceleration.
    pub max_linear_deceleration: f32,
    /// Turn rate limit in radians per second.
    pub max_rotation_rate: f32,
    /// Turn acceleration limit.
    pub max_rotational_acceleration: f32,
    /// Vertical speed limit for flying chassis.
    pub max_vertical_speed: f32,
    /// Vertical acceleration limit for flying chassis.
    pub max_vertical_acceleration: f32,
    /// Downward acceleration; negative.
    pub gravity: f32,
    /// Density relative to water.
    pub density: f32,
    /// Vertical speed added by a jump.
    pub jump_strength: f32,
    /// Jumps allowed per second; zero disables jumping.
    pub jump_rate: f32,
    /// Delay between the jump animation starting and the boost.
    pub pre_jump_delay: f32,
    /// How far ahead of touchdown the landing animation starts.
    pub pre_land_delay: f32,
}

impl Default for ChassisLimits {
    fn default() -> Self {
        Self {
            max_speed: 2.0,
            max_linear_acceleration: 2.0,
            max_linear_deceleration: -1.0,
            max_rotation_rate: 1.0,
            max_rotational_acceleration: 1.0,
            max_vertical_speed: 2.0,
            max_vertical_acceleration: 2.0,
            gravity: DEFAULT_GRAVITY,
            density: DEFAULT_DENSITY,
            jump_strength: 0.0,
            jump_rate: 1.0,
            pre_jump_delay: 0.2,
            pre_land_delay: 0.1,
        }
    }
}

impl ChassisLimits {
    /// Braking limit with the fallback to acceleration applied.
    #[must_use]
    pub fn linear_deceleration(&self) -> f32 {
        if self.max_linear_deceleration <= 0.0 {
            self.max_linear_acceleration
        } else {
            self.max_linear_deceleration
        }
    }
}

/// Multipliers set by the brain or editor on top of the limits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChassisModifiers {
    /// Scales the speed limits.
    pub movement_speed: f32,
    /// Scales the turn rate limit.
    pub turning_speed: f32,
    /// Scales the linear acceleration limits.
    pub linear_acceleration: f32,
    /// Scales the turn acceleration limit.
    pub turning_acceleration: f32,
}

impl Default for ChassisModifiers {
    fn default() -> Self {
        Self {
            movement_speed: 1.0,
            turning_speed: 1.0,
            linear_acceleration: 1.0,
            turning_acceleration: 1.0,
        }
    }
}

/// Jump sub-state: idle, jumping (pre-jump delay), landing, idle.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct JumpState {
    /// Jump requested this frame.
    pub jump: bool,
    /// Waiting out the pre-jump delay.
    pub jumping: bool,
    /// A second jump was spent at the apex.
    pub double_jumping: bool,
    /// Airborne and waiting to land.
    pub landing: bool,
    /// Tells animation to start the jump.
    pub start_jump_animation: bool,
    /// Tells animation to start the landing.
    pub start_land_animation: bool,
    /// When the current jump was requested.
    pub jump_start_time: f64,
    /// When the last boost was applied.
    pub last_jump_time: f64,
    /// Boost applied by the next jump.
    pub effective_jump_strength: f32,
}

impl JumpState {
    fn reset(&mut self, strength: f32) {
        *self = Self {
            effective_jump_strength: strength,
            ..Self::default()
        };
    }
}

bitflags::bitflags! {
    /// Position constraints imposed by the brain for one frame.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct Constraints: u8 {
        /// Only move along the world Y axis through the anchor.
        const NORTH_SOUTH = 1 << 0;
        /// Only move along the world X axis through the anchor.
        const EAST_WEST = 1 << 1;
        /// Only move vertically through the anchor.
        const UP_DOWN = 1 << 2;
        /// Pinned to `immobile_position` with zero velocity.
        const IMMOBILE = 1 << 3;
    }
}

/// Movement profile and per-frame terrain state for one actor.
#[derive(Debug, Clone, PartialEq)]
pub struct Chassis {
    /// Which row of the behaviour table drives this chassis.
    pub variant: ChassisVariant,
    /// Tuning limits.
    pub limits: ChassisLimits,
    /// Multipliers on the limits.
    pub modifiers: ChassisModifiers,
    /// Never moved by anything.
    pub fixed_position: bool,
    /// Has a front; probes and braking follow the heading.
    pub has_facing_direction: bool,
    /// Ignores glass walls.
    pub ignore_glass_walls: bool,
    /// Currently inside the glass walls.
    pub inside_glass_walls: bool,
    /// `inside_glass_walls` has been read from the terrain since the last
    /// activation.
    pub entered_world: bool,
    /// Only reports terrain and water actually touched.
    pub terrain_on_contact: bool,
    /// Still moving; settled props clear this.
    pub moving: bool,
    /// Brain intent is applied.
    pub allow_brain_movement: bool,
    /// Rolls as it moves.
    pub tumbles: bool,
    /// Re-derive the height offset from the current height next frame.
    pub reset_height_offset: bool,
    /// Jump sub-state.
    pub jump: JumpState,
    /// Active brain constraints.
    pub constraints: Constraints,
    /// Point the axis constraints pass through.
    pub constraint_anchor: Vec3,
    /// Where the immobile constraint pins the actor.
    pub immobile_position: Vec3,
    /// Absolute altitude target, zero when unset.
    pub target_altitude: f32,
    /// Altitude a saucer cruises at once established.
    pub cruise_altitude: Option<f32>,
    /// How much slope pushes a hover around.
    pub slope_attenuation: f32,
    /// Sine of the slope angle above which a saucer slides.
    pub slope_threshold: f32,
    /// Terrain probes; index 0 is always the centre probe.
    pub feelers: Vec<TerrainProbe>,
    /// Probe data is current.
    pub terrain_data_valid: bool,
    /// Standing on a path.
    pub over_path: bool,
    /// A probe hit terrain with no usable normal this frame.
    pub impacting_floor: bool,
    /// Consecutive near-still ground bounces.
    pub settle_count: u32,
    /// Bobbing at the water surface.
    pub floating: bool,
    /// In or over water.
    pub in_water: bool,
    /// Last wall or actor contact this frame.
    pub frame_contact: Option<CollisionContact>,
}

impl Default for Chassis {
    fn default() -> Self {
        Self::new(ChassisVariant::Hover)
    }
}

impl Chassis {
    /// A chassis of `variant` with default limits and a single centre probe.
    #[must_use]
    pub fn new(variant: ChassisVariant) -> Self {
        let behaviour = variant.behaviour();
        Self {
            variant,
            limits: ChassisLimits::default(),
            modifiers: ChassisModifiers::default(),
            fixed_position: false,
            has_facing_direction: behaviour.has_facing_direction,
            ignore_glass_walls: false,
            inside_glass_walls: true,
            entered_world: false,
            terrain_on_contact: behaviour.terrain_on_contact,
            moving: variant == ChassisVariant::DynamicProp,
            allow_brain_movement: true,
            tumbles: false,
            reset_height_offset: false,
            jump: JumpState::default(),
            constraints: Constraints::empty(),
            constraint_anchor: Vec3::ZERO,
            immobile_position: Vec3::ZERO,
            target_altitude: 0.0,
            cruise_altitude: None,
            slope_attenuation: 0.0,
            slope_threshold: 0.0,
            feelers: vec![TerrainProbe::centre()],
            terrain_data_valid: false,
            over_path: false,
            impacting_floor: false,
            settle_count: 0,
            floating: false,
            in_water: false,
            frame_contact: None,
        }
    }

    /// Adds a footprint probe at `offset`.
    #[must_use]
    pub fn with_feeler(mut self, offset: Vec3) -> Self {
        self.feelers.push(TerrainProbe::new(offset));
        self
    }

    /// Behaviour row for this chassis.
    #[must_use]
    pub fn behaviour(&self) -> &'static VariantBehaviour {
        self.variant.behaviour()
    }

    /// Whether the chassis can move sideways.
    #[must_use]
    pub fn supports_strafing(&self) -> bool {
        self.behaviour().supports_strafing
    }

    /// Sets both the configured and the effective jump boost.
    pub fn set_jump_strength(&mut self, strength: f32) {
        self.limits.jump_strength = strength;
        self.jump.effective_jump_strength = strength;
    }

    /// Resets runtime state for a recycled actor without reallocating.
    pub fn init_defaults(&mut self) {
        self.limits.density = DEFAULT_DENSITY;
        self.moving = false;
        self.jump.reset(self.limits.jump_strength);
        self.impacting_floor = false;
        self.target_altitude = 0.0;
        self.cruise_altitude = None;
        self.allow_brain_movement = true;
        self.terrain_data_valid = false;
        self.constraints = Constraints::empty();
        self.settle_count = 0;
        self.floating = false;
        self.in_water = false;
        self.slope_attenuation = 0.0;
        self.frame_contact = None;
        self.entered_world = false;
        for feeler in &mut self.feelers {
            feeler.init_defaults();
        }
    }

    /// Called when the actor enters the scene or is teleported.
    ///
    /// Probe history is dropped and the glass wall side is worked out again
    /// by the next [`Chassis::enter_world`].
    pub fn activate(&mut self) {
        for feeler in &mut self.feelers {
            feeler.reset_previous();
        }
        self.terrain_data_valid = false;
        self.entered_world = false;
    }

    /// Activates the chassis at `position`.
    ///
    /// An actor starting over terrain is inside the glass walls; one starting
    /// off the world stays outside them until it is activated again.
    pub fn enter_world(&mut self, position: Vec3, oracle: &dyn TerrainOracle) {
        self.activate();
        self.inside_glass_walls = oracle.height(position) > 0.0;
        self.entered_world = true;
        debug!(
            "chassis entered world at {position:?}, inside glass walls: {}",
            self.inside_glass_walls
        );
    }

    /// Turn rate limit after modifiers.
    #[must_use]
    pub fn calc_turn_speed(&self) -> f32 {
        self.limits.max_rotation_rate * self.modifiers.turning_speed
    }

    /// Turn acceleration limit after modifiers.
    #[must_use]
    pub fn calc_turn_acceleration(&self) -> f32 {
        self.limits.max_rotational_acceleration * self.modifiers.turning_acceleration
    }

    /// Terrain types under the probes. May contain duplicates; only
    /// meaningful while [`Chassis::terrain_data_valid`] holds.
    pub fn terrain_materials(&self) -> impl Iterator<Item = Option<u16>> + '_ {
        self.feelers.iter().map(|f| f.material().terrain_type)
    }

    /// Water types under the probes. May contain duplicates.
    pub fn water_materials(&self) -> impl Iterator<Item = Option<u16>> + '_ {
        self.feelers.iter().map(|f| f.material().water_type)
    }

    /// Path colour under the centre probe, if standing on a path.
    #[must_use]
    pub fn path_color(&self) -> Option<u8> {
        self.feelers.first().and_then(|f| f.material().path_color)
    }

    /// How far the chassis needs to stop from full speed, worst case.
    #[must_use]
    pub fn safe_stopping_distance(&self) -> f32 {
        let accel = self
            .limits
            .max_linear_acceleration
            .min(self.limits.linear_deceleration());
        if accel <= 0.0 {
            return 0.0;
        }
        let speed = self.limits.max_speed * self.modifiers.movement_speed;
        speed * speed * 0.5 / accel
    }

    /// Rough turning radius at full speed.
    #[must_use]
    pub fn safe_turning_radius(&self) -> f32 {
        if self.limits.max_rotational_acceleration <= 0.0 {
            return 0.0;
        }
        self.limits.max_speed * self.modifiers.movement_speed
            / self.limits.max_rotational_acceleration
    }

    /// Time needed to stop from `velocity`.
    #[must_use]
    pub fn safe_stopping_time(&self, velocity: Vec3) -> f32 {
        let accel = self
            .limits
            .max_linear_acceleration
            .min(self.limits.linear_deceleration());
        if accel <= 0.0 {
            return 0.0;
        }
        velocity.length() / accel
    }

    /// Probe placement for an actor at `origin`.
    #[must_use]
    pub fn probe_frame(&self, origin: Vec3, facing: Vec3, top_offset: f32, rescale: f32) -> ProbeFrame {
        ProbeFrame {
            facing,
            origin,
            top_height: top_offset,
            scale: rescale,
            has_facing: self.has_facing_direction,
        }
    }
}
