//! Scenario and chassis configuration loaded from JSON.
//!
//! Every field has a default, so a scenario file only lists what differs.
//! Loading validates the values the movement core assumes are sane (finite
//! limits, positive mass, coefficients within `0..=1`) and reports the first
//! offending field.

use std::path::{Path, PathBuf};

use glam::Vec3;
use log::debug;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::actor::{Actor, ActorId, ActorState, BodyProperties};
use crate::chassis::{Chassis, ChassisLimits, ChassisModifiers, ChassisVariant};
use crate::grid::{Column, GridTerrain};

/// Errors raised while loading a scenario.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        /// File that failed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The file is not valid scenario JSON.
    #[error("invalid scenario JSON: {0}")]
    Parse(#[from] serde_json::Error),
    /// A value is out of range.
    #[error("invalid value for `{field}`: {reason}")]
    Invalid {
        /// Dotted path of the offending field.
        field: String,
        /// What is wrong with it.
        reason: String,
    },
}

impl ConfigError {
    fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

fn check_finite(field: &str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, format!("{value} is not finite")))
    }
}

fn check_unit(field: &str, value: f32) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, format!("{value} is outside 0..=1")))
    }
}

/// Tuning for one chassis.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChassisConfig {
    /// Movement profile.
    pub variant: ChassisVariant,
    /// Speed and acceleration limits.
    pub limits: ChassisLimits,
    /// Multipliers on the limits.
    pub modifiers: ChassisModifiers,
    /// Footprint probe offsets besides the centre probe.
    pub feelers: Vec<Vec3>,
    /// Rolls as it moves.
    pub tumbles: bool,
    /// Ignores glass walls.
    pub ignore_glass_walls: bool,
    /// Never moved by anything.
    pub fixed_position: bool,
    /// How much slope pushes a hover around.
    pub slope_attenuation: f32,
    /// Sine of the slope angle above which a saucer slides.
    pub slope_threshold: f32,
}

impl ChassisConfig {
    /// Checks limits and probe offsets.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first bad field, prefixed
    /// with `prefix`.
    pub fn validate(&self, prefix: &str) -> Result<(), ConfigError> {
        let limits = &self.limits;
        for (name, value) in [
            ("max_speed", limits.max_speed),
            ("max_linear_acceleration", limits.max_linear_acceleration),
            ("max_linear_deceleration", limits.max_linear_deceleration),
            ("max_rotation_rate", limits.max_rotation_rate),
            ("max_rotational_acceleration", limits.max_rotational_acceleration),
            ("max_vertical_speed", limits.max_vertical_speed),
            ("max_vertical_acceleration", limits.max_vertical_acceleration),
            ("gravity", limits.gravity),
            ("density", limits.density),
            ("jump_strength", limits.jump_strength),
            ("jump_rate", limits.jump_rate),
        ] {
            check_finite(&format!("{prefix}.limits.{name}"), value)?;
        }
        if limits.gravity > 0.0 {
            return Err(ConfigError::invalid(
                format!("{prefix}.limits.gravity"),
                "gravity must point down",
            ));
        }
        if limits.density <= 0.0 {
            return Err(ConfigError::invalid(
                format!("{prefix}.limits.density"),
                "density must be positive",
            ));
        }
        for (index, offset) in self.feelers.iter().enumerate() {
            if !offset.is_finite() {
                return Err(ConfigError::invalid(
                    format!("{prefix}.feelers[{index}]"),
                    "offset is not finite",
                ));
            }
        }
        Ok(())
    }

    /// Builds a chassis with these settings.
    #[must_use]
    pub fn build(&self) -> Chassis {
        let mut chassis = Chassis::new(self.variant);
        chassis.limits = self.limits.clone();
        chassis.modifiers = self.modifiers.clone();
        chassis.set_jump_strength(self.limits.jump_strength);
        chassis.tumbles = self.tumbles;
        chassis.ignore_glass_walls = self.ignore_glass_walls;
        chassis.fixed_position = self.fixed_position;
        chassis.slope_attenuation = self.slope_attenuation;
        chassis.slope_threshold = self.slope_threshold;
        self.feelers
            .iter()
            .fold(chassis, |chassis, offset| chassis.with_feeler(*offset))
    }
}

/// One actor placed in a scenario.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ActorConfig {
    /// Start position.
    pub position: Vec3,
    /// Start velocity.
    pub velocity: Vec3,
    /// Start heading in radians.
    pub rotation_z: f32,
    /// Driven by the player; weighs more in collisions.
    pub user_controlled: bool,
    /// Starting lifecycle state.
    pub state: ActorState,
    /// Chassis settings.
    pub chassis: ChassisConfig,
    /// Body properties.
    pub body: BodyProperties,
}

impl ActorConfig {
    /// Checks the body and chassis.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first bad field.
    pub fn validate(&self, prefix: &str) -> Result<(), ConfigError> {
        if !self.position.is_finite() || !self.velocity.is_finite() {
            return Err(ConfigError::invalid(
                format!("{prefix}.position"),
                "position and velocity must be finite",
            ));
        }
        let body = &self.body;
        if !(body.mass.is_finite() && body.mass > 0.0) {
            return Err(ConfigError::invalid(
                format!("{prefix}.body.mass"),
                format!("{} is not a positive mass", body.mass),
            ));
        }
        check_unit(&format!("{prefix}.body.restitution"), body.restitution)?;
        check_unit(&format!("{prefix}.body.friction"), body.friction)?;
        if !(body.collision_radius.is_finite() && body.collision_radius >= 0.0) {
            return Err(ConfigError::invalid(
                format!("{prefix}.body.collision_radius"),
                "radius must be finite and non-negative",
            ));
        }
        self.chassis.validate(&format!("{prefix}.chassis"))
    }

    /// Builds the actor with identifier `id`.
    #[must_use]
    pub fn build(&self, id: ActorId) -> Actor {
        let mut actor = Actor::new(id, self.position, self.chassis.build());
        actor.movement.velocity = self.velocity;
        actor.movement.rotation_z = self.rotation_z;
        actor.movement.user_controlled = self.user_controlled;
        actor.body = self.body.clone();
        actor.state = self.state;
        actor
    }
}

/// A column override in a scenario's terrain.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnConfig {
    /// Grid x coordinate.
    pub x: usize,
    /// Grid y coordinate.
    pub y: usize,
    /// Column contents.
    #[serde(flatten)]
    pub column: Column,
}

/// Terrain for a scenario: a flat grid plus column overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainConfig {
    /// Cells along x.
    pub width: usize,
    /// Cells along y.
    pub depth: usize,
    /// Height of every cell without an override.
    pub height: f32,
    /// Material of every cell without an override.
    pub material: u16,
    /// Glass walls around the grid bounds.
    pub glass_walls: bool,
    /// Per-cell overrides.
    pub columns: Vec<ColumnConfig>,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            width: 16,
            depth: 16,
            height: 1.0,
            material: 1,
            glass_walls: true,
            columns: Vec::new(),
        }
    }
}

impl TerrainConfig {
    /// Builds the grid.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for an empty grid, a non-finite
    /// height or a column outside the grid.
    pub fn build(&self) -> Result<GridTerrain, ConfigError> {
        if self.width == 0 || self.depth == 0 {
            return Err(ConfigError::invalid("terrain", "grid must not be empty"));
        }
        check_finite("terrain.height", self.height)?;
        let mut grid = GridTerrain::flat(self.width, self.depth, self.height, self.material)
            .with_glass_walls(self.glass_walls);
        for (index, entry) in self.columns.iter().enumerate() {
            check_finite(&format!("terrain.columns[{index}].height"), entry.column.height)?;
            if !grid.set_column(entry.x, entry.y, entry.column) {
                return Err(ConfigError::invalid(
                    format!("terrain.columns[{index}]"),
                    format!("({}, {}) is outside the grid", entry.x, entry.y),
                ));
            }
        }
        Ok(grid)
    }
}

/// A complete scenario for the headless runner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    /// Terrain layout.
    pub terrain: TerrainConfig,
    /// Actors in the scenario, identified by their index.
    pub actors: Vec<ActorConfig>,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        let prop = ActorConfig {
            position: Vec3::new(4.5, 4.5, 6.0),
            chassis: ChassisConfig {
                variant: ChassisVariant::DynamicProp,
                ..ChassisConfig::default()
            },
            ..ActorConfig::default()
        };
        let hover = |x: f32, vx: f32| ActorConfig {
            position: Vec3::new(x, 8.5, 1.5),
            velocity: Vec3::new(vx, 0.0, 0.0),
            body: BodyProperties {
                default_edit_height: 0.5,
                ..BodyProperties::default()
            },
            ..ActorConfig::default()
        };
        Self {
            terrain: TerrainConfig::default(),
            actors: vec![prop, hover(6.0, 1.5), hover(10.0, -1.5)],
        }
    }
}

impl ScenarioConfig {
    /// Parses and validates a scenario from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed JSON and
    /// [`ConfigError::Invalid`] for out-of-range values.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let scenario: Self = serde_json::from_str(text)?;
        scenario.validate()?;
        Ok(scenario)
    }

    /// Reads, parses and validates a scenario file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] when the file cannot be read, otherwise as
    /// [`Self::from_json`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        debug!("loading scenario from {}", path.display());
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }

    /// Checks every actor.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first bad field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.actors
            .iter()
            .enumerate()
            .try_for_each(|(index, actor)| actor.validate(&format!("actors[{index}]")))
    }

    /// Builds the actors, numbering them from 1 in file order.
    #[must_use]
    pub fn build_actors(&self) -> Vec<Actor> {
        (1..)
            .zip(&self.actors)
            .map(|(id, actor)| actor.build(ActorId(id)))
            .collect()
    }
}
