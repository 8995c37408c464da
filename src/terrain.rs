//! Terrain oracle interface consumed by the probes and collision resolver.
//!
//! The movement core never owns terrain data. Everything it needs to know
//! about heights, materials, water and walls comes through [`TerrainOracle`],
//! which the surrounding game (or [`crate::grid::GridTerrain`] in tests and
//! the demo binary) implements.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Material tags under a sample point. Opaque to the movement core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MaterialInfo {
    /// Terrain material id, `None` when no terrain is touched.
    pub terrain_type: Option<u16>,
    /// Water type id, `None` when no water is touched.
    pub water_type: Option<u16>,
    /// Colour of the path under the point, if any.
    pub path_color: Option<u8>,
}

impl MaterialInfo {
    /// Forget the terrain half (terrain type and path).
    pub fn reset_terrain(&mut self) {
        self.terrain_type = None;
        self.path_color = None;
    }

    /// Forget the water half.
    pub fn reset_water(&mut self) {
        self.water_type = None;
    }

    /// True when no water was sampled.
    #[must_use]
    pub const fn no_water(&self) -> bool {
        self.water_type.is_none()
    }

    /// True when the sample sits on a path.
    #[must_use]
    pub const fn over_path(&self) -> bool {
        self.path_color.is_some()
    }
}

/// Vertical band a blocking test cares about.
///
/// Terrain at or below `min` counts as a wall (used for glass walls, where
/// "no terrain" is impassable); terrain above `max` is too tall to pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VerticalRange {
    /// Lowest passable height; `-1.0` lets actors walk off the world.
    pub min: f32,
    /// Highest passable terrain, normally the actor's waist.
    pub max: f32,
}

/// Step thresholds for [`TerrainOracle::blocked`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepDescriptor {
    /// Largest single step up; `f32::MAX` ignores it.
    pub max_step_up: f32,
    /// Largest single step down (negative); `f32::MIN` ignores it.
    pub max_step_down: f32,
    /// Water depth at which land to water is a wall; negative ignores it.
    pub land_to_water_depth: f32,
    /// Water depth at which water to land is a wall; negative ignores it.
    pub water_to_land_depth: f32,
}

impl StepDescriptor {
    /// A descriptor with every threshold disabled.
    pub const IGNORE_ALL: Self = Self {
        max_step_up: f32::MAX,
        max_step_down: f32::MIN,
        land_to_water_depth: -1.0,
        water_to_land_depth: -1.0,
    };
}

impl Default for StepDescriptor {
    fn default() -> Self {
        Self::IGNORE_ALL
    }
}

/// Result of a successful blocking test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlockHit {
    /// Last free point before the blocker.
    pub position: Vec3,
    /// Wall normal, or zero when the blocker has no usable side.
    pub normal: Vec3,
    /// Height of the blocking column; `<= 0` means a glass wall.
    pub block_height: f32,
}

/// Synchronous terrain queries used by the movement core.
pub trait TerrainOracle {
    /// Terrain and path height at `position`. Zero means "no terrain".
    fn height(&self, position: Vec3) -> f32;

    /// Like [`TerrainOracle::height`], also reporting material tags.
    fn height_with_material(&self, position: Vec3) -> (f32, MaterialInfo);

    /// Water surface height at `position`, including waves.
    fn water_height(&self, position: Vec3) -> f32;

    /// Still water level at `position`; zero when there is no water.
    fn water_base(&self, position: Vec3) -> f32 {
        self.water_height(position)
    }

    /// Tests the segment `from -> to` against terrain walls and glass.
    fn blocked(
        &self,
        from: Vec3,
        to: Vec3,
        range: VerticalRange,
        step: StepDescriptor,
        altitude_hint: f32,
    ) -> Option<BlockHit>;

    /// Surface normal at `position`.
    fn normal(&self, position: Vec3) -> Vec3;

    /// Whether the world edge is walled with glass.
    fn glass_walls(&self) -> bool {
        false
    }
}
