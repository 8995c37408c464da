//! Terrain probes ("feelers").
//!
//! A probe is an offset sample point under part of an actor's footprint.
//! Each frame it samples terrain under its world position and remembers the
//! previous sample so the collision resolver can test the segment between
//! the two against walls.

use glam::Vec3;

use crate::constants::MIN_ALTITUDE;
use crate::terrain::{MaterialInfo, TerrainOracle};

/// Terrain height under a probe.
///
/// The oracle reports exactly `0.0` where there is no terrain; that case is
/// kept distinct from very low ground.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Altitude {
    /// Nothing under the probe; off the edge of the world.
    NoTerrain,
    /// Terrain or path surface at this height.
    Ground(f32),
}

impl Altitude {
    /// Tags a raw oracle height.
    ///
    /// # Examples
    ///
    /// ```
    /// use lille_motion::probe::Altitude;
    /// assert_eq!(Altitude::from_sample(0.0), Altitude::NoTerrain);
    /// assert_eq!(Altitude::from_sample(1.5), Altitude::Ground(1.5));
    /// ```
    #[must_use]
    #[expect(clippy::float_cmp, reason = "The oracle reports exactly zero for no terrain.")]
    pub fn from_sample(height: f32) -> Self {
        if height == 0.0 {
            Self::NoTerrain
        } else {
            Self::Ground(height)
        }
    }

    /// Numeric height, with [`MIN_ALTITUDE`] standing in for no terrain.
    #[must_use]
    pub const fn height(self) -> f32 {
        match self {
            Self::NoTerrain => MIN_ALTITUDE,
            Self::Ground(h) => h,
        }
    }

    /// The ground height, if any.
    #[must_use]
    pub const fn ground(self) -> Option<f32> {
        match self {
            Self::NoTerrain => None,
            Self::Ground(h) => Some(h),
        }
    }

    /// True when there is terrain under the probe.
    #[must_use]
    pub const fn is_terrain(self) -> bool {
        matches!(self, Self::Ground(_))
    }

    /// True for terrain strictly between zero and `limit`.
    #[must_use]
    pub fn is_between_zero_and(self, limit: f32) -> bool {
        matches!(self, Self::Ground(h) if h > 0.0 && h < limit)
    }
}

/// One frame's worth of probe samples.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeelerSample {
    /// World position sampled this frame.
    pub position: Vec3,
    /// Terrain under `position`.
    pub altitude: Altitude,
    /// Position sampled on the previous frame.
    pub prev_position: Vec3,
    /// Terrain under `prev_position`.
    pub prev_altitude: Altitude,
}

/// How a probe's local offset is placed in the world.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProbeFrame {
    /// The actor's facing direction.
    pub facing: Vec3,
    /// Actor position the offset is relative to.
    pub origin: Vec3,
    /// Extra height added to the sample point.
    pub top_height: f32,
    /// Actor scale applied to the offset.
    pub scale: f32,
    /// Whether the offset rotates with the facing direction.
    pub has_facing: bool,
}

impl ProbeFrame {
    /// World position of `offset` in this frame.
    ///
    /// With a facing direction the offset's x runs along the facing and its
    /// y to the left of it; otherwise the world axes are used.
    #[must_use]
    pub fn place(&self, offset: Vec3) -> Vec3 {
        let oriented = if self.has_facing {
            let forward = Vec3::new(self.facing.x, self.facing.y, 0.0);
            let left = Vec3::Z.cross(forward);
            offset.x * forward + offset.y * left
        } else {
            Vec3::new(offset.x, offset.y, 0.0)
        };
        Vec3::new(
            oriented.x.mul_add(self.scale, self.origin.x),
            oriented.y.mul_add(self.scale, self.origin.y),
            offset.z.mul_add(self.scale, self.origin.z) + self.top_height,
        )
    }
}

/// A terrain probe at a fixed offset from its actor.
#[derive(Debug, Clone, PartialEq)]
pub struct TerrainProbe {
    /// Offset from the actor, local when the actor has a facing direction.
    pub offset: Vec3,
    previous: Option<(Vec3, Altitude)>,
    material: MaterialInfo,
}

impl TerrainProbe {
    /// A probe at `offset` with no previous sample.
    #[must_use]
    pub fn new(offset: Vec3) -> Self {
        Self {
            offset,
            previous: None,
            material: MaterialInfo::default(),
        }
    }

    /// The centre probe every chassis carries.
    #[must_use]
    pub fn centre() -> Self {
        Self::new(Vec3::ZERO)
    }

    /// Forgets the previous sample without touching the offset.
    pub fn init_defaults(&mut self) {
        self.previous = None;
    }

    /// Marks the probe uninitialised, e.g. after activation or a teleport.
    pub fn reset_previous(&mut self) {
        self.previous = None;
    }

    /// The last accepted sample, or `None` when uninitialised.
    ///
    /// A previous sample with no terrain under it also counts as
    /// uninitialised, so stepping in from off the world never looks like a
    /// wall crossing.
    #[must_use]
    pub fn previous(&self) -> Option<(Vec3, Altitude)> {
        self.previous.filter(|(_, altitude)| altitude.is_terrain())
    }

    /// Materials seen by the last update.
    #[must_use]
    pub const fn material(&self) -> &MaterialInfo {
        &self.material
    }

    /// Drops the terrain half of the material info.
    pub fn clear_terrain(&mut self) {
        self.material.reset_terrain();
    }

    /// Drops the water half of the material info.
    pub fn clear_water(&mut self) {
        self.material.reset_water();
    }

    /// World position of this probe in `frame`.
    #[must_use]
    pub fn offset_position(&self, frame: &ProbeFrame) -> Vec3 {
        frame.place(self.offset)
    }

    /// Raw terrain and path height under the probe in `frame`.
    #[must_use]
    pub fn altitude_at(&self, frame: &ProbeFrame, oracle: &dyn TerrainOracle) -> f32 {
        oracle.height(self.offset_position(frame))
    }

    /// Samples terrain under the probe and rolls the previous sample forward.
    ///
    /// On the first call after a reset, or after a sample off the world, the
    /// previous sample equals the current one, so an uninitialised probe never
    /// reports a wall crossing. The
    /// returned flag is always `true`; it marks the sample as usable.
    pub fn update(&mut self, frame: &ProbeFrame, oracle: &dyn TerrainOracle) -> (FeelerSample, bool) {
        let position = self.offset_position(frame);
        let (height, material) = oracle.height_with_material(position);
        self.material = material;
        let altitude = Altitude::from_sample(height);

        let (prev_position, prev_altitude) = self.previous().unwrap_or((position, altitude));
        self.previous = Some((position, altitude));

        (
            FeelerSample {
                position,
                altitude,
                prev_position,
                prev_altitude,
            },
            true,
        )
    }

    /// Checks the probe against a corrected actor position.
    ///
    /// Valid iff terrain exists under the probe and sits below the actor's
    /// waist. A valid sample replaces the previous one.
    pub fn validate(&mut self, frame: &ProbeFrame, waist_offset: f32, oracle: &dyn TerrainOracle) -> bool {
        let waist = frame.origin.z + waist_offset;
        let position = self.offset_position(frame);
        let height = oracle.height(position);
        let valid = height > 0.0 && height < waist;
        if valid {
            self.previous = Some((position, Altitude::Ground(height)));
        }
        valid
    }
}
