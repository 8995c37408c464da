#![cfg_attr(docsrs, feature(doc_cfg))]
//! Per-frame actor movement and collision response.
//!
//! Actors probe the terrain under their footprint with feelers, integrate
//! brain intent into velocity and heading under per-chassis limits, bounce
//! off terrain walls and glass, and exchange momentum with each other. The
//! terrain itself sits behind the [`TerrainOracle`] trait; [`GridTerrain`]
//! is a block-column implementation used by the runner and the tests.
//!
//! [`TickPipeline`] runs the stages in order for a slice of actors, and
//! [`MovementPlugin`] does the same for Bevy entities carrying a [`Body`].
pub mod actor;
pub mod chassis;
pub mod collision;
pub mod config;
pub mod constants;
pub mod effects;
pub mod grid;
pub mod intent;
pub mod logging;
pub mod pipeline;
pub mod plugin;
pub mod probe;
pub mod terrain;
pub mod time;
pub mod vector_math;
pub use constants::*;

// Re-export commonly used items
pub use actor::{Actor, ActorId, ActorState, BodyProperties, Movement};
pub use chassis::variant::{post_collision_test_update, pre_collision_test_update};
pub use chassis::{friction_decay, Chassis, ChassisLimits, ChassisVariant, Constraints};
pub use collision::{apply_collisions, collide_with_terrain_walls, CollisionContact, HitInfo};
pub use config::{ConfigError, ScenarioConfig};
pub use effects::{ImpactEvent, ImpactSink};
pub use grid::GridTerrain;
pub use intent::DesiredMovement;
pub use logging::init as init_logging;
pub use pipeline::{FrameScratch, TickPipeline};
pub use plugin::{Body, ImpactLog, MotionWorld, MovementPlugin};
pub use probe::{Altitude, TerrainProbe};
pub use terrain::TerrainOracle;
pub use time::FrameTime;

pub mod prelude {
    //! Prelude exports used in documentation examples.
    //!
    //! ```rust,no_run
    //! use lille_motion::prelude::*;
    //! ```

    pub use crate::Actor;
    pub use crate::ActorId;
    pub use crate::Chassis;
    pub use crate::ChassisVariant;
    pub use crate::GridTerrain;
    pub use crate::TerrainOracle;
    pub use crate::TickPipeline;
    pub use glam::Vec3;
}
