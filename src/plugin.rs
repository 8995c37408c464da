//! Bevy plugin running the movement pipeline over ECS entities.
//!
//! Entities carry their whole simulated state in a [`Body`] component. Each
//! `Update` the plugin gathers every body, runs one [`TickPipeline`] frame
//! against the terrain held in [`MotionWorld`], writes the bodies back and
//! stores the frame's impacts in [`ImpactLog`] for effect systems to read.

use bevy::prelude::*;

use crate::actor::Actor;
use crate::effects::ImpactEvent;
use crate::pipeline::TickPipeline;
use crate::terrain::TerrainOracle;

/// An entity simulated by the movement core.
#[derive(Component, Debug, Clone, Default)]
pub struct Body(pub Actor);

/// Terrain, clock and pipeline shared by every body.
#[derive(Resource)]
pub struct MotionWorld {
    /// Pipeline and its scratch buffers.
    pub pipeline: TickPipeline,
    /// Terrain every body moves over.
    pub terrain: Box<dyn TerrainOracle + Send + Sync>,
    /// Fixed frame length in seconds.
    pub dt: f32,
}

impl MotionWorld {
    /// A world over `terrain` stepping by `dt` seconds per update.
    #[must_use]
    pub fn new(terrain: impl TerrainOracle + Send + Sync + 'static, dt: f32) -> Self {
        Self {
            pipeline: TickPipeline::new(),
            terrain: Box::new(terrain),
            dt,
        }
    }
}

/// Impacts reported by the most recent frame.
#[derive(Resource, Debug, Default)]
pub struct ImpactLog {
    /// Events in the order they were raised.
    pub events: Vec<ImpactEvent>,
}

/// Advances every [`Body`] by one frame.
pub fn movement_tick_system(
    mut world: ResMut<MotionWorld>,
    mut impacts: ResMut<ImpactLog>,
    mut bodies: Query<&mut Body>,
) {
    let mut actors: Vec<Actor> = bodies
        .iter_mut()
        .map(|mut body| std::mem::take(&mut body.0))
        .collect();

    let MotionWorld {
        pipeline,
        terrain,
        dt,
    } = &mut *world;
    let events = pipeline.tick(&mut actors, terrain.as_ref(), *dt);
    impacts.events.clear();
    impacts.events.extend_from_slice(events);

    for (mut body, actor) in bodies.iter_mut().zip(actors) {
        body.0 = actor;
    }
}

/// Installs [`movement_tick_system`] in `Update`.
///
/// The system only runs once a [`MotionWorld`] resource has been inserted.
#[derive(Default)]
pub struct MovementPlugin;

impl Plugin for MovementPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ImpactLog>();
        app.add_systems(
            Update,
            movement_tick_system.run_if(resource_exists::<MotionWorld>),
        );
    }
}
