//! Impact signalling.
//!
//! The movement core does not play sounds or spawn particles. It reports
//! what it hit through an [`ImpactSink`], and the pipeline collects the
//! events into its frame scratch for the caller to drain.

use glam::Vec3;

use crate::actor::ActorId;

/// Something worth a bounce effect or a sound.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ImpactEvent {
    /// An actor bounced off a terrain wall or glass.
    TerrainBounce {
        /// Actor that bounced.
        actor: ActorId,
        /// Contact point.
        position: Vec3,
        /// The blocker was a glass wall rather than terrain.
        glass: bool,
    },
    /// At most one per actor per terrain pass.
    CollisionSound {
        /// Actor that hit.
        actor: ActorId,
        /// Terrain material hit, if known.
        terrain_type: Option<u16>,
        /// Impact speed exceeded the hard-hit threshold.
        hard: bool,
    },
    /// Two actors bounced off each other.
    ActorBounce {
        /// First actor of the pair.
        first: ActorId,
        /// Second actor of the pair.
        second: ActorId,
        /// Contact point.
        contact: Vec3,
        /// Closing speed along the contact normal.
        speed: f32,
    },
}

/// Receiver for impact events.
pub trait ImpactSink {
    /// Records one event.
    fn emit(&mut self, event: ImpactEvent);
}

impl ImpactSink for Vec<ImpactEvent> {
    fn emit(&mut self, event: ImpactEvent) {
        log::trace!("impact: {event:?}");
        self.push(event);
    }
}

/// Sink that drops everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiscardImpacts;

impl ImpactSink for DiscardImpacts {
    fn emit(&mut self, _event: ImpactEvent) {}
}
