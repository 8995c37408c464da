//! Ordered per-frame movement pipeline.
//!
//! [`TickPipeline::tick`] runs every stage for all actors in a fixed order:
//!
//! 1. pre-collision integration per chassis variant
//! 2. terrain walls and glass
//! 3. broad-phase sphere overlaps, dropping any that lie beyond a wall the
//!    actor already hit this frame
//! 4. two-body resolution
//! 5. post-collision vertical response
//! 6. clear this frame's constraints and intent
//!
//! Actors seen for the first time, or since their last activation, enter
//! the world before stage 1.
//!
//! The overlap list and the impact events live in a [`FrameScratch`] owned by
//! the pipeline and reused across frames.

use log::{debug, trace, warn};

use crate::actor::{Actor, ActorId};
use crate::chassis::variant::{post_collision_test_update, pre_collision_test_update};
use crate::chassis::Constraints;
use crate::collision::{
    apply_collisions, collide_with_terrain_walls, resolve_tie, CollisionContact, HitInfo,
};
use crate::constants::MAX_FRAME_SECONDS;
use crate::effects::ImpactEvent;
use crate::terrain::TerrainOracle;
use crate::time::FrameTime;

/// Finds overlapping actor pairs for the two-body resolver.
pub trait BroadPhase {
    /// Appends one [`HitInfo`] per overlapping, approaching pair to `out`.
    fn find_overlaps(&mut self, actors: &[Actor], out: &mut Vec<HitInfo>);
}

/// Tests every pair of collision spheres.
#[derive(Debug, Clone, Copy, Default)]
pub struct SphereBroadPhase;

impl BroadPhase for SphereBroadPhase {
    fn find_overlaps(&mut self, actors: &[Actor], out: &mut Vec<HitInfo>) {
        for (first, a) in actors.iter().enumerate() {
            let centre_a = a.world_collision_center();
            let radius_a = a.body.world_collision_radius();
            for (offset, b) in actors.iter().skip(first + 1).enumerate() {
                let delta = b.world_collision_center() - centre_a;
                let reach = radius_a + b.body.world_collision_radius();
                let distance_sq = delta.length_squared();
                if distance_sq >= reach * reach || distance_sq == 0.0 {
                    continue;
                }
                let normal = delta / distance_sq.sqrt();
                // Separating pairs are left alone so they can drift apart.
                if (a.movement.velocity - b.movement.velocity).dot(normal) <= 0.0 {
                    continue;
                }
                out.push(HitInfo {
                    first,
                    second: first + 1 + offset,
                    normal,
                    contact: centre_a + normal * radius_a,
                });
            }
        }
    }
}

/// Buffers reused from frame to frame.
#[derive(Debug, Clone, Default)]
pub struct FrameScratch {
    /// Overlaps found by the broad phase this frame.
    pub overlaps: Vec<HitInfo>,
    /// Impacts reported this frame.
    pub events: Vec<ImpactEvent>,
}

impl FrameScratch {
    /// Empties both buffers, keeping their capacity.
    pub fn clear(&mut self) {
        self.overlaps.clear();
        self.events.clear();
    }
}

/// Runs the movement stages in order over a slice of actors.
#[derive(Debug, Default)]
pub struct TickPipeline<B = SphereBroadPhase> {
    clock: FrameTime,
    scratch: FrameScratch,
    broad_phase: B,
}

impl TickPipeline {
    /// A pipeline with the sphere broad phase and the clock at zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl<B: BroadPhase> TickPipeline<B> {
    /// A pipeline using a custom broad phase.
    pub fn with_broad_phase(broad_phase: B) -> Self {
        Self {
            clock: FrameTime::default(),
            scratch: FrameScratch::default(),
            broad_phase,
        }
    }

    /// Timing of the most recent frame.
    #[must_use]
    pub const fn clock(&self) -> FrameTime {
        self.clock
    }

    /// Impacts reported by the most recent frame.
    #[must_use]
    pub fn events(&self) -> &[ImpactEvent] {
        &self.scratch.events
    }

    /// Advances every actor by `dt` seconds and returns the frame's impacts.
    ///
    /// Non-finite or negative frame lengths are treated as zero, and long
    /// frames are clamped to [`MAX_FRAME_SECONDS`].
    pub fn tick(
        &mut self,
        actors: &mut [Actor],
        terrain: &dyn TerrainOracle,
        dt: f32,
    ) -> &[ImpactEvent] {
        let dt = sanitize_dt(dt);
        self.clock.advance(dt);
        let time = self.clock;
        self.scratch.clear();

        for actor in actors.iter_mut() {
            if !actor.chassis.entered_world {
                actor.chassis.enter_world(actor.movement.position, terrain);
            }
            actor.movement.prev_position = actor.movement.position;
            actor.chassis.frame_contact = None;
            if !actor.chassis.fixed_position {
                pre_collision_test_update(actor, terrain, &time);
            }
        }

        for actor in actors.iter_mut().filter(|a| !a.chassis.fixed_position) {
            collide_with_terrain_walls(actor, terrain, &time, &mut self.scratch.events);
        }

        self.broad_phase
            .find_overlaps(actors, &mut self.scratch.overlaps);
        break_ties(actors, &mut self.scratch.overlaps);
        for hit in &self.scratch.overlaps {
            apply_collisions(actors, hit, dt, &mut self.scratch.events);
        }

        for actor in actors.iter_mut() {
            if !actor.chassis.fixed_position {
                post_collision_test_update(actor, terrain, &time);
            }
            actor.chassis.constraints = Constraints::empty();
            actor.desired.clear_intent();
            actor.desired.refresh_limits(&actor.chassis);
        }

        debug!(
            "tick at {:.3}s: {} actors, {} overlaps, {} impacts",
            time.total_seconds,
            actors.len(),
            self.scratch.overlaps.len(),
            self.scratch.events.len()
        );
        &self.scratch.events
    }
}

/// Settles overlaps with actors that also hit terrain this frame.
///
/// The contact closer along the actor's path wins. An overlap lying beyond
/// the wall is dropped; a wall lying beyond the overlap has its velocity
/// response undone so the two-body resolver starts from the pre-wall speed.
fn break_ties(actors: &mut [Actor], overlaps: &mut Vec<HitInfo>) {
    overlaps.retain(|hit| {
        let ids = (
            actors.get(hit.first).map(|a| a.id),
            actors.get(hit.second).map(|a| a.id),
        );
        let (Some(first_id), Some(second_id)) = ids else {
            return true;
        };
        let pairs = [(hit.first, second_id), (hit.second, first_id)];
        let wall_first = pairs.iter().any(|&(index, other)| {
            actors
                .get(index)
                .and_then(|actor| wall_contact(actor, other, hit))
                .is_some_and(|(_, chosen)| chosen.is_terrain())
        });
        if wall_first {
            trace!("dropping overlap {first_id:?}/{second_id:?} behind a wall");
            return false;
        }
        for (index, other) in pairs {
            if let Some(actor) = actors.get_mut(index) {
                if let Some((wall, _)) = wall_contact(actor, other, hit) {
                    actor.movement.velocity = wall.velocity_before;
                    actor.chassis.frame_contact = None;
                }
            }
        }
        true
    });
}

/// The actor's terrain contact and whichever of it and `hit` comes first.
fn wall_contact(
    actor: &Actor,
    other: ActorId,
    hit: &HitInfo,
) -> Option<(CollisionContact, CollisionContact)> {
    let wall = actor.chassis.frame_contact.filter(CollisionContact::is_terrain)?;
    let overlap = CollisionContact {
        point: hit.contact,
        normal: hit.normal,
        blocker: Some(other),
        velocity_before: wall.velocity_before,
        velocity_after: wall.velocity_before,
    };
    let chosen = resolve_tie(
        actor.movement.prev_position,
        wall.velocity_before,
        wall,
        overlap,
    );
    Some((wall, chosen))
}

fn sanitize_dt(dt: f32) -> f32 {
    if !dt.is_finite() || dt < 0.0 {
        warn!("ignoring invalid frame length {dt}");
        return 0.0;
    }
    dt.min(MAX_FRAME_SECONDS)
}

/// Total kinetic energy of `actors`; handy for checking that collisions only
/// remove energy.
#[must_use]
pub fn kinetic_energy(actors: &[Actor]) -> f32 {
    actors
        .iter()
        .map(|a| 0.5 * a.body.mass * a.movement.velocity.length_squared())
        .sum()
}
