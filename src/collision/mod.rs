//! Collision response against terrain walls and other actors.

pub mod actor;
pub mod terrain;

use glam::Vec3;
use ordered_float::OrderedFloat;

use crate::actor::ActorId;

pub use actor::{apply_collisions, resolve_pair, HitInfo};
pub use terrain::{
    apply_constraints, collide_with_ground, collide_with_terrain_walls, max_feeler_altitude,
    terrain_altitude_and_normal_from_feelers,
};

/// One resolved contact, kept for the rest of the frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionContact {
    /// Where the surfaces touched.
    pub point: Vec3,
    /// Normal pointing away from the surface that held firm.
    pub normal: Vec3,
    /// The actor that blocked, or `None` for terrain and glass.
    pub blocker: Option<ActorId>,
    /// Velocity before the response.
    pub velocity_before: Vec3,
    /// Velocity after the response.
    pub velocity_after: Vec3,
}

impl CollisionContact {
    /// True when terrain or glass caused the contact.
    #[must_use]
    pub const fn is_terrain(&self) -> bool {
        self.blocker.is_none()
    }
}

/// Picks whichever contact lies closer to `start` along the trajectory.
///
/// Used when terrain and an actor both block the same path. Ties go to the
/// terrain contact.
///
/// # Examples
///
/// ```
/// use lille_motion::actor::ActorId;
/// use lille_motion::collision::{resolve_tie, CollisionContact};
/// use glam::Vec3;
/// let contact = |x: f32, blocker| CollisionContact {
///     point: Vec3::new(x, 0.0, 0.0),
///     normal: Vec3::NEG_X,
///     blocker,
///     velocity_before: Vec3::X,
///     velocity_after: Vec3::NEG_X,
/// };
/// let wall = contact(3.0, None);
/// let actor = contact(1.0, Some(ActorId(7)));
/// let chosen = resolve_tie(Vec3::ZERO, Vec3::X, wall, actor);
/// assert_eq!(chosen.blocker, Some(ActorId(7)));
/// ```
#[must_use]
pub fn resolve_tie(
    start: Vec3,
    direction: Vec3,
    terrain: CollisionContact,
    actor: CollisionContact,
) -> CollisionContact {
    let along = |contact: &CollisionContact| {
        let offset = contact.point - start;
        let distance = if direction.length_squared() > 0.0 {
            offset.dot(direction.normalize())
        } else {
            offset.length()
        };
        OrderedFloat(distance)
    };
    // `min_by_key` keeps the first of equal keys, so terrain wins ties.
    [terrain, actor]
        .into_iter()
        .min_by_key(along)
        .unwrap_or(terrain)
}
