//! Two-body bounce between overlapping actors.
//!
//! This is a momentum-approximating model rather than exact physics: user
//! controlled actors weigh [`USER_MASS_MULTIPLIER`] times their mass so the
//! player is hard to push, which breaks true conservation.

use glam::Vec3;
use log::{trace, warn};

use crate::actor::{Actor, ActorId};
use crate::chassis::friction_decay;
use crate::collision::CollisionContact;
use crate::constants::{DEFAULT_MASS, IMMOBILE_NUDGE, MIN_MASS, USER_MASS_MULTIPLIER};
use crate::effects::{ImpactEvent, ImpactSink};
use crate::vector_math::{reflect, split_normal_tangent};

/// An overlap reported by the broad phase.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitInfo {
    /// Index of the first actor in the frame's actor slice.
    pub first: usize,
    /// Index of the second actor.
    pub second: usize,
    /// Unit contact normal.
    pub normal: Vec3,
    /// Contact point.
    pub contact: Vec3,
}

fn effective_mass(actor: &Actor) -> f32 {
    let mut mass = actor.body.mass;
    if !mass.is_finite() || mass < MIN_MASS {
        warn!(
            "actor {:?} has unusable mass {mass}; using {DEFAULT_MASS}",
            actor.id
        );
        mass = DEFAULT_MASS;
    }
    if actor.movement.user_controlled {
        mass *= USER_MASS_MULTIPLIER;
    }
    mass
}

fn record_contact(actor: &mut Actor, hit: &HitInfo, blocker: ActorId, before: Vec3) {
    actor.chassis.frame_contact = Some(CollisionContact {
        point: hit.contact,
        normal: hit.normal,
        blocker: Some(blocker),
        velocity_before: before,
        velocity_after: actor.movement.velocity,
    });
}

/// Bounces two overlapping actors off each other along `hit.normal`.
///
/// When either actor is immobile only the other one responds: its velocity
/// is reflected and scaled by both restitutions, and it is put back at its
/// previous position plus a small nudge along the new velocity. Otherwise
/// each actor's normal speed is blended between the common (inelastic) speed
/// and the elastic exchange by the product of both restitutions, and the
/// tangential part decays by each actor's own friction.
pub fn resolve_pair(
    a: &mut Actor,
    b: &mut Actor,
    hit: &HitInfo,
    dt: f32,
    sink: &mut dyn ImpactSink,
) {
    let normal = hit.normal;
    let restitution = a.body.restitution * b.body.restitution;
    let closing_speed = (a.movement.velocity - b.movement.velocity).dot(normal).abs();

    match (a.is_immobile(), b.is_immobile()) {
        (true, true) => {
            trace!("both {:?} and {:?} are immobile", a.id, b.id);
            return;
        }
        (false, true) => bounce_off_immobile(a, b.id, hit, restitution, dt),
        (true, false) => bounce_off_immobile(b, a.id, hit, restitution, dt),
        (false, false) => exchange(a, b, hit, restitution, dt),
    }

    sink.emit(ImpactEvent::ActorBounce {
        first: a.id,
        second: b.id,
        contact: hit.contact,
        speed: closing_speed,
    });
}

fn bounce_off_immobile(mover: &mut Actor, blocker: ActorId, hit: &HitInfo, restitution: f32, dt: f32) {
    let before = mover.movement.velocity;
    let velocity = reflect(before, hit.normal) * restitution;
    mover.movement.velocity = velocity;
    mover.movement.position = mover.movement.prev_position + velocity * (IMMOBILE_NUDGE * dt);
    record_contact(mover, hit, blocker, before);
}

fn exchange(a: &mut Actor, b: &mut Actor, hit: &HitInfo, restitution: f32, dt: f32) {
    let normal = hit.normal;
    let m0 = effective_mass(a);
    let m1 = effective_mass(b);
    let total = m0 + m1;

    let before_a = a.movement.velocity;
    let before_b = b.movement.velocity;
    let (along_a, tangent_a) = split_normal_tangent(before_a, normal);
    let (along_b, tangent_b) = split_normal_tangent(before_b, normal);
    let u0 = along_a.dot(normal);
    let u1 = along_b.dot(normal);

    let common = (m0 * u0 + m1 * u1) / total;
    let elastic0 = ((m0 - m1) * u0 + 2.0 * m1 * u1) / total;
    let elastic1 = ((m1 - m0) * u1 + 2.0 * m0 * u0) / total;
    let u0_after = common + restitution * (elastic0 - common);
    let u1_after = common + restitution * (elastic1 - common);

    a.movement.velocity = tangent_a * friction_decay(a.body.friction, dt) + u0_after * normal;
    b.movement.velocity = tangent_b * friction_decay(b.body.friction, dt) + u1_after * normal;

    let (id_a, id_b) = (a.id, b.id);
    record_contact(a, hit, id_b, before_a);
    record_contact(b, hit, id_a, before_b);
}

/// Resolves an overlap reported against a slice of actors.
///
/// Out-of-range or identical indices are ignored.
pub fn apply_collisions(
    actors: &mut [Actor],
    hit: &HitInfo,
    dt: f32,
    sink: &mut dyn ImpactSink,
) {
    let (low, high, swapped) = if hit.first < hit.second {
        (hit.first, hit.second, false)
    } else {
        (hit.second, hit.first, true)
    };
    if low == high || high >= actors.len() {
        warn!("ignoring collision between actors {} and {}", hit.first, hit.second);
        return;
    }
    let (head, tail) = actors.split_at_mut(high);
    let (Some(low_actor), Some(high_actor)) = (head.get_mut(low), tail.first_mut()) else {
        return;
    };
    if swapped {
        resolve_pair(high_actor, low_actor, hit, dt, sink);
    } else {
        resolve_pair(low_actor, high_actor, hit, dt, sink);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chassis::{Chassis, Constraints};
    use crate::effects::DiscardImpacts;
    use approx::assert_relative_eq;
    use rstest::rstest;

    fn body(id: u32, x: f32, velocity: Vec3, mass: f32, restitution: f32) -> Actor {
        let mut actor = Actor::new(ActorId(id), Vec3::new(x, 0.0, 0.0), Chassis::default());
        actor.movement.velocity = velocity;
        actor.body.mass = mass;
        actor.body.restitution = restitution;
        actor
    }

    fn head_on() -> HitInfo {
        HitInfo {
            first: 0,
            second: 1,
            normal: Vec3::X,
            contact: Vec3::new(0.5, 0.0, 0.0),
        }
    }

    #[test]
    fn equal_elastic_bodies_swap_speeds() {
        let mut a = body(0, 0.0, Vec3::new(3.0, 0.0, 0.0), 1.0, 1.0);
        let mut b = body(1, 1.0, Vec3::new(-3.0, 0.0, 0.0), 1.0, 1.0);
        resolve_pair(&mut a, &mut b, &head_on(), 0.1, &mut DiscardImpacts);
        assert_relative_eq!(a.movement.velocity.x, -3.0, epsilon = 1e-5);
        assert_relative_eq!(b.movement.velocity.x, 3.0, epsilon = 1e-5);
    }

    #[test]
    fn zero_restitution_merges_normal_speed() {
        let mut a = body(0, 0.0, Vec3::new(3.0, 1.0, 0.0), 1.0, 0.0);
        let mut b = body(1, 1.0, Vec3::new(-3.0, 0.0, 0.0), 1.0, 0.0);
        resolve_pair(&mut a, &mut b, &head_on(), 0.1, &mut DiscardImpacts);
        assert_relative_eq!(a.movement.velocity.x, b.movement.velocity.x, epsilon = 1e-6);
        assert_relative_eq!(a.movement.velocity.y, 1.0);
    }

    #[test]
    fn one_to_two_mass_exchange() {
        let mut a = body(0, 0.0, Vec3::new(5.0, 0.0, 0.0), 1.0, 1.0);
        let mut b = body(1, 1.0, Vec3::new(-5.0, 0.0, 0.0), 2.0, 1.0);
        resolve_pair(&mut a, &mut b, &head_on(), 0.1, &mut DiscardImpacts);
        assert_relative_eq!(a.movement.velocity.x, -25.0 / 3.0, epsilon = 1e-4);
        assert_relative_eq!(b.movement.velocity.x, 5.0 / 3.0, epsilon = 1e-4);
    }

    #[test]
    fn user_controlled_actor_is_heavy() {
        let mut a = body(0, 0.0, Vec3::new(1.0, 0.0, 0.0), 1.0, 1.0);
        let mut b = body(1, 1.0, Vec3::ZERO, 1.0, 1.0);
        a.movement.user_controlled = true;
        resolve_pair(&mut a, &mut b, &head_on(), 0.1, &mut DiscardImpacts);
        assert_relative_eq!(a.movement.velocity.x, 1.0, epsilon = 1e-3);
        assert_relative_eq!(b.movement.velocity.x, 2.0, epsilon = 1e-3);
    }

    #[rstest]
    #[case(Vec3::X, Vec3::new(4.0, 0.0, 0.0))]
    #[case(Vec3::Y, Vec3::new(-1.0, 3.0, 0.5))]
    #[case(Vec3::new(0.6, 0.8, 0.0), Vec3::new(0.0, -7.0, 0.0))]
    #[case(Vec3::NEG_Z, Vec3::new(0.0, 0.0, -2.0))]
    fn immobile_actor_never_moves(#[case] normal: Vec3, #[case] speed: Vec3) {
        for (mover_first, tweak) in [(true, true), (false, true), (true, false), (false, false)] {
            let mut mover = body(0, 0.0, speed, 1.0, 0.8);
            mover.movement.prev_position = Vec3::new(-0.1, 0.0, 0.0);
            let mut wall = body(1, 1.0, Vec3::new(0.5, 0.0, 0.0), 3.0, 0.5);
            if tweak {
                wall.tweak_immobile = true;
            } else {
                wall.chassis.constraints = Constraints::IMMOBILE;
            }
            let wall_before = (wall.movement.position, wall.movement.velocity);
            let hit = HitInfo {
                first: 0,
                second: 1,
                normal,
                contact: Vec3::ZERO,
            };
            let mut events = Vec::new();
            if mover_first {
                resolve_pair(&mut mover, &mut wall, &hit, 0.1, &mut events);
            } else {
                resolve_pair(&mut wall, &mut mover, &hit, 0.1, &mut events);
            }
            assert_eq!((wall.movement.position, wall.movement.velocity), wall_before);
            let expected = reflect(speed, normal) * 0.4;
            assert_relative_eq!(mover.movement.velocity.x, expected.x, epsilon = 1e-5);
            assert_relative_eq!(mover.movement.velocity.y, expected.y, epsilon = 1e-5);
            assert_relative_eq!(mover.movement.velocity.z, expected.z, epsilon = 1e-5);
            assert_eq!(events.len(), 1);
        }
    }

    #[test]
    fn apply_collisions_handles_reversed_indices() {
        let mut actors = vec![
            body(0, 0.0, Vec3::new(-2.0, 0.0, 0.0), 1.0, 1.0),
            body(1, 1.0, Vec3::new(2.0, 0.0, 0.0), 1.0, 1.0),
        ];
        let hit = HitInfo {
            first: 1,
            second: 0,
            normal: Vec3::NEG_X,
            contact: Vec3::new(0.5, 0.0, 0.0),
        };
        let mut events = Vec::new();
        apply_collisions(&mut actors, &hit, 0.1, &mut events);
        assert!(matches!(
            events.as_slice(),
            [ImpactEvent::ActorBounce { first: ActorId(1), second: ActorId(0), .. }]
        ));
        assert_relative_eq!(actors[0].movement.velocity.x, 2.0, epsilon = 1e-5);
        assert_relative_eq!(actors[1].movement.velocity.x, -2.0, epsilon = 1e-5);
    }

    #[test]
    fn apply_collisions_ignores_self_hits() {
        let mut actors = vec![body(0, 0.0, Vec3::X, 1.0, 1.0)];
        let hit = HitInfo {
            first: 0,
            second: 0,
            normal: Vec3::X,
            contact: Vec3::ZERO,
        };
        let mut events = Vec::new();
        apply_collisions(&mut actors, &hit, 0.1, &mut events);
        assert!(events.is_empty());
        assert_eq!(actors[0].movement.velocity, Vec3::X);
    }
}
