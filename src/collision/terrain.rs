//! Terrain wall and glass collision, driven by the chassis probes.
//!
//! Each probe tests the segment from its previous sample to its current one
//! against the terrain oracle. A blocked probe pulls the actor back to the
//! last free point, pushes it a little off the wall and bounces the velocity
//! off the wall normal. A final sanity pass reverts the move if the actor's
//! centre still ended up inside a wall or across the glass.

use glam::Vec3;
use log::{debug, trace};

use crate::actor::{Actor, ActorState};
use crate::chassis::{friction_decay, Chassis, ChassisVariant, Constraints};
use crate::collision::CollisionContact;
use crate::constants::{
    GROUND_PENETRATION_LIMIT, HARD_HIT_SPEED, TERRAIN_CONTACT_EPSILON, WALL_PUSH_OFF,
};
use crate::effects::{ImpactEvent, ImpactSink};
use crate::probe::{Altitude, ProbeFrame};
use crate::terrain::{StepDescriptor, TerrainOracle, VerticalRange};
use crate::time::FrameTime;
use crate::vector_math::{nearest_point_on_line, normalize_or, reflect, split_normal_tangent};

/// Lowest passable height when leaving the world is allowed.
const OPEN_EDGE_MIN: f32 = -1.0;

/// Outcome of testing every probe once.
struct ProbePass {
    accumulated: Vec3,
    weight: f32,
    feelers_valid: bool,
    impacting_floor: bool,
    contact: Option<CollisionContact>,
}

/// Collides an actor's attempted move with terrain walls and glass.
///
/// Skips the work when the actor has not moved and its probe data is still
/// valid. Emits a [`ImpactEvent::TerrainBounce`] per wall bounce and at most
/// one [`ImpactEvent::CollisionSound`] per call. A zero wall normal is not
/// treated as a wall: it sets `impacting_floor` and leaves the velocity for
/// the ground bounce. That rule is a heuristic for near-vertical descents
/// and can hide genuine side hits.
pub fn collide_with_terrain_walls(
    actor: &mut Actor,
    oracle: &dyn TerrainOracle,
    time: &FrameTime,
    sink: &mut dyn ImpactSink,
) {
    actor.chassis.impacting_floor = false;

    let prev_position = actor.movement.prev_position;
    let mut position = actor.movement.position;
    let mut velocity = actor.movement.velocity;
    let moved = position != prev_position || velocity != Vec3::ZERO;
    if actor.chassis.terrain_data_valid && !moved {
        return;
    }

    let waist = if actor.held {
        f32::MAX
    } else {
        actor.body.waist_offset
    };
    let glass = oracle.glass_walls() && !actor.chassis.ignore_glass_walls && !actor.held;

    let pass = test_probes(actor, oracle, time, sink, &mut position, velocity, waist, glass);

    if pass.weight > 0.0 {
        velocity = pass.accumulated / pass.weight;
    }

    let chassis = &mut actor.chassis;
    chassis.terrain_data_valid = true;
    chassis.over_path = false;
    chassis.impacting_floor = pass.impacting_floor;
    if pass.contact.is_some() {
        chassis.frame_contact = pass.contact;
    }

    apply_constraints(chassis, &mut position, &mut velocity);
    apply_height_offset_reset(actor, position, oracle);

    let mut bounce_height = 0.0;
    if pass.feelers_valid {
        let top = Vec3::new(position.x, position.y, position.z + actor.body.top_offset);
        let (new_height, info) = oracle.height_with_material(top);
        actor.chassis.over_path = info.over_path();

        let height = position.z + waist;
        let hit_wall = new_height > 0.0 && new_height > height;
        let on_terrain = Altitude::from_sample(new_height).is_terrain();
        let glass_crossed = glass && (actor.chassis.inside_glass_walls != on_terrain);
        if hit_wall || glass_crossed {
            debug!(
                "actor {:?} ended inside a wall or across glass; reverting",
                actor.id
            );
            if height > 0.0 {
                bounce_height = new_height;
                position = prev_position;
            } else {
                position.x = prev_position.x;
                position.y = prev_position.y;
            }
        }
    } else {
        position = prev_position;
    }

    actor.movement.position = position;
    actor.movement.velocity = velocity;

    if bounce_height > 0.0 {
        (actor.chassis.behaviour().bounce_off_ground)(actor, oracle, bounce_height, Vec3::Z, time.dt);
    }
}

#[expect(
    clippy::too_many_arguments,
    reason = "Splits the probe loop out of the resolver without boxing its state."
)]
fn test_probes(
    actor: &mut Actor,
    oracle: &dyn TerrainOracle,
    time: &FrameTime,
    sink: &mut dyn ImpactSink,
    position: &mut Vec3,
    velocity: Vec3,
    waist: f32,
    glass: bool,
) -> ProbePass {
    let mut pass = ProbePass {
        accumulated: Vec3::ZERO,
        weight: 0.0,
        feelers_valid: true,
        impacting_floor: false,
        contact: None,
    };
    let mut sound_played = false;

    let id = actor.id;
    let facing = actor.movement.facing();
    let altitude_hint = actor.movement.altitude();
    let active = actor.state == ActorState::Active;
    let collision_bottom = actor.world_collision_center().z - actor.body.world_collision_radius();
    let top_offset = actor.body.top_offset;
    let rescale = actor.body.rescale;
    let restitution = actor.body.restitution;
    let friction = actor.body.friction;
    let chassis = &mut actor.chassis;
    let landing = chassis.jump.landing;
    let terrain_on_contact = chassis.terrain_on_contact;
    let has_facing = chassis.has_facing_direction;
    let tumbling_legacy =
        chassis.variant == ChassisVariant::DynamicProp && chassis.tumbles && friction == 0.0;

    for (index, feeler) in chassis.feelers.iter_mut().enumerate() {
        let frame = ProbeFrame {
            facing,
            origin: *position,
            top_height: top_offset,
            scale: rescale,
            has_facing,
        };
        let (data, usable) = feeler.update(&frame, oracle);
        if !usable {
            continue;
        }

        let height = position.z + waist;
        if height <= 0.0 {
            continue;
        }
        let mut range = VerticalRange {
            min: OPEN_EDGE_MIN,
            max: height,
        };

        let altitude = data.altitude.height();
        if landing && altitude < height {
            feeler.clear_terrain();
        }
        if terrain_on_contact {
            if altitude + TERRAIN_CONTACT_EPSILON < collision_bottom {
                feeler.clear_terrain();
            }
            if !feeler.material().no_water() && collision_bottom > oracle.water_height(data.position) {
                feeler.clear_water();
            }
        }

        if index != 0 {
            let probe_base = data.position.z - top_offset + feeler.offset.z * rescale;
            if probe_base < data.prev_altitude.height() && active {
                let outward = normalize_or(*position - data.position, Vec3::ZERO);
                let impulse = normalize_or(outward + Vec3::Z, Vec3::Z);
                pass.accumulated += impulse;
                pass.weight += 1.0;
            }
        }

        match data.prev_altitude {
            Altitude::NoTerrain => {
                if !data.altitude.is_terrain() {
                    continue;
                }
            }
            Altitude::Ground(_) => {
                if glass {
                    range.min = 0.0;
                }
                if data.altitude.is_between_zero_and(height) {
                    continue;
                }
            }
        }

        let Some(hit) = oracle.blocked(
            data.prev_position,
            data.position,
            range,
            StepDescriptor::IGNORE_ALL,
            altitude_hint,
        ) else {
            continue;
        };

        if hit.normal == Vec3::ZERO {
            trace!("actor {id:?} probe {index} blocked with no normal");
            pass.impacting_floor = true;
            continue;
        }

        let mut bounced = velocity;
        if bounced.dot(hit.normal) < 0.0 {
            bounced = if tumbling_legacy {
                reflect(bounced * restitution, hit.normal)
            } else {
                let (normal_part, tangent) = split_normal_tangent(bounced, hit.normal);
                tangent * friction_decay(friction, time.dt) - restitution * normal_part
            };
            sink.emit(ImpactEvent::TerrainBounce {
                actor: id,
                position: hit.position,
                glass: hit.block_height <= 0.0,
            });
            pass.contact = Some(CollisionContact {
                point: hit.position,
                normal: hit.normal,
                blocker: None,
                velocity_before: velocity,
                velocity_after: bounced,
            });
        }

        *position += hit.position - data.position;
        *position += WALL_PUSH_OFF * hit.normal;
        pass.accumulated += bounced;
        pass.weight += 1.0;

        if !sound_played {
            sink.emit(ImpactEvent::CollisionSound {
                actor: id,
                terrain_type: feeler.material().terrain_type,
                hard: velocity.length() > HARD_HIT_SPEED,
            });
            sound_played = true;
        }

        let corrected = ProbeFrame {
            origin: *position,
            ..frame
        };
        if !feeler.validate(&corrected, waist, oracle) {
            pass.feelers_valid = false;
        }
    }
    pass
}

/// Applies the brain's position constraints.
///
/// Constraints are not cleared here; the pipeline clears them once per frame.
pub fn apply_constraints(chassis: &Chassis, position: &mut Vec3, velocity: &mut Vec3) {
    let anchor = chassis.constraint_anchor;
    if chassis.constraints.contains(Constraints::NORTH_SOUTH) {
        let z = position.z;
        *position = nearest_point_on_line(*position, anchor, anchor + Vec3::Y);
        position.z = z;
    }
    if chassis.constraints.contains(Constraints::EAST_WEST) {
        let z = position.z;
        *position = nearest_point_on_line(*position, anchor, anchor + Vec3::X);
        position.z = z;
    }
    if chassis.constraints.contains(Constraints::UP_DOWN) {
        *position = nearest_point_on_line(*position, anchor, anchor + Vec3::Z);
    }
    if chassis.constraints.contains(Constraints::IMMOBILE) {
        *position = chassis.immobile_position;
        *velocity = Vec3::ZERO;
    }
}

fn apply_height_offset_reset(actor: &mut Actor, position: Vec3, oracle: &dyn TerrainOracle) {
    if !actor.chassis.reset_height_offset {
        return;
    }
    let frame = actor.chassis.probe_frame(
        position,
        actor.movement.facing(),
        actor.body.top_offset,
        actor.body.rescale,
    );
    let terrain = max_feeler_altitude(&actor.chassis, &frame, oracle);
    let water = oracle.water_base(position);
    let floor = if actor.body.stay_above_water {
        terrain.max(water)
    } else {
        terrain
    };
    actor.body.height_offset = position.z - floor - actor.body.default_edit_height;
    actor.chassis.reset_height_offset = false;
}

/// Highest terrain under any probe in `frame`, never below zero.
#[must_use]
pub fn max_feeler_altitude(chassis: &Chassis, frame: &ProbeFrame, oracle: &dyn TerrainOracle) -> f32 {
    chassis
        .feelers
        .iter()
        .map(|feeler| feeler.altitude_at(frame, oracle))
        .fold(0.0, f32::max)
}

/// Terrain height and normal under the actor from last frame's probe data.
///
/// Falls back to a direct height query and a flat normal when the centre
/// probe is uninitialised or the actor is dead.
#[must_use]
pub fn terrain_altitude_and_normal_from_feelers(
    actor: &Actor,
    oracle: &dyn TerrainOracle,
) -> (f32, Vec3) {
    let centre = actor.chassis.feelers.first().and_then(|f| f.previous());
    let Some((centre_position, centre_altitude)) = centre.filter(|(p, _)| *p != Vec3::ZERO) else {
        return fallback_altitude(actor, oracle);
    };
    if actor.state.is_corpse() {
        return fallback_altitude(actor, oracle);
    }

    let mut altitude = centre_altitude.height();
    if actor.chassis.feelers.len() == 1 {
        return (altitude, oracle.normal(centre_position));
    }

    let mut normal = Vec3::ZERO;
    for (position, sample) in actor.chassis.feelers.iter().skip(1).filter_map(|f| f.previous()) {
        altitude = altitude.max(sample.height());
        if !sample.is_terrain() || !centre_altitude.is_terrain() {
            continue;
        }
        let mut along = position - centre_position;
        along.z += sample.height() - centre_altitude.height();
        let right = along.cross(Vec3::Z);
        normal += normalize_or(right.cross(along), Vec3::ZERO);
    }
    (altitude, normalize_or(normal, Vec3::Z))
}

fn fallback_altitude(actor: &Actor, oracle: &dyn TerrainOracle) -> (f32, Vec3) {
    let prev = actor.movement.prev_position;
    let top = Vec3::new(prev.x, prev.y, prev.z + actor.body.top_offset);
    (oracle.height(top), Vec3::Z)
}

/// Bounces the bottom of the collision sphere off the ground.
///
/// Only fires when the sphere is at most [`GROUND_PENETRATION_LIMIT`] deep;
/// deeper actors are assumed to be falling through a hole. Returns whether
/// the actor touched the ground.
pub fn collide_with_ground(actor: &mut Actor, oracle: &dyn TerrainOracle) -> bool {
    let position = actor.movement.position;
    let terrain = oracle.height(position);
    let bottom = actor.world_collision_center().z - actor.body.world_collision_radius();
    let depth = bottom - terrain;
    if terrain <= 0.0 || depth > 0.0 || depth <= GROUND_PENETRATION_LIMIT {
        return false;
    }

    actor.movement.position.z -= depth;
    let normal = oracle.normal(actor.movement.position);
    let velocity = actor.movement.velocity;
    if velocity.dot(normal) < 0.0 {
        actor.movement.velocity = reflect(velocity, normal) * actor.body.restitution;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::ActorId;
    use crate::grid::{Column, GridTerrain};
    use crate::terrain::{BlockHit, MaterialInfo};
    use approx::assert_relative_eq;
    use rstest::{fixture, rstest};
    use std::cell::Cell;

    /// Terrain that is everywhere as tall as `height` and always blocked
    /// with `hit`.
    struct FixedOracle {
        height: f32,
        hit: Option<BlockHit>,
    }

    impl TerrainOracle for FixedOracle {
        fn height(&self, _position: Vec3) -> f32 {
            self.height
        }

        fn height_with_material(&self, _position: Vec3) -> (f32, MaterialInfo) {
            (self.height, MaterialInfo::default())
        }

        fn water_height(&self, _position: Vec3) -> f32 {
            0.0
        }

        fn blocked(
            &self,
            _from: Vec3,
            _to: Vec3,
            _range: VerticalRange,
            _step: StepDescriptor,
            _altitude_hint: f32,
        ) -> Option<BlockHit> {
            self.hit
        }

        fn normal(&self, _position: Vec3) -> Vec3 {
            Vec3::Z
        }
    }

    #[fixture]
    fn walled() -> GridTerrain {
        let mut terrain = GridTerrain::flat(4, 4, 1.0, 1);
        for y in 0..4 {
            terrain.set_column(
                2,
                y,
                Column {
                    height: 5.0,
                    material: 9,
                    ..Column::default()
                },
            );
        }
        terrain
    }

    fn walker(position: Vec3, velocity: Vec3) -> Actor {
        let mut actor = Actor::new(ActorId(1), position, Chassis::default());
        actor.movement.velocity = velocity;
        actor.body.restitution = 0.5;
        actor
    }

    fn step_to(actor: &mut Actor, position: Vec3) {
        actor.movement.prev_position = actor.movement.position;
        actor.movement.position = position;
    }

    #[test]
    fn zero_normal_marks_floor_without_touching_velocity() {
        let oracle = FixedOracle {
            height: 5.0,
            hit: Some(BlockHit {
                position: Vec3::ZERO,
                normal: Vec3::ZERO,
                block_height: 5.0,
            }),
        };
        let mut actor = walker(Vec3::new(0.0, 0.0, 1.0), Vec3::new(1.0, 0.0, 0.0));
        let mut events = Vec::new();
        collide_with_terrain_walls(&mut actor, &oracle, &FrameTime::new(0.1, 0.0), &mut events);
        assert!(actor.chassis.impacting_floor);
        assert_eq!(actor.movement.velocity, Vec3::new(1.0, 0.0, 0.0));
        assert!(events.is_empty());
    }

    #[rstest]
    fn wall_reflects_normal_component(walled: GridTerrain) {
        let time = FrameTime::new(0.1, 0.0);
        let mut actor = walker(Vec3::new(1.5, 1.5, 1.0), Vec3::new(2.0, 0.0, 0.0));
        let mut events = Vec::new();
        collide_with_terrain_walls(&mut actor, &walled, &time, &mut events);
        assert!(events.is_empty());

        step_to(&mut actor, Vec3::new(2.2, 1.5, 1.0));
        collide_with_terrain_walls(&mut actor, &walled, &time, &mut events);

        assert_relative_eq!(actor.movement.velocity.x, -1.0, epsilon = 1e-5);
        assert!(actor.movement.position.x < 2.0);
        assert!(actor.movement.position.x > 1.8);
        assert!(actor.chassis.terrain_data_valid);
        assert!(matches!(
            events.as_slice(),
            [
                ImpactEvent::TerrainBounce { glass: false, .. },
                ImpactEvent::CollisionSound { hard: false, .. }
            ]
        ));
        let contact = actor.chassis.frame_contact.expect("wall contact recorded");
        assert_eq!(contact.normal, Vec3::NEG_X);
        assert!(contact.is_terrain());
    }

    #[rstest]
    fn glass_holds_actor_inside() {
        let terrain = GridTerrain::flat(4, 4, 1.0, 1).with_glass_walls(true);
        let time = FrameTime::new(0.1, 0.0);
        let mut actor = walker(Vec3::new(3.5, 1.5, 1.0), Vec3::new(3.0, 0.0, 0.0));
        let mut events = Vec::new();
        collide_with_terrain_walls(&mut actor, &terrain, &time, &mut events);

        step_to(&mut actor, Vec3::new(4.3, 1.5, 1.0));
        collide_with_terrain_walls(&mut actor, &terrain, &time, &mut events);

        assert!(actor.movement.position.x < 4.0);
        assert!(actor.movement.velocity.x < 0.0);
        assert!(events
            .iter()
            .any(|e| matches!(e, ImpactEvent::TerrainBounce { glass: true, .. })));
        assert!(events
            .iter()
            .any(|e| matches!(e, ImpactEvent::CollisionSound { hard: true, .. })));
    }

    #[rstest]
    fn open_edge_lets_actor_leave() {
        let terrain = GridTerrain::flat(4, 4, 1.0, 1);
        let time = FrameTime::new(0.1, 0.0);
        let mut actor = walker(Vec3::new(3.5, 1.5, 1.0), Vec3::new(3.0, 0.0, 0.0));
        let mut events = Vec::new();
        collide_with_terrain_walls(&mut actor, &terrain, &time, &mut events);
        step_to(&mut actor, Vec3::new(4.3, 1.5, 1.0));
        collide_with_terrain_walls(&mut actor, &terrain, &time, &mut events);
        assert_relative_eq!(actor.movement.position.x, 4.3);
        assert!(events.is_empty());
    }

    #[rstest]
    fn still_actor_with_valid_data_is_skipped(walled: GridTerrain) {
        let mut actor = walker(Vec3::new(1.5, 1.5, 1.0), Vec3::ZERO);
        actor.chassis.terrain_data_valid = true;
        actor.chassis.impacting_floor = true;
        collide_with_terrain_walls(&mut actor, &walled, &FrameTime::new(0.1, 0.0), &mut Vec::new());
        assert!(!actor.chassis.impacting_floor);
        assert!(actor.chassis.feelers.iter().all(|f| f.previous().is_none()));
    }

    #[test]
    fn immobile_constraint_pins_position() {
        let mut chassis = Chassis::default();
        chassis.constraints = Constraints::IMMOBILE;
        chassis.immobile_position = Vec3::new(1.0, 2.0, 3.0);
        let mut position = Vec3::new(5.0, 5.0, 5.0);
        let mut velocity = Vec3::ONE;
        apply_constraints(&chassis, &mut position, &mut velocity);
        assert_eq!(position, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(velocity, Vec3::ZERO);
    }

    #[test]
    fn axis_constraint_keeps_height() {
        let mut chassis = Chassis::default();
        chassis.constraints = Constraints::NORTH_SOUTH;
        chassis.constraint_anchor = Vec3::new(1.0, 0.0, 0.0);
        let mut position = Vec3::new(4.0, 3.0, 2.0);
        let mut velocity = Vec3::ZERO;
        apply_constraints(&chassis, &mut position, &mut velocity);
        assert_eq!(position, Vec3::new(1.0, 3.0, 2.0));
    }

    #[rstest]
    fn ground_bounce_reflects_and_lifts() {
        let terrain = GridTerrain::flat(4, 4, 1.0, 1);
        let mut actor = walker(Vec3::new(1.5, 1.5, 0.8), Vec3::new(0.0, 0.0, -4.0));
        actor.body.collision_center = Vec3::new(0.0, 0.0, 0.5);
        actor.body.collision_radius = 0.5;
        assert!(collide_with_ground(&mut actor, &terrain));
        assert_relative_eq!(actor.movement.position.z, 1.0, epsilon = 1e-6);
        assert_relative_eq!(actor.movement.velocity.z, 2.0, epsilon = 1e-6);
    }

    #[rstest]
    fn altitude_from_uninitialised_feelers_falls_back(walled: GridTerrain) {
        let actor = walker(Vec3::new(2.5, 1.5, 6.0), Vec3::ZERO);
        let (altitude, normal) = terrain_altitude_and_normal_from_feelers(&actor, &walled);
        assert_eq!(altitude, 5.0);
        assert_eq!(normal, Vec3::Z);
    }

    #[rstest]
    fn max_feeler_altitude_sees_every_probe(walled: GridTerrain) {
        let chassis = Chassis::default().with_feeler(Vec3::new(1.0, 0.0, 0.0));
        let frame = chassis.probe_frame(Vec3::new(1.5, 1.5, 1.0), Vec3::X, 0.0, 1.0);
        assert_eq!(max_feeler_altitude(&chassis, &frame, &walled), 5.0);
    }

    /// No terrain west of `x = 0`, low ground east of it, and a wall hit
    /// reported for every query.
    struct WorldEdge {
        blocked_calls: Cell<u32>,
    }

    impl TerrainOracle for WorldEdge {
        fn height(&self, position: Vec3) -> f32 {
            if position.x < 0.0 {
                0.0
            } else {
                0.5
            }
        }

        fn height_with_material(&self, position: Vec3) -> (f32, MaterialInfo) {
            (self.height(position), MaterialInfo::default())
        }

        fn water_height(&self, _position: Vec3) -> f32 {
            0.0
        }

        fn blocked(
            &self,
            _from: Vec3,
            to: Vec3,
            _range: VerticalRange,
            _step: StepDescriptor,
            _altitude_hint: f32,
        ) -> Option<BlockHit> {
            self.blocked_calls.set(self.blocked_calls.get() + 1);
            Some(BlockHit {
                position: to,
                normal: Vec3::NEG_X,
                block_height: 0.5,
            })
        }

        fn normal(&self, _position: Vec3) -> Vec3 {
            Vec3::Z
        }
    }

    #[test]
    fn stepping_in_from_off_the_world_is_not_a_wall_crossing() {
        let oracle = WorldEdge {
            blocked_calls: Cell::new(0),
        };
        let time = FrameTime::new(0.1, 0.0);
        let mut actor = walker(Vec3::new(-0.3, 1.0, 1.0), Vec3::new(1.0, 0.0, 0.0));
        let mut events = Vec::new();
        collide_with_terrain_walls(&mut actor, &oracle, &time, &mut events);

        step_to(&mut actor, Vec3::new(0.1, 1.0, 1.0));
        collide_with_terrain_walls(&mut actor, &oracle, &time, &mut events);

        assert_eq!(oracle.blocked_calls.get(), 0);
        assert_eq!(actor.movement.velocity, Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(actor.movement.position, Vec3::new(0.1, 1.0, 1.0));
        assert!(events.is_empty());
    }

    #[test]
    fn embedded_side_feeler_lifts_actor_out() {
        let terrain = GridTerrain::flat(4, 4, 1.0, 1);
        let mut actor = walker(Vec3::new(1.5, 1.5, 0.8), Vec3::ZERO);
        actor.chassis = Chassis::default().with_feeler(Vec3::new(1.0, 0.0, 0.0));
        let mut events = Vec::new();

        collide_with_terrain_walls(&mut actor, &terrain, &FrameTime::new(0.1, 0.0), &mut events);

        let lift = std::f32::consts::FRAC_1_SQRT_2;
        assert_relative_eq!(actor.movement.velocity.x, -lift, epsilon = 1e-5);
        assert_relative_eq!(actor.movement.velocity.y, 0.0, epsilon = 1e-5);
        assert_relative_eq!(actor.movement.velocity.z, lift, epsilon = 1e-5);
        assert!(events.is_empty());
    }

    #[test]
    fn centre_feeler_alone_gives_no_lift() {
        let terrain = GridTerrain::flat(4, 4, 1.0, 1);
        let mut actor = walker(Vec3::new(1.5, 1.5, 0.8), Vec3::ZERO);
        collide_with_terrain_walls(&mut actor, &terrain, &FrameTime::new(0.1, 0.0), &mut Vec::new());
        assert_eq!(actor.movement.velocity, Vec3::ZERO);
    }

    #[rstest]
    fn height_offset_is_rederived_from_current_height() {
        let terrain = GridTerrain::flat(4, 4, 1.0, 1);
        let mut actor = walker(Vec3::new(1.5, 1.5, 3.0), Vec3::ZERO);
        actor.body.default_edit_height = 0.5;
        actor.body.height_offset = 7.0;
        actor.chassis.reset_height_offset = true;

        collide_with_terrain_walls(&mut actor, &terrain, &FrameTime::new(0.1, 0.0), &mut Vec::new());

        assert_relative_eq!(actor.body.height_offset, 1.5, epsilon = 1e-6);
        assert_relative_eq!(actor.body.edit_height(), 2.0, epsilon = 1e-6);
        assert!(!actor.chassis.reset_height_offset);
    }

    #[test]
    fn height_offset_left_alone_without_reset() {
        let terrain = GridTerrain::flat(4, 4, 1.0, 1);
        let mut actor = walker(Vec3::new(1.5, 1.5, 3.0), Vec3::ZERO);
        actor.body.height_offset = 7.0;
        collide_with_terrain_walls(&mut actor, &terrain, &FrameTime::new(0.1, 0.0), &mut Vec::new());
        assert_relative_eq!(actor.body.height_offset, 7.0);
    }

    fn open_oracle(height: f32, hit: Option<BlockHit>) -> FixedOracle {
        FixedOracle { height, hit }
    }

    #[test]
    fn ending_inside_a_wall_reverts_the_whole_move() {
        let oracle = open_oracle(5.0, None);
        let mut actor = walker(Vec3::new(0.0, 0.0, 1.0), Vec3::new(1.0, 0.0, -2.0));
        step_to(&mut actor, Vec3::new(1.0, 0.0, 1.0));

        collide_with_terrain_walls(&mut actor, &oracle, &FrameTime::new(0.1, 0.0), &mut Vec::new());

        assert_eq!(actor.movement.position, Vec3::new(0.0, 0.0, 1.0));
        // The revert also bounces the actor off the wall top.
        assert_relative_eq!(actor.movement.velocity.z, 1.0, epsilon = 1e-6);
        assert_relative_eq!(actor.movement.velocity.x, 1.0, epsilon = 1e-6);
    }

    #[test]
    fn sunken_actor_only_reverts_sideways() {
        let oracle = open_oracle(5.0, None);
        let mut actor = walker(Vec3::new(0.0, 0.0, -1.0), Vec3::new(1.0, 1.0, -1.0));
        step_to(&mut actor, Vec3::new(1.0, 1.0, -2.0));

        collide_with_terrain_walls(&mut actor, &oracle, &FrameTime::new(0.1, 0.0), &mut Vec::new());

        assert_eq!(actor.movement.position, Vec3::new(0.0, 0.0, -2.0));
        assert_eq!(actor.movement.velocity, Vec3::new(1.0, 1.0, -1.0));
    }

    #[test]
    fn invalid_feeler_after_push_off_restores_previous_position() {
        let oracle = open_oracle(
            5.0,
            Some(BlockHit {
                position: Vec3::new(0.5, 0.0, 1.0),
                normal: Vec3::NEG_X,
                block_height: 5.0,
            }),
        );
        let mut actor = walker(Vec3::new(0.0, 0.0, 1.0), Vec3::new(2.0, 0.0, 0.0));
        step_to(&mut actor, Vec3::new(1.0, 0.0, 1.0));
        let mut events = Vec::new();

        collide_with_terrain_walls(&mut actor, &oracle, &FrameTime::new(0.1, 0.0), &mut events);

        assert_eq!(actor.movement.position, Vec3::new(0.0, 0.0, 1.0));
        assert_relative_eq!(actor.movement.velocity.x, -1.0, epsilon = 1e-5);
        assert!(matches!(
            events.first(),
            Some(ImpactEvent::TerrainBounce { glass: false, .. })
        ));
    }

    #[rstest]
    #[case::resting(false, false, 3.0, Some(1))]
    #[case::landing_above_ground(true, false, 1.0, None)]
    #[case::hovering_clear_of_ground(false, true, 3.0, None)]
    #[case::touching_ground(false, true, 1.0, Some(1))]
    fn untouched_terrain_is_not_reported(
        #[case] landing: bool,
        #[case] terrain_on_contact: bool,
        #[case] z: f32,
        #[case] expected: Option<u16>,
    ) {
        let terrain = GridTerrain::flat(4, 4, 1.0, 1);
        let mut actor = walker(Vec3::new(1.5, 1.5, z), Vec3::ZERO);
        actor.chassis.jump.landing = landing;
        actor.chassis.terrain_on_contact = terrain_on_contact;

        collide_with_terrain_walls(&mut actor, &terrain, &FrameTime::new(0.1, 0.0), &mut Vec::new());

        assert_eq!(actor.chassis.terrain_materials().next(), Some(expected));
    }
}
