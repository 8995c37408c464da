//! Terrain wall response against a scripted terrain oracle.

mod common;

use common::wall_east_of_origin;
use glam::Vec3;
use lille_motion::terrain::BlockHit;
use lille_motion::{
    collide_with_terrain_walls, Actor, ActorId, Chassis, ChassisVariant, FrameTime, ImpactEvent,
};
use rstest::{fixture, rstest};
use test_utils::assert_vec3_near;

#[fixture]
fn walker() -> Actor {
    let mut actor = Actor::new(
        ActorId(1),
        Vec3::new(1.0, 1.0, 1.0),
        Chassis::new(ChassisVariant::Hover),
    );
    actor.movement.prev_position = Vec3::new(0.8, 1.0, 1.0);
    actor.movement.velocity = Vec3::new(2.0, 0.0, 0.0);
    actor
}

#[rstest]
fn wall_hit_reflects_and_pushes_off(mut walker: Actor) {
    let mut terrain = wall_east_of_origin();
    terrain.expect_blocked().times(1).returning(|_, _, _, _, _| {
        Some(BlockHit {
            position: Vec3::new(0.9, 1.0, 1.0),
            normal: Vec3::NEG_X,
            block_height: 3.0,
        })
    });
    let mut events = Vec::new();

    collide_with_terrain_walls(&mut walker, &terrain, &FrameTime::new(0.1, 0.0), &mut events);

    assert_vec3_near(walker.movement.velocity, Vec3::new(-1.0, 0.0, 0.0), 1e-5);
    assert_vec3_near(walker.movement.position, Vec3::new(0.89, 1.0, 1.0), 1e-5);
    assert!(walker.chassis.terrain_data_valid);
    let contact = walker.chassis.frame_contact.expect("wall contact recorded");
    assert!(contact.is_terrain());
    assert!(matches!(
        events.as_slice(),
        [
            ImpactEvent::TerrainBounce { glass: false, .. },
            ImpactEvent::CollisionSound { hard: false, .. }
        ]
    ));
}

#[rstest]
fn zero_normal_is_treated_as_floor(mut walker: Actor) {
    let mut terrain = wall_east_of_origin();
    terrain.expect_blocked().times(1).returning(|_, _, _, _, _| {
        Some(BlockHit {
            position: Vec3::new(0.9, 1.0, 1.0),
            normal: Vec3::ZERO,
            block_height: 3.0,
        })
    });
    let mut events = Vec::new();

    collide_with_terrain_walls(&mut walker, &terrain, &FrameTime::new(0.1, 0.0), &mut events);

    assert!(walker.chassis.impacting_floor);
    assert_eq!(walker.movement.velocity, Vec3::new(2.0, 0.0, 0.0));
    assert!(events.is_empty());
}

#[rstest]
fn unmoved_actor_with_valid_data_skips_the_oracle(mut walker: Actor) {
    let mut terrain = wall_east_of_origin();
    terrain.expect_blocked().never();
    walker.movement.prev_position = walker.movement.position;
    walker.movement.velocity = Vec3::ZERO;
    walker.chassis.terrain_data_valid = true;
    let mut events = Vec::new();

    collide_with_terrain_walls(&mut walker, &terrain, &FrameTime::new(0.1, 0.0), &mut events);

    assert!(events.is_empty());
}
