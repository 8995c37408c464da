//! Behaviour-driven tests for the two-body resolver using rust-rspec.

use glam::Vec3;
use lille_motion::effects::DiscardImpacts;
use lille_motion::pipeline::kinetic_energy;
use lille_motion::{apply_collisions, Actor, HitInfo};
use test_utils::physics::ball;

const DT: f32 = 0.1;
const TOLERANCE: f32 = 1e-4;

#[derive(Clone, Debug, Default)]
struct Pair {
    actors: Vec<Actor>,
}

impl Pair {
    fn set(&mut self, first: Actor, second: Actor) {
        self.actors = vec![first, second];
    }

    fn collide(&mut self) {
        let hit = HitInfo {
            first: 0,
            second: 1,
            normal: Vec3::X,
            contact: Vec3::ZERO,
        };
        apply_collisions(&mut self.actors, &hit, DT, &mut DiscardImpacts);
    }

    fn assert_velocities(&self, first: f32, second: f32) {
        let actual: Vec<f32> = self.actors.iter().map(|a| a.movement.velocity.x).collect();
        assert!(
            matches!(actual.as_slice(), [a, b] if (a - first).abs() < TOLERANCE && (b - second).abs() < TOLERANCE),
            "expected [{first}, {second}], got {actual:?}"
        );
    }
}

#[test]
fn head_on_collisions() {
    rspec::run(&rspec::given("two actors meeting head on", Pair::default(), |ctx| {
        ctx.when("both are perfectly elastic with equal mass", |ctx| {
            ctx.before_each(|pair| {
                pair.set(ball(1, Vec3::X, 1.0, 1.0), ball(2, Vec3::NEG_X, 1.0, 1.0));
                pair.collide();
            });
            ctx.then("they swap velocities", |pair| {
                pair.assert_velocities(-1.0, 1.0);
            });
        });

        ctx.when("the second is twice as heavy", |ctx| {
            ctx.before_each(|pair| {
                pair.set(
                    ball(1, Vec3::new(5.0, 0.0, 0.0), 1.0, 1.0),
                    ball(2, Vec3::new(-5.0, 0.0, 0.0), 2.0, 1.0),
                );
                pair.collide();
            });
            ctx.then("momentum and energy are conserved", |pair| {
                pair.assert_velocities(-25.0 / 3.0, 5.0 / 3.0);
                assert!((kinetic_energy(&pair.actors) - 37.5).abs() < 1e-3);
            });
        });

        ctx.when("one actor has no restitution", |ctx| {
            ctx.before_each(|pair| {
                pair.set(ball(1, Vec3::X, 1.0, 0.0), ball(2, Vec3::NEG_X, 1.0, 1.0));
                pair.collide();
            });
            ctx.then("they move off together", |pair| {
                pair.assert_velocities(0.0, 0.0);
            });
        });

        ctx.when("the second actor is immobile", |ctx| {
            ctx.before_each(|pair| {
                let mut wall = ball(2, Vec3::ZERO, 1.0, 1.0);
                wall.tweak_immobile = true;
                pair.set(ball(1, Vec3::X, 1.0, 1.0), wall);
                pair.collide();
            });
            ctx.then("only the mobile actor bounces", |pair| {
                pair.assert_velocities(-1.0, 0.0);
            });
        });
    }));
}
