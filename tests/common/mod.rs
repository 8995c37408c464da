//! Mocks shared by the integration tests.

use glam::Vec3;
use lille_motion::terrain::{BlockHit, MaterialInfo, StepDescriptor, TerrainOracle, VerticalRange};
use mockall::mock;

mock! {
    pub Terrain {}
    impl TerrainOracle for Terrain {
        fn height(&self, position: Vec3) -> f32;
        fn height_with_material(&self, position: Vec3) -> (f32, MaterialInfo);
        fn water_height(&self, position: Vec3) -> f32;
        fn blocked(
            &self,
            from: Vec3,
            to: Vec3,
            range: VerticalRange,
            step: StepDescriptor,
            altitude_hint: f32,
        ) -> Option<BlockHit>;
        fn normal(&self, position: Vec3) -> Vec3;
        fn glass_walls(&self) -> bool;
    }
}

/// Terrain 0.5 high west of `x = 0.9` and a 3.0 high wall east of it.
///
/// `blocked` is left for each test to script.
pub fn wall_east_of_origin() -> MockTerrain {
    let surface = |p: Vec3| if p.x > 0.9 { 3.0 } else { 0.5 };
    let mut terrain = MockTerrain::new();
    terrain.expect_glass_walls().return_const(false);
    terrain.expect_height().returning(surface);
    terrain
        .expect_height_with_material()
        .returning(move |p| (surface(p), MaterialInfo::default()));
    terrain.expect_water_height().return_const(0.0);
    terrain.expect_normal().return_const(Vec3::Z);
    terrain
}
