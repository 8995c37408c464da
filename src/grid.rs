//! Block-column terrain implementing [`TerrainOracle`].
//!
//! Each integer grid cell holds one column with a flat or sloped top, a
//! material tag and an optional water level. Cells outside the grid, and
//! columns with zero height, report "no terrain". The demo runner and the
//! integration tests drive the movement core against this terrain.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::terrain::{BlockHit, MaterialInfo, StepDescriptor, TerrainOracle, VerticalRange};
use crate::vector_math::{horizontal_length, normalize_or};

/// Horizontal distance between samples when marching a blocking test.
const MARCH_STEP: f32 = 0.1;
/// Half-width of the finite difference used for normals.
const NORMAL_PROBE: f32 = 0.25;

/// A single terrain column.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Column {
    /// Height of the column top at the cell origin. Zero leaves the cell empty.
    pub height: f32,
    /// Slope of the top surface per unit of x and y.
    pub gradient: Vec2,
    /// Terrain material tag.
    pub material: u16,
    /// Still water level over the column; zero for dry cells.
    pub water_level: f32,
    /// Water type tag used when the column is submerged.
    pub water_type: Option<u16>,
    /// Path colour painted on the column, if any.
    pub path_color: Option<u8>,
}

/// Rectangular grid of terrain columns.
#[derive(Debug, Clone, PartialEq)]
pub struct GridTerrain {
    width: usize,
    depth: usize,
    columns: Vec<Column>,
    glass_walls: bool,
}

impl GridTerrain {
    /// An empty grid of `width * depth` cells.
    #[must_use]
    pub fn new(width: usize, depth: usize) -> Self {
        Self {
            width,
            depth,
            columns: vec![Column::default(); width * depth],
            glass_walls: false,
        }
    }

    /// A grid where every cell has the same flat column.
    ///
    /// # Examples
    ///
    /// ```
    /// use lille_motion::grid::GridTerrain;
    /// use lille_motion::TerrainOracle;
    /// use glam::Vec3;
    /// let terrain = GridTerrain::flat(4, 4, 1.0, 2);
    /// assert_eq!(terrain.height(Vec3::new(1.5, 2.5, 3.0)), 1.0);
    /// assert_eq!(terrain.height(Vec3::new(-1.0, 0.0, 0.0)), 0.0);
    /// ```
    #[must_use]
    pub fn flat(width: usize, depth: usize, height: f32, material: u16) -> Self {
        let column = Column {
            height,
            material,
            ..Column::default()
        };
        Self {
            width,
            depth,
            columns: vec![column; width * depth],
            glass_walls: false,
        }
    }

    /// Enables or disables glass walls around the grid.
    #[must_use]
    pub fn with_glass_walls(mut self, enabled: bool) -> Self {
        self.glass_walls = enabled;
        self
    }

    /// Replaces the column at `(x, y)`. Returns `false` outside the grid.
    pub fn set_column(&mut self, x: usize, y: usize, column: Column) -> bool {
        if x >= self.width || y >= self.depth {
            return false;
        }
        match self.columns.get_mut(y * self.width + x) {
            Some(slot) => {
                *slot = column;
                true
            }
            None => false,
        }
    }

    /// The column at `(x, y)`, if inside the grid.
    #[must_use]
    pub fn column(&self, x: usize, y: usize) -> Option<&Column> {
        if x >= self.width || y >= self.depth {
            return None;
        }
        self.columns.get(y * self.width + x)
    }

    #[expect(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "Coordinates are floored and checked against the grid bounds first."
    )]
    fn cell_at(&self, position: Vec3) -> Option<(usize, usize)> {
        let x = position.x.floor();
        let y = position.y.floor();
        if !x.is_finite() || !y.is_finite() || x < 0.0 || y < 0.0 {
            return None;
        }
        let (cx, cy) = (x as usize, y as usize);
        (cx < self.width && cy < self.depth).then_some((cx, cy))
    }

    #[expect(
        clippy::cast_precision_loss,
        reason = "Grid sizes are far below the f32 integer limit."
    )]
    fn surface(column: &Column, cell: (usize, usize), position: Vec3) -> f32 {
        if column.height <= 0.0 {
            return 0.0;
        }
        let local = Vec2::new(position.x - cell.0 as f32, position.y - cell.1 as f32);
        column.height + local.dot(column.gradient)
    }

    fn lookup(&self, position: Vec3) -> Option<(&Column, (usize, usize))> {
        let cell = self.cell_at(position)?;
        self.column(cell.0, cell.1).map(|c| (c, cell))
    }

    #[expect(
        clippy::cast_precision_loss,
        reason = "Grid sizes are far below the f32 integer limit."
    )]
    fn edge_normal(&self, position: Vec3) -> Vec3 {
        let mut normal = Vec3::ZERO;
        if position.x < 0.0 {
            normal.x = 1.0;
        } else if position.x >= self.width as f32 {
            normal.x = -1.0;
        }
        if position.y < 0.0 {
            normal.y = 1.0;
        } else if position.y >= self.depth as f32 {
            normal.y = -1.0;
        }
        normal.normalize_or_zero()
    }

    fn crossing_normal(
        &self,
        from: Option<(usize, usize)>,
        to: Option<(usize, usize)>,
        point: Vec3,
        delta: Vec3,
    ) -> Vec3 {
        match (from, to) {
            (Some(a), Some(b)) => {
                let mut normal = Vec3::ZERO;
                if a.0 != b.0 {
                    normal.x = -delta.x.signum();
                }
                if a.1 != b.1 {
                    normal.y = -delta.y.signum();
                }
                normal.normalize_or_zero()
            }
            (Some(_), None) => self.edge_normal(point),
            _ => Vec3::ZERO,
        }
    }

    fn is_wall(
        &self,
        (from_point, from_height): (Vec3, f32),
        (to_point, to_height): (Vec3, f32),
        range: VerticalRange,
        step: StepDescriptor,
    ) -> bool {
        if to_height <= range.min || to_height > range.max {
            return true;
        }
        if from_height > 0.0 && to_height > 0.0 {
            let rise = to_height - from_height;
            if rise > step.max_step_up || rise < step.max_step_down {
                return true;
            }
        }
        let from_depth = self.water_base(from_point) - from_height;
        let to_depth = self.water_base(to_point) - to_height;
        let into_water = step.land_to_water_depth >= 0.0
            && from_depth <= 0.0
            && to_depth > step.land_to_water_depth;
        let onto_land = step.water_to_land_depth >= 0.0
            && from_depth > step.water_to_land_depth
            && to_depth <= 0.0;
        into_water || onto_land
    }
}

impl TerrainOracle for GridTerrain {
    fn height(&self, position: Vec3) -> f32 {
        self.lookup(position)
            .map_or(0.0, |(column, cell)| Self::surface(column, cell, position))
    }

    fn height_with_material(&self, position: Vec3) -> (f32, MaterialInfo) {
        let Some((column, cell)) = self.lookup(position) else {
            return (0.0, MaterialInfo::default());
        };
        let height = Self::surface(column, cell, position);
        let mut info = MaterialInfo::default();
        if height > 0.0 {
            info.terrain_type = Some(column.material);
            info.path_color = column.path_color;
        }
        if column.water_level > height {
            info.water_type = column.water_type;
        }
        (height, info)
    }

    fn water_height(&self, position: Vec3) -> f32 {
        self.lookup(position)
            .map_or(0.0, |(column, _)| column.water_level)
    }

    #[expect(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss,
        reason = "Sample counts are small positive integers."
    )]
    fn blocked(
        &self,
        from: Vec3,
        to: Vec3,
        range: VerticalRange,
        step: StepDescriptor,
        _altitude_hint: f32,
    ) -> Option<BlockHit> {
        let delta = to - from;
        let samples = (horizontal_length(delta) / MARCH_STEP).ceil().max(1.0) as u32;

        let mut last_point = from;
        let mut last_cell = self.cell_at(from);
        let mut last_height = self.height(from);
        for i in 1..=samples {
            let point = from + delta * (i as f32 / samples as f32);
            let cell = self.cell_at(point);
            let height = self.height(point);
            if self.is_wall((last_point, last_height), (point, height), range, step) {
                return Some(BlockHit {
                    position: last_point,
                    normal: self.crossing_normal(last_cell, cell, point, delta),
                    block_height: height,
                });
            }
            last_point = point;
            last_cell = cell;
            last_height = height;
        }
        None
    }

    fn normal(&self, position: Vec3) -> Vec3 {
        let dx = Vec3::X * NORMAL_PROBE;
        let dy = Vec3::Y * NORMAL_PROBE;
        let slope_x = self.height(position + dx) - self.height(position - dx);
        let slope_y = self.height(position + dy) - self.height(position - dy);
        normalize_or(
            Vec3::new(-slope_x, -slope_y, 2.0 * NORMAL_PROBE),
            Vec3::Z,
        )
    }

    fn glass_walls(&self) -> bool {
        self.glass_walls
    }
}
