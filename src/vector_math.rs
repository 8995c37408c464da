//! Vector helpers shared by the kinematics and collision code.
//! Small guarded wrappers around `glam` for the degenerate cases the
//! movement code has to survive.
use std::f32::consts::{PI, TAU};

use glam::{Vec2, Vec3};

/// Returns the unit vector in the direction of `vector`, or `fallback` when
/// `vector` is zero-length or not finite.
///
/// # Examples
///
/// ```
/// use lille_motion::vector_math::normalize_or;
/// use glam::Vec3;
/// let n = normalize_or(Vec3::new(3.0, 0.0, 4.0), Vec3::Z);
/// assert!((n.x - 0.6).abs() < 1e-6);
/// assert_eq!(normalize_or(Vec3::ZERO, Vec3::Z), Vec3::Z);
/// ```
#[must_use]
pub fn normalize_or(vector: Vec3, fallback: Vec3) -> Vec3 {
    if !vector.is_finite() {
        return fallback;
    }
    vector.try_normalize().unwrap_or(fallback)
}

/// Reflects `vector` across the plane with unit normal `normal`.
#[must_use]
pub fn reflect(vector: Vec3, normal: Vec3) -> Vec3 {
    vector - 2.0 * vector.dot(normal) * normal
}

/// Splits `vector` into the part along `normal` and the remainder.
#[must_use]
pub fn split_normal_tangent(vector: Vec3, normal: Vec3) -> (Vec3, Vec3) {
    let along = vector.dot(normal) * normal;
    (along, vector - along)
}

/// Closest point to `point` on the infinite line through `a` and `b`.
#[must_use]
pub fn nearest_point_on_line(point: Vec3, a: Vec3, b: Vec3) -> Vec3 {
    let dir = b - a;
    let len_sq = dir.length_squared();
    if len_sq <= f32::EPSILON {
        return a;
    }
    a + dir * ((point - a).dot(dir) / len_sq)
}

/// Wraps an angle difference into `[-PI, PI]`.
///
/// # Examples
///
/// ```
/// use lille_motion::vector_math::normalize_angle;
/// use std::f32::consts::PI;
/// assert!((normalize_angle(1.5 * PI) + 0.5 * PI).abs() < 1e-5);
/// ```
#[must_use]
pub fn normalize_angle(angle: f32) -> f32 {
    let wrapped = angle % TAU;
    if wrapped > PI {
        wrapped - TAU
    } else if wrapped < -PI {
        wrapped + TAU
    } else {
        wrapped
    }
}

/// Heading around +Z for a horizontal direction, measured from +X.
#[must_use]
pub fn z_rotation_from_direction(direction: Vec3) -> f32 {
    direction.y.atan2(direction.x)
}

/// Horizontal unit vector for a heading around +Z.
#[must_use]
pub fn direction_from_z_rotation(rotation: f32) -> Vec3 {
    let (sin, cos) = rotation.sin_cos();
    Vec3::new(cos, sin, 0.0)
}

/// Length of the horizontal part of `vector`.
#[must_use]
pub fn horizontal_length(vector: Vec3) -> f32 {
    Vec2::new(vector.x, vector.y).length()
}

/// Linear interpolation between two scalars.
#[must_use]
pub fn lerp(from: f32, to: f32, t: f32) -> f32 {
    from + (to - from) * t
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    #[rstest]
    #[case(0.0, 0.0)]
    #[case(PI, PI)]
    #[case(-PI, -PI)]
    #[case(1.5 * PI, -0.5 * PI)]
    #[case(-1.5 * PI, 0.5 * PI)]
    #[case(3.0 * TAU + 0.25, 0.25)]
    fn wraps_angles(#[case] input: f32, #[case] expected: f32) {
        assert_relative_eq!(normalize_angle(input), expected, epsilon = 1e-4);
    }

    #[test]
    fn nan_falls_back() {
        assert_eq!(normalize_or(Vec3::new(f32::NAN, 1.0, 0.0), Vec3::X), Vec3::X);
    }

    #[test]
    fn reflect_flips_normal_component() {
        let out = reflect(Vec3::new(1.0, 0.0, -2.0), Vec3::Z);
        assert_eq!(out, Vec3::new(1.0, 0.0, 2.0));
    }

    #[test]
    fn projects_onto_axis_line() {
        let p = nearest_point_on_line(Vec3::new(3.0, 4.0, 5.0), Vec3::ZERO, Vec3::Y);
        assert_eq!(p, Vec3::new(0.0, 4.0, 0.0));
    }
}
