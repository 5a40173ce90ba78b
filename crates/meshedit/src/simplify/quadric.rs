//! Quadric error matrices.

use glam::{Mat3, Mat4, Vec3, Vec4};
use std::ops::{Add, AddAssign};

use crate::constants::QUADRIC_DET_EPSILON;

/// Symmetric 4x4 matrix measuring summed squared distance to a set of planes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quadric(pub Mat4);

impl Default for Quadric {
    fn default() -> Self {
        Self(Mat4::ZERO)
    }
}

impl Quadric {
    /// Quadric of the plane through `point` with unit `normal`.
    ///
    /// A zero normal (degenerate face) gives the zero quadric.
    pub fn from_plane(normal: Vec3, point: Vec3) -> Self {
        let p = normal.extend(-normal.dot(point));
        Self(Mat4::from_cols(p * p.x, p * p.y, p * p.z, p * p.w))
    }

    /// Error at a position: `v^T Q v` with `v = (x, y, z, 1)`
    pub fn error(&self, position: Vec3) -> f32 {
        let v: Vec4 = position.extend(1.0);
        v.dot(self.0 * v)
    }

    /// Position minimizing the error for an edge `a`-`b`, with its cost.
    ///
    /// Solves the 3x3 system from the upper block. When it is singular the
    /// best of the two endpoints and the midpoint is used instead.
    pub fn optimal(&self, a: Vec3, b: Vec3) -> (Vec3, f32) {
        let q = &self.0;
        let block = Mat3::from_cols(
            q.x_axis.truncate(),
            q.y_axis.truncate(),
            q.z_axis.truncate(),
        );
        if block.determinant().abs() > QUADRIC_DET_EPSILON {
            let position = block.inverse() * -q.w_axis.truncate();
            if position.is_finite() {
                return (position, self.error(position));
            }
        }

        [a, b, (a + b) * 0.5]
            .into_iter()
            .map(|p| (p, self.error(p)))
            .fold((a, f32::INFINITY), |best, candidate| {
                if candidate.1 < best.1 { candidate } else { best }
            })
    }
}

impl Add for Quadric {
    type Output = Quadric;

    fn add(self, rhs: Quadric) -> Quadric {
        Quadric(self.0 + rhs.0)
    }
}

impl AddAssign for Quadric {
    fn add_assign(&mut self, rhs: Quadric) {
        self.0 += rhs.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plane_error_is_squared_distance() {
        let q = Quadric::from_plane(Vec3::Z, Vec3::new(4.0, -2.0, 1.0));
        assert!(q.error(Vec3::new(0.0, 0.0, 1.0)).abs() < 1e-6);
        assert!((q.error(Vec3::new(7.0, 3.0, 4.0)) - 9.0).abs() < 1e-5);
        assert!((q.error(Vec3::new(0.0, 0.0, -1.0)) - 4.0).abs() < 1e-5);
    }

    #[test]
    fn test_optimal_solves_plane_intersection() {
        let corner = Vec3::new(1.0, 2.0, 3.0);
        let q = Quadric::from_plane(Vec3::X, corner)
            + Quadric::from_plane(Vec3::Y, corner)
            + Quadric::from_plane(Vec3::Z, corner);

        let (position, cost) = q.optimal(Vec3::ZERO, Vec3::ONE);
        assert!((position - corner).length() < 1e-4);
        assert!(cost.abs() < 1e-4);
    }

    #[test]
    fn test_singular_system_falls_back() {
        // Two parallel planes leave the 3x3 block singular
        let mut q = Quadric::from_plane(Vec3::Z, Vec3::ZERO);
        q += Quadric::from_plane(Vec3::Z, Vec3::new(0.0, 0.0, 2.0));

        let a = Vec3::new(0.0, 0.0, 0.0);
        let b = Vec3::new(0.0, 0.0, 2.0);
        let (position, cost) = q.optimal(a, b);
        // The midpoint sits one unit from both planes; either endpoint costs 4
        assert_eq!(position, Vec3::new(0.0, 0.0, 1.0));
        assert!((cost - 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_zero_normal_gives_zero_quadric() {
        let q = Quadric::from_plane(Vec3::ZERO, Vec3::ONE);
        assert_eq!(q, Quadric::default());
        assert_eq!(q.error(Vec3::splat(5.0)), 0.0);
    }
}
