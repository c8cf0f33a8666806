pub mod aabb;
pub mod polyline;
pub mod tridiagonal;

use std::fmt::Debug;
use std::ops::{Add, Mul, Sub};

pub use glam::{dvec2, dvec3, DVec2, DVec3};
pub use aabb::Aabb2;
pub use polyline::Polyline;
pub use tridiagonal::{solve_cyclic_tridiagonal, solve_tridiagonal};

pub type Point2 = DVec2;
pub type Point3 = DVec3;
pub type Vector2 = DVec2;
pub type Vector3 = DVec3;

/// Anything that can be blended by affine combinations: scalars, 2D and 3D points.
///
/// This is all the de Boor scheme and the linear solvers need from a control point.
pub trait ControlPoint:
    Copy + Debug + Add<Output = Self> + Sub<Output = Self> + Mul<f64, Output = Self>
{
    /// Affine blend `(1 - alpha) * self + alpha * other`.
    fn lerp_to(self, other: Self, alpha: f64) -> Self {
        self * (1.0 - alpha) + other * alpha
    }
}

impl<T> ControlPoint for T where
    T: Copy + Debug + Add<Output = T> + Sub<Output = T> + Mul<f64, Output = T>
{
}

/// Euclidean length of a point or vector.
pub trait Norm {
    fn norm(self) -> f64;
}

impl Norm for f64 {
    fn norm(self) -> f64 {
        self.abs()
    }
}

impl Norm for DVec2 {
    fn norm(self) -> f64 {
        self.length()
    }
}

impl Norm for DVec3 {
    fn norm(self) -> f64 {
        self.length()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lerp_to() {
        let p = dvec2(0.0, 2.0).lerp_to(dvec2(4.0, 0.0), 0.25);
        assert_eq!(p, dvec2(1.0, 1.5));
        assert_eq!(2.0_f64.lerp_to(4.0, 0.5), 3.0);
    }

    #[test]
    fn test_norm() {
        assert_eq!((-3.0_f64).norm(), 3.0);
        assert_eq!(dvec2(3.0, 4.0).norm(), 5.0);
        assert_eq!(dvec3(2.0, 3.0, 6.0).norm(), 7.0);
    }
}
