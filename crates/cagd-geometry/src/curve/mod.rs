//! Curve traits and implementations.

mod bspline;
mod interpolate;
mod parallel;

use cagd_core::Result;
use cagd_math::ControlPoint;

pub use bspline::BSplineCurve;
pub use interpolate::Parametrization;
pub use parallel::ParallelOptions;

/// Trait for parametric curves.
pub trait Curve: Send + Sync {
    type Point: ControlPoint;

    /// Evaluate the curve at parameter `t`.
    fn point_at(&self, t: f64) -> Result<Self::Point>;

    /// Evaluate the tangent direction at parameter `t`.
    fn tangent_at(&self, t: f64) -> Result<Self::Point>;

    /// Return the parameter domain `(t_min, t_max)`.
    fn domain(&self) -> (f64, f64);
}
