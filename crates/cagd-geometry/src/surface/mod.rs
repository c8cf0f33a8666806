//! Surface traits and implementations.

mod bezier;
mod bspline;

use cagd_core::Result;
use cagd_math::ControlPoint;

pub use bezier::{BezierPatch, BezierPatches};
pub use bspline::{Direction, TensorProductSurface};

/// Trait for parametric surfaces.
pub trait Surface: Send + Sync {
    type Point: ControlPoint;

    /// Evaluate the surface at parameters `(u, v)`.
    fn point_at(&self, u: f64, v: f64) -> Result<Self::Point>;

    /// Return the u-parameter domain `(u_min, u_max)`.
    fn domain_u(&self) -> (f64, f64);

    /// Return the v-parameter domain `(v_min, v_max)`.
    fn domain_v(&self) -> (f64, f64);
}
