//! CAGD geometry: knot vectors, B-spline curves and surfaces, interpolation
//! and offset curves.

pub mod curve;
pub mod spline;
pub mod surface;
pub mod tessellate;

pub use curve::{BSplineCurve, Curve, ParallelOptions, Parametrization};
pub use spline::{KnotVector, KnotVectorBuilder};
pub use surface::{BezierPatch, BezierPatches, Direction, Surface, TensorProductSurface};
