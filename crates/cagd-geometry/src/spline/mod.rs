//! Spline core algorithms: knot vectors and de Boor reduction.

pub mod deboor;
pub mod knot;

pub use deboor::de_boor;
pub use knot::{KnotVector, KnotVectorBuilder};
