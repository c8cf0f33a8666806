//! Adaptive flattening of curves into polylines.

use cagd_core::error::{CagdError, Result};
use cagd_math::{Norm, Polyline};

use crate::curve::Curve;

/// Maximum recursion depth for adaptive subdivision.
const MAX_DEPTH: u32 = 12;

/// Convert a curve to a polyline using adaptive subdivision.
///
/// Segments are split in half while the curve point at the parameter
/// midpoint is farther than `tolerance` from the chord midpoint.
pub fn curve_to_polyline<C>(curve: &C, tolerance: f64) -> Result<Polyline<C::Point>>
where
    C: Curve + ?Sized,
    C::Point: Norm,
{
    if !(tolerance > 0.0) {
        return Err(CagdError::InvalidArgument(format!(
            "tolerance must be positive, got {tolerance}"
        )));
    }

    let (t_min, t_max) = curve.domain();
    let mut polyline = Polyline::new();
    let start = curve.point_at(t_min)?;
    let end = curve.point_at(t_max)?;
    polyline.append_point(start);
    subdivide_curve(curve, (t_min, start), (t_max, end), tolerance, &mut polyline, 0)?;
    Ok(polyline)
}

fn subdivide_curve<C>(
    curve: &C,
    (t0, p0): (f64, C::Point),
    (t1, p1): (f64, C::Point),
    tolerance: f64,
    polyline: &mut Polyline<C::Point>,
    depth: u32,
) -> Result<()>
where
    C: Curve + ?Sized,
    C::Point: Norm,
{
    if depth >= MAX_DEPTH {
        polyline.append_point(p1);
        return Ok(());
    }

    let t_mid = (t0 + t1) * 0.5;
    let p_mid = curve.point_at(t_mid)?;

    // Chord midpoint
    let chord_mid = (p0 + p1) * 0.5;
    let deviation = (p_mid - chord_mid).norm();

    // Always split once: an S-shaped span can have its midpoint on the chord.
    if deviation > tolerance || depth == 0 {
        subdivide_curve(curve, (t0, p0), (t_mid, p_mid), tolerance, polyline, depth + 1)?;
        subdivide_curve(curve, (t_mid, p_mid), (t1, p1), tolerance, polyline, depth + 1)
    } else {
        polyline.append_point(p1);
        Ok(())
    }
}
