//! De Boor column reduction for B-spline evaluation and knot insertion.

use cagd_math::ControlPoint;

use super::knot::KnotVector;

/// Run the de Boor scheme at `t` until only `stop` points are left.
///
/// The reduction starts from the `degree + 1` control points that influence
/// the knot span containing `t` and performs `degree + 1 - stop` levels of
/// affine blending on an owned copy. `stop == 1` yields the curve point,
/// `stop == 2` the two points whose difference is the tangent direction and
/// `stop == degree` the new control points of a Boehm knot insertion.
///
/// `t` must lie inside the support of the spline and `stop` in
/// `1..=degree + 1`.
pub fn de_boor<P: ControlPoint>(
    degree: usize,
    knots: &KnotVector,
    control_points: &[P],
    t: f64,
    stop: usize,
) -> Vec<P> {
    debug_assert!(
        (1..=degree + 1).contains(&stop),
        "stop must be in 1..={}, got {}",
        degree + 1,
        stop
    );

    let k = knots.knot_index(t);
    debug_assert!(
        k >= degree && k < control_points.len(),
        "knot span {} outside of the control net (degree {}, {} control points)",
        k,
        degree,
        control_points.len()
    );

    let mut d: Vec<P> = control_points[k - degree..=k].to_vec();

    for level in 1..=(degree + 1 - stop) {
        for j in (level..=degree).rev() {
            let lo = knots[j + k - degree];
            let hi = knots[j + 1 + k - level];
            let alpha = (t - lo) / (hi - lo);
            d[j] = d[j - 1].lerp_to(d[j], alpha);
        }
    }

    d.split_off(degree + 1 - stop)
}
