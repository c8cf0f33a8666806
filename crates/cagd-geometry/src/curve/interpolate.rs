//! Cubic B-spline interpolation of planar point sequences.

use std::f64::consts::{FRAC_PI_2, PI};

use cagd_core::error::{CagdError, Result};
use cagd_math::{solve_cyclic_tridiagonal, solve_tridiagonal, Point2};
use serde::{Deserialize, Serialize};

use super::BSplineCurve;
use crate::spline::KnotVector;

/// Rule assigning parameter values (nodes) to the interpolated points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Parametrization {
    /// `t_i = i`
    Equidistant,
    /// Cumulative chord length.
    #[default]
    Chordal,
    /// Cumulative square root of the chord length.
    Centripetal,
    /// Chord length corrected by the turning angles at the neighbouring points.
    Foley,
}

impl Parametrization {
    /// Node sequence `t_0 = 0 < t_1 < ... < t_{n-1}` for `points`.
    pub fn nodes(self, points: &[Point2]) -> Result<Vec<f64>> {
        match self {
            Self::Equidistant => Ok((0..points.len()).map(|i| i as f64).collect()),
            Self::Chordal => Ok(accumulate(chord_lengths(points)?)),
            Self::Centripetal => Ok(accumulate(
                chord_lengths(points)?.into_iter().map(f64::sqrt).collect(),
            )),
            Self::Foley => foley_nodes(points),
        }
    }
}

fn chord_lengths(points: &[Point2]) -> Result<Vec<f64>> {
    points
        .windows(2)
        .enumerate()
        .map(|(i, w)| {
            let d = w[0].distance(w[1]);
            if d > 0.0 {
                Ok(d)
            } else {
                Err(CagdError::NumericDegeneracy(format!(
                    "points {} and {} coincide",
                    i,
                    i + 1
                )))
            }
        })
        .collect()
}

fn accumulate(steps: Vec<f64>) -> Vec<f64> {
    std::iter::once(0.0)
        .chain(steps.into_iter().scan(0.0, |sum, d| {
            *sum += d;
            Some(*sum)
        }))
        .collect()
}

fn foley_nodes(points: &[Point2]) -> Result<Vec<f64>> {
    let n = points.len();
    if n < 2 {
        return Ok(vec![0.0; n]);
    }
    let d = chord_lengths(points)?;

    // Turning angle correction, only defined at interior points
    let mut alpha = vec![0.0; n];
    for i in 1..n - 1 {
        let incoming = points[i] - points[i - 1];
        let outgoing = points[i + 1] - points[i];
        let cos = incoming.dot(outgoing) / (d[i - 1] * d[i]);
        if !cos.is_finite() {
            return Err(CagdError::NumericDegeneracy(format!(
                "turning angle at point {i} is undefined"
            )));
        }
        alpha[i] = (PI - cos.clamp(-1.0, 1.0).acos()).min(FRAC_PI_2);
    }

    let mut t = vec![0.0; n];
    for i in 1..n {
        let before = if i >= 2 {
            1.5 * alpha[i - 1] * d[i - 2] / (d[i - 2] + d[i - 1])
        } else {
            0.0
        };
        let after = if i + 1 < n {
            1.5 * alpha[i] * d[i] / (d[i] + d[i - 1])
        } else {
            0.0
        };
        t[i] = t[i - 1] + d[i - 1] * (1.0 + before + after);
    }
    Ok(t)
}

fn require_points(points: &[Point2], required: usize) -> Result<()> {
    if points.len() < required {
        return Err(CagdError::InsufficientPoints {
            required,
            actual: points.len(),
        });
    }
    Ok(())
}

impl BSplineCurve<Point2> {
    /// Cubic B-spline through `points` with vanishing second derivative at
    /// both ends.
    ///
    /// The knot vector is the node sequence of `mode` clamped with
    /// multiplicity 4 at both ends, so `n` points give `n + 6` knots and
    /// `n + 2` control points, and `evaluate(t_i) == points[i]`.
    pub fn interpolate_cubic(mode: Parametrization, points: &[Point2]) -> Result<Self> {
        require_points(points, 3)?;
        let n = points.len();
        let nodes = mode.nodes(points)?;
        let knots = KnotVector::clamped(&nodes, 3);
        let u = knots.as_slice();

        let size = n + 2;
        let mut lower = vec![0.0; size];
        let mut diag = vec![0.0; size];
        let mut upper = vec![0.0; size];
        let mut rhs = vec![Point2::ZERO; size];

        // End points are interpolated by the first and last control point
        diag[0] = 1.0;
        rhs[0] = points[0];
        diag[n + 1] = 1.0;
        rhs[n + 1] = points[n - 1];

        // C''(t_0) = 0
        let r = (u[4] - u[2]) / (u[5] - u[2]);
        lower[1] = -1.0;
        diag[1] = 1.0 + r;
        upper[1] = -r;

        // C''(t_{n-1}) = 0
        let s = (u[n + 1] - u[n]) / (u[n + 3] - u[n]);
        lower[n] = s - 1.0;
        diag[n] = 2.0 - s;
        upper[n] = -1.0;

        // C(t_{i-1}) = p_{i-1}
        for i in 2..n {
            let a = (u[i + 2] - u[i]) / (u[i + 3] - u[i]);
            let b = (u[i + 2] - u[i + 1]) / (u[i + 3] - u[i + 1]);
            let c = (u[i + 2] - u[i + 1]) / (u[i + 4] - u[i + 1]);
            lower[i] = (1.0 - b) * (1.0 - a);
            diag[i] = (1.0 - b) * a + b * (1.0 - c);
            upper[i] = b * c;
            rhs[i] = points[i - 1];
        }

        let control_points = solve_tridiagonal(&lower, &diag, &upper, &rhs)?;
        Ok(Self::new(3, knots, control_points))
    }

    /// Closed C2 cubic B-spline through `points`.
    ///
    /// Uses the uniform knots `0, 1, ..., n + 6`; the curve is supported on
    /// `[3, n + 3]` and passes through `points[j]` at `t = 3 + j`, returning
    /// to `points[0]` at the end of the support.
    pub fn interpolate_cubic_periodic(points: &[Point2]) -> Result<Self> {
        require_points(points, 3)?;
        let n = points.len();

        let lower = vec![1.0 / 6.0; n];
        let diag = vec![2.0 / 3.0; n];
        let upper = vec![1.0 / 6.0; n];
        let solved = solve_cyclic_tridiagonal(&lower, &diag, &upper, points)?;

        // d[0] = d[m], d[m+1] = d[1], d[m+2] = d[2]
        let mut control_points = Vec::with_capacity(n + 3);
        control_points.push(solved[n - 1]);
        control_points.extend_from_slice(&solved);
        control_points.push(solved[0]);
        control_points.push(solved[1]);

        Ok(Self::new(3, KnotVector::uniform(n + 7), control_points))
    }
}
