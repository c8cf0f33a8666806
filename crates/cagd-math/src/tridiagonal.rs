//! Solvers for tridiagonal and cyclic ("almost tridiagonal") linear systems.
//!
//! Row `i` of the system reads
//! `lower[i] * x[i-1] + diag[i] * x[i] + upper[i] * x[i+1] = rhs[i]`.
//! The coefficients are scalars; the unknowns and right-hand side may be any
//! [`ControlPoint`], so a system over 2D points is solved for both
//! coordinates at once.

use cagd_core::{CagdError, Result};

use crate::ControlPoint;

/// Pivots smaller than this are treated as singular.
const PIVOT_EPSILON: f64 = 1e-14;

/// Solve a tridiagonal system with the Thomas algorithm.
///
/// `lower[0]` and `upper[n-1]` lie outside the matrix and are ignored.
pub fn solve_tridiagonal<V: ControlPoint>(
    lower: &[f64],
    diag: &[f64],
    upper: &[f64],
    rhs: &[V],
) -> Result<Vec<V>> {
    let n = check_lengths(lower, diag, upper, rhs.len())?;
    if n == 0 {
        return Ok(Vec::new());
    }

    let mut c_prime = vec![0.0; n];
    let mut d_prime = Vec::with_capacity(n);

    // Forward sweep
    let pivot = checked_pivot(diag[0], 0)?;
    c_prime[0] = upper[0] / pivot;
    d_prime.push(rhs[0] * (1.0 / pivot));

    for i in 1..n {
        let denom = checked_pivot(diag[i] - lower[i] * c_prime[i - 1], i)?;
        if i < n - 1 {
            c_prime[i] = upper[i] / denom;
        }
        let d = (rhs[i] - d_prime[i - 1] * lower[i]) * (1.0 / denom);
        d_prime.push(d);
    }

    // Back substitution
    let mut x = d_prime;
    for i in (0..n - 1).rev() {
        x[i] = x[i] - x[i + 1] * c_prime[i];
    }

    Ok(x)
}

/// Solve a cyclic tridiagonal system.
///
/// In addition to the tridiagonal band, `lower[0]` couples row 0 to
/// `x[n-1]` and `upper[n-1]` couples row `n-1` to `x[0]`. The corners are
/// folded into a rank-one correction (Sherman-Morrison) on top of two
/// Thomas solves.
pub fn solve_cyclic_tridiagonal<V: ControlPoint>(
    lower: &[f64],
    diag: &[f64],
    upper: &[f64],
    rhs: &[V],
) -> Result<Vec<V>> {
    let n = check_lengths(lower, diag, upper, rhs.len())?;
    if n < 3 {
        return Err(CagdError::InvalidArgument(format!(
            "cyclic tridiagonal system needs at least 3 rows, got {n}"
        )));
    }

    let alpha = upper[n - 1];
    let beta = lower[0];
    let gamma = -checked_pivot(diag[0], 0)?;

    let mut modified = diag.to_vec();
    modified[0] = diag[0] - gamma;
    modified[n - 1] = diag[n - 1] - alpha * beta / gamma;

    let x = solve_tridiagonal(lower, &modified, upper, rhs)?;

    let mut u = vec![0.0; n];
    u[0] = gamma;
    u[n - 1] = alpha;
    let z = solve_tridiagonal(lower, &modified, upper, &u)?;

    let denom = checked_pivot(1.0 + z[0] + beta * z[n - 1] / gamma, 0)?;
    let factor = (x[0] + x[n - 1] * (beta / gamma)) * (1.0 / denom);

    Ok(x.iter().zip(z).map(|(&xi, zi)| xi - factor * zi).collect())
}

fn check_lengths(lower: &[f64], diag: &[f64], upper: &[f64], rhs: usize) -> Result<usize> {
    let n = diag.len();
    if lower.len() != n || upper.len() != n || rhs != n {
        return Err(CagdError::InvalidArgument(format!(
            "tridiagonal system size mismatch: lower {}, diag {}, upper {}, rhs {}",
            lower.len(),
            n,
            upper.len(),
            rhs
        )));
    }
    Ok(n)
}

fn checked_pivot(pivot: f64, row: usize) -> Result<f64> {
    if pivot.abs() < PIVOT_EPSILON || !pivot.is_finite() {
        return Err(CagdError::NumericDegeneracy(format!(
            "singular tridiagonal system at row {row}"
        )));
    }
    Ok(pivot)
}
