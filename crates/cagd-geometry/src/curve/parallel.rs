//! Approximate offset ("parallel") curves of planar cubic B-splines.

use cagd_core::error::{CagdError, Result};
use cagd_core::Tolerance;
use cagd_math::{dvec2, Point2};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use super::{BSplineCurve, Parametrization};

/// Options for [`BSplineCurve::generate_parallel`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParallelOptions {
    /// Signed offset distance; positive values offset to the right of the
    /// direction of travel.
    distance: f64,
    /// Largest accepted deviation from `|distance|` at the span midpoints.
    tolerance: f64,
    /// Number of refinement rounds before giving up.
    max_iterations: usize,
}

impl Default for ParallelOptions {
    fn default() -> Self {
        Self {
            distance: 0.0,
            tolerance: 1e-3,
            max_iterations: 16,
        }
    }
}

impl ParallelOptions {
    pub fn new(distance: f64, tolerance: f64) -> Self {
        Self::default()
            .with_distance(distance)
            .with_tolerance(tolerance)
    }

    pub fn distance(&self) -> f64 {
        self.distance
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    pub fn with_distance(mut self, distance: f64) -> Self {
        self.distance = distance;
        self
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }
}

impl BSplineCurve<Point2> {
    /// Cubic curve approximating the offset of `self` at `options.distance()`.
    ///
    /// The offset is interpolated through points displaced along the normal
    /// at every interior knot. The `i`-th interior knot of the offset curve
    /// corresponds to the `i`-th interior knot of `self`; wherever the
    /// distance between corresponding span midpoints deviates from the
    /// requested distance by more than the tolerance, a knot is inserted into
    /// `self` and the offset is rebuilt. Knot insertion leaves the shape of
    /// `self` unchanged; only its knot vector grows.
    pub fn generate_parallel(&mut self, options: &ParallelOptions) -> Result<Self> {
        if self.degree != 3 {
            return Err(CagdError::InvalidArgument(format!(
                "parallel curves need a cubic curve, got degree {}",
                self.degree
            )));
        }
        if !(options.tolerance() > 0.0) {
            return Err(CagdError::InvalidArgument(format!(
                "tolerance must be positive, got {}",
                options.tolerance()
            )));
        }

        let distance = options.distance();
        let mut parallel = self.offset_through_knots(distance)?;
        let mut rounds = 0;
        loop {
            let failing: Vec<f64> = self
                .midpoint_deviations(&parallel, distance)?
                .into_iter()
                .filter(|&(_, deviation)| deviation > options.tolerance())
                .map(|(t, _)| t)
                .collect();

            if failing.is_empty() {
                debug!(
                    "parallel curve at distance {} converged after {} rounds with {} knots",
                    distance,
                    rounds,
                    self.knots.len()
                );
                return Ok(parallel);
            }
            if rounds == options.max_iterations() {
                warn!(
                    "parallel curve at distance {} still has {} spans out of tolerance after {} rounds",
                    distance,
                    failing.len(),
                    rounds
                );
                return Err(CagdError::NonConvergence { iterations: rounds });
            }

            rounds += 1;
            debug!(
                "round {}: refining {} of {} spans",
                rounds,
                failing.len(),
                self.knots.interior(self.degree).len() - 1
            );
            for t in failing {
                self.insert_knot(t)?;
            }
            parallel = self.offset_through_knots(distance)?;
        }
    }

    /// Largest deviation of the midpoint distance between `self` and
    /// `parallel` from `|distance|`, over all pairs of interior knot spans.
    pub fn parallel_deviation(&self, parallel: &Self, distance: f64) -> Result<f64> {
        Ok(self
            .midpoint_deviations(parallel, distance)?
            .into_iter()
            .map(|(_, deviation)| deviation)
            .fold(0.0, f64::max))
    }

    /// `(midpoint of the span in self, deviation)` for every interior span.
    fn midpoint_deviations(&self, parallel: &Self, distance: f64) -> Result<Vec<(f64, f64)>> {
        let base = self.knots.interior(self.degree);
        let offset = parallel.knots.interior(parallel.degree);
        if base.len() != offset.len() {
            return Err(CagdError::InvalidShape(format!(
                "{} interior knots cannot be paired with {} offset knots",
                base.len(),
                offset.len()
            )));
        }

        base.windows(2)
            .zip(offset.windows(2))
            .map(|(b, o)| {
                let mid_base = 0.5 * (b[0] + b[1]);
                let mid_offset = 0.5 * (o[0] + o[1]);
                let gap = self
                    .evaluate(mid_base)?
                    .distance(parallel.evaluate(mid_offset)?);
                Ok((mid_base, (gap - distance.abs()).abs()))
            })
            .collect()
    }

    /// Chordal cubic through the offset points at every interior knot.
    fn offset_through_knots(&self, distance: f64) -> Result<Self> {
        let points = self
            .knots
            .interior(self.degree)
            .iter()
            .map(|&t| {
                let p = self.evaluate(t)?;
                let tangent = self.tangent(t)?;
                let length = tangent.length();
                if Tolerance::default().is_zero(length) {
                    return Err(CagdError::NumericDegeneracy(format!(
                        "vanishing tangent at t = {t}"
                    )));
                }
                Ok(p + dvec2(tangent.y, -tangent.x) * (distance / length))
            })
            .collect::<Result<Vec<_>>>()?;

        Self::interpolate_cubic(Parametrization::Chordal, &points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spline::KnotVector;

    fn straight_line() -> BSplineCurve {
        let points: Vec<_> = (0..5).map(|i| dvec2(i as f64, 0.0)).collect();
        BSplineCurve::interpolate_cubic(Parametrization::Chordal, &points).unwrap()
    }

    #[test]
    fn test_options_builder() {
        let options = ParallelOptions::new(0.5, 0.01).with_max_iterations(3);
        assert_eq!(options.distance(), 0.5);
        assert_eq!(options.tolerance(), 0.01);
        assert_eq!(options.max_iterations(), 3);
        assert_eq!(ParallelOptions::default().max_iterations(), 16);
    }

    #[test]
    fn test_straight_line_offsets_exactly() {
        let mut line = straight_line();
        let knots_before = line.knots.clone();

        let parallel = line.generate_parallel(&ParallelOptions::new(0.5, 1e-6)).unwrap();

        // Nothing to refine on a straight line
        assert_eq!(line.knots, knots_before);
        for i in 0..=16 {
            let t = 4.0 * i as f64 / 16.0;
            let p = parallel.evaluate(t).unwrap();
            assert!((p.y + 0.5).abs() < 1e-9, "t = {t}: {p}");
        }
        assert!(line.parallel_deviation(&parallel, 0.5).unwrap() < 1e-9);
    }

    #[test]
    fn test_negative_distance_offsets_to_the_left() {
        let mut line = straight_line();
        let parallel = line.generate_parallel(&ParallelOptions::new(-0.5, 1e-6)).unwrap();
        let p = parallel.evaluate(2.0).unwrap();
        assert!((p - dvec2(2.0, 0.5)).length() < 1e-9);
    }

    #[test]
    fn test_rejects_non_cubic() {
        let mut quadratic = BSplineCurve::new(
            2,
            KnotVector::new(vec![0.0, 0.0, 0.0, 1.0, 1.0, 1.0]),
            vec![dvec2(0.0, 0.0), dvec2(1.0, 1.0), dvec2(2.0, 0.0)],
        );
        let result = quadratic.generate_parallel(&ParallelOptions::new(0.1, 0.01));
        assert!(matches!(result, Err(CagdError::InvalidArgument(_))));
    }

    #[test]
    fn test_rejects_non_positive_tolerance() {
        let mut line = straight_line();
        let result = line.generate_parallel(&ParallelOptions::new(0.1, 0.0));
        assert!(matches!(result, Err(CagdError::InvalidArgument(_))));
    }

    #[test]
    fn test_reports_non_convergence() {
        let points = vec![
            dvec2(0.0, 0.0),
            dvec2(1.0, 1.0),
            dvec2(2.0, -1.0),
            dvec2(3.0, 1.0),
            dvec2(4.0, 0.0),
        ];
        let mut curve = BSplineCurve::interpolate_cubic(Parametrization::Chordal, &points).unwrap();
        let original = curve.clone();

        let options = ParallelOptions::new(0.2, 1e-12).with_max_iterations(0);
        let result = curve.generate_parallel(&options);
        assert_eq!(result, Err(CagdError::NonConvergence { iterations: 0 }));
        assert_eq!(curve, original);
    }
}
