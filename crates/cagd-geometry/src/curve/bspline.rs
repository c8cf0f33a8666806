//! B-spline curve: evaluation, tangents, knot insertion and sampling.

use cagd_core::error::{CagdError, Result};
use cagd_core::traits::{BoundingBox, Validate};
use cagd_core::Tolerance;
use cagd_math::{Aabb2, ControlPoint, Point2, Polyline};
use serde::{Deserialize, Serialize};

use super::Curve;
use crate::spline::{deboor, KnotVector};

/// A B-spline curve defined by degree, knot vector, and control points.
///
/// The curve is supported on `[knots[degree], knots[len - degree - 1])`.
/// The upper end is evaluated as a left limit, so the support is usable as a
/// closed interval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BSplineCurve<P = Point2> {
    pub degree: usize,
    pub knots: KnotVector,
    pub control_points: Vec<P>,
}

impl<P: ControlPoint> BSplineCurve<P> {
    pub fn new(degree: usize, knots: KnotVector, control_points: Vec<P>) -> Self {
        debug_assert!(degree >= 1, "B-spline degree must be at least 1");
        debug_assert!(
            knots.len() == control_points.len() + degree + 1,
            "Knot vector length must be n + p + 1, got {} knots for {} CPs with degree {}",
            knots.len(),
            control_points.len(),
            degree
        );
        Self {
            degree,
            knots,
            control_points,
        }
    }

    /// Like [`BSplineCurve::new`] but reports an invalid shape as an error.
    pub fn try_new(degree: usize, knots: KnotVector, control_points: Vec<P>) -> Result<Self> {
        let curve = Self {
            degree,
            knots,
            control_points,
        };
        curve.validate()?;
        Ok(curve)
    }

    /// The interval `[a, b)` on which the curve is supported.
    pub fn support(&self) -> (f64, f64) {
        self.knots.domain(self.degree)
    }

    /// Curve point at `t`, which must lie in the closed support `[a, b]`.
    pub fn evaluate(&self, t: f64) -> Result<P> {
        self.evaluate_with_tolerance(t, Tolerance::default())
    }

    pub fn evaluate_with_tolerance(&self, t: f64, tolerance: Tolerance) -> Result<P> {
        let t = self.closed_parameter(t, tolerance)?;
        Ok(self.de_boor(t, 1)[0])
    }

    /// Secant of the last de Boor level at `t`.
    ///
    /// Points along the derivative; its length is the derivative scaled by
    /// the local knot span, not the derivative itself.
    pub fn tangent(&self, t: f64) -> Result<P> {
        self.tangent_with_tolerance(t, Tolerance::default())
    }

    pub fn tangent_with_tolerance(&self, t: f64, tolerance: Tolerance) -> Result<P> {
        let t = self.closed_parameter(t, tolerance)?;
        let last_two = self.de_boor(t, 2);
        Ok(last_two[1] - last_two[0])
    }

    /// De Boor reduction at `t` stopped when `stop` points are left.
    ///
    /// # Panics
    ///
    /// If the curve is malformed or `t` is outside the support; the checked
    /// entry points are [`evaluate`](Self::evaluate) and
    /// [`tangent`](Self::tangent).
    pub fn de_boor(&self, t: f64, stop: usize) -> Vec<P> {
        deboor::de_boor(self.degree, &self.knots, &self.control_points, t, stop)
    }

    /// Insert the knot `t` without changing the shape of the curve.
    ///
    /// `degree` new control points replace the `degree - 1` old ones around
    /// the span of `t`, so the curve gains one knot and one control point.
    pub fn insert_knot(&mut self, t: f64) -> Result<()> {
        self.validate()?;
        let (a, b) = self.support();
        if !(a <= t && t < b) {
            return Err(CagdError::OutOfDomain {
                parameter: t,
                min: a,
                max: b,
            });
        }

        let new_points = self.de_boor(t, self.degree);
        let k = self.knots.knot_index(t);
        self.control_points.splice(k + 1 - self.degree..k, new_points);
        self.knots.insert(t);
        Ok(())
    }

    /// The control polygon as a polyline.
    pub fn control_polygon(&self) -> Polyline<P> {
        self.control_points.iter().copied().collect()
    }

    /// Sample every non-empty knot span in the support with `num_samples`
    /// uniform steps.
    ///
    /// The first point is the start of the support; consecutive points are
    /// the line segments approximating the curve.
    pub fn sample(&self, num_samples: usize) -> Result<Polyline<P>> {
        if num_samples == 0 {
            return Err(CagdError::InvalidArgument(
                "at least one sample per knot span is required".into(),
            ));
        }

        self.validate()?;

        let end = self.knots.len() - self.degree - 1;
        let mut polyline = Polyline::with_capacity(end.saturating_sub(self.degree) * num_samples + 1);
        for i in self.degree..end {
            let (k0, k1) = (self.knots[i], self.knots[i + 1]);
            if k0 == k1 {
                continue;
            }
            if polyline.is_empty() {
                polyline.append_point(self.evaluate(k0)?);
            }
            for j in 1..=num_samples {
                let t = k0 + j as f64 / num_samples as f64 * (k1 - k0);
                polyline.append_point(self.evaluate(t)?);
            }
        }
        Ok(polyline)
    }

    fn closed_parameter(&self, t: f64, tolerance: Tolerance) -> Result<f64> {
        if !(tolerance.closed_end > 0.0) {
            return Err(CagdError::InvalidArgument(format!(
                "closed end offset must be positive, got {}",
                tolerance.closed_end
            )));
        }
        self.check_counts()?;

        let (a, b) = self.support();
        if !(a <= t && t <= b) {
            return Err(CagdError::OutOfDomain {
                parameter: t,
                min: a,
                max: b,
            });
        }

        let t = tolerance.left_limit(t, b);
        let k = self.knots.knot_index(t);
        if k < self.degree || k >= self.control_points.len() {
            return Err(CagdError::InvalidShape(format!(
                "t = {} falls in knot span {} outside of {} control points of degree {}",
                t,
                k,
                self.control_points.len(),
                self.degree
            )));
        }
        Ok(t)
    }

    /// Degree and knot count, without the ordering check of [`Validate`].
    fn check_counts(&self) -> Result<()> {
        if self.degree < 1 {
            return Err(CagdError::InvalidShape("degree must be at least 1".into()));
        }
        if self.knots.len() != self.control_points.len() + self.degree + 1 {
            return Err(CagdError::InvalidShape(format!(
                "{} knots do not match {} control points of degree {}",
                self.knots.len(),
                self.control_points.len(),
                self.degree
            )));
        }
        Ok(())
    }
}

impl BSplineCurve<Point2> {
    /// Componentwise extent of the control points.
    ///
    /// By the convex hull property this box also contains the curve.
    pub fn axis_aligned_bounding_box(&self) -> Option<Aabb2> {
        Aabb2::from_points(&self.control_points)
    }
}

impl BoundingBox for BSplineCurve<Point2> {
    type Point = Point2;

    fn bounding_box(&self) -> Option<(Point2, Point2)> {
        self.axis_aligned_bounding_box().map(|aabb| (aabb.min, aabb.max))
    }
}

impl<P: ControlPoint> Validate for BSplineCurve<P> {
    fn validate(&self) -> Result<()> {
        self.check_counts()?;
        self.knots.validate()
    }
}

impl<P: ControlPoint + Send + Sync> Curve for BSplineCurve<P> {
    type Point = P;

    fn point_at(&self, t: f64) -> Result<P> {
        self.evaluate(t)
    }

    fn tangent_at(&self, t: f64) -> Result<P> {
        self.tangent(t)
    }

    fn domain(&self) -> (f64, f64) {
        self.support()
    }
}
