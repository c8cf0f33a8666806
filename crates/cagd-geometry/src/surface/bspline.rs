//! Tensor-product B-spline surfaces.

use cagd_core::error::{CagdError, Result};
use cagd_core::traits::Validate;
use cagd_core::Tolerance;
use cagd_math::{ControlPoint, Point3};
use log::debug;
use serde::{Deserialize, Serialize};

use super::{BezierPatch, BezierPatches, Surface};
use crate::curve::BSplineCurve;
use crate::spline::{deboor, KnotVector};

/// Parameter direction of a tensor-product surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Along the rows of the control grid, parameter `u`.
    U,
    /// Along the columns of the control grid, parameter `v`.
    V,
}

/// A B-spline surface defined by degrees, knot vectors, and a 2D grid of control points.
///
/// `control_points[i][j]` is the control point at row `i` (u-direction) and column `j` (v-direction).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TensorProductSurface<P = Point3> {
    pub degree_u: usize,
    pub degree_v: usize,
    pub knots_u: KnotVector,
    pub knots_v: KnotVector,
    pub control_points: Vec<Vec<P>>,
}

impl<P: ControlPoint> TensorProductSurface<P> {
    pub fn new(
        degree_u: usize,
        degree_v: usize,
        knots_u: KnotVector,
        knots_v: KnotVector,
        control_points: Vec<Vec<P>>,
    ) -> Self {
        let n_u = control_points.len();
        let n_v = control_points.first().map_or(0, Vec::len);
        debug_assert!(
            knots_u.len() == n_u + degree_u + 1,
            "knots_u length mismatch: {} != {} + {} + 1",
            knots_u.len(),
            n_u,
            degree_u
        );
        debug_assert!(
            knots_v.len() == n_v + degree_v + 1,
            "knots_v length mismatch: {} != {} + {} + 1",
            knots_v.len(),
            n_v,
            degree_v
        );
        Self {
            degree_u,
            degree_v,
            knots_u,
            knots_v,
            control_points,
        }
    }

    /// Like [`TensorProductSurface::new`] but reports an invalid shape as an error.
    pub fn try_new(
        degree_u: usize,
        degree_v: usize,
        knots_u: KnotVector,
        knots_v: KnotVector,
        control_points: Vec<Vec<P>>,
    ) -> Result<Self> {
        let surface = Self {
            degree_u,
            degree_v,
            knots_u,
            knots_v,
            control_points,
        };
        surface.validate()?;
        Ok(surface)
    }

    pub fn degree(&self, direction: Direction) -> usize {
        match direction {
            Direction::U => self.degree_u,
            Direction::V => self.degree_v,
        }
    }

    pub fn knots(&self, direction: Direction) -> &KnotVector {
        match direction {
            Direction::U => &self.knots_u,
            Direction::V => &self.knots_v,
        }
    }

    /// Number of control points along `u` (rows) and `v` (columns).
    pub fn grid_size(&self) -> (usize, usize) {
        (
            self.control_points.len(),
            self.control_points.first().map_or(0, Vec::len),
        )
    }

    /// Supports `((a, b), (c, d))` of the `u` and `v` directions.
    pub fn support(&self) -> ((f64, f64), (f64, f64)) {
        (
            self.knots_u.domain(self.degree_u),
            self.knots_v.domain(self.degree_v),
        )
    }

    /// Surface point at `(u, v)` inside the closed support.
    pub fn evaluate(&self, u: f64, v: f64) -> Result<P> {
        self.evaluate_with_tolerance(u, v, Tolerance::default())
    }

    pub fn evaluate_with_tolerance(&self, u: f64, v: f64, tolerance: Tolerance) -> Result<P> {
        self.validate()?;
        let ((a, b), (c, d)) = self.support();
        let u = closed_parameter(u, a, b, tolerance)?;
        let v = closed_parameter(v, c, d, tolerance)?;
        Ok(self.de_boor((u, v), (1, 1))[0][0])
    }

    /// Tensor de Boor reduction.
    ///
    /// Every row is reduced along `v` to `stop.1` points, then each of the
    /// resulting `stop.1` columns is reduced along `u` to `stop.0` points.
    /// The result holds `stop.1` vectors of `stop.0` points.
    pub fn de_boor(&self, (u, v): (f64, f64), (stop_u, stop_v): (usize, usize)) -> Vec<Vec<P>> {
        let reduced_rows: Vec<Vec<P>> = self
            .control_points
            .iter()
            .map(|row| deboor::de_boor(self.degree_v, &self.knots_v, row, v, stop_v))
            .collect();

        (0..stop_v)
            .map(|col| {
                let column: Vec<P> = reduced_rows.iter().map(|row| row[col]).collect();
                deboor::de_boor(self.degree_u, &self.knots_u, &column, u, stop_u)
            })
            .collect()
    }

    /// Insert the knot `t` in `direction` without changing the surface.
    ///
    /// In `u` every column gains a point, so the grid gains a row; in `v`
    /// every row gains a point, so the grid gains a column.
    pub fn insert_knot(&mut self, direction: Direction, t: f64) -> Result<()> {
        self.validate()?;
        let (a, b) = self.knots(direction).domain(self.degree(direction));
        if !(a <= t && t < b) {
            return Err(CagdError::OutOfDomain {
                parameter: t,
                min: a,
                max: b,
            });
        }

        match direction {
            Direction::U => {
                let (_, n_v) = self.grid_size();
                let columns = (0..n_v).map(|j| {
                    self.control_points
                        .iter()
                        .map(|row| row[j])
                        .collect::<Vec<P>>()
                });
                let columns = insert_into_lines(self.degree_u, &self.knots_u, columns, t)?;
                let n_u = columns.first().map_or(0, Vec::len);
                self.control_points = (0..n_u)
                    .map(|i| columns.iter().map(|column| column[i]).collect())
                    .collect();
                self.knots_u.insert(t);
            }
            Direction::V => {
                let rows = self.control_points.iter().cloned();
                self.control_points = insert_into_lines(self.degree_v, &self.knots_v, rows, t)?;
                self.knots_v.insert(t);
            }
        }
        Ok(())
    }

    /// Raise every interior knot to multiplicity `degree` in both directions.
    ///
    /// Afterwards each non-empty knot span of a clamped surface is covered
    /// by its own `(degree_u + 1) x (degree_v + 1)` block of control points.
    pub fn refine_to_bezier(&mut self) -> Result<()> {
        self.validate()?;
        for direction in [Direction::U, Direction::V] {
            let inserted = self.raise_interior_multiplicities(direction)?;
            debug!("{:?}: inserted {} knots for Bezier extraction", direction, inserted);
        }
        Ok(())
    }

    /// Split a clamped surface into Bézier patches, row-major over the
    /// non-empty knot spans of `u` and `v`.
    pub fn to_bezier_patches(&self) -> Result<BezierPatches<P>> {
        self.validate()?;
        for direction in [Direction::U, Direction::V] {
            if !self.knots(direction).is_clamped(self.degree(direction)) {
                return Err(CagdError::InvalidShape(format!(
                    "Bezier extraction needs clamped knots, {:?} knots are {:?}",
                    direction,
                    self.knots(direction).as_slice()
                )));
            }
        }

        let mut refined = self.clone();
        refined.refine_to_bezier()?;

        let (du, dv) = (refined.degree_u, refined.degree_v);
        let (n_u, n_v) = refined.grid_size();
        if (n_u - 1) % du != 0 || (n_v - 1) % dv != 0 {
            return Err(CagdError::InvalidShape(format!(
                "a {}x{} grid of degree ({}, {}) does not split into patches",
                n_u, n_v, du, dv
            )));
        }

        let (patches_u, patches_v) = ((n_u - 1) / du, (n_v - 1) / dv);
        let mut patches = BezierPatches::new(patches_u, patches_v);
        for i in 0..patches_u {
            for j in 0..patches_v {
                let grid = refined.control_points[du * i..=du * (i + 1)]
                    .iter()
                    .map(|row| row[dv * j..=dv * (j + 1)].to_vec())
                    .collect();
                patches.append(BezierPatch::new(du, dv, grid));
            }
        }
        debug!(
            "split {}x{} surface into {}x{} Bezier patches",
            n_u, n_v, patches_u, patches_v
        );
        Ok(patches)
    }

    fn raise_interior_multiplicities(&mut self, direction: Direction) -> Result<usize> {
        let degree = self.degree(direction);
        let mut inserted = 0;
        let mut i = degree + 1;
        while i + degree + 1 < self.knots(direction).len() {
            let knots = self.knots(direction);
            let value = knots[i];
            let mut multiplicity =
                knots.multiplicity_in(value, degree + 1..knots.len() - degree - 1);
            while multiplicity < degree {
                self.insert_knot(direction, value)?;
                multiplicity += 1;
                inserted += 1;
            }
            i += 1;
        }
        Ok(inserted)
    }
}

/// Knot insertion on every line of control points, each through its own
/// temporary curve over a copy of `knots`.
fn insert_into_lines<P: ControlPoint>(
    degree: usize,
    knots: &KnotVector,
    lines: impl Iterator<Item = Vec<P>>,
    t: f64,
) -> Result<Vec<Vec<P>>> {
    lines
        .map(|line| {
            let mut curve = BSplineCurve::try_new(degree, knots.clone(), line)?;
            curve.insert_knot(t)?;
            Ok(curve.control_points)
        })
        .collect()
}

fn closed_parameter(t: f64, min: f64, max: f64, tolerance: Tolerance) -> Result<f64> {
    if !(tolerance.closed_end > 0.0) {
        return Err(CagdError::InvalidArgument(format!(
            "closed end offset must be positive, got {}",
            tolerance.closed_end
        )));
    }
    if !(min <= t && t <= max) {
        return Err(CagdError::OutOfDomain {
            parameter: t,
            min,
            max,
        });
    }
    Ok(tolerance.left_limit(t, max))
}

impl<P: ControlPoint> Validate for TensorProductSurface<P> {
    fn validate(&self) -> Result<()> {
        let (n_u, n_v) = self.grid_size();
        if n_u == 0 || n_v == 0 {
            return Err(CagdError::InvalidShape("empty control grid".into()));
        }
        if let Some(i) = self.control_points.iter().position(|row| row.len() != n_v) {
            return Err(CagdError::InvalidShape(format!(
                "row {} has {} control points, expected {}",
                i,
                self.control_points[i].len(),
                n_v
            )));
        }
        for (direction, count) in [(Direction::U, n_u), (Direction::V, n_v)] {
            let degree = self.degree(direction);
            let knots = self.knots(direction);
            if degree < 1 {
                return Err(CagdError::InvalidShape(format!(
                    "{:?} degree must be at least 1",
                    direction
                )));
            }
            knots.validate()?;
            if knots.len() != count + degree + 1 {
                return Err(CagdError::InvalidShape(format!(
                    "{} {:?} knots do not match {} control points of degree {}",
                    knots.len(),
                    direction,
                    count,
                    degree
                )));
            }
        }
        Ok(())
    }
}

impl<P: ControlPoint + Send + Sync> Surface for TensorProductSurface<P> {
    type Point = P;

    fn point_at(&self, u: f64, v: f64) -> Result<P> {
        self.evaluate(u, v)
    }

    fn domain_u(&self) -> (f64, f64) {
        self.knots_u.domain(self.degree_u)
    }

    fn domain_v(&self) -> (f64, f64) {
        self.knots_v.domain(self.degree_v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cagd_math::{dvec3, DVec3};

    fn bilinear_surface() -> TensorProductSurface {
        TensorProductSurface::new(
            1,
            1,
            KnotVector::new(vec![0.0, 0.0, 1.0, 1.0]),
            KnotVector::new(vec![0.0, 0.0, 1.0, 1.0]),
            vec![
                vec![DVec3::new(0.0, 0.0, 0.0), DVec3::new(1.0, 0.0, 0.0)],
                vec![DVec3::new(0.0, 1.0, 0.0), DVec3::new(1.0, 1.0, 0.0)],
            ],
        )
    }

    /// Quadratic in `u`, cubic in `v`, one interior knot per direction.
    fn mixed_surface() -> TensorProductSurface {
        let control_points = (0..4)
            .map(|i| {
                (0..5)
                    .map(|j| {
                        let (x, y) = (i as f64, j as f64);
                        dvec3(x, y, ((i * 3 + j * 7) % 5) as f64 - 2.0)
                    })
                    .collect()
            })
            .collect();
        TensorProductSurface::new(
            2,
            3,
            KnotVector::new(vec![0.0, 0.0, 0.0, 1.0, 2.0, 2.0, 2.0]),
            KnotVector::new(vec![0.0, 0.0, 0.0, 0.0, 0.5, 1.0, 1.0, 1.0, 1.0]),
            control_points,
        )
    }

    fn grid(surface: &TensorProductSurface) -> Vec<(f64, f64)> {
        let ((a, b), (c, d)) = surface.support();
        let mut params = Vec::new();
        for i in 0..=10 {
            for j in 0..=10 {
                params.push((
                    a + (b - a) * i as f64 / 10.0,
                    c + (d - c) * j as f64 / 10.0,
                ));
            }
        }
        params
    }

    #[test]
    fn test_bilinear_corners_and_center() {
        let surf = bilinear_surface();
        let p00 = surf.evaluate(0.0, 0.0).unwrap();
        assert!((p00 - DVec3::new(0.0, 0.0, 0.0)).length() < 1e-10);

        let p01 = surf.evaluate(0.0, 1.0).unwrap();
        assert!((p01 - DVec3::new(1.0, 0.0, 0.0)).length() < 1e-5);

        let p11 = surf.evaluate(1.0, 1.0).unwrap();
        assert!((p11 - DVec3::new(1.0, 1.0, 0.0)).length() < 1e-5);

        let p = surf.evaluate(0.5, 0.5).unwrap();
        assert!((p - DVec3::new(0.5, 0.5, 0.0)).length() < 1e-10);
    }

    #[test]
    fn test_out_of_domain_per_axis() {
        let surf = mixed_surface();
        assert!(matches!(
            surf.evaluate(2.5, 0.5),
            Err(CagdError::OutOfDomain { max, .. }) if max == 2.0
        ));
        assert!(matches!(
            surf.evaluate(1.0, 1.5),
            Err(CagdError::OutOfDomain { max, .. }) if max == 1.0
        ));
    }

    #[test]
    fn test_validate() {
        assert!(mixed_surface().is_valid());

        let mut ragged = mixed_surface();
        ragged.control_points[2].pop();
        assert!(matches!(ragged.validate(), Err(CagdError::InvalidShape(_))));

        let mut short = mixed_surface();
        short.knots_u.remove(0);
        assert!(short.validate().is_err());

        let empty = TensorProductSurface::<DVec3>::try_new(
            1,
            1,
            KnotVector::new(vec![]),
            KnotVector::new(vec![]),
            vec![],
        );
        assert!(empty.is_err());
    }

    #[test]
    fn test_de_boor_shape() {
        let surf = mixed_surface();
        let reduced = surf.de_boor((0.5, 0.25), (2, 3));
        assert_eq!(reduced.len(), 3);
        assert!(reduced.iter().all(|column| column.len() == 2));
    }

    #[test]
    fn test_insert_knot_u_preserves_surface() {
        let mut surf = mixed_surface();
        let before = surf.clone();
        surf.insert_knot(Direction::U, 0.4).unwrap();

        assert_eq!(surf.grid_size(), (5, 5));
        assert_eq!(surf.knots_u.len(), before.knots_u.len() + 1);
        assert_eq!(surf.knots_v, before.knots_v);
        for (u, v) in grid(&before) {
            let diff = surf.evaluate(u, v).unwrap() - before.evaluate(u, v).unwrap();
            assert!(diff.length() < 1e-9, "({u}, {v}): {diff}");
        }
    }

    #[test]
    fn test_insert_knot_v_preserves_surface() {
        let mut surf = mixed_surface();
        let before = surf.clone();
        surf.insert_knot(Direction::V, 0.5).unwrap();
        surf.insert_knot(Direction::V, 0.8).unwrap();

        assert_eq!(surf.grid_size(), (4, 7));
        assert_eq!(surf.knots_u, before.knots_u);
        for (u, v) in grid(&before) {
            let diff = surf.evaluate(u, v).unwrap() - before.evaluate(u, v).unwrap();
            assert!(diff.length() < 1e-9, "({u}, {v}): {diff}");
        }
    }

    #[test]
    fn test_insert_knot_outside_support() {
        let mut surf = mixed_surface();
        assert!(surf.insert_knot(Direction::U, 2.0).is_err());
        assert!(surf.insert_knot(Direction::V, -0.1).is_err());
        assert_eq!(surf, mixed_surface());
    }

    #[test]
    fn test_refine_to_bezier_multiplicities() {
        let mut surf = mixed_surface();
        surf.refine_to_bezier().unwrap();
        assert_eq!(
            surf.knots_u.as_slice(),
            &[0.0, 0.0, 0.0, 1.0, 1.0, 2.0, 2.0, 2.0]
        );
        assert_eq!(
            surf.knots_v.as_slice(),
            &[0.0, 0.0, 0.0, 0.0, 0.5, 0.5, 0.5, 1.0, 1.0, 1.0, 1.0]
        );
        assert_eq!(surf.grid_size(), (5, 7));
    }

    #[test]
    fn test_bezier_patches_match_surface() {
        let surf = mixed_surface();
        let patches = surf.to_bezier_patches().unwrap();
        assert_eq!(patches.dimensions(), (2, 2));
        assert_eq!(patches.len(), 4);

        let spans_u = [(0.0, 1.0), (1.0, 2.0)];
        let spans_v = [(0.0, 0.5), (0.5, 1.0)];
        for (i, &(u0, u1)) in spans_u.iter().enumerate() {
            for (j, &(v0, v1)) in spans_v.iter().enumerate() {
                let patch = patches.get(i, j).unwrap();
                assert_eq!(patch.control_points.len(), 3);
                assert_eq!(patch.control_points[0].len(), 4);
                for k in 0..=4 {
                    for l in 0..=4 {
                        let (s, r) = (k as f64 / 4.0, l as f64 / 4.0);
                        let on_patch = patch.evaluate(s, r).unwrap();
                        let on_surface = surf
                            .evaluate(u0 + s * (u1 - u0), v0 + r * (v1 - v0))
                            .unwrap();
                        assert!(
                            (on_patch - on_surface).length() < 1e-4,
                            "patch ({i}, {j}) at ({s}, {r})"
                        );
                    }
                }
            }
        }
        // The input is left untouched
        assert_eq!(surf, mixed_surface());
    }

    #[test]
    fn test_bezier_patches_need_clamped_knots() {
        let control_points = vec![vec![dvec3(0.0, 0.0, 0.0); 4]; 4];
        let surf = TensorProductSurface::new(
            2,
            2,
            KnotVector::uniform(7),
            KnotVector::uniform(7),
            control_points,
        );
        assert!(matches!(
            surf.to_bezier_patches(),
            Err(CagdError::InvalidShape(_))
        ));
    }

    #[test]
    fn test_evaluate_checks_shape_and_tolerance() {
        let mut ragged = mixed_surface();
        ragged.control_points[1].pop();
        assert!(matches!(
            ragged.evaluate(0.5, 0.5),
            Err(CagdError::InvalidShape(_))
        ));

        let surf = mixed_surface();
        assert!(matches!(
            surf.evaluate_with_tolerance(2.0, 1.0, Tolerance::new(0.0, 1e-9)),
            Err(CagdError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_surface_trait_view() {
        let surf = mixed_surface();
        let view: &dyn Surface<Point = DVec3> = &surf;
        assert_eq!(view.domain_u(), (0.0, 2.0));
        assert_eq!(view.domain_v(), (0.0, 1.0));
        assert_eq!(view.point_at(1.0, 0.5).unwrap(), surf.evaluate(1.0, 0.5).unwrap());
    }
}
