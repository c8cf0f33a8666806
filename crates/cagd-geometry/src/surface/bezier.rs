//! Bézier patches produced by splitting a B-spline surface.

use cagd_core::error::{CagdError, Result};
use cagd_math::{ControlPoint, Point3};
use serde::{Deserialize, Serialize};

/// A tensor-product Bézier patch on `[0, 1] x [0, 1]`.
///
/// `control_points[k][l]` has `degree_u + 1` rows and `degree_v + 1` columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BezierPatch<P = Point3> {
    pub degree_u: usize,
    pub degree_v: usize,
    pub control_points: Vec<Vec<P>>,
}

impl<P: ControlPoint> BezierPatch<P> {
    pub fn new(degree_u: usize, degree_v: usize, control_points: Vec<Vec<P>>) -> Self {
        debug_assert!(
            control_points.len() == degree_u + 1
                && control_points.iter().all(|row| row.len() == degree_v + 1),
            "Bezier patch of degree ({}, {}) needs a {}x{} control grid",
            degree_u,
            degree_v,
            degree_u + 1,
            degree_v + 1
        );
        Self {
            degree_u,
            degree_v,
            control_points,
        }
    }

    /// Evaluate with de Casteljau along `v` in every row, then along `u`.
    pub fn evaluate(&self, u: f64, v: f64) -> Result<P> {
        for t in [u, v] {
            if !(0.0..=1.0).contains(&t) {
                return Err(CagdError::OutOfDomain {
                    parameter: t,
                    min: 0.0,
                    max: 1.0,
                });
            }
        }
        let column: Vec<P> = self
            .control_points
            .iter()
            .map(|row| de_casteljau(row, v))
            .collect();
        Ok(de_casteljau(&column, u))
    }
}

fn de_casteljau<P: ControlPoint>(points: &[P], t: f64) -> P {
    let mut d = points.to_vec();
    for level in 1..d.len() {
        for j in 0..d.len() - level {
            d[j] = d[j].lerp_to(d[j + 1], t);
        }
    }
    d[0]
}

/// Bézier patches in row-major order of their `(u, v)` patch indices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BezierPatches<P = Point3> {
    patches_u: usize,
    patches_v: usize,
    patches: Vec<BezierPatch<P>>,
}

impl<P> BezierPatches<P> {
    /// Empty collection laid out as `patches_u x patches_v`.
    pub fn new(patches_u: usize, patches_v: usize) -> Self {
        Self {
            patches_u,
            patches_v,
            patches: Vec::with_capacity(patches_u * patches_v),
        }
    }

    pub fn append(&mut self, patch: BezierPatch<P>) {
        self.patches.push(patch);
    }

    /// Number of patches along `(u, v)`.
    pub fn dimensions(&self) -> (usize, usize) {
        (self.patches_u, self.patches_v)
    }

    pub fn len(&self) -> usize {
        self.patches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patches.is_empty()
    }

    /// Patch `i` along `u` and `j` along `v`.
    pub fn get(&self, i: usize, j: usize) -> Option<&BezierPatch<P>> {
        if i >= self.patches_u || j >= self.patches_v {
            return None;
        }
        self.patches.get(i * self.patches_v + j)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, BezierPatch<P>> {
        self.patches.iter()
    }
}

impl<'a, P> IntoIterator for &'a BezierPatches<P> {
    type Item = &'a BezierPatch<P>;
    type IntoIter = std::slice::Iter<'a, BezierPatch<P>>;

    fn into_iter(self) -> Self::IntoIter {
        self.patches.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cagd_math::dvec3;

    fn saddle() -> BezierPatch {
        BezierPatch::new(
            1,
            2,
            vec![
                vec![dvec3(0.0, 0.0, 0.0), dvec3(0.0, 0.5, 1.0), dvec3(0.0, 1.0, 0.0)],
                vec![dvec3(1.0, 0.0, 0.0), dvec3(1.0, 0.5, -1.0), dvec3(1.0, 1.0, 0.0)],
            ],
        )
    }

    #[test]
    fn test_patch_corners_and_center() {
        let patch = saddle();
        assert_eq!(patch.evaluate(0.0, 0.0).unwrap(), dvec3(0.0, 0.0, 0.0));
        assert_eq!(patch.evaluate(1.0, 1.0).unwrap(), dvec3(1.0, 1.0, 0.0));

        // z = (1 - u) * 0.5 - u * 0.5 at v = 0.5
        let p = patch.evaluate(0.25, 0.5).unwrap();
        assert!((p - dvec3(0.25, 0.5, 0.25)).length() < 1e-12);
    }

    #[test]
    fn test_patch_out_of_domain() {
        assert!(saddle().evaluate(1.5, 0.0).is_err());
        assert!(saddle().evaluate(0.0, -0.1).is_err());
    }

    #[test]
    fn test_patches_row_major() {
        let mut patches = BezierPatches::new(2, 3);
        assert!(patches.is_empty());
        for i in 0..6 {
            let mut patch = saddle();
            patch.control_points[0][0] = dvec3(i as f64, 0.0, 0.0);
            patches.append(patch);
        }
        assert_eq!(patches.len(), 6);
        assert_eq!(patches.dimensions(), (2, 3));
        assert_eq!(
            patches.get(1, 0).unwrap().control_points[0][0],
            dvec3(3.0, 0.0, 0.0)
        );
        assert!(patches.get(2, 0).is_none());
        assert_eq!(patches.iter().count(), 6);
    }
}
