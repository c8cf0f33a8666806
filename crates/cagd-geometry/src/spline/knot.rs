//! Knot vectors for B-spline curves and surfaces.

use std::ops::{Index, Range};

use cagd_core::error::{CagdError, Result};
use cagd_core::traits::Validate;
use serde::{Deserialize, Serialize};

/// A non-decreasing sequence of knots `u_0 <= u_1 <= ... <= u_{n-1}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnotVector(Vec<f64>);

impl KnotVector {
    /// Wrap an already filled knot sequence. Ordering is checked by [`Validate`].
    pub fn new(knots: Vec<f64>) -> Self {
        Self(knots)
    }

    /// Clamped knot vector `[t0; degree], nodes..., [tn; degree]`.
    ///
    /// The first and last node end up with multiplicity `degree + 1`.
    pub fn clamped(nodes: &[f64], degree: usize) -> Self {
        let mut knots = Vec::with_capacity(nodes.len() + 2 * degree);
        if let (Some(&first), Some(&last)) = (nodes.first(), nodes.last()) {
            knots.extend(std::iter::repeat(first).take(degree));
            knots.extend_from_slice(nodes);
            knots.extend(std::iter::repeat(last).take(degree));
        }
        Self(knots)
    }

    /// Uniform knots `0, 1, ..., n - 1`.
    pub fn uniform(n: usize) -> Self {
        Self((0..n).map(|i| i as f64).collect())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn first(&self) -> Option<f64> {
        self.0.first().copied()
    }

    pub fn last(&self) -> Option<f64> {
        self.0.last().copied()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, f64> {
        self.0.iter()
    }

    /// Overwrite the knot at `index`. Ordering is not re-checked.
    pub fn set(&mut self, index: usize, value: f64) {
        self.0[index] = value;
    }

    /// Delete the knot at `index`, shifting later knots down by one.
    pub fn remove(&mut self, index: usize) -> f64 {
        self.0.remove(index)
    }

    /// Insert `t` before the first knot that is `>= t` and return its index.
    ///
    /// Appends when `t` is greater than every knot.
    pub fn insert(&mut self, t: f64) -> usize {
        let index = self.0.iter().position(|&k| k >= t).unwrap_or(self.0.len());
        self.0.insert(index, t);
        index
    }

    /// Index `i` of the half-open span `[knots[i], knots[i+1])` containing `v`.
    ///
    /// When no span contains `v` (it sits on the closed upper end), the span
    /// ending at the first occurrence of the maximum knot is returned. Values
    /// outside `[first, last]` have no meaningful span; callers check the
    /// support first.
    pub fn knot_index(&self, v: f64) -> usize {
        if let Some(i) = self.0.windows(2).position(|w| w[0] <= v && v < w[1]) {
            return i;
        }

        let max = self.0.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let first_max = self.0.iter().position(|&k| k == max).unwrap_or(0);
        first_max.saturating_sub(1)
    }

    /// Parameter domain `(knots[degree], knots[len - degree - 1])`.
    pub fn domain(&self, degree: usize) -> (f64, f64) {
        (self.0[degree], self.0[self.0.len() - degree - 1])
    }

    /// Knots inside the domain, `knots[degree..len - degree]`.
    pub fn interior(&self, degree: usize) -> &[f64] {
        &self.0[degree..self.0.len() - degree]
    }

    /// Number of knots equal to `value` within the index `range`.
    pub fn multiplicity_in(&self, value: f64, range: Range<usize>) -> usize {
        let end = range.end.min(self.0.len());
        let start = range.start.min(end);
        self.0[start..end]
            .iter()
            .take_while(|&&k| k <= value)
            .filter(|&&k| k == value)
            .count()
    }

    /// Whether both end knots repeat more than `degree` times.
    pub fn is_clamped(&self, degree: usize) -> bool {
        let (Some(first), Some(last)) = (self.first(), self.last()) else {
            return false;
        };
        let n = self.0.len();
        n > 2 * degree + 1
            && self.0[..=degree].iter().all(|&k| k == first)
            && self.0[n - degree - 1..].iter().all(|&k| k == last)
    }
}

impl Validate for KnotVector {
    fn validate(&self) -> Result<()> {
        for (i, w) in self.0.windows(2).enumerate() {
            if w[1] < w[0] || w[0].is_nan() || w[1].is_nan() {
                return Err(CagdError::InvalidShape(format!(
                    "knot {} ({}) is smaller than knot {} ({})",
                    i + 1,
                    w[1],
                    i,
                    w[0]
                )));
            }
        }
        Ok(())
    }
}

impl Index<usize> for KnotVector {
    type Output = f64;

    fn index(&self, index: usize) -> &f64 {
        &self.0[index]
    }
}

impl From<Vec<f64>> for KnotVector {
    fn from(knots: Vec<f64>) -> Self {
        Self(knots)
    }
}

impl<'a> IntoIterator for &'a KnotVector {
    type Item = &'a f64;
    type IntoIter = std::slice::Iter<'a, f64>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Fixed-length knot buffer filled slot by slot, then validated once.
#[derive(Debug, Clone, PartialEq)]
pub struct KnotVectorBuilder {
    slots: Vec<Option<f64>>,
}

impl KnotVectorBuilder {
    /// Allocate `len` unset slots.
    pub fn with_len(len: usize) -> Self {
        Self {
            slots: vec![None; len],
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<f64> {
        self.slots.get(index).copied().flatten()
    }

    pub fn set(&mut self, index: usize, value: f64) -> &mut Self {
        self.slots[index] = Some(value);
        self
    }

    /// Finish construction; fails on unset slots or decreasing knots.
    pub fn build(self) -> Result<KnotVector> {
        let knots = self
            .slots
            .iter()
            .enumerate()
            .map(|(i, slot)| {
                slot.ok_or_else(|| CagdError::InvalidShape(format!("knot {i} was never set")))
            })
            .collect::<Result<Vec<_>>>()?;
        let knots = KnotVector(knots);
        knots.validate()?;
        Ok(knots)
    }
}
