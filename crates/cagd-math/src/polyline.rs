use serde::{Deserialize, Serialize};

use crate::Point2;

/// An open sequence of points joined by straight segments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polyline<P = Point2> {
    pub points: Vec<P>,
}

impl<P: Copy> Polyline<P> {
    pub fn new() -> Self {
        Self { points: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            points: Vec::with_capacity(capacity),
        }
    }

    pub fn append_point(&mut self, p: P) {
        self.points.push(p);
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, P> {
        self.points.iter()
    }

    /// Consecutive point pairs, i.e. the line segments to draw.
    pub fn segments(&self) -> impl Iterator<Item = (P, P)> + '_ {
        self.points.windows(2).map(|w| (w[0], w[1]))
    }
}

impl<P: Copy> Default for Polyline<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> From<Vec<P>> for Polyline<P> {
    fn from(points: Vec<P>) -> Self {
        Self { points }
    }
}

impl<P> FromIterator<P> for Polyline<P> {
    fn from_iter<I: IntoIterator<Item = P>>(iter: I) -> Self {
        Self {
            points: iter.into_iter().collect(),
        }
    }
}
