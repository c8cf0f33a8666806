/// Numeric tolerances shared by the evaluation and construction routines.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Tolerance {
    /// Amount subtracted from a parameter sitting exactly on the closed upper
    /// end of a support interval, so that it is evaluated as a left limit.
    pub closed_end: f64,
    /// Linear tolerance for distance comparisons (in model units)
    pub linear: f64,
}

impl Tolerance {
    pub const DEFAULT_CLOSED_END: f64 = 1e-6;
    pub const DEFAULT_LINEAR: f64 = 1e-9;

    pub fn new(closed_end: f64, linear: f64) -> Self {
        Self { closed_end, linear }
    }

    pub fn default_precision() -> Self {
        Self {
            closed_end: Self::DEFAULT_CLOSED_END,
            linear: Self::DEFAULT_LINEAR,
        }
    }

    pub fn loose() -> Self {
        Self {
            closed_end: 1e-4,
            linear: 1e-6,
        }
    }

    pub fn tight() -> Self {
        Self {
            closed_end: 1e-9,
            linear: 1e-12,
        }
    }

    /// Check if a value is zero within linear tolerance
    pub fn is_zero(self, v: f64) -> bool {
        v.abs() < self.linear
    }

    /// Map `t` onto the half-open interval `[min, max)` used for evaluation.
    ///
    /// `t == max` becomes `max - closed_end`; everything else is returned as is.
    pub fn left_limit(self, t: f64, max: f64) -> f64 {
        if t == max {
            t - self.closed_end
        } else {
            t
        }
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::default_precision()
    }
}
