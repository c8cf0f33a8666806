use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CagdError {
    #[error("Invalid shape: {0}")]
    InvalidShape(String),

    #[error("Parameter {parameter} outside of support [{min}, {max}]")]
    OutOfDomain { parameter: f64, min: f64, max: f64 },

    #[error("Numeric degeneracy: {0}")]
    NumericDegeneracy(String),

    #[error("No convergence after {iterations} iterations")]
    NonConvergence { iterations: usize },

    #[error("Need at least {required} points, got {actual}")]
    InsufficientPoints { required: usize, actual: usize },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

pub type Result<T> = std::result::Result<T, CagdError>;
