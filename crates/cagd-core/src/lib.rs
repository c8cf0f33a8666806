pub mod error;
pub mod tolerance;
pub mod traits;

pub use error::{CagdError, Result};
pub use tolerance::Tolerance;
