//! Error types for nodal-interp.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    #[error("need at least {required} samples, got {actual}")]
    TooFewPoints { required: usize, actual: usize },

    #[error("sample length mismatch: {x} abscissas, {y} ordinates")]
    LengthMismatch { x: usize, y: usize },
}

pub type Result<T> = std::result::Result<T, Error>;
