//! Error types for nodal-core.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    #[error("{matrix} matrix must be {}x{}, got {}x{}", .expected.0, .expected.1, .actual.0, .actual.1)]
    DimensionMismatch {
        matrix: &'static str,
        expected: (usize, usize),
        actual: (usize, usize),
    },

    #[error("no history for slot {slot} (element tracks {count})")]
    NoHistory { slot: usize, count: usize },
}

pub type Result<T> = std::result::Result<T, Error>;
