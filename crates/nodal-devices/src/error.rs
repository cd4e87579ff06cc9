//! Error types for nodal-devices.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("device {name} has invalid value: {value}")]
    InvalidValue { name: String, value: f64 },

    #[error("sample data: {0}")]
    Samples(#[from] nodal_interp::Error),

    #[error(transparent)]
    Element(#[from] nodal_core::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Reject a non-positive (or non-finite) parameter.
pub(crate) fn positive(name: &str, value: f64) -> Result<f64> {
    if value > 0.0 && value.is_finite() {
        Ok(value)
    } else {
        Err(Error::InvalidValue {
            name: name.to_string(),
            value,
        })
    }
}
