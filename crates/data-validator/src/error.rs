//! Validation Error Types

use thiserror::Error;

/// Errors during record validation
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// Value out of allowed range
    #[error("{field} value {value} is out of range [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },

    /// Categorical value outside the training vocabulary
    #[error("{field} value {value:?} is not one of {allowed:?}")]
    UnknownCategory {
        field: &'static str,
        value: String,
        allowed: Vec<String>,
    },

    /// Categorical field left blank
    #[error("{0} must not be empty")]
    EmptyField(&'static str),
}
