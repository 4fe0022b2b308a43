//! Error types for the seasonal-fusion library.
//!
//! Predictors never fail: a missing prediction is an ordinary abstaining
//! [`Verdict`](crate::core::Verdict). Errors are reserved for configuration
//! and input problems.

use thiserror::Error;

/// Result type alias for fusion operations.
pub type Result<T> = std::result::Result<T, FusionError>;

/// Errors that can occur while configuring or feeding the fusion engine.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FusionError {
    /// A required table or dataset is empty.
    #[error("empty input data: {0}")]
    EmptyData(String),

    /// Invalid parameter value.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// An outcome label could not be recognized.
    #[error("unrecognized outcome label: {0:?}")]
    InvalidOutcome(String),

    /// Two entries of one configuration table share an id.
    #[error("duplicate id: {0}")]
    DuplicateId(String),

    /// Configuration document could not be decoded.
    #[error("configuration error: {0}")]
    Config(String),
}

impl From<serde_json::Error> for FusionError {
    fn from(err: serde_json::Error) -> Self {
        FusionError::Config(err.to_string())
    }
}
