//! Error types for configuration loading and agent training.
//!
//! The simulator has no error states; invalid actions degrade to no-ops.

use thiserror::Error;

use crate::validation::ValidationError;

/// Errors produced by the crate.
#[derive(Debug, Error)]
pub enum LabError {
    /// Configuration file could not be read.
    #[error("config io error: {0}")]
    Io(#[from] std::io::Error),
    /// Configuration text is not valid JSON for the schema.
    #[error("config parse error: {0}")]
    Parse(#[from] serde_json::Error),
    /// Configuration parsed but failed validation.
    #[error("invalid config: {}", format_validation(.0))]
    InvalidConfig(Vec<ValidationError>),
    /// An update was requested from a buffer with no transitions.
    #[error("cannot update from an empty episode")]
    EmptyEpisode,
    /// The action distribution could not be sampled (non-finite score).
    #[error("action sampling failed: {0}")]
    Sampling(String),
    /// A tensor operation in the approximator or the update failed.
    #[error("tensor error: {0}")]
    Tensor(#[from] candle_core::Error),
}

/// Result alias used across the crate.
pub type LabResult<T> = Result<T, LabError>;

fn format_validation(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
