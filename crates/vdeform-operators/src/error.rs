//! Error types for operator assembly.

use thiserror::Error;

/// Errors that can occur while configuring operators.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OperatorError {
    /// Settings are out of range.
    #[error("invalid operator settings: {0}")]
    InvalidSettings(String),
}

/// Result type for operator configuration.
pub type Result<T> = std::result::Result<T, OperatorError>;
