//! Error types for workflow resource validation

use thiserror::Error;

/// Errors that can occur when working with workflow resources
#[derive(Debug, Error)]
pub enum CrdError {
    /// Missing required field
    #[error("Missing required field: {0}")]
    MissingField(String),

    /// Invalid field value
    #[error("Invalid value for field '{field}': {message}")]
    InvalidFieldValue { field: String, message: String },
}

/// Result type for workflow resource operations
pub type Result<T> = std::result::Result<T, CrdError>;
