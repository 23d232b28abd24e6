use std::io;
use thiserror::Error;

/// Custom error types for hms_divide
#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to set {field}: {value}")]
    Validation {
        /// Name of the rejected field
        field: &'static str,
        /// Display form of the rejected value
        value: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),
}

/// Result type alias using our custom Error type
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Creates a new validation error for a field and its offending value
    pub fn validation(field: &'static str, value: impl ToString) -> Self {
        Error::Validation {
            field,
            value: value.to_string(),
        }
    }

    /// Creates a new storage error
    pub fn storage(msg: impl Into<String>) -> Self {
        Error::Storage(msg.into())
    }

    /// Creates a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    /// Creates a new invalid state error
    pub fn invalid_state(msg: impl Into<String>) -> Self {
        Error::InvalidState(msg.into())
    }

    /// Returns the field name if this is a validation error
    pub fn field(&self) -> Option<&'static str> {
        match self {
            Error::Validation { field, .. } => Some(*field),
            _ => None,
        }
    }
}
