//! Error types for gavel.

use thiserror::Error;

/// Common error type for gavel operations.
#[derive(Error, Debug)]
pub enum GavelError {
    /// Database error.
    ///
    /// Generic database error wrapping errors from any backend.
    /// Errors from sqlx are converted automatically.
    #[error("database error: {0}")]
    Database(String),

    /// Validation error for entity input.
    ///
    /// Carries the names of the fields that failed validation.
    #[error("validation failed for fields: {}", fields.join(", "))]
    Validation {
        /// Names of the fields that failed.
        fields: Vec<String>,
    },

    /// Resource not found.
    #[error("{0} not found")]
    NotFound(String),

    /// A multi-statement transaction violated one of its invariants
    /// and was rolled back.
    #[error("consistency error: {0}")]
    Consistency(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl GavelError {
    /// Build a validation error from field names.
    pub fn validation<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        GavelError::Validation {
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }
}

// Conversion from sqlx errors
impl From<sqlx::Error> for GavelError {
    fn from(e: sqlx::Error) -> Self {
        GavelError::Database(e.to_string())
    }
}

/// Result type alias for gavel operations.
pub type Result<T> = std::result::Result<T, GavelError>;
