//! Error types for choreust
//!
//! Exit codes:
//! - 0: Success
//! - 2: User error (bad configuration, rejected input, unknown id)
//! - 4: Operation failed (storage could not confirm the write)

use thiserror::Error;

/// Exit codes for the choreust CLI
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const USER_ERROR: i32 = 2;
    pub const OPERATION_FAILED: i32 = 4;
}

/// Main error type for choreust operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Task configuration is inconsistent for its schedule or frequency.
    #[error("Invalid task configuration: {0}")]
    Config(String),

    /// User-supplied data breaks a domain rule.
    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    /// The store failed before the mutation was committed. Safe to retry.
    #[error("Storage error: {0}")]
    Persistence(String),
}

impl Error {
    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        Error::NotFound {
            kind,
            id: id.into(),
        }
    }

    /// Whether the caller may retry the same operation unchanged.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Persistence(_))
    }

    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Config(_) | Error::Validation(_) | Error::NotFound { .. } => {
                exit_codes::USER_ERROR
            }
            Error::Persistence(_) => exit_codes::OPERATION_FAILED,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Persistence(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Persistence(err.to_string())
    }
}

/// Result type alias for choreust operations
pub type Result<T> = std::result::Result<T, Error>;
