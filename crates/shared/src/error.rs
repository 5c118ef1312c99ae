//! Application-wide error types.
//!
//! Every caller-facing failure is one of these kinds. Module errors in the
//! other crates convert into `AppError` so the presentation layer only ever
//! sees a stable kind plus a human-readable reason.

use thiserror::Error;

/// Result type alias using `AppError`.
pub type AppResult<T> = Result<T, AppError>;

/// Application error types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AppError {
    /// Missing, malformed, invalid or expired credential.
    #[error("Authentication required: {0}")]
    Unauthenticated(String),

    /// Authenticated, but the role or ownership check failed.
    #[error("Access denied: {0}")]
    Forbidden(String),

    /// Resource absent or already soft-deleted.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Unsupported entity kind or media type, oversized file, malformed identifier.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Durable-storage I/O error.
    #[error("Storage failure: {0}")]
    StorageFailure(String),

    /// Duplicate unique key.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Unauthenticated(_) => 401,
            Self::Forbidden(_) => 403,
            Self::NotFound(_) => 404,
            Self::InvalidInput(_) => 400,
            Self::Conflict(_) => 409,
            Self::StorageFailure(_) | Self::Internal(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Unauthenticated(_) => "UNAUTHENTICATED",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::NotFound(_) => "NOT_FOUND",
            Self::InvalidInput(_) => "INVALID_INPUT",
            Self::StorageFailure(_) => "STORAGE_FAILURE",
            Self::Conflict(_) => "CONFLICT",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns the human-readable reason without the kind prefix.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Unauthenticated(msg)
            | Self::Forbidden(msg)
            | Self::NotFound(msg)
            | Self::InvalidInput(msg)
            | Self::StorageFailure(msg)
            | Self::Conflict(msg)
            | Self::Internal(msg) => msg,
        }
    }
}
