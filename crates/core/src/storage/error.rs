//! Storage error types.

use sitetrack_shared::AppError;
use thiserror::Error;

/// Storage operation errors.
#[derive(Debug, Error)]
pub enum StorageError {
    /// File size exceeds maximum allowed.
    #[error("file size {size} bytes exceeds maximum allowed {max} bytes")]
    FileTooLarge {
        /// Actual file size.
        size: u64,
        /// Maximum allowed size.
        max: u64,
    },

    /// Content type not in the allow-lists.
    #[error("unsupported media type '{content_type}'")]
    UnsupportedMediaType {
        /// The rejected content type.
        content_type: String,
    },

    /// Blob not found in storage.
    #[error("file not found: {path}")]
    NotFound {
        /// Storage path that was not found.
        path: String,
    },

    /// Storage path or namespace is not acceptable.
    #[error("invalid storage path: {0}")]
    InvalidPath(String),

    /// Storage provider configuration error.
    #[error("storage configuration error: {0}")]
    Configuration(String),

    /// OpenDAL operation error.
    #[error("storage operation failed: {0}")]
    Operation(String),
}

impl StorageError {
    /// Create a file too large error.
    #[must_use]
    pub fn file_too_large(size: u64, max: u64) -> Self {
        Self::FileTooLarge { size, max }
    }

    /// Create an unsupported media type error.
    #[must_use]
    pub fn unsupported_media_type(content_type: impl Into<String>) -> Self {
        Self::UnsupportedMediaType {
            content_type: content_type.into(),
        }
    }

    /// Create a not found error.
    #[must_use]
    pub fn not_found(path: impl Into<String>) -> Self {
        Self::NotFound { path: path.into() }
    }

    /// Create a configuration error.
    #[must_use]
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Create an operation error.
    #[must_use]
    pub fn operation(msg: impl Into<String>) -> Self {
        Self::Operation(msg.into())
    }
}

impl From<opendal::Error> for StorageError {
    fn from(err: opendal::Error) -> Self {
        match err.kind() {
            opendal::ErrorKind::NotFound => Self::NotFound {
                path: err.to_string(),
            },
            opendal::ErrorKind::ConfigInvalid => Self::Configuration(err.to_string()),
            _ => Self::Operation(err.to_string()),
        }
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::FileTooLarge { .. }
            | StorageError::UnsupportedMediaType { .. }
            | StorageError::InvalidPath(_) => Self::InvalidInput(err.to_string()),
            StorageError::NotFound { .. } => Self::NotFound(err.to_string()),
            StorageError::Configuration(_) | StorageError::Operation(_) => {
                Self::StorageFailure(err.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_failures_are_invalid_input() {
        let err = AppError::from(StorageError::file_too_large(11, 10));
        assert_eq!(err.error_code(), "INVALID_INPUT");

        let err = AppError::from(StorageError::unsupported_media_type("text/html"));
        assert_eq!(err.error_code(), "INVALID_INPUT");
        assert!(err.message().contains("text/html"));
    }

    #[test]
    fn test_io_failures_are_storage_failures() {
        let err = AppError::from(StorageError::operation("disk full"));
        assert_eq!(err.error_code(), "STORAGE_FAILURE");
        assert_eq!(err.status_code(), 500);

        let err = AppError::from(StorageError::not_found("project/a.png"));
        assert_eq!(err.status_code(), 404);
    }
}
