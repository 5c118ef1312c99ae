//! Attachment error types.

use sitetrack_shared::AppError;
use sitetrack_shared::types::AttachmentId;
use thiserror::Error;

use super::types::EntityKind;
use crate::storage::StorageError;

/// Attachment operation errors.
#[derive(Debug, Error)]
pub enum AttachmentError {
    /// Attachment not found or already deleted.
    #[error("attachment not found: {0}")]
    NotFound(AttachmentId),

    /// Entity has no image attachments.
    #[error("no image attached to {entity_kind} {entity_id}")]
    NoImage {
        /// Owning entity kind.
        entity_kind: EntityKind,
        /// Owning entity ID.
        entity_id: i64,
    },

    /// Entity kind outside the supported set.
    #[error("invalid entity type: {0}")]
    InvalidEntityKind(String),

    /// Upload request carried no files.
    #[error("no files provided")]
    NoFiles,

    /// Caller is not the uploader.
    #[error("only the uploader may modify attachment {0}")]
    NotOwner(AttachmentId),

    /// Storage operation failed.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Repository operation failed.
    #[error("repository error: {0}")]
    Repository(String),
}

impl AttachmentError {
    /// Create a not found error.
    #[must_use]
    pub fn not_found(id: AttachmentId) -> Self {
        Self::NotFound(id)
    }

    /// Create a repository error.
    #[must_use]
    pub fn repository(msg: impl Into<String>) -> Self {
        Self::Repository(msg.into())
    }
}

impl From<AttachmentError> for AppError {
    fn from(err: AttachmentError) -> Self {
        match err {
            AttachmentError::NotFound(_) | AttachmentError::NoImage { .. } => {
                Self::NotFound(err.to_string())
            }
            AttachmentError::InvalidEntityKind(_) | AttachmentError::NoFiles => {
                Self::InvalidInput(err.to_string())
            }
            AttachmentError::NotOwner(_) => Self::Forbidden(err.to_string()),
            AttachmentError::Storage(e) => e.into(),
            AttachmentError::Repository(_) => Self::Internal(err.to_string()),
        }
    }
}
