//! Attachment types and data structures.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sitetrack_shared::types::{AttachmentId, UserId};

pub use crate::storage::FileKind;

/// Kind of entity an attachment belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// Construction project.
    Project,
    /// Recorded defect.
    Defect,
}

impl EntityKind {
    /// Convert to database string value.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Project => "project",
            Self::Defect => "defect",
        }
    }

    /// Parse from database string value.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "project" => Some(Self::Project),
            "defect" => Some(Self::Defect),
            _ => None,
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Attachment domain model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    /// Unique identifier.
    pub id: AttachmentId,
    /// Generated file name.
    pub file_name: String,
    /// Name the file was uploaded with.
    pub original_name: String,
    /// Blob path relative to the storage root.
    pub storage_path: String,
    /// File size in bytes.
    pub file_size: i64,
    /// MIME type.
    pub content_type: String,
    /// Image or document.
    pub file_kind: FileKind,
    /// Owning entity kind.
    pub entity_kind: EntityKind,
    /// Owning entity ID.
    pub entity_id: i64,
    /// User who uploaded.
    pub uploaded_by: UserId,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last replacement timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Attachment {
    /// Outward representation.
    #[must_use]
    pub fn summary(&self) -> AttachmentSummary {
        AttachmentSummary {
            id: self.id,
            file_name: self.file_name.clone(),
            original_name: self.original_name.clone(),
            file_size: self.file_size,
            content_type: self.content_type.clone(),
            file_kind: self.file_kind,
            entity_kind: self.entity_kind,
            entity_id: self.entity_id,
            uploaded_by: self.uploaded_by,
            created_at: self.created_at,
            url: format!("/api/v1/files/{}", self.id),
        }
    }
}

/// Attachment as returned to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttachmentSummary {
    /// Unique identifier.
    pub id: AttachmentId,
    /// Generated file name.
    pub file_name: String,
    /// Name the file was uploaded with.
    pub original_name: String,
    /// File size in bytes.
    pub file_size: i64,
    /// MIME type.
    pub content_type: String,
    /// Image or document.
    pub file_kind: FileKind,
    /// Owning entity kind.
    pub entity_kind: EntityKind,
    /// Owning entity ID.
    pub entity_id: i64,
    /// User who uploaded.
    pub uploaded_by: UserId,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Download URL.
    pub url: String,
}

/// Input for creating an attachment record.
#[derive(Debug, Clone)]
pub struct NewAttachment {
    /// Generated file name.
    pub file_name: String,
    /// Name the file was uploaded with.
    pub original_name: String,
    /// Blob path relative to the storage root.
    pub storage_path: String,
    /// File size in bytes.
    pub file_size: i64,
    /// MIME type.
    pub content_type: String,
    /// Image or document.
    pub file_kind: FileKind,
    /// Owning entity kind.
    pub entity_kind: EntityKind,
    /// Owning entity ID.
    pub entity_id: i64,
    /// User who uploaded.
    pub uploaded_by: UserId,
}

/// New file details written over an existing record on replace.
#[derive(Debug, Clone)]
pub struct AttachmentUpdate {
    /// Generated file name.
    pub file_name: String,
    /// Name the file was uploaded with.
    pub original_name: String,
    /// Blob path relative to the storage root.
    pub storage_path: String,
    /// File size in bytes.
    pub file_size: i64,
    /// MIME type.
    pub content_type: String,
    /// Image or document.
    pub file_kind: FileKind,
}

/// A file received from a client.
#[derive(Debug, Clone)]
pub struct UploadFile {
    /// Client-supplied file name.
    pub original_name: String,
    /// Declared MIME type.
    pub content_type: String,
    /// File contents.
    pub bytes: Bytes,
}

/// A file from a batch that could not be stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedUpload {
    /// Client-supplied file name.
    pub filename: String,
    /// Stable error code.
    pub code: String,
    /// Human-readable reason.
    pub reason: String,
}

/// Result of a batch upload.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UploadOutcome {
    /// Stored files.
    pub succeeded: Vec<AttachmentSummary>,
    /// Rejected files.
    pub failed: Vec<FailedUpload>,
}

/// Blob contents ready to be served.
#[derive(Debug, Clone)]
pub struct Download {
    /// MIME type.
    pub content_type: String,
    /// Name the file was uploaded with.
    pub original_name: String,
    /// Image or document.
    pub file_kind: FileKind,
    /// File contents.
    pub bytes: Bytes,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_kind_roundtrip() {
        for kind in [EntityKind::Project, EntityKind::Defect] {
            assert_eq!(EntityKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(EntityKind::parse("invoice"), None);
        assert_eq!(EntityKind::parse("Project"), None);
    }

    #[test]
    fn test_summary_carries_download_url() {
        let now = Utc::now();
        let attachment = Attachment {
            id: AttachmentId(15),
            file_name: "0192_7.png".into(),
            original_name: "site.png".into(),
            storage_path: "project/0192_7.png".into(),
            file_size: 2048,
            content_type: "image/png".into(),
            file_kind: FileKind::Image,
            entity_kind: EntityKind::Project,
            entity_id: 7,
            uploaded_by: UserId(3),
            created_at: now,
            updated_at: now,
        };

        let summary = attachment.summary();
        assert_eq!(summary.url, "/api/v1/files/15");

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["entity_kind"], "project");
        assert_eq!(json["file_kind"], "image");
        assert!(json.get("storage_path").is_none());
    }
}
