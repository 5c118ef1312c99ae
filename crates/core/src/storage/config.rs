//! Storage configuration types.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Coarse classification of an accepted upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileKind {
    /// Raster image.
    Image,
    /// Office document, PDF or plain text.
    Document,
}

impl FileKind {
    /// Convert to database string value.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Document => "document",
        }
    }

    /// Parse from database string value.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "image" => Some(Self::Image),
            "document" => Some(Self::Document),
            _ => None,
        }
    }
}

/// Storage service configuration.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Root directory for blobs.
    pub root: PathBuf,
    /// Maximum file size in bytes (inclusive).
    pub max_file_size: u64,
    /// Content types classified as images.
    pub image_types: Vec<String>,
    /// Content types classified as documents.
    pub document_types: Vec<String>,
}

impl StorageConfig {
    /// Default max file size: 10MB.
    pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

    /// Create a new storage config rooted at `root` with default settings.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            max_file_size: Self::DEFAULT_MAX_FILE_SIZE,
            image_types: Self::default_image_types(),
            document_types: Self::default_document_types(),
        }
    }

    /// Set maximum file size.
    #[must_use]
    pub fn with_max_file_size(mut self, size: u64) -> Self {
        self.max_file_size = size;
        self
    }

    /// Default image content types.
    #[must_use]
    pub fn default_image_types() -> Vec<String> {
        ["image/jpeg", "image/jpg", "image/png", "image/gif", "image/webp"]
            .into_iter()
            .map(String::from)
            .collect()
    }

    /// Default document content types.
    #[must_use]
    pub fn default_document_types() -> Vec<String> {
        [
            "application/pdf",
            "application/msword",
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
            "text/plain",
        ]
        .into_iter()
        .map(String::from)
        .collect()
    }

    /// Classify a content type, ignoring parameters such as `charset`.
    ///
    /// Returns `None` for anything outside the allow-lists.
    #[must_use]
    pub fn classify(&self, content_type: &str) -> Option<FileKind> {
        let essence = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();

        if self.image_types.iter().any(|t| *t == essence) {
            Some(FileKind::Image)
        } else if self.document_types.iter().any(|t| *t == essence) {
            Some(FileKind::Document)
        } else {
            None
        }
    }
}
