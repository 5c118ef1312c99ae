//! Polymorphic file attachments.
//!
//! This module provides business logic for file attachments including:
//! - Batch upload with per-file validation
//! - Listing by owning entity
//! - Download of live attachments
//! - Uploader-only replace and delete
//! - First-image lookup for entity thumbnails

mod error;
mod service;
mod types;


pub use error::AttachmentError;
pub use service::{AttachmentRepository, AttachmentService};
pub use types::{
    Attachment, AttachmentSummary, AttachmentUpdate, Download, EntityKind, FailedUpload, FileKind,
    NewAttachment, UploadFile, UploadOutcome,
};
