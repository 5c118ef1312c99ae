//! Attachment service implementation.
//!
//! Blob and metadata writes are never wrapped in one transaction. Consistency
//! comes from ordering alone:
//! - upload writes the blob first and removes it if the record insert fails
//! - replace writes the new blob first, removes it if the record update
//!   fails, and removes the old blob only after the update commits
//! - delete removes the blob (best-effort) and then tombstones the record

use std::sync::Arc;

use sitetrack_shared::AppError;
use sitetrack_shared::types::{AttachmentId, UserId};

use super::error::AttachmentError;
use super::types::{
    Attachment, AttachmentSummary, AttachmentUpdate, Download, EntityKind, FailedUpload, FileKind,
    NewAttachment, UploadFile, UploadOutcome,
};
use crate::auth::Principal;
use crate::storage::StorageService;

/// Repository trait for attachment persistence.
///
/// This trait is implemented by the db crate to provide actual database operations.
/// Soft-deleted records are invisible to every method.
pub trait AttachmentRepository: Send + Sync {
    /// Create a new attachment record.
    fn create(
        &self,
        input: NewAttachment,
    ) -> impl std::future::Future<Output = Result<Attachment, AttachmentError>> + Send;

    /// Find a live attachment by ID.
    fn find_live_by_id(
        &self,
        id: AttachmentId,
    ) -> impl std::future::Future<Output = Result<Option<Attachment>, AttachmentError>> + Send;

    /// List live attachments of an entity, oldest first (ties by ID).
    fn list_by_entity(
        &self,
        entity_kind: EntityKind,
        entity_id: i64,
    ) -> impl std::future::Future<Output = Result<Vec<Attachment>, AttachmentError>> + Send;

    /// Overwrite the file details of a live attachment.
    ///
    /// Fails with `AttachmentError::NotFound` if no live row was updated.
    fn update_file(
        &self,
        id: AttachmentId,
        update: AttachmentUpdate,
    ) -> impl std::future::Future<Output = Result<Attachment, AttachmentError>> + Send;

    /// Tombstone a live attachment. Returns false if none was live.
    fn soft_delete(
        &self,
        id: AttachmentId,
    ) -> impl std::future::Future<Output = Result<bool, AttachmentError>> + Send;
}

/// Attachment service for managing file attachments.
pub struct AttachmentService<R: AttachmentRepository> {
    storage: Arc<StorageService>,
    repo: Arc<R>,
}

impl<R: AttachmentRepository> AttachmentService<R> {
    /// Create a new attachment service.
    #[must_use]
    pub fn new(storage: Arc<StorageService>, repo: Arc<R>) -> Self {
        Self { storage, repo }
    }

    /// Parse an entity kind from a request parameter.
    ///
    /// # Errors
    ///
    /// Returns `AttachmentError::InvalidEntityKind` for anything outside the closed set.
    pub fn parse_entity_kind(kind: &str) -> Result<EntityKind, AttachmentError> {
        EntityKind::parse(kind).ok_or_else(|| AttachmentError::InvalidEntityKind(kind.to_string()))
    }

    /// Upload a batch of files for an entity.
    ///
    /// Each file succeeds or fails on its own; failures are reported in the
    /// outcome rather than aborting the batch.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity kind is invalid or no files were given.
    pub async fn upload(
        &self,
        caller: &Principal,
        entity_kind: &str,
        entity_id: i64,
        files: Vec<UploadFile>,
    ) -> Result<UploadOutcome, AttachmentError> {
        let entity_kind = Self::parse_entity_kind(entity_kind)?;
        if files.is_empty() {
            return Err(AttachmentError::NoFiles);
        }

        let mut outcome = UploadOutcome::default();

        for file in files {
            let filename = file.original_name.clone();
            match self
                .store(caller.user_id, entity_kind, entity_id, file)
                .await
            {
                Ok(attachment) => outcome.succeeded.push(attachment.summary()),
                Err(e) => {
                    tracing::info!(filename = %filename, error = %e, "upload rejected");
                    let err = AppError::from(e);
                    outcome.failed.push(FailedUpload {
                        filename,
                        code: err.error_code().to_string(),
                        reason: err.message().to_string(),
                    });
                }
            }
        }

        Ok(outcome)
    }

    async fn store(
        &self,
        uploaded_by: UserId,
        entity_kind: EntityKind,
        entity_id: i64,
        file: UploadFile,
    ) -> Result<Attachment, AttachmentError> {
        let file_kind = self
            .storage
            .validate(&file.content_type, file.bytes.len() as u64)?;

        let blob = self
            .storage
            .persist(
                entity_kind.as_str(),
                entity_id,
                &file.original_name,
                file.bytes,
            )
            .await?;

        let input = NewAttachment {
            file_name: blob.file_name,
            original_name: file.original_name,
            storage_path: blob.path.clone(),
            file_size: i64::try_from(blob.size).unwrap_or(i64::MAX),
            content_type: file.content_type,
            file_kind,
            entity_kind,
            entity_id,
            uploaded_by,
        };

        match self.repo.create(input).await {
            Ok(attachment) => {
                tracing::info!(
                    attachment_id = %attachment.id,
                    storage_path = %attachment.storage_path,
                    "attachment uploaded"
                );
                Ok(attachment)
            }
            Err(e) => {
                self.storage.remove(&blob.path).await;
                Err(e)
            }
        }
    }

    /// List an entity's attachments, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity kind is invalid or the repository fails.
    pub async fn list(
        &self,
        entity_kind: &str,
        entity_id: i64,
    ) -> Result<Vec<AttachmentSummary>, AttachmentError> {
        let entity_kind = Self::parse_entity_kind(entity_kind)?;
        let attachments = self.repo.list_by_entity(entity_kind, entity_id).await?;
        Ok(attachments.iter().map(Attachment::summary).collect())
    }

    /// Get attachment by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if attachment not found or database operation fails.
    pub async fn get_by_id(&self, id: AttachmentId) -> Result<Attachment, AttachmentError> {
        self.repo
            .find_live_by_id(id)
            .await?
            .ok_or_else(|| AttachmentError::not_found(id))
    }

    /// Load an attachment together with its blob.
    ///
    /// # Errors
    ///
    /// Returns an error if the record or its blob is missing.
    pub async fn fetch_for_download(&self, id: AttachmentId) -> Result<Download, AttachmentError> {
        let attachment = self.get_by_id(id).await?;
        self.download(attachment).await
    }

    /// Delete an attachment uploaded by `caller`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Attachment not found
    /// - Caller is not the uploader
    /// - Database operation fails
    pub async fn delete(&self, id: AttachmentId, caller: &Principal) -> Result<(), AttachmentError> {
        let attachment = self.get_by_id(id).await?;
        Self::ensure_owner(&attachment, caller)?;

        self.storage.remove(&attachment.storage_path).await;

        if !self.repo.soft_delete(id).await? {
            return Err(AttachmentError::not_found(id));
        }

        tracing::info!(attachment_id = %id, user_id = %caller.user_id, "attachment deleted");
        Ok(())
    }

    /// Replace the file behind an attachment uploaded by `caller`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Attachment not found (including a concurrent delete)
    /// - Caller is not the uploader
    /// - The new file fails validation
    /// - Storage or database operation fails
    pub async fn replace(
        &self,
        id: AttachmentId,
        caller: &Principal,
        file: UploadFile,
    ) -> Result<AttachmentSummary, AttachmentError> {
        let existing = self.get_by_id(id).await?;
        Self::ensure_owner(&existing, caller)?;

        let file_kind = self
            .storage
            .validate(&file.content_type, file.bytes.len() as u64)?;

        let blob = self
            .storage
            .persist(
                existing.entity_kind.as_str(),
                existing.entity_id,
                &file.original_name,
                file.bytes,
            )
            .await?;

        let update = AttachmentUpdate {
            file_name: blob.file_name,
            original_name: file.original_name,
            storage_path: blob.path.clone(),
            file_size: i64::try_from(blob.size).unwrap_or(i64::MAX),
            content_type: file.content_type,
            file_kind,
        };

        let updated = match self.repo.update_file(id, update).await {
            Ok(updated) => updated,
            Err(e) => {
                self.storage.remove(&blob.path).await;
                return Err(e);
            }
        };

        self.storage.remove(&existing.storage_path).await;

        tracing::info!(
            attachment_id = %id,
            storage_path = %updated.storage_path,
            "attachment replaced"
        );
        Ok(updated.summary())
    }

    /// Earliest image attached to an entity.
    ///
    /// # Errors
    ///
    /// Returns `AttachmentError::NoImage` if the entity has no image attachments.
    pub async fn first_image(
        &self,
        entity_kind: &str,
        entity_id: i64,
    ) -> Result<Attachment, AttachmentError> {
        let entity_kind = Self::parse_entity_kind(entity_kind)?;
        self.repo
            .list_by_entity(entity_kind, entity_id)
            .await?
            .into_iter()
            .find(|a| a.file_kind == FileKind::Image)
            .ok_or(AttachmentError::NoImage {
                entity_kind,
                entity_id,
            })
    }

    /// Earliest image attached to an entity, with its blob.
    ///
    /// # Errors
    ///
    /// See [`Self::first_image`] and [`Self::fetch_for_download`].
    pub async fn fetch_first_image(
        &self,
        entity_kind: &str,
        entity_id: i64,
    ) -> Result<Download, AttachmentError> {
        let attachment = self.first_image(entity_kind, entity_id).await?;
        self.download(attachment).await
    }

    async fn download(&self, attachment: Attachment) -> Result<Download, AttachmentError> {
        let bytes = self.storage.read(&attachment.storage_path).await?;
        Ok(Download {
            content_type: attachment.content_type,
            original_name: attachment.original_name,
            file_kind: attachment.file_kind,
            bytes,
        })
    }

    fn ensure_owner(attachment: &Attachment, caller: &Principal) -> Result<(), AttachmentError> {
        if attachment.uploaded_by == caller.user_id {
            Ok(())
        } else {
            Err(AttachmentError::NotOwner(attachment.id))
        }
    }
}
