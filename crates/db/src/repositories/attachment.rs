//! Attachment repository for database operations.
//!
//! Implements attachment persistence using `SeaORM`. Tombstoned rows are
//! filtered out of every query.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use sitetrack_core::attachment::{
    Attachment, AttachmentError, AttachmentRepository as AttachmentRepoTrait, AttachmentUpdate,
    EntityKind, FileKind, NewAttachment,
};
use sitetrack_shared::types::{AttachmentId, UserId};

use crate::entities::attachments;

/// Attachment repository implementation.
#[derive(Debug, Clone)]
pub struct AttachmentRepository {
    db: DatabaseConnection,
}

impl AttachmentRepository {
    /// Create a new attachment repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

impl AttachmentRepoTrait for AttachmentRepository {
    async fn create(&self, input: NewAttachment) -> Result<Attachment, AttachmentError> {
        let now = Utc::now().into();
        let active_model = attachments::ActiveModel {
            file_name: Set(input.file_name),
            original_name: Set(input.original_name),
            storage_path: Set(input.storage_path),
            file_size: Set(input.file_size),
            content_type: Set(input.content_type),
            file_kind: Set(input.file_kind.as_str().to_string()),
            entity_type: Set(input.entity_kind.as_str().to_string()),
            entity_id: Set(input.entity_id),
            uploaded_by: Set(input.uploaded_by.into_inner()),
            created_at: Set(now),
            updated_at: Set(now),
            deleted_at: Set(None),
            ..Default::default()
        };

        let model = active_model.insert(&self.db).await.map_err(repo_err)?;
        model_to_attachment(model)
    }

    async fn find_live_by_id(
        &self,
        id: AttachmentId,
    ) -> Result<Option<Attachment>, AttachmentError> {
        attachments::Entity::find_by_id(id.into_inner())
            .filter(attachments::Column::DeletedAt.is_null())
            .one(&self.db)
            .await
            .map_err(repo_err)?
            .map(model_to_attachment)
            .transpose()
    }

    async fn list_by_entity(
        &self,
        entity_kind: EntityKind,
        entity_id: i64,
    ) -> Result<Vec<Attachment>, AttachmentError> {
        attachments::Entity::find()
            .filter(attachments::Column::EntityType.eq(entity_kind.as_str()))
            .filter(attachments::Column::EntityId.eq(entity_id))
            .filter(attachments::Column::DeletedAt.is_null())
            .order_by_asc(attachments::Column::CreatedAt)
            .order_by_asc(attachments::Column::Id)
            .all(&self.db)
            .await
            .map_err(repo_err)?
            .into_iter()
            .map(model_to_attachment)
            .collect()
    }

    async fn update_file(
        &self,
        id: AttachmentId,
        update: AttachmentUpdate,
    ) -> Result<Attachment, AttachmentError> {
        let changes = attachments::ActiveModel {
            file_name: Set(update.file_name),
            original_name: Set(update.original_name),
            storage_path: Set(update.storage_path),
            file_size: Set(update.file_size),
            content_type: Set(update.content_type),
            file_kind: Set(update.file_kind.as_str().to_string()),
            updated_at: Set(Utc::now().into()),
            ..Default::default()
        };

        let mut updated = attachments::Entity::update_many()
            .set(changes)
            .filter(attachments::Column::Id.eq(id.into_inner()))
            .filter(attachments::Column::DeletedAt.is_null())
            .exec_with_returning(&self.db)
            .await
            .map_err(repo_err)?;

        match updated.pop() {
            Some(model) => model_to_attachment(model),
            None => Err(AttachmentError::not_found(id)),
        }
    }

    async fn soft_delete(&self, id: AttachmentId) -> Result<bool, AttachmentError> {
        let result = attachments::Entity::update_many()
            .col_expr(
                attachments::Column::DeletedAt,
                sea_orm::sea_query::Expr::value(Some(
                    sea_orm::prelude::DateTimeWithTimeZone::from(Utc::now()),
                )),
            )
            .filter(attachments::Column::Id.eq(id.into_inner()))
            .filter(attachments::Column::DeletedAt.is_null())
            .exec(&self.db)
            .await
            .map_err(repo_err)?;

        Ok(result.rows_affected > 0)
    }
}

fn repo_err(e: DbErr) -> AttachmentError {
    AttachmentError::repository(e.to_string())
}

fn model_to_attachment(model: attachments::Model) -> Result<Attachment, AttachmentError> {
    let file_kind = FileKind::parse(&model.file_kind).ok_or_else(|| {
        AttachmentError::repository(format!("unknown file kind: {}", model.file_kind))
    })?;
    let entity_kind = EntityKind::parse(&model.entity_type).ok_or_else(|| {
        AttachmentError::repository(format!("unknown entity type: {}", model.entity_type))
    })?;

    Ok(Attachment {
        id: AttachmentId(model.id),
        file_name: model.file_name,
        original_name: model.original_name,
        storage_path: model.storage_path,
        file_size: model.file_size,
        content_type: model.content_type,
        file_kind,
        entity_kind,
        entity_id: model.entity_id,
        uploaded_by: UserId(model.uploaded_by),
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    })
}
