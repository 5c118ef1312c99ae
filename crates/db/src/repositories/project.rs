//! Project repository for database operations.

use chrono::{NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, IntoActiveModel,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use serde::{Deserialize, Serialize};
use sitetrack_shared::AppError;
use sitetrack_shared::types::{PageRequest, ProjectId, UserId};

use crate::entities::projects;

/// Lifecycle status of a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    /// Work in progress.
    Active,
    /// Handed over.
    Completed,
    /// On hold.
    Suspended,
}

impl ProjectStatus {
    /// Convert to database string value.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Suspended => "suspended",
        }
    }

    /// Parse from database string value.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "active" => Some(Self::Active),
            "completed" => Some(Self::Completed),
            "suspended" => Some(Self::Suspended),
            _ => None,
        }
    }
}

/// Input for creating a project.
#[derive(Debug, Clone)]
pub struct CreateProjectInput {
    /// Project name.
    pub name: String,
    /// Free-form description.
    pub description: String,
    /// Site address.
    pub address: String,
    /// Initial status.
    pub status: ProjectStatus,
    /// Planned start.
    pub start_date: Option<NaiveDate>,
    /// Planned completion.
    pub end_date: Option<NaiveDate>,
    /// Creating manager.
    pub created_by: UserId,
}

/// Partial update of a project. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default)]
pub struct UpdateProjectInput {
    /// New name.
    pub name: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New address.
    pub address: Option<String>,
    /// New status.
    pub status: Option<ProjectStatus>,
    /// New planned start.
    pub start_date: Option<NaiveDate>,
    /// New planned completion.
    pub end_date: Option<NaiveDate>,
}

/// Filter for listing projects.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProjectFilter {
    /// Only projects in this status.
    pub status: Option<ProjectStatus>,
}

/// Errors from project persistence.
#[derive(Debug, thiserror::Error)]
pub enum ProjectError {
    /// No live project with this ID.
    #[error("project {0} not found")]
    NotFound(ProjectId),

    /// End date precedes start date.
    #[error("end date must not be before start date")]
    InvalidDates,

    /// Database error.
    #[error("database error: {0}")]
    Database(#[from] DbErr),
}

impl From<ProjectError> for AppError {
    fn from(err: ProjectError) -> Self {
        match err {
            ProjectError::NotFound(_) => Self::NotFound(err.to_string()),
            ProjectError::InvalidDates => Self::InvalidInput(err.to_string()),
            ProjectError::Database(_) => Self::Internal(err.to_string()),
        }
    }
}

/// Project repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct ProjectRepository {
    db: DatabaseConnection,
}

impl ProjectRepository {
    /// Creates a new project repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Lists live projects, newest first, with the total count.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(
        &self,
        filter: ProjectFilter,
        page: &PageRequest,
    ) -> Result<(Vec<projects::Model>, u64), ProjectError> {
        let mut query = projects::Entity::find().filter(projects::Column::DeletedAt.is_null());
        if let Some(status) = filter.status {
            query = query.filter(projects::Column::Status.eq(status.as_str()));
        }

        let total = query.clone().count(&self.db).await?;
        let items = query
            .order_by_desc(projects::Column::CreatedAt)
            .order_by_desc(projects::Column::Id)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await?;

        Ok((items, total))
    }

    /// Finds a live project by ID.
    ///
    /// # Errors
    ///
    /// Returns `ProjectError::NotFound` if the project is absent or deleted.
    pub async fn find(&self, id: ProjectId) -> Result<projects::Model, ProjectError> {
        projects::Entity::find_by_id(id.into_inner())
            .filter(projects::Column::DeletedAt.is_null())
            .one(&self.db)
            .await?
            .ok_or(ProjectError::NotFound(id))
    }

    /// Creates a project.
    ///
    /// # Errors
    ///
    /// Returns an error if the dates are inverted or the insert fails.
    pub async fn create(&self, input: CreateProjectInput) -> Result<projects::Model, ProjectError> {
        check_dates(input.start_date, input.end_date)?;

        let now = Utc::now().into();
        let model = projects::ActiveModel {
            name: Set(input.name),
            description: Set(input.description),
            address: Set(input.address),
            status: Set(input.status.as_str().to_string()),
            start_date: Set(input.start_date),
            end_date: Set(input.end_date),
            created_by: Set(input.created_by.into_inner()),
            created_at: Set(now),
            updated_at: Set(now),
            deleted_at: Set(None),
            ..Default::default()
        }
        .insert(&self.db)
        .await?;

        tracing::info!(project_id = model.id, "project created");
        Ok(model)
    }

    /// Applies a partial update to a live project.
    ///
    /// # Errors
    ///
    /// Returns an error if the project is missing, the resulting dates are
    /// inverted, or the update fails.
    pub async fn update(
        &self,
        id: ProjectId,
        input: UpdateProjectInput,
    ) -> Result<projects::Model, ProjectError> {
        let existing = self.find(id).await?;
        check_dates(
            input.start_date.or(existing.start_date),
            input.end_date.or(existing.end_date),
        )?;

        let mut active = existing.into_active_model();
        if let Some(name) = input.name {
            active.name = Set(name);
        }
        if let Some(description) = input.description {
            active.description = Set(description);
        }
        if let Some(address) = input.address {
            active.address = Set(address);
        }
        if let Some(status) = input.status {
            active.status = Set(status.as_str().to_string());
        }
        if let Some(start_date) = input.start_date {
            active.start_date = Set(Some(start_date));
        }
        if let Some(end_date) = input.end_date {
            active.end_date = Set(Some(end_date));
        }
        active.updated_at = Set(Utc::now().into());

        Ok(active.update(&self.db).await?)
    }

    /// Tombstones a live project.
    ///
    /// # Errors
    ///
    /// Returns `ProjectError::NotFound` if no live project was deleted.
    pub async fn soft_delete(&self, id: ProjectId) -> Result<(), ProjectError> {
        let result = projects::Entity::update_many()
            .col_expr(
                projects::Column::DeletedAt,
                sea_orm::sea_query::Expr::value(Some(
                    sea_orm::prelude::DateTimeWithTimeZone::from(Utc::now()),
                )),
            )
            .filter(projects::Column::Id.eq(id.into_inner()))
            .filter(projects::Column::DeletedAt.is_null())
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            return Err(ProjectError::NotFound(id));
        }

        tracing::info!(project_id = %id, "project deleted");
        Ok(())
    }
}

fn check_dates(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Result<(), ProjectError> {
    match (start, end) {
        (Some(start), Some(end)) if end < start => Err(ProjectError::InvalidDates),
        _ => Ok(()),
    }
}
