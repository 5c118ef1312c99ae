//! Project routes. Reads are open to every role; writes are manager-only.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    middleware::from_fn_with_state,
    response::Response,
    routing::{get, post, put},
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sitetrack_core::attachment::EntityKind;
use sitetrack_db::entities::projects;
use sitetrack_db::repositories::{
    CreateProjectInput, ProjectFilter, ProjectStatus, UpdateProjectInput,
};
use sitetrack_shared::AppError;
use sitetrack_shared::types::{PageRequest, PageResponse, ProjectId, UserId};
use validator::Validate;

use crate::AppState;
use crate::error::ApiResult;
use crate::middleware::{AuthUser, MANAGER_ONLY, require_roles};
use crate::routes::auth::validation_error;
use crate::routes::files::file_response;

/// Creates the project routes.
pub fn routes() -> Router<AppState> {
    let managed = Router::new()
        .route("/projects", post(create_project))
        .route("/projects/{id}", put(update_project).delete(delete_project))
        .route_layer(from_fn_with_state(MANAGER_ONLY, require_roles));

    Router::new()
        .route("/projects", get(list_projects))
        .route("/projects/{id}", get(get_project))
        .route("/projects/{id}/files", get(project_files))
        .route("/projects/{id}/image", get(project_image))
        .merge(managed)
}

/// Query parameters for listing projects. Unparseable numbers fall back to defaults.
#[derive(Debug, Deserialize)]
pub struct ListProjectsQuery {
    /// Status filter.
    pub status: Option<String>,
    /// Page number.
    pub page: Option<String>,
    /// Page size.
    pub limit: Option<String>,
}

/// Request body for creating a project.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateProjectRequest {
    /// Project name.
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
    /// Site address.
    #[serde(default)]
    #[validate(length(max = 500))]
    pub address: String,
    /// Initial status, `active` when omitted.
    #[serde(default)]
    pub status: Option<ProjectStatus>,
    /// Planned start.
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    /// Planned completion.
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
}

/// Request body for updating a project. Omitted fields are unchanged.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateProjectRequest {
    /// New name.
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New address.
    #[validate(length(max = 500))]
    pub address: Option<String>,
    /// New status.
    pub status: Option<ProjectStatus>,
    /// New planned start.
    pub start_date: Option<NaiveDate>,
    /// New planned completion.
    pub end_date: Option<NaiveDate>,
}

/// Project as returned to clients.
#[derive(Debug, Serialize)]
pub struct ProjectResponse {
    /// Project ID.
    pub id: ProjectId,
    /// Project name.
    pub name: String,
    /// Description.
    pub description: String,
    /// Site address.
    pub address: String,
    /// Lifecycle status.
    pub status: String,
    /// Planned start.
    pub start_date: Option<NaiveDate>,
    /// Planned completion.
    pub end_date: Option<NaiveDate>,
    /// Creating manager.
    pub created_by: UserId,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl From<projects::Model> for ProjectResponse {
    fn from(model: projects::Model) -> Self {
        Self {
            id: ProjectId(model.id),
            name: model.name,
            description: model.description,
            address: model.address,
            status: model.status,
            start_date: model.start_date,
            end_date: model.end_date,
            created_by: UserId(model.created_by),
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

/// GET /projects - Paginated project list, newest first.
async fn list_projects(
    State(state): State<AppState>,
    Query(query): Query<ListProjectsQuery>,
) -> ApiResult<Json<PageResponse<ProjectResponse>>> {
    let status = match query.status.as_deref().filter(|s| !s.is_empty()) {
        Some(raw) => Some(
            ProjectStatus::parse(raw)
                .ok_or_else(|| AppError::InvalidInput(format!("unknown status: {raw}")))?,
        ),
        None => None,
    };
    let page = page_request(query.page.as_deref(), query.limit.as_deref());

    let (items, total) = state
        .projects()
        .list(ProjectFilter { status }, &page)
        .await?;

    Ok(Json(PageResponse::new(
        items.into_iter().map(ProjectResponse::from).collect(),
        page.page,
        page.limit,
        total,
    )))
}

/// GET /projects/{id}
async fn get_project(
    State(state): State<AppState>,
    Path(id): Path<ProjectId>,
) -> ApiResult<Json<serde_json::Value>> {
    let project = ProjectResponse::from(state.projects().find(id).await?);
    Ok(Json(json!({ "project": project })))
}

/// POST /projects - Manager only.
async fn create_project(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Json(payload): Json<CreateProjectRequest>,
) -> ApiResult<(StatusCode, Json<serde_json::Value>)> {
    payload.validate().map_err(validation_error)?;

    let project = state
        .projects()
        .create(CreateProjectInput {
            name: payload.name,
            description: payload.description,
            address: payload.address,
            status: payload.status.unwrap_or(ProjectStatus::Active),
            start_date: payload.start_date,
            end_date: payload.end_date,
            created_by: principal.user_id,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "project": ProjectResponse::from(project) })),
    ))
}

/// PUT /projects/{id} - Manager only.
async fn update_project(
    State(state): State<AppState>,
    Path(id): Path<ProjectId>,
    Json(payload): Json<UpdateProjectRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    payload.validate().map_err(validation_error)?;

    let project = state
        .projects()
        .update(
            id,
            UpdateProjectInput {
                name: payload.name,
                description: payload.description,
                address: payload.address,
                status: payload.status,
                start_date: payload.start_date,
                end_date: payload.end_date,
            },
        )
        .await?;

    Ok(Json(json!({ "project": ProjectResponse::from(project) })))
}

/// DELETE /projects/{id} - Manager only.
async fn delete_project(
    State(state): State<AppState>,
    Path(id): Path<ProjectId>,
) -> ApiResult<Json<serde_json::Value>> {
    state.projects().soft_delete(id).await?;
    Ok(Json(json!({ "message": "project deleted" })))
}

/// GET /projects/{id}/files
async fn project_files(
    State(state): State<AppState>,
    Path(id): Path<ProjectId>,
) -> ApiResult<Json<serde_json::Value>> {
    let files = state
        .attachment_service()
        .list(EntityKind::Project.as_str(), id.into_inner())
        .await?;
    Ok(Json(json!({ "files": files })))
}

/// GET /projects/{id}/image - Earliest image attached to the project.
async fn project_image(
    State(state): State<AppState>,
    Path(id): Path<ProjectId>,
) -> ApiResult<Response> {
    let download = state
        .attachment_service()
        .fetch_first_image(EntityKind::Project.as_str(), id.into_inner())
        .await?;
    Ok(file_response(download))
}

fn page_request(page: Option<&str>, limit: Option<&str>) -> PageRequest {
    let defaults = PageRequest::default();
    PageRequest {
        page: page.and_then(|p| p.trim().parse().ok()).unwrap_or(defaults.page),
        limit: limit
            .and_then(|l| l.trim().parse().ok())
            .unwrap_or(defaults.limit),
    }
    .normalized()
}
