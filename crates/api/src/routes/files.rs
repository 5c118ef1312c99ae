//! Attachment routes: upload, list, download, replace and delete.

use axum::{
    Json, Router,
    extract::{
        DefaultBodyLimit, Multipart, Path, Query, State,
        multipart::{Field, MultipartError},
    },
    http::{
        HeaderMap, HeaderValue,
        header::{CACHE_CONTROL, CONTENT_DISPOSITION, CONTENT_TYPE},
    },
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sitetrack_core::attachment::{
    AttachmentSummary, Download, FailedUpload, FileKind, UploadFile,
};
use sitetrack_shared::AppError;
use sitetrack_shared::types::AttachmentId;

use crate::AppState;
use crate::error::ApiResult;
use crate::middleware::AuthUser;

const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";
const IMAGE_CACHE_CONTROL: &str = "public, max-age=3600";

/// Creates the attachment routes. Multipart bodies are capped at `max_request_bytes`.
pub fn routes(max_request_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/files/upload", post(upload))
        .route("/files", get(list))
        .route(
            "/files/{id}",
            get(download).put(replace).delete(delete_file),
        )
        .layer(DefaultBodyLimit::max(max_request_bytes))
}

/// Query for listing an entity's attachments.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// Owning entity kind.
    pub entity_type: Option<String>,
    /// Owning entity ID.
    pub entity_id: Option<String>,
}

/// Response for a batch upload.
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    /// Files that were stored.
    pub uploaded_files: Vec<AttachmentSummary>,
    /// Files that were rejected.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<FailedUpload>,
}

/// POST /files/upload - Store one or more files for an entity.
async fn upload(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    mut multipart: Multipart,
) -> ApiResult<Json<UploadResponse>> {
    let mut entity_type = None;
    let mut entity_id = None;
    let mut files = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "entity_type" => entity_type = Some(field.text().await.map_err(multipart_error)?),
            "entity_id" => entity_id = Some(field.text().await.map_err(multipart_error)?),
            "files" => files.push(read_file(field).await?),
            _ => {}
        }
    }

    let (entity_type, entity_id) = entity_ref(entity_type, entity_id)?;
    let outcome = state
        .attachment_service()
        .upload(&principal, &entity_type, entity_id, files)
        .await?;

    Ok(Json(UploadResponse {
        uploaded_files: outcome.succeeded,
        errors: outcome.failed,
    }))
}

/// GET /files - List an entity's attachments, oldest first.
async fn list(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<serde_json::Value>> {
    let (entity_type, entity_id) = entity_ref(query.entity_type, query.entity_id)?;
    let files = state
        .attachment_service()
        .list(&entity_type, entity_id)
        .await?;

    Ok(Json(json!({ "files": files })))
}

/// GET /files/{id} - Serve the blob inline.
async fn download(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<AttachmentId>,
) -> ApiResult<Response> {
    let download = state.attachment_service().fetch_for_download(id).await?;
    Ok(file_response(download))
}

/// PUT /files/{id} - Swap the blob behind an attachment.
async fn replace(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Path(id): Path<AttachmentId>,
    mut multipart: Multipart,
) -> ApiResult<Json<serde_json::Value>> {
    let mut file = None;
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() == Some("file") {
            file = Some(read_file(field).await?);
            break;
        }
    }

    let file = file.ok_or_else(|| AppError::InvalidInput("file is required".to_string()))?;
    let summary = state
        .attachment_service()
        .replace(id, &principal, file)
        .await?;

    Ok(Json(json!({ "message": "file replaced", "file": summary })))
}

/// DELETE /files/{id} - Remove an attachment.
async fn delete_file(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Path(id): Path<AttachmentId>,
) -> ApiResult<Json<serde_json::Value>> {
    state.attachment_service().delete(id, &principal).await?;
    Ok(Json(json!({ "message": "file deleted" })))
}

async fn read_file(field: Field<'_>) -> Result<UploadFile, AppError> {
    let original_name = field.file_name().unwrap_or("upload").to_string();
    let content_type = field
        .content_type()
        .unwrap_or(FALLBACK_CONTENT_TYPE)
        .to_string();
    let bytes = field.bytes().await.map_err(multipart_error)?;

    Ok(UploadFile {
        original_name,
        content_type,
        bytes,
    })
}

fn entity_ref(
    entity_type: Option<String>,
    entity_id: Option<String>,
) -> Result<(String, i64), AppError> {
    let (Some(entity_type), Some(entity_id)) = (entity_type, entity_id) else {
        return Err(AppError::InvalidInput(
            "entity_type and entity_id are required".to_string(),
        ));
    };

    let entity_id = entity_id
        .trim()
        .parse::<i64>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| AppError::InvalidInput("invalid entity_id".to_string()))?;

    Ok((entity_type, entity_id))
}

fn multipart_error(err: MultipartError) -> AppError {
    AppError::InvalidInput(err.body_text())
}

/// Builds an inline file response. Images are cacheable.
pub(crate) fn file_response(download: Download) -> Response {
    let mut headers = HeaderMap::new();
    headers.insert(
        CONTENT_TYPE,
        HeaderValue::from_str(&download.content_type)
            .unwrap_or(HeaderValue::from_static(FALLBACK_CONTENT_TYPE)),
    );
    if let Ok(disposition) = HeaderValue::from_str(&content_disposition(&download.original_name))
    {
        headers.insert(CONTENT_DISPOSITION, disposition);
    }
    if download.file_kind == FileKind::Image {
        headers.insert(CACHE_CONTROL, HeaderValue::from_static(IMAGE_CACHE_CONTROL));
    }

    (headers, download.bytes).into_response()
}

/// `inline` disposition with an ASCII fallback name and an RFC 5987 UTF-8 name.
fn content_disposition(original_name: &str) -> String {
    let fallback: String = original_name
        .chars()
        .map(|c| {
            if (c.is_ascii_graphic() && c != '"' && c != '\\') || c == ' ' {
                c
            } else {
                '_'
            }
        })
        .collect();

    let mut encoded = String::with_capacity(original_name.len());
    for byte in original_name.bytes() {
        if byte.is_ascii_alphanumeric() || b"!#$&+-.^_`|~".contains(&byte) {
            encoded.push(char::from(byte));
        } else {
            encoded.push_str(&format!("%{byte:02X}"));
        }
    }

    format!("inline; filename=\"{fallback}\"; filename*=UTF-8''{encoded}")
}
