//! HTTP API layer with Axum routes and middleware.
//!
//! This crate provides:
//! - REST API routes under `/api/v1`
//! - Authentication and role middleware
//! - Mapping of the application error taxonomy to JSON responses

pub mod error;
pub mod middleware;
pub mod routes;

use axum::Router;
use sea_orm::DatabaseConnection;
use sitetrack_core::attachment::AttachmentService;
use sitetrack_core::auth::AuthService;
use sitetrack_core::storage::StorageService;
use sitetrack_db::{AttachmentRepository, ProjectRepository, UserRepository};
use sitetrack_shared::JwtService;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: Arc<DatabaseConnection>,
    /// JWT service for token operations.
    pub jwt_service: Arc<JwtService>,
    /// Blob storage for attachments.
    pub storage: Arc<StorageService>,
    /// Body limit for multipart upload requests.
    pub max_request_bytes: usize,
}

impl AppState {
    /// Auth service over the user store.
    #[must_use]
    pub fn auth_service(&self) -> AuthService<UserRepository> {
        AuthService::new(
            Arc::new(UserRepository::new((*self.db).clone())),
            self.jwt_service.clone(),
        )
    }

    /// Attachment service over the attachment store.
    #[must_use]
    pub fn attachment_service(&self) -> AttachmentService<AttachmentRepository> {
        AttachmentService::new(
            self.storage.clone(),
            Arc::new(AttachmentRepository::new((*self.db).clone())),
        )
    }

    /// Project store.
    #[must_use]
    pub fn projects(&self) -> ProjectRepository {
        ProjectRepository::new((*self.db).clone())
    }
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes_with_state(&state))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
