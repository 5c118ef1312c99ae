//! Authentication routes for register, login and profile.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use sitetrack_core::auth::{AuthSession, IdentityView, RegisterInput};
use sitetrack_shared::AppError;
use sitetrack_shared::auth::{LoginRequest, RegisterRequest};
use validator::{Validate, ValidationErrors};

use crate::AppState;
use crate::error::ApiResult;
use crate::middleware::AuthUser;

/// Public auth routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
}

/// Auth routes that require a session.
pub fn protected_routes() -> Router<AppState> {
    Router::new().route("/profile", get(profile))
}

/// POST /auth/register - Create an account and sign it in.
async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<AuthSession>)> {
    payload.validate().map_err(validation_error)?;

    let session = state
        .auth_service()
        .register(RegisterInput {
            email: payload.email,
            password: payload.password,
            first_name: payload.first_name,
            last_name: payload.last_name,
            phone: payload.phone,
            role_code: payload.role_code,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(session)))
}

/// POST /auth/login - Exchange credentials for a session token.
async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<Json<AuthSession>> {
    payload.validate().map_err(validation_error)?;

    let session = state
        .auth_service()
        .login(&payload.email, &payload.password)
        .await?;

    Ok(Json(session))
}

/// GET /profile - The signed-in user.
async fn profile(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
) -> ApiResult<Json<IdentityView>> {
    let user = state.auth_service().profile(principal.user_id).await?;
    Ok(Json(user))
}

/// Flattens validator output into a single invalid-input error.
pub(crate) fn validation_error(errors: ValidationErrors) -> AppError {
    let field_errors = errors.field_errors();
    let mut fields: Vec<&str> = field_errors.keys().map(AsRef::as_ref).collect();
    fields.sort_unstable();
    AppError::InvalidInput(format!("invalid fields: {}", fields.join(", ")))
}
