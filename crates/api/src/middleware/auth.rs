//! Authentication and role middleware for protected routes.

use std::sync::Arc;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use sitetrack_core::auth::{self, AuthError, Principal, RoleCode};
use sitetrack_shared::JwtService;

use crate::error::ApiError;

/// Roles allowed to manage projects.
pub const MANAGER_ONLY: &[RoleCode] = &[RoleCode::Manager];

/// Authentication middleware that validates session tokens.
///
/// This middleware:
/// 1. Reads the Bearer token from the Authorization header
/// 2. Validates the token using the JWT service
/// 3. Stores the caller's `Principal` in request extensions for handlers to access
pub async fn auth_middleware(
    State(jwt): State<Arc<JwtService>>,
    mut request: Request,
    next: Next,
) -> Response {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    match auth::authenticate(header, &jwt) {
        Ok(principal) => {
            request.extensions_mut().insert(principal);
            next.run(request).await
        }
        Err(e) => {
            tracing::debug!(error = %e, "request rejected by auth gate");
            ApiError::from(e).into_response()
        }
    }
}

/// Role middleware. Must run after [`auth_middleware`].
///
/// Apply with `route_layer(from_fn_with_state(MANAGER_ONLY, require_roles))`.
pub async fn require_roles(
    State(allowed): State<&'static [RoleCode]>,
    request: Request,
    next: Next,
) -> Response {
    let Some(principal) = request.extensions().get::<Principal>() else {
        return ApiError::from(AuthError::Unauthenticated(
            "authentication required".to_string(),
        ))
        .into_response();
    };

    if let Err(e) = auth::authorize(principal, allowed) {
        tracing::info!(user_id = %principal.user_id, role = %principal.role, "role check failed");
        return ApiError::from(e).into_response();
    }

    next.run(request).await
}

/// Extractor for the authenticated caller.
///
/// ```ignore
/// async fn handler(AuthUser(principal): AuthUser) -> impl IntoResponse {
///     let user_id = principal.user_id;
///     // ...
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser(pub Principal);

impl AuthUser {
    /// Returns the inner principal.
    #[must_use]
    pub fn principal(&self) -> &Principal {
        &self.0
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Principal>()
            .cloned()
            .map(AuthUser)
            .ok_or_else(|| {
                ApiError::from(AuthError::Unauthenticated(
                    "authentication required".to_string(),
                ))
            })
    }
}
