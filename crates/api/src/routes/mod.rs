//! API route definitions.

use axum::{Router, middleware};

use crate::{AppState, middleware::auth_middleware};

pub mod auth;
pub mod files;
pub mod health;
pub mod projects;

#[cfg(test)]
mod test_support;

/// Creates the API router. Everything except health, register and login sits
/// behind the auth gate.
pub fn api_routes_with_state(state: &AppState) -> Router<AppState> {
    let protected_routes = Router::new()
        .merge(auth::protected_routes())
        .merge(files::routes(state.max_request_bytes))
        .merge(projects::routes())
        .layer(middleware::from_fn_with_state(
            state.jwt_service.clone(),
            auth_middleware,
        ));

    Router::new()
        .merge(health::routes())
        .merge(auth::routes())
        .merge(protected_routes)
}
