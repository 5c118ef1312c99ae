//! HTTP middleware.

pub mod auth;

pub use auth::{AuthUser, MANAGER_ONLY, auth_middleware, require_roles};
