//! Authentication and authorization.
//!
//! This module provides:
//! - Password hashing with Argon2id
//! - Role and identity definitions
//! - The authorization gate (bearer authentication, role checks)
//! - Registration, login and profile lookup

mod error;
mod gate;
mod password;
mod service;
mod types;

pub use error::AuthError;
pub use gate::{BEARER_SCHEME, authenticate, authenticate_at, authorize, bearer_token};
pub use password::{PasswordError, hash_password, verify_password};
pub use service::{AuthService, AuthSession, CredentialRepository, RegisterInput};
pub use types::{Identity, IdentityView, NewIdentity, Principal, Role, RoleCode};
