//! Registration, login and profile lookup.

use std::sync::Arc;

use serde::Serialize;
use sitetrack_shared::jwt::{JwtService, TokenSubject};
use sitetrack_shared::types::UserId;

use super::error::AuthError;
use super::password::{hash_password, verify_password};
use super::types::{Identity, IdentityView, NewIdentity, Role, RoleCode};

/// Repository trait for user and role records.
///
/// This trait is implemented by the db crate to provide actual database operations.
/// Every lookup ignores soft-deleted users.
pub trait CredentialRepository: Send + Sync {
    /// Find a live user by email.
    fn find_by_email(
        &self,
        email: &str,
    ) -> impl std::future::Future<Output = Result<Option<Identity>, AuthError>> + Send;

    /// Find a live user by ID.
    fn find_by_id(
        &self,
        id: UserId,
    ) -> impl std::future::Future<Output = Result<Option<Identity>, AuthError>> + Send;

    /// Find a role by code.
    fn find_role(
        &self,
        code: RoleCode,
    ) -> impl std::future::Future<Output = Result<Option<Role>, AuthError>> + Send;

    /// Persist a new active user.
    ///
    /// Fails with `AuthError::EmailTaken` if a live user already has the email.
    fn create(
        &self,
        input: NewIdentity,
    ) -> impl std::future::Future<Output = Result<Identity, AuthError>> + Send;
}

/// Input for registering a new user.
#[derive(Debug, Clone)]
pub struct RegisterInput {
    /// Email.
    pub email: String,
    /// Plaintext password.
    pub password: String,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Contact phone.
    pub phone: String,
    /// Requested role code.
    pub role_code: String,
}

/// A signed-in user and their session token.
#[derive(Debug, Clone, Serialize)]
pub struct AuthSession {
    /// The user.
    pub user: IdentityView,
    /// Session token.
    pub token: String,
    /// Token lifetime in seconds.
    pub expires_in: i64,
}

/// Auth service for user sessions.
pub struct AuthService<R: CredentialRepository> {
    repo: Arc<R>,
    tokens: Arc<JwtService>,
}

impl<R: CredentialRepository> AuthService<R> {
    /// Create a new auth service.
    #[must_use]
    pub fn new(repo: Arc<R>, tokens: Arc<JwtService>) -> Self {
        Self { repo, tokens }
    }

    /// Register a new user and sign them in.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The role code is unknown
    /// - The email is already registered
    /// - The role has not been seeded
    /// - Hashing, persistence or token signing fails
    pub async fn register(&self, input: RegisterInput) -> Result<AuthSession, AuthError> {
        let code = RoleCode::parse(&input.role_code)
            .ok_or_else(|| AuthError::UnknownRole(input.role_code.clone()))?;

        if self.repo.find_by_email(&input.email).await?.is_some() {
            return Err(AuthError::EmailTaken(input.email));
        }

        let role = self
            .repo
            .find_role(code)
            .await?
            .ok_or_else(|| AuthError::repository(format!("role '{code}' is not seeded")))?;

        let password_hash = hash_password(&input.password)?;

        let identity = self
            .repo
            .create(NewIdentity {
                email: input.email,
                password_hash,
                first_name: input.first_name,
                last_name: input.last_name,
                phone: input.phone,
                role_id: role.id,
            })
            .await?;

        tracing::info!(user_id = %identity.id, role = %code, "user registered");

        self.session(&identity)
    }

    /// Verify credentials and sign the user in.
    ///
    /// Unknown emails and wrong passwords fail identically.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials`, `AuthError::AccountDisabled`,
    /// or a repository/token error.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthSession, AuthError> {
        let identity = self
            .repo
            .find_by_email(email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !verify_password(password, &identity.password_hash) {
            return Err(AuthError::InvalidCredentials);
        }

        if !identity.is_active {
            return Err(AuthError::AccountDisabled);
        }

        self.session(&identity)
    }

    /// Look up the caller's own profile.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserNotFound` if the user is absent or soft-deleted.
    pub async fn profile(&self, user_id: UserId) -> Result<IdentityView, AuthError> {
        self.repo
            .find_by_id(user_id)
            .await?
            .map(|identity| identity.view())
            .ok_or(AuthError::UserNotFound(user_id))
    }

    fn session(&self, identity: &Identity) -> Result<AuthSession, AuthError> {
        let token = self.tokens.issue(&TokenSubject::from(identity))?;
        Ok(AuthSession {
            user: identity.view(),
            token,
            expires_in: self.tokens.expires_in(),
        })
    }
}
