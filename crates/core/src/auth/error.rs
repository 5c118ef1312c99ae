//! Auth error types.

use sitetrack_shared::AppError;
use sitetrack_shared::jwt::JwtError;
use sitetrack_shared::types::UserId;
use thiserror::Error;

use super::password::PasswordError;

/// Authentication and authorization errors.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Missing or malformed credential.
    #[error("{0}")]
    Unauthenticated(String),

    /// Role not in the operation's allow-list.
    #[error("{0}")]
    Forbidden(String),

    /// Unknown email or wrong password.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// The account exists but is disabled.
    #[error("account is disabled")]
    AccountDisabled,

    /// Email already registered.
    #[error("email already registered: {0}")]
    EmailTaken(String),

    /// Role code outside the closed set.
    #[error("unknown role code: {0}")]
    UnknownRole(String),

    /// User not found (or soft-deleted).
    #[error("user not found: {0}")]
    UserNotFound(UserId),

    /// Password hashing failed.
    #[error(transparent)]
    Password(#[from] PasswordError),

    /// Token issue or validation failed.
    #[error(transparent)]
    Token(#[from] JwtError),

    /// Credential store operation failed.
    #[error("repository error: {0}")]
    Repository(String),
}

impl AuthError {
    /// Create a repository error.
    #[must_use]
    pub fn repository(msg: impl Into<String>) -> Self {
        Self::Repository(msg.into())
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Unauthenticated(msg) => Self::Unauthenticated(msg),
            AuthError::InvalidCredentials => Self::Unauthenticated(err.to_string()),
            AuthError::Forbidden(msg) => Self::Forbidden(msg),
            AuthError::AccountDisabled => Self::Forbidden(err.to_string()),
            AuthError::EmailTaken(_) => Self::Conflict(err.to_string()),
            AuthError::UnknownRole(_) => Self::InvalidInput(err.to_string()),
            AuthError::UserNotFound(_) => Self::NotFound(err.to_string()),
            AuthError::Token(e) => e.into(),
            AuthError::Password(_) | AuthError::Repository(_) => Self::Internal(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(AuthError::Unauthenticated("missing".into()), 401)]
    #[case(AuthError::InvalidCredentials, 401)]
    #[case(AuthError::Forbidden("role".into()), 403)]
    #[case(AuthError::AccountDisabled, 403)]
    #[case(AuthError::EmailTaken("a@b.c".into()), 409)]
    #[case(AuthError::UnknownRole("admin".into()), 400)]
    #[case(AuthError::UserNotFound(UserId(9)), 404)]
    #[case(AuthError::Token(JwtError::TokenInvalid("bad".into())), 401)]
    #[case(AuthError::Token(JwtError::SigningFailure("no key".into())), 500)]
    #[case(AuthError::repository("connection reset"), 500)]
    fn test_maps_to_status(#[case] err: AuthError, #[case] status: u16) {
        assert_eq!(AppError::from(err).status_code(), status);
    }

    #[test]
    fn test_login_failures_share_a_message() {
        let err = AppError::from(AuthError::InvalidCredentials);
        assert_eq!(err.message(), "invalid email or password");
    }
}
