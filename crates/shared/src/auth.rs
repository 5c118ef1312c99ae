//! Authentication types for session tokens and auth payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::types::UserId;

/// Session token claims.
///
/// A self-contained signed assertion; nothing about it is persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID).
    pub sub: UserId,
    /// User email at issue time.
    pub email: String,
    /// Role code at issue time.
    pub role: String,
    /// Issued at timestamp.
    pub iat: i64,
    /// Expiration timestamp.
    pub exp: i64,
}

impl Claims {
    /// Creates claims issued at `issued_at` and expiring at `expires_at`.
    #[must_use]
    pub fn new(
        user_id: UserId,
        email: &str,
        role: &str,
        issued_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            sub: user_id,
            email: email.to_string(),
            role: role.to_string(),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        }
    }

    /// Returns the user ID from claims.
    #[must_use]
    pub const fn user_id(&self) -> UserId {
        self.sub
    }

    /// Returns true when the token is expired at `now` (expiry is exclusive).
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() >= self.exp
    }
}

/// Login request payload.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginRequest {
    /// User email.
    #[validate(email)]
    pub email: String,
    /// User password.
    #[validate(length(min = 6))]
    pub password: String,
}

/// Registration request payload.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterRequest {
    /// User email.
    #[validate(email)]
    pub email: String,
    /// User password.
    #[validate(length(min = 6))]
    pub password: String,
    /// Given name.
    #[validate(length(min = 1, max = 100))]
    pub first_name: String,
    /// Family name.
    #[validate(length(min = 1, max = 100))]
    pub last_name: String,
    /// Contact phone.
    #[serde(default)]
    #[validate(length(max = 20))]
    pub phone: String,
    /// Requested role code (`manager`, `engineer` or `observer`).
    pub role_code: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use serde_json::json;

    #[test]
    fn test_claims_new_sets_correct_fields() {
        let now = Utc::now();
        let expires_at = now + Duration::hours(1);

        let claims = Claims::new(UserId(3), "eng@example.com", "engineer", now, expires_at);

        assert_eq!(claims.sub, UserId(3));
        assert_eq!(claims.email, "eng@example.com");
        assert_eq!(claims.role, "engineer");
        assert_eq!(claims.iat, now.timestamp());
        assert_eq!(claims.exp, expires_at.timestamp());
    }

    #[test]
    fn test_claims_expiry_is_exclusive() {
        let now = Utc::now();
        let claims = Claims::new(UserId(1), "a@b.c", "observer", now, now + Duration::seconds(10));

        assert!(!claims.is_expired_at(now));
        assert!(!claims.is_expired_at(now + Duration::seconds(9)));
        assert!(claims.is_expired_at(now + Duration::seconds(10)));
        assert!(claims.is_expired_at(now + Duration::seconds(11)));
    }

    #[test]
    fn test_register_request_validation() {
        let req: RegisterRequest = serde_json::from_value(json!({
            "email": "new@example.com",
            "password": "secret1",
            "first_name": "Ivan",
            "last_name": "Petrov",
            "role_code": "engineer"
        }))
        .expect("deserialize request");
        assert!(req.validate().is_ok());
        assert_eq!(req.phone, "");

        let bad = RegisterRequest {
            email: "not-an-email".into(),
            password: "123".into(),
            ..req
        };
        let errors = bad.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("password"));
    }

    #[test]
    fn test_login_request_requires_password_length() {
        let req = LoginRequest {
            email: "user@example.com".into(),
            password: "12345".into(),
        };
        assert!(req.validate().is_err());
    }
}
