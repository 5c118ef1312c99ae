//! Session token issuance and validation.
//!
//! Tokens are HS256-signed JWTs carrying the subject id, email and role code.
//! Validation is fully stateless: there is no revocation list, a token dies at
//! its expiry or when its signature stops verifying.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use thiserror::Error;

use crate::auth::Claims;
use crate::config::JwtSettings;
use crate::error::AppError;
use crate::types::UserId;

/// Token lifetime used when none is configured.
pub const DEFAULT_EXPIRY_HOURS: i64 = 24;

/// JWT configuration.
#[derive(Clone)]
pub struct JwtConfig {
    /// Secret key for signing tokens.
    pub secret: String,
    /// Token lifetime in hours.
    pub expires_hours: i64,
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"[hidden]")
            .field("expires_hours", &self.expires_hours)
            .finish()
    }
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: String::new(),
            expires_hours: DEFAULT_EXPIRY_HOURS,
        }
    }
}

impl From<&JwtSettings> for JwtConfig {
    fn from(settings: &JwtSettings) -> Self {
        Self {
            secret: settings.secret.clone(),
            expires_hours: i64::try_from(settings.effective_expiry_hours())
                .unwrap_or(DEFAULT_EXPIRY_HOURS),
        }
    }
}

/// Errors that can occur during JWT operations.
#[derive(Debug, Error)]
pub enum JwtError {
    /// The token could not be signed (missing secret or encoder failure).
    #[error("failed to sign token: {0}")]
    SigningFailure(String),

    /// Bad signature, unexpected algorithm, malformed structure or expired.
    #[error("invalid token: {0}")]
    TokenInvalid(String),
}

impl From<JwtError> for AppError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::SigningFailure(msg) => Self::Internal(msg),
            JwtError::TokenInvalid(msg) => Self::Unauthenticated(msg),
        }
    }
}

/// What a token asserts about its holder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenSubject {
    /// Identity id.
    pub user_id: UserId,
    /// Identity email.
    pub email: String,
    /// Role code.
    pub role_code: String,
}

/// JWT service for token operations.
#[derive(Clone)]
pub struct JwtService {
    config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl std::fmt::Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService")
            .field("config", &self.config)
            .field("encoding_key", &"[hidden]")
            .field("decoding_key", &"[hidden]")
            .finish()
    }
}

impl JwtService {
    /// Creates a new JWT service with the given configuration.
    #[must_use]
    pub fn new(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());
        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }

    /// Issues a token for `subject`, valid from now for the configured lifetime.
    ///
    /// # Errors
    ///
    /// Returns `JwtError::SigningFailure` if no secret is configured or encoding fails.
    pub fn issue(&self, subject: &TokenSubject) -> Result<String, JwtError> {
        self.issue_at(subject, Utc::now())
    }

    /// Issues a token as if the current instant were `now`.
    ///
    /// # Errors
    ///
    /// Returns `JwtError::SigningFailure` if no secret is configured or encoding fails.
    pub fn issue_at(&self, subject: &TokenSubject, now: DateTime<Utc>) -> Result<String, JwtError> {
        if self.config.secret.is_empty() {
            return Err(JwtError::SigningFailure(
                "signing secret is not configured".to_string(),
            ));
        }

        let claims = Claims::new(
            subject.user_id,
            &subject.email,
            &subject.role_code,
            now,
            now + self.ttl(),
        );

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| JwtError::SigningFailure(e.to_string()))
    }

    /// Validates and decodes a token against the wall clock.
    ///
    /// # Errors
    ///
    /// Returns `JwtError::TokenInvalid` on any signature, algorithm, structure or expiry failure.
    pub fn validate(&self, token: &str) -> Result<Claims, JwtError> {
        self.validate_at(token, Utc::now())
    }

    /// Validates and decodes a token as if the current instant were `now`.
    ///
    /// The token is rejected at and after its `exp` second; there is no leeway.
    ///
    /// # Errors
    ///
    /// Returns `JwtError::TokenInvalid` on any signature, algorithm, structure or expiry failure.
    pub fn validate_at(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, JwtError> {
        if self.config.secret.is_empty() {
            return Err(JwtError::TokenInvalid(
                "signing secret is not configured".to_string(),
            ));
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        let claims = decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| JwtError::TokenInvalid(e.to_string()))?;

        if claims.is_expired_at(now) {
            return Err(JwtError::TokenInvalid("token has expired".to_string()));
        }

        Ok(claims)
    }

    /// Configured token lifetime.
    #[must_use]
    pub fn ttl(&self) -> Duration {
        Duration::hours(self.config.expires_hours)
    }

    /// Returns the token lifetime in seconds.
    #[must_use]
    pub const fn expires_in(&self) -> i64 {
        self.config.expires_hours * 3600
    }
}
