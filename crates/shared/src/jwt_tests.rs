//! Unit tests for session token issuance and validation.

use chrono::{Duration, TimeZone, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use proptest::prelude::*;

use crate::auth::Claims;
use crate::jwt::{JwtConfig, JwtError, JwtService, TokenSubject};
use crate::types::UserId;

const SECRET: &str = "test-signing-secret-with-enough-entropy";

fn service() -> JwtService {
    JwtService::new(JwtConfig {
        secret: SECRET.to_string(),
        expires_hours: 24,
    })
}

fn subject() -> TokenSubject {
    TokenSubject {
        user_id: UserId(42),
        email: "manager@example.com".to_string(),
        role_code: "manager".to_string(),
    }
}

fn fixed_now() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 8, 0, 0).unwrap()
}

#[test]
fn test_issue_then_validate_returns_subject() {
    let svc = service();
    let now = fixed_now();

    let token = svc.issue_at(&subject(), now).unwrap();
    let claims = svc.validate_at(&token, now + Duration::hours(1)).unwrap();

    assert_eq!(claims.user_id(), UserId(42));
    assert_eq!(claims.email, "manager@example.com");
    assert_eq!(claims.role, "manager");
    assert_eq!(claims.iat, now.timestamp());
    assert_eq!(claims.exp, (now + Duration::hours(24)).timestamp());
}

#[test]
fn test_issue_with_wall_clock_validates() {
    let svc = service();
    let token = svc.issue(&subject()).unwrap();
    assert!(svc.validate(&token).is_ok());
}

#[test]
fn test_token_rejected_at_and_after_expiry() {
    let svc = service();
    let now = fixed_now();
    let token = svc.issue_at(&subject(), now).unwrap();
    let expiry = now + Duration::hours(24);

    assert!(svc.validate_at(&token, expiry - Duration::seconds(1)).is_ok());
    assert!(matches!(
        svc.validate_at(&token, expiry),
        Err(JwtError::TokenInvalid(_))
    ));
    assert!(matches!(
        svc.validate_at(&token, expiry + Duration::seconds(1)),
        Err(JwtError::TokenInvalid(_))
    ));
}

#[test]
fn test_configured_lifetime_is_used() {
    let svc = JwtService::new(JwtConfig {
        secret: SECRET.to_string(),
        expires_hours: 2,
    });
    let now = fixed_now();
    let token = svc.issue_at(&subject(), now).unwrap();

    assert_eq!(svc.expires_in(), 7200);
    assert!(svc.validate_at(&token, now + Duration::minutes(119)).is_ok());
    assert!(svc.validate_at(&token, now + Duration::hours(2)).is_err());
}

#[test]
fn test_empty_secret_cannot_sign() {
    let svc = JwtService::new(JwtConfig::default());
    assert!(matches!(
        svc.issue(&subject()),
        Err(JwtError::SigningFailure(_))
    ));
}

#[test]
fn test_wrong_secret_is_rejected() {
    let now = fixed_now();
    let token = service().issue_at(&subject(), now).unwrap();

    let other = JwtService::new(JwtConfig {
        secret: "a-completely-different-secret".to_string(),
        expires_hours: 24,
    });
    assert!(matches!(
        other.validate_at(&token, now),
        Err(JwtError::TokenInvalid(_))
    ));
}

#[test]
fn test_other_algorithm_is_rejected() {
    let now = fixed_now();
    let claims = Claims::new(
        UserId(42),
        "manager@example.com",
        "manager",
        now,
        now + Duration::hours(1),
    );
    let token = encode(
        &Header::new(Algorithm::HS512),
        &claims,
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .unwrap();

    assert!(matches!(
        service().validate_at(&token, now),
        Err(JwtError::TokenInvalid(_))
    ));
}

#[test]
fn test_malformed_tokens_are_rejected() {
    let svc = service();
    for token in ["", "abc", "a.b", "a.b.c", "not a token at all"] {
        assert!(
            matches!(svc.validate(token), Err(JwtError::TokenInvalid(_))),
            "{token:?} should be rejected"
        );
    }
}

#[test]
fn test_debug_hides_secret() {
    let rendered = format!("{:?}", service());
    assert!(!rendered.contains(SECRET));
    assert!(rendered.contains("[hidden]"));
}

#[test]
fn test_errors_map_to_app_errors() {
    use crate::error::AppError;

    let err: AppError = JwtError::TokenInvalid("bad".into()).into();
    assert_eq!(err, AppError::Unauthenticated("bad".into()));

    let err: AppError = JwtError::SigningFailure("no key".into()).into();
    assert_eq!(err, AppError::Internal("no key".into()));
}

const BASE64URL: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-_";

proptest! {
    #[test]
    fn prop_tampered_signature_is_rejected(index in any::<prop::sample::Index>(), pick in 0usize..BASE64URL.len()) {
        let svc = service();
        let now = fixed_now();
        let token = svc.issue_at(&subject(), now).unwrap();

        let sig_start = token.rfind('.').unwrap() + 1;
        let sig_len = token.len() - sig_start;
        let pos = sig_start + index.index(sig_len);

        let mut bytes = token.into_bytes();
        let mut replacement = BASE64URL[pick];
        if replacement == bytes[pos] {
            replacement = BASE64URL[(pick + 1) % BASE64URL.len()];
        }
        bytes[pos] = replacement;
        let tampered = String::from_utf8(bytes).unwrap();

        prop_assert!(svc.validate_at(&tampered, now).is_err());
    }

    #[test]
    fn prop_tampered_payload_is_rejected(index in any::<prop::sample::Index>()) {
        let svc = service();
        let now = fixed_now();
        let token = svc.issue_at(&subject(), now).unwrap();

        let first_dot = token.find('.').unwrap();
        let second_dot = token.rfind('.').unwrap();
        let pos = first_dot + 1 + index.index(second_dot - first_dot - 1);

        let mut bytes = token.into_bytes();
        bytes[pos] = if bytes[pos] == b'A' { b'B' } else { b'A' };
        let tampered = String::from_utf8(bytes).unwrap();

        prop_assert!(svc.validate_at(&tampered, now).is_err());
    }
}
