//! Authorization gate: bearer authentication followed by role checks.

use chrono::{DateTime, Utc};
use sitetrack_shared::jwt::JwtService;

use super::error::AuthError;
use super::types::{Principal, RoleCode};

/// Authorization scheme accepted by [`authenticate`].
pub const BEARER_SCHEME: &str = "Bearer";

/// Extracts the token from an `Authorization` header value.
///
/// The value must be exactly two space-separated parts: the scheme (matched
/// case-insensitively) and a non-empty token.
///
/// # Errors
///
/// Returns `AuthError::Unauthenticated` if the header has any other shape.
pub fn bearer_token(header: &str) -> Result<&str, AuthError> {
    let parts: Vec<&str> = header.split(' ').collect();
    match parts.as_slice() {
        [scheme, token] if scheme.eq_ignore_ascii_case(BEARER_SCHEME) && !token.is_empty() => {
            Ok(token)
        }
        _ => Err(AuthError::Unauthenticated(
            "invalid authorization header format".to_string(),
        )),
    }
}

/// Authenticates a request from its `Authorization` header.
///
/// # Errors
///
/// Returns `AuthError::Unauthenticated` if the header is absent or malformed,
/// or the token fails validation.
pub fn authenticate(header: Option<&str>, tokens: &JwtService) -> Result<Principal, AuthError> {
    authenticate_at(header, tokens, Utc::now())
}

/// Same as [`authenticate`], validating expiry against `now`.
///
/// # Errors
///
/// See [`authenticate`].
pub fn authenticate_at(
    header: Option<&str>,
    tokens: &JwtService,
    now: DateTime<Utc>,
) -> Result<Principal, AuthError> {
    let header = header
        .ok_or_else(|| AuthError::Unauthenticated("missing authorization header".to_string()))?;
    let token = bearer_token(header)?;

    let claims = tokens
        .validate_at(token, now)
        .map_err(|e| AuthError::Unauthenticated(e.to_string()))?;

    Ok(Principal::from(claims))
}

/// Checks that the principal's role is in `allowed`.
///
/// Unknown role codes are forbidden, never an internal error.
///
/// # Errors
///
/// Returns `AuthError::Forbidden` if the role is unknown or not allowed.
pub fn authorize(principal: &Principal, allowed: &[RoleCode]) -> Result<RoleCode, AuthError> {
    RoleCode::parse(&principal.role)
        .filter(|code| allowed.contains(code))
        .ok_or_else(|| AuthError::Forbidden("insufficient permissions".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use rstest::rstest;
    use sitetrack_shared::jwt::{JwtConfig, TokenSubject};
    use sitetrack_shared::types::UserId;

    fn tokens() -> JwtService {
        JwtService::new(JwtConfig {
            secret: "gate-test-secret".to_string(),
            expires_hours: 1,
        })
    }

    fn principal(role: &str) -> Principal {
        Principal {
            user_id: UserId(1),
            email: "someone@example.com".into(),
            role: role.into(),
        }
    }

    #[rstest]
    #[case("Bearer abc.def.ghi", "abc.def.ghi")]
    #[case("bearer abc", "abc")]
    #[case("BEARER abc", "abc")]
    fn test_bearer_token_accepts(#[case] header: &str, #[case] token: &str) {
        assert_eq!(bearer_token(header).unwrap(), token);
    }

    #[rstest]
    #[case("")]
    #[case("Bearer")]
    #[case("Bearer ")]
    #[case("Basic abc")]
    #[case("Bearer abc def")]
    #[case("Bearer  abc")]
    #[case("abc")]
    fn test_bearer_token_rejects(#[case] header: &str) {
        assert!(matches!(
            bearer_token(header),
            Err(AuthError::Unauthenticated(_))
        ));
    }

    #[test]
    fn test_authenticate_publishes_principal() {
        let svc = tokens();
        let now = Utc::now();
        let token = svc
            .issue_at(
                &TokenSubject {
                    user_id: UserId(3),
                    email: "eng@example.com".into(),
                    role_code: "engineer".into(),
                },
                now,
            )
            .unwrap();
        let header = format!("Bearer {token}");

        let principal = authenticate_at(Some(&header), &svc, now).unwrap();
        assert_eq!(principal.user_id, UserId(3));
        assert_eq!(principal.email, "eng@example.com");
        assert_eq!(principal.role, "engineer");

        let expired = authenticate_at(Some(&header), &svc, now + Duration::hours(1));
        assert!(matches!(expired, Err(AuthError::Unauthenticated(_))));
    }

    #[test]
    fn test_authenticate_requires_header() {
        assert!(matches!(
            authenticate(None, &tokens()),
            Err(AuthError::Unauthenticated(_))
        ));
        assert!(matches!(
            authenticate(Some("Bearer not-a-jwt"), &tokens()),
            Err(AuthError::Unauthenticated(_))
        ));
    }

    #[rstest]
    #[case("manager", &[RoleCode::Manager], true)]
    #[case("engineer", &[RoleCode::Manager], false)]
    #[case("observer", &[RoleCode::Manager], false)]
    #[case("engineer", &[RoleCode::Manager, RoleCode::Engineer], true)]
    #[case("admin", &[RoleCode::Manager], false)]
    #[case("", &[RoleCode::Manager, RoleCode::Engineer, RoleCode::Observer], false)]
    fn test_authorize(#[case] role: &str, #[case] allowed: &[RoleCode], #[case] ok: bool) {
        let result = authorize(&principal(role), allowed);
        if ok {
            assert_eq!(result.unwrap().as_str(), role);
        } else {
            assert!(matches!(result, Err(AuthError::Forbidden(_))));
        }
    }
}
