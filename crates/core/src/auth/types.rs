//! Identity, role and principal types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sitetrack_shared::auth::Claims;
use sitetrack_shared::jwt::TokenSubject;
use sitetrack_shared::types::{RoleId, UserId};

/// Closed set of role codes understood by the authorization gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleCode {
    /// Manages projects; the only role allowed to create, update or delete them.
    Manager,
    /// Field engineer.
    Engineer,
    /// Read-mostly stakeholder.
    Observer,
}

impl RoleCode {
    /// Every role code, in seeding order.
    pub const ALL: [Self; 3] = [Self::Manager, Self::Engineer, Self::Observer];

    /// Convert to database string value.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Manager => "manager",
            Self::Engineer => "engineer",
            Self::Observer => "observer",
        }
    }

    /// Parse from database string value.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "manager" => Some(Self::Manager),
            "engineer" => Some(Self::Engineer),
            "observer" => Some(Self::Observer),
            _ => None,
        }
    }

    /// Human-readable role name.
    #[must_use]
    pub const fn display_name(&self) -> &'static str {
        match self {
            Self::Manager => "Manager",
            Self::Engineer => "Engineer",
            Self::Observer => "Observer",
        }
    }
}

impl std::fmt::Display for RoleCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Role {
    /// Role ID.
    pub id: RoleId,
    /// Display name.
    pub name: String,
    /// Stable code.
    pub code: RoleCode,
}

/// A registered user, as held by the credential store.
///
/// Deliberately not `Serialize`: the password hash must never leave the
/// process. Use [`IdentityView`] for outward representations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// User ID.
    pub id: UserId,
    /// Unique email.
    pub email: String,
    /// Argon2id PHC string.
    pub password_hash: String,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Contact phone.
    pub phone: String,
    /// Disabled accounts cannot log in.
    pub is_active: bool,
    /// Assigned role.
    pub role: Role,
    /// Registration time.
    pub created_at: DateTime<Utc>,
}

impl Identity {
    /// Outward representation without the password hash.
    #[must_use]
    pub fn view(&self) -> IdentityView {
        IdentityView {
            id: self.id,
            email: self.email.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            phone: self.phone.clone(),
            is_active: self.is_active,
            role: self.role.clone(),
            created_at: self.created_at,
        }
    }
}

impl From<&Identity> for TokenSubject {
    fn from(identity: &Identity) -> Self {
        Self {
            user_id: identity.id,
            email: identity.email.clone(),
            role_code: identity.role.code.as_str().to_string(),
        }
    }
}

/// Outward user representation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IdentityView {
    /// User ID.
    pub id: UserId,
    /// Email.
    pub email: String,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Contact phone.
    pub phone: String,
    /// Whether the account is enabled.
    pub is_active: bool,
    /// Assigned role.
    pub role: Role,
    /// Registration time.
    pub created_at: DateTime<Utc>,
}

/// Input for persisting a new identity.
#[derive(Debug, Clone)]
pub struct NewIdentity {
    /// Email.
    pub email: String,
    /// Argon2id PHC string.
    pub password_hash: String,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Contact phone.
    pub phone: String,
    /// Role to assign.
    pub role_id: RoleId,
}

/// The authenticated caller, as published by the gate.
///
/// `role` is the raw code from the token; it is only interpreted by
/// [`crate::auth::authorize`], which treats unknown codes as forbidden.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Principal {
    /// Caller's user ID.
    pub user_id: UserId,
    /// Caller's email at token issue time.
    pub email: String,
    /// Caller's role code at token issue time.
    pub role: String,
}

impl From<Claims> for Principal {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.sub,
            email: claims.email,
            role: claims.role,
        }
    }
}
