//! Authentication domain models.
//!
//! These are internal domain models, distinct from the HTTP request/response
//! shapes in `financia_api::models` (which use camelCase field names).

use serde::{Deserialize, Serialize};

/// Canonical user identity. Never carries password material.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    /// Always stored lowercased.
    pub email: String,
    /// External OAuth provider subject, unique when present.
    pub provider_id: Option<String>,
    pub profile_image: Option<String>,
}

/// User with password hash (for internal auth flows).
///
/// `password_hash` is `None` for accounts created through OAuth only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserWithPassword {
    pub user: User,
    pub password_hash: Option<String>,
}

/// Fields for a user record that does not exist yet. The store assigns the id.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: Option<String>,
    pub provider_id: Option<String>,
    pub profile_image: Option<String>,
}

/// Identity asserted by an OAuth provider after it verified a credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderIdentity {
    pub provider_id: String,
    pub email: String,
    pub display_name: String,
    pub avatar_url: Option<String>,
}

/// JWT claims embedded in session tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject: user ID (standard JWT `sub` claim).
    pub sub: String,
    /// Expiry (unix timestamp).
    pub exp: i64,
    /// Issued at (unix timestamp).
    pub iat: i64,
}
