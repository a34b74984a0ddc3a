//! Credential store contract.
//!
//! The store exclusively owns user records. Implementations must enforce
//! uniqueness of `email` (case-insensitive) and of `provider_id` when present,
//! and report collisions as [`StoreError::UniquenessViolation`] so the
//! identity resolver can retry instead of surfacing a raw storage failure.

use async_trait::async_trait;
use thiserror::Error;

use crate::models::auth::{NewUser, UserWithPassword};

/// Which unique attribute a write collided on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueField {
    Email,
    ProviderId,
}

/// Credential store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("uniqueness violation on {0:?}")]
    UniquenessViolation(UniqueField),

    #[error("record not found")]
    NotFound,

    #[error("database error: {0}")]
    Db(sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        if let Some(db) = e.as_database_error()
            && db.is_unique_violation()
        {
            return StoreError::UniquenessViolation(unique_field_for_constraint(db.constraint()));
        }
        StoreError::Db(e)
    }
}

/// Map a Postgres unique constraint name onto the attribute it guards.
///
/// Unknown constraints on the users table can only be the email index.
pub fn unique_field_for_constraint(constraint: Option<&str>) -> UniqueField {
    match constraint {
        Some(name) if name.contains("provider") => UniqueField::ProviderId,
        _ => UniqueField::Email,
    }
}

/// Read/write contract for user records.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Case-insensitive lookup by email.
    async fn find_by_email(&self, email: &str) -> Result<Option<UserWithPassword>, StoreError>;

    async fn find_by_provider_id(
        &self,
        provider_id: &str,
    ) -> Result<Option<UserWithPassword>, StoreError>;

    async fn find_by_id(&self, id: &str) -> Result<Option<UserWithPassword>, StoreError>;

    /// Persist a new record, assigning its id.
    async fn insert(&self, user: NewUser) -> Result<UserWithPassword, StoreError>;

    /// Set the provider link of an existing record. `profile_image` replaces
    /// the stored avatar only when present; every other column is untouched.
    async fn link_provider(
        &self,
        id: &str,
        provider_id: &str,
        profile_image: Option<&str>,
    ) -> Result<UserWithPassword, StoreError>;

    /// Replace only the password hash.
    async fn set_password_hash(&self, id: &str, password_hash: &str) -> Result<(), StoreError>;

    /// Replace name and/or avatar; `None` keeps the stored value.
    async fn update_profile(
        &self,
        id: &str,
        name: Option<&str>,
        profile_image: Option<&str>,
    ) -> Result<UserWithPassword, StoreError>;
}
