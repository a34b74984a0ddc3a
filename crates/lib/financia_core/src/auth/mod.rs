//! Authentication and identity logic.
//!
//! Provides password hashing, session token management, the credential store
//! contract, and the single identity resolver shared by every OAuth flow.

pub mod credentials;
pub mod google;
pub mod jwt;
pub mod memory;
pub mod oauth;
pub mod password;
pub mod provider;
pub mod queries;
pub mod resolver;
pub mod session;
pub mod store;

use thiserror::Error;

pub use store::{StoreError, UniqueField, UserStore};

/// Authentication errors.
///
/// Display strings are what clients may see, so the credential and token
/// variants stay deliberately vague.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("User already exists")]
    DuplicateEmail,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Old password is incorrect")]
    IncorrectOldPassword,

    #[error("Account has no password; sign in with your provider")]
    NoPasswordCredential,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Token expired")]
    ExpiredToken,

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Provider token verification failed")]
    InvalidProviderToken,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sqlx::Error> for AuthError {
    fn from(e: sqlx::Error) -> Self {
        AuthError::Store(StoreError::from(e))
    }
}

/// Canonical form used for every email comparison and write.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_email_trims_and_lowercases() {
        assert_eq!(normalize_email("  Alice@Example.COM "), "alice@example.com");
    }

    #[test]
    fn credential_errors_share_one_message() {
        assert_eq!(AuthError::InvalidCredentials.to_string(), "Invalid credentials");
    }
}
