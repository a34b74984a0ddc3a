//! Password credential manager: registration, verification, rotation and
//! profile edits for accounts held in a [`UserStore`].

use std::sync::Arc;

use tracing::{debug, info};

use super::password::{hash_password_blocking, validate_password, verify_password_blocking};
use super::store::{StoreError, UniqueField, UserStore};
use super::{AuthError, normalize_email};
use crate::models::auth::{NewUser, User};

/// Password-based account operations.
#[derive(Clone)]
pub struct CredentialManager {
    store: Arc<dyn UserStore>,
}

impl CredentialManager {
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self { store }
    }

    /// Create a password account. Fails with `DuplicateEmail` when the email is taken.
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
        profile_image: Option<&str>,
    ) -> Result<User, AuthError> {
        let name = name.trim();
        let email = normalize_email(email);
        if name.is_empty() {
            return Err(AuthError::Validation("Name is required".into()));
        }
        if email.is_empty() || !email.contains('@') {
            return Err(AuthError::Validation("A valid email is required".into()));
        }
        validate_password(password)?;

        if self.store.find_by_email(&email).await?.is_some() {
            return Err(AuthError::DuplicateEmail);
        }

        let password_hash = hash_password_blocking(password.to_string()).await?;
        let created = self
            .store
            .insert(NewUser {
                name: name.to_string(),
                email,
                password_hash: Some(password_hash),
                provider_id: None,
                profile_image: profile_image.filter(|p| !p.is_empty()).map(String::from),
            })
            .await
            .map_err(|e| match e {
                // Lost a race with a concurrent registration.
                StoreError::UniquenessViolation(UniqueField::Email) => AuthError::DuplicateEmail,
                other => AuthError::Store(other),
            })?;

        info!(user_id = %created.user.id, "registered password account");
        Ok(created.user)
    }

    /// Check an email/password pair.
    ///
    /// Unknown emails, wrong passwords and accounts without a password all
    /// fail with the same `InvalidCredentials` error.
    pub async fn verify(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let record = self.store.find_by_email(email).await?;
        let stored_hash = record.as_ref().and_then(|r| r.password_hash.clone());

        let password_ok = verify_password_blocking(password.to_string(), stored_hash).await?;
        match record {
            Some(record) if password_ok => Ok(record.user),
            _ => {
                debug!("password verification failed");
                Err(AuthError::InvalidCredentials)
            }
        }
    }

    /// Replace the password after re-verifying the old one.
    ///
    /// On any failure the stored hash is left untouched.
    pub async fn change_password(
        &self,
        user_id: &str,
        old_password: &str,
        new_password: &str,
    ) -> Result<(), AuthError> {
        let record = self
            .store
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::Unauthorized)?;

        let Some(current_hash) = record.password_hash.clone() else {
            return Err(AuthError::NoPasswordCredential);
        };
        if !verify_password_blocking(old_password.to_string(), Some(current_hash)).await? {
            return Err(AuthError::IncorrectOldPassword);
        }
        validate_password(new_password)?;

        let new_hash = hash_password_blocking(new_password.to_string()).await?;
        self.store.set_password_hash(user_id, &new_hash).await?;
        info!(user_id, "password changed");
        Ok(())
    }

    /// Update display name and/or avatar reference. Empty values are ignored.
    pub async fn update_profile(
        &self,
        user_id: &str,
        name: Option<&str>,
        profile_image: Option<&str>,
    ) -> Result<User, AuthError> {
        let name = name.map(str::trim).filter(|n| !n.is_empty());
        let profile_image = profile_image.filter(|p| !p.is_empty());
        let updated = self
            .store
            .update_profile(user_id, name, profile_image)
            .await
            .map_err(|e| match e {
                StoreError::NotFound => AuthError::Unauthorized,
                other => AuthError::Store(other),
            })?;
        Ok(updated.user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::memory::MemoryUserStore;

    fn manager() -> (CredentialManager, Arc<MemoryUserStore>) {
        let store = Arc::new(MemoryUserStore::new());
        (CredentialManager::new(store.clone()), store)
    }

    #[tokio::test]
    async fn register_then_verify() {
        let (creds, _) = manager();
        let registered = creds
            .register("Alice", "alice@example.com", "pw123456", None)
            .await
            .unwrap();
        let verified = creds.verify("alice@example.com", "pw123456").await.unwrap();
        assert_eq!(registered.id, verified.id);
    }

    #[tokio::test]
    async fn verify_ignores_email_case() {
        let (creds, _) = manager();
        creds
            .register("Alice", "Alice@Example.com", "pw123456", None)
            .await
            .unwrap();
        assert!(creds.verify("ALICE@example.COM", "pw123456").await.is_ok());
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected_regardless_of_other_fields() {
        let (creds, store) = manager();
        creds
            .register("Alice", "alice@example.com", "pw123456", None)
            .await
            .unwrap();
        let err = creds
            .register("Someone Else", "ALICE@example.com", "different1", Some("a.png"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::DuplicateEmail));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn unknown_email_and_wrong_password_are_indistinguishable() {
        let (creds, _) = manager();
        creds
            .register("Alice", "alice@example.com", "pw123456", None)
            .await
            .unwrap();

        let wrong = creds.verify("alice@example.com", "wrong").await.unwrap_err();
        let unknown = creds.verify("nobody@example.com", "pw123456").await.unwrap_err();

        assert!(matches!(wrong, AuthError::InvalidCredentials));
        assert!(matches!(unknown, AuthError::InvalidCredentials));
        assert_eq!(wrong.to_string(), unknown.to_string());
    }

    #[tokio::test]
    async fn oauth_only_account_cannot_password_login() {
        let (creds, store) = manager();
        store
            .insert(NewUser {
                name: "Bob".into(),
                email: "bob@example.com".into(),
                password_hash: None,
                provider_id: Some("g1".into()),
                profile_image: None,
            })
            .await
            .unwrap();
        let err = creds.verify("bob@example.com", "google_oauth").await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn short_password_is_rejected_at_registration() {
        let (creds, _) = manager();
        let err = creds
            .register("Alice", "alice@example.com", "123", None)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Validation(_)));
    }

    #[tokio::test]
    async fn change_password_requires_old_password() {
        let (creds, _) = manager();
        let user = creds
            .register("Alice", "alice@example.com", "pw123456", None)
            .await
            .unwrap();

        let err = creds
            .change_password(&user.id, "not-it", "newpass123")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::IncorrectOldPassword));
        assert!(creds.verify("alice@example.com", "pw123456").await.is_ok());
    }

    #[tokio::test]
    async fn change_password_rotates_hash() {
        let (creds, _) = manager();
        let user = creds
            .register("Alice", "alice@example.com", "pw123456", None)
            .await
            .unwrap();
        creds
            .change_password(&user.id, "pw123456", "newpass123")
            .await
            .unwrap();

        assert!(creds.verify("alice@example.com", "newpass123").await.is_ok());
        assert!(matches!(
            creds.verify("alice@example.com", "pw123456").await,
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn change_password_rejects_oauth_only_account() {
        let (creds, store) = manager();
        let rec = store
            .insert(NewUser {
                name: "Bob".into(),
                email: "bob@example.com".into(),
                password_hash: None,
                provider_id: Some("g1".into()),
                profile_image: None,
            })
            .await
            .unwrap();
        let err = creds
            .change_password(&rec.user.id, "whatever", "newpass123")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::NoPasswordCredential));
    }

    #[tokio::test]
    async fn update_profile_keeps_omitted_fields() {
        let (creds, _) = manager();
        let user = creds
            .register("Alice", "alice@example.com", "pw123456", Some("old.png"))
            .await
            .unwrap();

        let renamed = creds
            .update_profile(&user.id, Some("Alice B."), None)
            .await
            .unwrap();
        assert_eq!(renamed.name, "Alice B.");
        assert_eq!(renamed.profile_image.as_deref(), Some("old.png"));

        let reimaged = creds
            .update_profile(&user.id, Some("  "), Some("new.png"))
            .await
            .unwrap();
        assert_eq!(reimaged.name, "Alice B.");
        assert_eq!(reimaged.profile_image.as_deref(), Some("new.png"));
    }
}
