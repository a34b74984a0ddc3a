//! In-memory credential store.
//!
//! Backs tests and single-process development runs. Uniqueness checks and the
//! write happen under one write lock, which gives the same guarantee as the
//! unique indexes of the Postgres store.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::normalize_email;
use super::store::{StoreError, UniqueField, UserStore};
use crate::models::auth::{NewUser, User, UserWithPassword};
use crate::uuid::uuidv7;

/// `UserStore` keeping records in a process-local map.
#[derive(Default)]
pub struct MemoryUserStore {
    users: RwLock<HashMap<String, UserWithPassword>>,
    writes: AtomicUsize,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful inserts and updates so far.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }
}

/// Returns the first unique attribute of `candidate` already held by another record.
fn collision<'a>(
    users: impl Iterator<Item = &'a UserWithPassword>,
    candidate_id: Option<&str>,
    email: &str,
    provider_id: Option<&str>,
) -> Option<UniqueField> {
    for existing in users {
        if Some(existing.user.id.as_str()) == candidate_id {
            continue;
        }
        if existing.user.email == email {
            return Some(UniqueField::Email);
        }
        if provider_id.is_some() && existing.user.provider_id.as_deref() == provider_id {
            return Some(UniqueField::ProviderId);
        }
    }
    None
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserWithPassword>, StoreError> {
        let email = normalize_email(email);
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.user.email == email).cloned())
    }

    async fn find_by_provider_id(
        &self,
        provider_id: &str,
    ) -> Result<Option<UserWithPassword>, StoreError> {
        let users = self.users.read().await;
        Ok(users
            .values()
            .find(|u| u.user.provider_id.as_deref() == Some(provider_id))
            .cloned())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<UserWithPassword>, StoreError> {
        Ok(self.users.read().await.get(id).cloned())
    }

    async fn insert(&self, user: NewUser) -> Result<UserWithPassword, StoreError> {
        let email = normalize_email(&user.email);
        let mut users = self.users.write().await;
        if let Some(field) = collision(users.values(), None, &email, user.provider_id.as_deref()) {
            return Err(StoreError::UniquenessViolation(field));
        }
        let record = UserWithPassword {
            user: User {
                id: uuidv7().to_string(),
                name: user.name,
                email,
                provider_id: user.provider_id,
                profile_image: user.profile_image,
            },
            password_hash: user.password_hash,
        };
        users.insert(record.user.id.clone(), record.clone());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(record)
    }

    async fn link_provider(
        &self,
        id: &str,
        provider_id: &str,
        profile_image: Option<&str>,
    ) -> Result<UserWithPassword, StoreError> {
        let mut users = self.users.write().await;
        let email = users
            .get(id)
            .map(|r| r.user.email.clone())
            .ok_or(StoreError::NotFound)?;
        if let Some(field) = collision(users.values(), Some(id), &email, Some(provider_id)) {
            return Err(StoreError::UniquenessViolation(field));
        }
        let record = users.get_mut(id).ok_or(StoreError::NotFound)?;
        record.user.provider_id = Some(provider_id.to_string());
        if let Some(image) = profile_image {
            record.user.profile_image = Some(image.to_string());
        }
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(record.clone())
    }

    async fn set_password_hash(&self, id: &str, password_hash: &str) -> Result<(), StoreError> {
        let mut users = self.users.write().await;
        let record = users.get_mut(id).ok_or(StoreError::NotFound)?;
        record.password_hash = Some(password_hash.to_string());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn update_profile(
        &self,
        id: &str,
        name: Option<&str>,
        profile_image: Option<&str>,
    ) -> Result<UserWithPassword, StoreError> {
        let mut users = self.users.write().await;
        let record = users.get_mut(id).ok_or(StoreError::NotFound)?;
        if let Some(name) = name {
            record.user.name = name.to_string();
        }
        if let Some(image) = profile_image {
            record.user.profile_image = Some(image.to_string());
        }
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(record.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(email: &str, provider_id: Option<&str>) -> NewUser {
        NewUser {
            name: "Test".into(),
            email: email.into(),
            password_hash: None,
            provider_id: provider_id.map(String::from),
            profile_image: None,
        }
    }

    #[tokio::test]
    async fn insert_assigns_id_and_normalizes_email() {
        let store = MemoryUserStore::new();
        let rec = store.insert(new_user("Carol@Example.com", None)).await.unwrap();
        assert!(!rec.user.id.is_empty());
        assert_eq!(rec.user.email, "carol@example.com");

        let found = store.find_by_email("CAROL@example.com").await.unwrap();
        assert_eq!(found.map(|u| u.user.id), Some(rec.user.id));
    }

    #[tokio::test]
    async fn duplicate_email_is_a_uniqueness_violation() {
        let store = MemoryUserStore::new();
        store.insert(new_user("dup@example.com", None)).await.unwrap();
        let err = store.insert(new_user("DUP@example.com", None)).await.unwrap_err();
        assert!(matches!(err, StoreError::UniquenessViolation(UniqueField::Email)));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn duplicate_provider_id_is_a_uniqueness_violation() {
        let store = MemoryUserStore::new();
        store.insert(new_user("a@example.com", Some("g1"))).await.unwrap();
        let err = store.insert(new_user("b@example.com", Some("g1"))).await.unwrap_err();
        assert!(matches!(err, StoreError::UniquenessViolation(UniqueField::ProviderId)));
    }

    #[tokio::test]
    async fn writes_to_unknown_record_are_not_found() {
        let store = MemoryUserStore::new();
        assert!(matches!(
            store.link_provider("missing", "g1", None).await,
            Err(StoreError::NotFound)
        ));
        assert!(matches!(
            store.set_password_hash("missing", "hash").await,
            Err(StoreError::NotFound)
        ));
        assert!(matches!(
            store.update_profile("missing", Some("x"), None).await,
            Err(StoreError::NotFound)
        ));
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test]
    async fn link_provider_rejects_provider_id_held_elsewhere() {
        let store = MemoryUserStore::new();
        store.insert(new_user("a@example.com", Some("g1"))).await.unwrap();
        let other = store.insert(new_user("b@example.com", None)).await.unwrap();
        let err = store
            .link_provider(&other.user.id, "g1", None)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::UniquenessViolation(UniqueField::ProviderId)));
    }

    #[tokio::test]
    async fn targeted_writes_leave_other_columns_alone() {
        let store = MemoryUserStore::new();
        let mut user = new_user("self@example.com", None);
        user.password_hash = Some("h1".into());
        user.profile_image = Some("me.png".into());
        let rec = store.insert(user).await.unwrap();

        let linked = store.link_provider(&rec.user.id, "g5", None).await.unwrap();
        assert_eq!(linked.user.profile_image.as_deref(), Some("me.png"));
        assert_eq!(linked.password_hash.as_deref(), Some("h1"));

        store.set_password_hash(&rec.user.id, "h2").await.unwrap();
        let renamed = store
            .update_profile(&rec.user.id, Some("Renamed"), None)
            .await
            .unwrap();
        assert_eq!(renamed.user.name, "Renamed");
        assert_eq!(renamed.user.provider_id.as_deref(), Some("g5"));
        assert_eq!(renamed.password_hash.as_deref(), Some("h2"));
        assert_eq!(store.write_count(), 4);
    }
}
