//! Identity resolver: maps a provider-asserted identity onto exactly one
//! canonical user record.
//!
//! Resolution order:
//!
//! 1. a record already linked to the provider id is returned untouched;
//! 2. otherwise a record with the same email is linked (provider id and
//!    avatar set) and returned;
//! 3. otherwise a new OAuth-only record is created.
//!
//! Checking the provider id first keeps repeated logins write-free; the email
//! fallback merges a manual account with a later provider sign-in.

use std::sync::Arc;

use tracing::{info, warn};

use super::store::{StoreError, UserStore};
use super::{AuthError, normalize_email};
use crate::models::auth::{NewUser, ProviderIdentity, User};

/// Number of passes before giving up on a contended resolution.
const MAX_RESOLVE_ATTEMPTS: usize = 3;

#[derive(Clone)]
pub struct IdentityResolver {
    store: Arc<dyn UserStore>,
}

impl IdentityResolver {
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self { store }
    }

    /// Resolve `identity` to a user, linking or creating a record as needed.
    ///
    /// A uniqueness violation means a concurrent request wrote a record for
    /// the same email or provider id between our lookup and our write; the
    /// resolution restarts so that it finds and links that record.
    pub async fn resolve(&self, identity: &ProviderIdentity) -> Result<User, AuthError> {
        let email = normalize_email(&identity.email);
        if identity.provider_id.is_empty() || email.is_empty() {
            return Err(AuthError::InvalidProviderToken);
        }

        for attempt in 1..=MAX_RESOLVE_ATTEMPTS {
            match self.resolve_once(identity, &email).await {
                Err(AuthError::Store(StoreError::UniquenessViolation(field))) => {
                    warn!(attempt, ?field, "identity write collided; retrying resolution");
                }
                other => return other,
            }
        }
        Err(AuthError::Internal(
            "identity resolution kept colliding with concurrent writes".into(),
        ))
    }

    async fn resolve_once(
        &self,
        identity: &ProviderIdentity,
        email: &str,
    ) -> Result<User, AuthError> {
        if let Some(linked) = self.store.find_by_provider_id(&identity.provider_id).await? {
            return Ok(linked.user);
        }

        if let Some(existing) = self.store.find_by_email(email).await? {
            if let Some(previous) = existing.user.provider_id.as_deref() {
                warn!(
                    user_id = %existing.user.id,
                    previous,
                    "replacing provider link on account matched by email"
                );
            }
            let linked = self
                .store
                .link_provider(
                    &existing.user.id,
                    &identity.provider_id,
                    identity.avatar_url.as_deref(),
                )
                .await?;
            info!(user_id = %linked.user.id, "linked provider identity to existing account");
            return Ok(linked.user);
        }

        let created = self
            .store
            .insert(NewUser {
                name: identity.display_name.clone(),
                email: email.to_string(),
                password_hash: None,
                provider_id: Some(identity.provider_id.clone()),
                profile_image: identity.avatar_url.clone(),
            })
            .await?;
        info!(user_id = %created.user.id, "created account from provider identity");
        Ok(created.user)
    }
}
