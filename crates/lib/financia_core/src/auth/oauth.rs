//! OAuth redirect-flow support: PKCE helpers and the pending-state store.
//!
//! The state parameter doubles as the CSRF token and the key under which the
//! PKCE verifier waits for the callback.

use std::sync::Arc;
use std::time::{Duration, Instant};

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use dashmap::DashMap;
use rand::RngCore;
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

/// TTL for pending state entries (10 minutes).
pub const STATE_TTL: Duration = Duration::from_secs(600);

/// Upper bound on logins waiting for their callback.
pub const MAX_PENDING_STATES: usize = 10_000;

// =============================================================================
// PKCE helpers
// =============================================================================

/// Generate a cryptographic PKCE code verifier (43 chars, URL-safe).
pub fn generate_code_verifier() -> String {
    let mut bytes = [0u8; 32];
    rand::rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Compute S256 code challenge from a code verifier.
pub fn compute_code_challenge(verifier: &str) -> String {
    let digest = Sha256::digest(verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(digest)
}

/// Generate a cryptographic state parameter (CSRF token).
pub fn generate_state() -> String {
    let mut bytes = [0u8; 24];
    rand::rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

// =============================================================================
// Pending state store
// =============================================================================

/// Pending login stored between the redirect and the callback.
#[derive(Debug, Clone)]
pub struct OAuthPendingState {
    pub pkce_verifier: String,
    pub redirect_uri: String,
    pub created_at: Instant,
}

impl OAuthPendingState {
    pub fn new(pkce_verifier: String, redirect_uri: String) -> Self {
        Self {
            pkce_verifier,
            redirect_uri,
            created_at: Instant::now(),
        }
    }
}

/// In-memory store for pending OAuth logins (keyed by state parameter).
pub struct OAuthStateStore {
    states: DashMap<String, OAuthPendingState>,
    ttl: Duration,
    capacity: usize,
}

impl OAuthStateStore {
    pub fn new() -> Self {
        Self::with_limits(STATE_TTL, MAX_PENDING_STATES)
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self::with_limits(ttl, MAX_PENDING_STATES)
    }

    pub fn with_limits(ttl: Duration, capacity: usize) -> Self {
        Self {
            states: DashMap::new(),
            ttl,
            capacity,
        }
    }

    /// Insert a pending state entry.
    ///
    /// Returns `false` without storing anything when the store is still full
    /// after evicting expired entries.
    pub fn insert(&self, state_key: String, pending: OAuthPendingState) -> bool {
        if self.states.len() >= self.capacity {
            self.cleanup();
            if self.states.len() >= self.capacity {
                warn!(capacity = self.capacity, "OAuth state store full");
                return false;
            }
        }
        self.states.insert(state_key, pending);
        true
    }

    /// Take (remove and return) a pending state entry.
    /// Returns `None` if not found or expired; each state is usable once.
    pub fn take(&self, state_key: &str) -> Option<OAuthPendingState> {
        let (_, pending) = self.states.remove(state_key)?;
        if pending.created_at.elapsed() > self.ttl {
            debug!("discarding expired OAuth state");
            return None;
        }
        Some(pending)
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Evict expired entries.
    pub fn cleanup(&self) {
        let ttl = self.ttl;
        self.states.retain(|_, v| v.created_at.elapsed() <= ttl);
    }

    /// Spawn a periodic cleanup task.
    pub fn spawn_cleanup_task(self: &Arc<Self>) -> tokio::task::JoinHandle<()> {
        let store = Arc::clone(self);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(60));
            loop {
                interval.tick().await;
                store.cleanup();
            }
        })
    }
}

impl Default for OAuthStateStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_challenge_matches_rfc7636_example() {
        // Appendix B of RFC 7636.
        let verifier = "dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk";
        assert_eq!(
            compute_code_challenge(verifier),
            "E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM"
        );
    }

    #[test]
    fn verifier_and_state_are_url_safe_and_unique() {
        let a = generate_code_verifier();
        let b = generate_code_verifier();
        assert_ne!(a, b);
        assert_eq!(a.len(), 43);
        let state = generate_state();
        assert!(
            state
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
    }

    #[test]
    fn state_is_single_use() {
        let store = OAuthStateStore::new();
        store.insert(
            "s1".into(),
            OAuthPendingState::new("verifier".into(), "http://cb".into()),
        );
        let taken = store.take("s1").expect("pending state");
        assert_eq!(taken.pkce_verifier, "verifier");
        assert!(store.take("s1").is_none());
    }

    #[test]
    fn full_store_rejects_new_states() {
        let store = OAuthStateStore::with_limits(STATE_TTL, 2);
        for key in ["a", "b"] {
            assert!(store.insert(key.into(), OAuthPendingState::new("v".into(), "http://cb".into())));
        }
        assert!(!store.insert("c".into(), OAuthPendingState::new("v".into(), "http://cb".into())));
        assert_eq!(store.len(), 2);
        assert!(store.take("c").is_none());

        // Completing a login frees a slot.
        assert!(store.take("a").is_some());
        assert!(store.insert("c".into(), OAuthPendingState::new("v".into(), "http://cb".into())));
    }

    #[test]
    fn full_store_evicts_expired_before_rejecting() {
        let store = OAuthStateStore::with_limits(Duration::from_secs(60), 1);
        store.insert(
            "stale".into(),
            OAuthPendingState {
                pkce_verifier: "v".into(),
                redirect_uri: "http://cb".into(),
                created_at: Instant::now() - Duration::from_secs(120),
            },
        );
        assert!(store.insert("fresh".into(), OAuthPendingState::new("v".into(), "http://cb".into())));
        assert_eq!(store.len(), 1);
        assert!(store.take("fresh").is_some());
    }

    #[test]
    fn expired_state_is_rejected_and_cleaned() {
        let store = OAuthStateStore::with_ttl(Duration::ZERO);
        store.insert(
            "old".into(),
            OAuthPendingState {
                pkce_verifier: "v".into(),
                redirect_uri: "http://cb".into(),
                created_at: Instant::now() - Duration::from_secs(1),
            },
        );
        store.insert(
            "old2".into(),
            OAuthPendingState {
                pkce_verifier: "v".into(),
                redirect_uri: "http://cb".into(),
                created_at: Instant::now() - Duration::from_secs(1),
            },
        );
        assert!(store.take("old").is_none());
        store.cleanup();
        assert!(store.is_empty());
    }
}
