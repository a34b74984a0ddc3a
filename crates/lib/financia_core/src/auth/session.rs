//! Session authenticator: bearer header → verified, still-existing user.

use std::sync::Arc;

use tracing::debug;

use super::AuthError;
use super::jwt::TokenIssuer;
use super::store::UserStore;
use crate::models::auth::User;

/// Extract the token from an `Authorization: Bearer <token>` header value.
///
/// The scheme is matched case-insensitively; an empty token is rejected.
pub fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("Bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

#[derive(Clone)]
pub struct SessionAuthenticator {
    issuer: TokenIssuer,
    store: Arc<dyn UserStore>,
}

impl SessionAuthenticator {
    pub fn new(issuer: TokenIssuer, store: Arc<dyn UserStore>) -> Self {
        Self { issuer, store }
    }

    /// Authenticate a raw `Authorization` header value.
    ///
    /// Every client-side problem collapses into `Unauthorized`; only store
    /// failures surface as something else.
    pub async fn authenticate(&self, header: Option<&str>) -> Result<User, AuthError> {
        let Some(header) = header else {
            debug!("no authorization header");
            return Err(AuthError::Unauthorized);
        };
        let Some(token) = bearer_token(header) else {
            debug!("authorization header is not a bearer token");
            return Err(AuthError::Unauthorized);
        };
        let user_id = self.issuer.verify(token).map_err(|e| {
            debug!(error = %e, "bearer token rejected");
            AuthError::Unauthorized
        })?;
        match self.store.find_by_id(&user_id).await? {
            Some(record) => Ok(record.user),
            None => {
                debug!(user_id, "token subject no longer exists");
                Err(AuthError::Unauthorized)
            }
        }
    }
}
