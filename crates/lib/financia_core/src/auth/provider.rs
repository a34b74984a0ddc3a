//! OAuth identity provider contract.
//!
//! A provider turns an opaque provider-issued credential into a verified
//! [`ProviderIdentity`]. Both the server-redirect flow and the
//! client-submitted-token flow go through this trait and then hand the
//! identity to the [`IdentityResolver`](super::resolver::IdentityResolver).

use async_trait::async_trait;

use super::AuthError;
use crate::models::auth::ProviderIdentity;

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Short provider name used in logs (e.g. `"google"`).
    fn name(&self) -> &str;

    /// URL the browser is redirected to for the server-redirect flow.
    fn authorize_url(&self, state: &str, code_challenge: &str, redirect_uri: &str) -> String;

    /// Verify an ID token submitted by a client-side sign-in widget.
    async fn verify_id_token(&self, id_token: &str) -> Result<ProviderIdentity, AuthError>;

    /// Exchange an authorization code from the redirect callback.
    async fn exchange_code(
        &self,
        code: &str,
        redirect_uri: &str,
        code_verifier: &str,
    ) -> Result<ProviderIdentity, AuthError>;
}
