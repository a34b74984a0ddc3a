//! Authentication service: session issuance shared by every sign-in path.

use financia_core::auth::provider::IdentityProvider;
use financia_core::models::auth::{ProviderIdentity, User};
use tracing::info;

use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::models::AuthResponse;

/// Issue a session token for `user` and wrap both in the auth response body.
pub fn auth_response(state: &AppState, user: User) -> AppResult<AuthResponse> {
    let token = state.issuer.issue(&user.id)?;
    Ok(AuthResponse {
        token,
        user: user.into(),
    })
}

/// The configured Google provider, or 503 when Google sign-in is disabled.
pub fn google_provider(state: &AppState) -> AppResult<&dyn IdentityProvider> {
    state
        .google
        .as_deref()
        .ok_or_else(|| AppError::Unavailable("Google sign-in is not configured".into()))
}

/// Resolve a provider identity to a user and open a session for it.
pub async fn sign_in_with_identity(
    state: &AppState,
    provider: &dyn IdentityProvider,
    identity: &ProviderIdentity,
) -> AppResult<AuthResponse> {
    let user = state.resolver.resolve(identity).await?;
    info!(user_id = %user.id, provider = provider.name(), "provider sign-in");
    auth_response(state, user)
}
