//! Google sign-in handlers: client-side ID token login and the server-side
//! redirect flow (PKCE, single-use state).

use axum::Json;
use axum::extract::{Query, State};
use axum::response::Redirect;
use financia_core::auth::oauth::{
    OAuthPendingState, compute_code_challenge, generate_code_verifier, generate_state,
};
use tracing::{debug, warn};
use url::Url;

use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::models::{AuthResponse, GoogleLoginRequest, OAuthCallbackParams};
use crate::services::auth::{google_provider, sign_in_with_identity};

/// `POST /api/auth/google-login`: exchange a Google ID token for a session.
pub async fn google_login_handler(
    State(state): State<AppState>,
    Json(body): Json<GoogleLoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    let provider = google_provider(&state)?;
    let identity = provider.verify_id_token(body.token.trim()).await?;
    Ok(Json(sign_in_with_identity(&state, provider, &identity).await?))
}

/// `GET /api/auth/google`: send the browser to Google's consent screen.
pub async fn google_redirect_handler(State(state): State<AppState>) -> AppResult<Redirect> {
    let provider = google_provider(&state)?;

    let verifier = generate_code_verifier();
    let challenge = compute_code_challenge(&verifier);
    let state_key = generate_state();
    let redirect_uri = state.config.google_redirect_url.clone();

    let url = provider.authorize_url(&state_key, &challenge, &redirect_uri);
    if !state
        .oauth_states
        .insert(state_key, OAuthPendingState::new(verifier, redirect_uri))
    {
        return Err(AppError::Unavailable(
            "Too many pending sign-ins, try again later".into(),
        ));
    }

    Ok(Redirect::to(&url))
}

/// `GET /api/auth/google/callback`: finish the redirect flow and hand the
/// session token to the frontend.
pub async fn google_callback_handler(
    State(state): State<AppState>,
    Query(params): Query<OAuthCallbackParams>,
) -> AppResult<Redirect> {
    let provider = google_provider(&state)?;

    if let Some(error) = params.error.as_deref() {
        debug!(error, "google redirect returned an error");
        return frontend_redirect(&state, "login", &[("error", "google_auth_failed")]);
    }
    let (Some(code), Some(state_key)) = (params.code.as_deref(), params.state.as_deref()) else {
        debug!("google callback without code or state");
        return frontend_redirect(&state, "login", &[("error", "google_auth_failed")]);
    };
    let Some(pending) = state.oauth_states.take(state_key) else {
        debug!("unknown or expired oauth state");
        return frontend_redirect(&state, "login", &[("error", "google_auth_failed")]);
    };

    let identity = match provider
        .exchange_code(code, &pending.redirect_uri, &pending.pkce_verifier)
        .await
    {
        Ok(identity) => identity,
        Err(e) => {
            warn!(error = %e, "google code exchange failed");
            return frontend_redirect(&state, "login", &[("error", "google_auth_failed")]);
        }
    };

    match sign_in_with_identity(&state, provider, &identity).await {
        Ok(session) => {
            frontend_redirect(&state, "dashboard", &[("token", session.token.as_str())])
        }
        Err(e) => {
            warn!(error = ?e, "google sign-in failed after code exchange");
            frontend_redirect(&state, "login", &[("error", "google_auth_failed")])
        }
    }
}

fn frontend_redirect(state: &AppState, page: &str, query: &[(&str, &str)]) -> AppResult<Redirect> {
    let base = state.config.frontend_url.trim_end_matches('/');
    let mut url = Url::parse(&format!("{base}/{page}"))
        .map_err(|e| AppError::Internal(format!("invalid FRONTEND_URL: {e}")))?;
    url.query_pairs_mut().extend_pairs(query);
    Ok(Redirect::to(url.as_str()))
}
