//! Google sign-in.
//!
//! ID tokens from the client-side widget are checked through Google's
//! `tokeninfo` endpoint (signature, expiry, audience). Redirect-flow codes
//! are exchanged at the token endpoint with PKCE and the profile is read
//! from the OpenID `userinfo` endpoint.

use async_trait::async_trait;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;

use super::AuthError;
use super::provider::IdentityProvider;
use crate::models::auth::ProviderIdentity;

pub const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
pub const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
pub const GOOGLE_TOKENINFO_URL: &str = "https://oauth2.googleapis.com/tokeninfo";
pub const GOOGLE_USERINFO_URL: &str = "https://openidconnect.googleapis.com/v1/userinfo";

/// Scopes requested in the redirect flow.
const SCOPES: &str = "openid email profile";

/// Google client registration plus endpoint overrides (tests point these at fakes).
#[derive(Debug, Clone)]
pub struct GoogleConfig {
    pub client_id: String,
    pub client_secret: String,
    pub auth_url: String,
    pub token_url: String,
    pub tokeninfo_url: String,
    pub userinfo_url: String,
}

impl GoogleConfig {
    /// Config using Google's production endpoints.
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            auth_url: GOOGLE_AUTH_URL.into(),
            token_url: GOOGLE_TOKEN_URL.into(),
            tokeninfo_url: GOOGLE_TOKENINFO_URL.into(),
            userinfo_url: GOOGLE_USERINFO_URL.into(),
        }
    }
}

/// Claims returned by `tokeninfo` for an ID token.
#[derive(Debug, Deserialize)]
struct TokenInfo {
    aud: String,
    sub: String,
    email: Option<String>,
    #[serde(default)]
    email_verified: Option<serde_json::Value>,
    name: Option<String>,
    picture: Option<String>,
}

/// Response from Google's token endpoint.
#[derive(Debug, Deserialize)]
struct GoogleTokenResponse {
    access_token: String,
}

/// OpenID userinfo document.
#[derive(Debug, Deserialize)]
struct UserInfo {
    sub: String,
    email: Option<String>,
    #[serde(default)]
    email_verified: Option<serde_json::Value>,
    name: Option<String>,
    picture: Option<String>,
}

/// `tokeninfo` encodes booleans as strings, userinfo as JSON booleans.
fn is_true(value: Option<&serde_json::Value>) -> bool {
    match value {
        Some(serde_json::Value::Bool(b)) => *b,
        Some(serde_json::Value::String(s)) => s == "true",
        _ => false,
    }
}

/// Build a provider identity, requiring a verified email.
fn to_identity(
    sub: String,
    email: Option<String>,
    email_verified: Option<&serde_json::Value>,
    name: Option<String>,
    picture: Option<String>,
) -> Result<ProviderIdentity, AuthError> {
    let email = email.filter(|e| !e.is_empty()).ok_or_else(|| {
        debug!("google identity has no email");
        AuthError::InvalidProviderToken
    })?;
    if !is_true(email_verified) {
        debug!("google identity email is not verified");
        return Err(AuthError::InvalidProviderToken);
    }
    if sub.is_empty() {
        return Err(AuthError::InvalidProviderToken);
    }
    let display_name = name
        .filter(|n| !n.trim().is_empty())
        .unwrap_or_else(|| email.split('@').next().unwrap_or(&email).to_string());
    Ok(ProviderIdentity {
        provider_id: sub,
        email,
        display_name,
        avatar_url: picture.filter(|p| !p.is_empty()),
    })
}

/// Google implementation of [`IdentityProvider`].
pub struct GoogleProvider {
    config: GoogleConfig,
    auth_url: Url,
    http: reqwest::Client,
}

impl GoogleProvider {
    pub fn new(config: GoogleConfig) -> Result<Self, AuthError> {
        let auth_url = Url::parse(&config.auth_url)
            .map_err(|e| AuthError::Internal(format!("invalid Google auth URL: {e}")))?;
        Ok(Self {
            config,
            auth_url,
            http: reqwest::Client::new(),
        })
    }

    async fn read_json<T: DeserializeOwned>(
        resp: reqwest::Response,
        what: &str,
    ) -> Result<T, AuthError> {
        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            debug!(%status, body = %body, "google {what} rejected");
            return Err(AuthError::InvalidProviderToken);
        }
        resp.json::<T>().await.map_err(|e| {
            warn!(error = %e, "google {what} response parse error");
            AuthError::InvalidProviderToken
        })
    }
}

#[async_trait]
impl IdentityProvider for GoogleProvider {
    fn name(&self) -> &str {
        "google"
    }

    fn authorize_url(&self, state: &str, code_challenge: &str, redirect_uri: &str) -> String {
        let mut url = self.auth_url.clone();
        url.query_pairs_mut()
            .append_pair("client_id", &self.config.client_id)
            .append_pair("redirect_uri", redirect_uri)
            .append_pair("response_type", "code")
            .append_pair("scope", SCOPES)
            .append_pair("state", state)
            .append_pair("code_challenge", code_challenge)
            .append_pair("code_challenge_method", "S256")
            .append_pair("prompt", "select_account");
        url.into()
    }

    async fn verify_id_token(&self, id_token: &str) -> Result<ProviderIdentity, AuthError> {
        if id_token.is_empty() {
            return Err(AuthError::InvalidProviderToken);
        }
        let resp = self
            .http
            .get(&self.config.tokeninfo_url)
            .query(&[("id_token", id_token)])
            .send()
            .await
            .map_err(|e| AuthError::Internal(format!("google tokeninfo request: {e}")))?;
        let info: TokenInfo = Self::read_json(resp, "tokeninfo").await?;

        if info.aud != self.config.client_id {
            debug!(aud = %info.aud, "google id token issued for another client");
            return Err(AuthError::InvalidProviderToken);
        }
        to_identity(
            info.sub,
            info.email,
            info.email_verified.as_ref(),
            info.name,
            info.picture,
        )
    }

    async fn exchange_code(
        &self,
        code: &str,
        redirect_uri: &str,
        code_verifier: &str,
    ) -> Result<ProviderIdentity, AuthError> {
        let params = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("redirect_uri", redirect_uri),
            ("code_verifier", code_verifier),
        ];
        let resp = self
            .http
            .post(&self.config.token_url)
            .form(&params)
            .send()
            .await
            .map_err(|e| AuthError::Internal(format!("google token exchange: {e}")))?;
        let tokens: GoogleTokenResponse = Self::read_json(resp, "token exchange").await?;

        let resp = self
            .http
            .get(&self.config.userinfo_url)
            .bearer_auth(&tokens.access_token)
            .send()
            .await
            .map_err(|e| AuthError::Internal(format!("google userinfo request: {e}")))?;
        let info: UserInfo = Self::read_json(resp, "userinfo").await?;

        to_identity(
            info.sub,
            info.email,
            info.email_verified.as_ref(),
            info.name,
            info.picture,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> GoogleProvider {
        GoogleProvider::new(GoogleConfig::new("client-123", "secret")).unwrap()
    }

    #[test]
    fn authorize_url_carries_pkce_and_state() {
        let url = provider().authorize_url("st4te", "ch4llenge", "http://localhost:5000/cb");
        let parsed = Url::parse(&url).unwrap();
        let pairs: std::collections::HashMap<_, _> = parsed.query_pairs().into_owned().collect();
        assert_eq!(pairs["client_id"], "client-123");
        assert_eq!(pairs["state"], "st4te");
        assert_eq!(pairs["code_challenge"], "ch4llenge");
        assert_eq!(pairs["code_challenge_method"], "S256");
        assert_eq!(pairs["redirect_uri"], "http://localhost:5000/cb");
        assert_eq!(pairs["scope"], "openid email profile");
    }

    #[test]
    fn invalid_auth_url_is_rejected() {
        let mut config = GoogleConfig::new("id", "secret");
        config.auth_url = "not a url".into();
        assert!(GoogleProvider::new(config).is_err());
    }

    #[test]
    fn unverified_email_is_rejected() {
        let err = to_identity(
            "sub".into(),
            Some("x@example.com".into()),
            Some(&serde_json::json!("false")),
            None,
            None,
        )
        .unwrap_err();
        assert!(matches!(err, AuthError::InvalidProviderToken));
    }

    #[test]
    fn missing_name_falls_back_to_email_local_part() {
        let identity = to_identity(
            "sub".into(),
            Some("dana@example.com".into()),
            Some(&serde_json::json!(true)),
            None,
            Some(String::new()),
        )
        .unwrap();
        assert_eq!(identity.display_name, "dana");
        assert_eq!(identity.avatar_url, None);
    }

    #[tokio::test]
    async fn empty_id_token_is_rejected_without_network() {
        let err = provider().verify_id_token("").await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidProviderToken));
    }
}
