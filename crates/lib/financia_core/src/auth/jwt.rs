//! Session token issuance and verification (HS256 JWT).

use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use rand::RngCore;
use tracing::{debug, info, warn};

use super::AuthError;
use crate::models::auth::TokenClaims;

/// Session token lifetime: 1 hour.
pub const SESSION_TOKEN_EXPIRY_SECS: i64 = 60 * 60;

/// Signs and verifies session tokens with a process-wide secret.
///
/// The key material is loaded once at startup and never mutated, so clones
/// can be shared freely across concurrent requests.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl TokenIssuer {
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        }
    }

    /// Issue a token for `user_id`, valid for one hour from now.
    pub fn issue(&self, user_id: &str) -> Result<String, AuthError> {
        self.issue_at(user_id, Utc::now())
    }

    /// Issue a token as if the current time were `now`.
    pub fn issue_at(&self, user_id: &str, now: DateTime<Utc>) -> Result<String, AuthError> {
        let claims = TokenClaims {
            sub: user_id.to_string(),
            exp: (now + Duration::seconds(SESSION_TOKEN_EXPIRY_SECS)).timestamp(),
            iat: now.timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AuthError::Internal(format!("jwt encode: {e}")))
    }

    /// Verify a token, returning the subject user id.
    pub fn verify(&self, token: &str) -> Result<String, AuthError> {
        self.verify_at(token, Utc::now())
    }

    /// Verify a token against an explicit clock.
    ///
    /// A token is accepted only while `now < exp`; there is no leeway.
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<String, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked below against the injected clock.
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["exp", "sub"]);

        let data = decode::<TokenClaims>(token, &self.decoding, &validation).map_err(|e| {
            debug!(error = %e, "session token rejected");
            match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::ExpiredToken,
                _ => AuthError::InvalidToken,
            }
        })?;

        if data.claims.exp <= now.timestamp() {
            return Err(AuthError::ExpiredToken);
        }
        if data.claims.sub.is_empty() {
            return Err(AuthError::InvalidToken);
        }
        Ok(data.claims.sub)
    }
}

/// Generate a random hex secret from `len` random bytes.
pub fn generate_secret(len: usize) -> String {
    let mut bytes = vec![0u8; len];
    rand::rng().fill_bytes(&mut bytes);
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// Resolve the JWT secret: env var `JWT_SECRET` → persisted file.
pub fn resolve_jwt_secret() -> String {
    if let Ok(secret) = std::env::var("JWT_SECRET")
        && !secret.is_empty()
    {
        return secret;
    }
    resolve_jwt_secret_at(&jwt_secret_path())
}

/// Read the secret persisted at `path`, generating and persisting one if absent.
pub fn resolve_jwt_secret_at(path: &Path) -> String {
    if let Ok(existing) = std::fs::read_to_string(path) {
        let trimmed = existing.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }
    let secret = generate_secret(32);
    if let Some(parent) = path.parent()
        && let Err(e) = std::fs::create_dir_all(parent)
    {
        warn!(path = %parent.display(), error = %e, "cannot create secret directory");
    }
    match std::fs::write(path, &secret) {
        Ok(()) => info!(path = %path.display(), "generated new JWT secret"),
        Err(e) => warn!(
            path = %path.display(),
            error = %e,
            "cannot persist JWT secret; tokens will not survive a restart"
        ),
    }
    secret
}

/// Path to the persisted JWT secret file.
fn jwt_secret_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("financia")
        .join("jwt-secret")
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"test-secret";

    #[test]
    fn fresh_token_verifies_to_subject() {
        let issuer = TokenIssuer::new(SECRET);
        let token = issuer.issue("user-1").unwrap();
        assert_eq!(issuer.verify(&token).unwrap(), "user-1");
    }

    #[test]
    fn token_expires_after_one_hour() {
        let issuer = TokenIssuer::new(SECRET);
        let issued = Utc::now();
        let token = issuer.issue_at("user-1", issued).unwrap();

        let almost = issued + Duration::seconds(SESSION_TOKEN_EXPIRY_SECS - 1);
        assert_eq!(issuer.verify_at(&token, almost).unwrap(), "user-1");

        let later = issued + Duration::seconds(SESSION_TOKEN_EXPIRY_SECS + 1);
        assert!(matches!(
            issuer.verify_at(&token, later),
            Err(AuthError::ExpiredToken)
        ));
    }

    #[test]
    fn token_issued_long_ago_is_expired_now() {
        let issuer = TokenIssuer::new(SECRET);
        let token = issuer
            .issue_at("user-1", Utc::now() - Duration::hours(2))
            .unwrap();
        assert!(matches!(issuer.verify(&token), Err(AuthError::ExpiredToken)));
    }

    #[test]
    fn other_secret_is_rejected() {
        let token = TokenIssuer::new(SECRET).issue("user-1").unwrap();
        let other = TokenIssuer::new(b"another-secret");
        assert!(matches!(other.verify(&token), Err(AuthError::InvalidToken)));
    }

    #[test]
    fn garbage_is_rejected() {
        let issuer = TokenIssuer::new(SECRET);
        assert!(matches!(
            issuer.verify("not.a.jwt"),
            Err(AuthError::InvalidToken)
        ));
        assert!(matches!(issuer.verify(""), Err(AuthError::InvalidToken)));
    }

    #[test]
    fn tampered_payload_is_rejected() {
        let issuer = TokenIssuer::new(SECRET);
        let token = issuer.issue("user-1").unwrap();
        let forged = issuer.issue("user-2").unwrap();
        let forged_payload = forged.split('.').nth(1).unwrap();
        let mut parts: Vec<&str> = token.split('.').collect();
        parts[1] = forged_payload;
        let spliced = parts.join(".");
        assert!(matches!(
            issuer.verify(&spliced),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn generated_secret_is_hex_of_requested_length() {
        let secret = generate_secret(32);
        assert_eq!(secret.len(), 64);
        assert!(secret.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn secret_is_persisted_and_reused() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("jwt-secret");
        let first = resolve_jwt_secret_at(&path);
        assert!(path.exists());
        let second = resolve_jwt_secret_at(&path);
        assert_eq!(first, second);
    }
}
