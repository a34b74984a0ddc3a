//! API server configuration.

use financia_core::auth::google::GoogleConfig;
use financia_core::auth::jwt::resolve_jwt_secret;

/// Configuration for the API server.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    /// Address to bind the HTTP listener (e.g. "127.0.0.1:5000").
    pub bind_addr: String,
    /// PostgreSQL connection URL.
    pub pg_connection_url: String,
    /// Session token signing secret.
    pub jwt_secret: String,
    /// Browser app that receives the token after the redirect sign-in flow.
    pub frontend_url: String,
    /// Callback URL registered with Google for the redirect flow.
    pub google_redirect_url: String,
    /// Google client registration; `None` disables the Google routes.
    pub google: Option<GoogleConfig>,
}

impl ApiConfig {
    /// Reads configuration from environment variables with sensible defaults.
    ///
    /// | Variable               | Default                                          |
    /// |------------------------|--------------------------------------------------|
    /// | `BIND_ADDR`            | `127.0.0.1:5000`                                 |
    /// | `DATABASE_URL`         | `postgres://localhost:5432/financia`             |
    /// | `JWT_SECRET`           | generated & persisted to file                    |
    /// | `FRONTEND_URL`         | `http://localhost:3000`                          |
    /// | `GOOGLE_CLIENT_ID`     | unset (Google sign-in disabled)                  |
    /// | `GOOGLE_CLIENT_SECRET` | unset                                            |
    /// | `GOOGLE_REDIRECT_URL`  | `http://localhost:5000/api/auth/google/callback` |
    pub fn from_env() -> Self {
        let google = match (
            non_empty_env("GOOGLE_CLIENT_ID"),
            non_empty_env("GOOGLE_CLIENT_SECRET"),
        ) {
            (Some(id), Some(secret)) => Some(GoogleConfig::new(id, secret)),
            _ => None,
        };
        Self {
            bind_addr: std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:5000".into()),
            pg_connection_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "postgres://localhost:5432/financia".into()),
            jwt_secret: resolve_jwt_secret(),
            frontend_url: std::env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:3000".into()),
            google_redirect_url: std::env::var("GOOGLE_REDIRECT_URL")
                .unwrap_or_else(|_| "http://localhost:5000/api/auth/google/callback".into()),
            google,
        }
    }

    /// Config for in-process use (tests, tools): fixed secret, no Google.
    pub fn local(jwt_secret: impl Into<String>) -> Self {
        Self {
            bind_addr: "127.0.0.1:0".into(),
            pg_connection_url: String::new(),
            jwt_secret: jwt_secret.into(),
            frontend_url: "http://localhost:3000".into(),
            google_redirect_url: "http://localhost:5000/api/auth/google/callback".into(),
            google: None,
        }
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
