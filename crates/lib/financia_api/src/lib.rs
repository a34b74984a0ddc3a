//! # financia_api
//!
//! HTTP API library for Financia.

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post, put};
use financia_core::auth::credentials::CredentialManager;
use financia_core::auth::jwt::TokenIssuer;
use financia_core::auth::oauth::OAuthStateStore;
use financia_core::auth::provider::IdentityProvider;
use financia_core::auth::resolver::IdentityResolver;
use financia_core::auth::session::SessionAuthenticator;
use financia_core::auth::UserStore;
use financia_core::ledger::LedgerStore;
use sqlx::PgPool;
use tower_http::cors::{Any, CorsLayer};

use crate::config::ApiConfig;
use crate::handlers::{auth, budgets, health, oauth, transactions};

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// API configuration.
    pub config: ApiConfig,
    pub credentials: CredentialManager,
    pub resolver: IdentityResolver,
    pub issuer: TokenIssuer,
    pub sessions: SessionAuthenticator,
    pub ledger: Arc<dyn LedgerStore>,
    /// Google sign-in; `None` when no client is configured.
    pub google: Option<Arc<dyn IdentityProvider>>,
    /// Pending redirect-flow states, keyed by the `state` parameter.
    pub oauth_states: Arc<OAuthStateStore>,
}

impl AppState {
    /// Wire the auth components around one user store and one ledger store.
    pub fn new(config: ApiConfig, users: Arc<dyn UserStore>, ledger: Arc<dyn LedgerStore>) -> Self {
        let issuer = TokenIssuer::new(config.jwt_secret.as_bytes());
        Self {
            credentials: CredentialManager::new(users.clone()),
            resolver: IdentityResolver::new(users.clone()),
            sessions: SessionAuthenticator::new(issuer.clone(), users),
            issuer,
            ledger,
            google: None,
            oauth_states: Arc::new(OAuthStateStore::new()),
            config,
        }
    }

    /// Enable the Google routes with `provider`.
    pub fn with_google(mut self, provider: Arc<dyn IdentityProvider>) -> Self {
        self.google = Some(provider);
        self
    }
}

/// Run embedded database migrations.
///
/// Delegates to `financia_core::migrate::migrate()` which owns the migration files.
pub async fn migrate(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    financia_core::migrate::migrate(pool).await
}

/// Builds the Axum router with all routes and shared state.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Public routes (no auth required)
    let public = Router::new()
        .route(routes::GET_API_HEALTH, get(health::health_handler))
        .route(routes::POST_AUTH_REGISTER, post(auth::register_handler))
        .route(routes::POST_AUTH_LOGIN, post(auth::login_handler))
        .route(routes::POST_AUTH_GOOGLE_LOGIN, post(oauth::google_login_handler))
        .route(routes::GET_AUTH_GOOGLE, get(oauth::google_redirect_handler))
        .route(
            routes::GET_AUTH_GOOGLE_CALLBACK,
            get(oauth::google_callback_handler),
        );

    // Protected routes (require auth)
    let protected = Router::new()
        .route(routes::GET_AUTH_PROTECTED, get(auth::protected_handler))
        .route(
            routes::PUT_AUTH_CHANGE_PASSWORD,
            put(auth::change_password_handler),
        )
        .route(
            routes::PUT_AUTH_UPDATE_PROFILE,
            put(auth::update_profile_handler),
        )
        .route(
            routes::TRANSACTIONS,
            post(transactions::create_transaction_handler)
                .get(transactions::list_transactions_handler),
        )
        .route(
            routes::GET_TRANSACTIONS_SUMMARY,
            get(transactions::monthly_summary_handler),
        )
        .route(
            routes::TRANSACTIONS_ID,
            put(transactions::update_transaction_handler)
                .delete(transactions::delete_transaction_handler),
        )
        .route(
            routes::BUDGETS,
            post(budgets::create_budget_handler).get(budgets::list_budgets_handler),
        )
        .route(
            routes::GET_BUDGETS_PROGRESS,
            get(budgets::budget_progress_handler),
        )
        .route(
            routes::BUDGETS_ID,
            put(budgets::update_budget_handler).delete(budgets::delete_budget_handler),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::require_auth,
        ));

    Router::new()
        .merge(public)
        .merge(protected)
        .layer(cors)
        .with_state(state)
}
