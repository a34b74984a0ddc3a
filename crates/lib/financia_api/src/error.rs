//! Application error types.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use financia_core::auth::AuthError;
use financia_core::ledger::LedgerError;
use thiserror::Error;
use tracing::error;

use crate::models::ErrorResponse;

/// Convenience alias for handler return types.
pub type AppResult<T> = Result<T, AppError>;

/// Application-level errors with HTTP status mapping.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error("Internal server error")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, message) = match &self {
            AppError::Validation(m) => (StatusCode::BAD_REQUEST, "validation_error", m.as_str()),
            AppError::NotFound(m) => (StatusCode::NOT_FOUND, "not_found", m.as_str()),
            AppError::Unauthorized(m) => (StatusCode::UNAUTHORIZED, "unauthorized", m.as_str()),
            AppError::Unavailable(m) => {
                (StatusCode::SERVICE_UNAVAILABLE, "unavailable", m.as_str())
            }
            AppError::Internal(detail) => {
                error!(detail = %detail, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "Internal server error",
                )
            }
        };
        let body = Json(ErrorResponse {
            error: error.to_string(),
            message: message.to_string(),
        });
        (status, body).into_response()
    }
}

impl From<AuthError> for AppError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::DuplicateEmail
            | AuthError::IncorrectOldPassword
            | AuthError::NoPasswordCredential => AppError::Validation(e.to_string()),
            AuthError::Validation(msg) => AppError::Validation(msg),
            AuthError::InvalidCredentials | AuthError::InvalidProviderToken => {
                AppError::Unauthorized(e.to_string())
            }
            AuthError::InvalidToken | AuthError::ExpiredToken | AuthError::Unauthorized => {
                AppError::Unauthorized("Unauthorized".into())
            }
            AuthError::Store(_) | AuthError::Internal(_) => AppError::Internal(e.to_string()),
        }
    }
}

impl From<LedgerError> for AppError {
    fn from(e: LedgerError) -> Self {
        match e {
            LedgerError::Validation(msg) => AppError::Validation(msg),
            LedgerError::NotFound(what) => AppError::NotFound(format!("{what} not found")),
            LedgerError::Store(_) => AppError::Internal(e.to_string()),
        }
    }
}
