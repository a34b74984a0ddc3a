//! Password account and session request handlers.

use axum::extract::State;
use axum::{Extension, Json};

use crate::AppState;
use crate::error::AppResult;
use crate::middleware::auth::AuthenticatedUser;
use crate::models::{
    AuthResponse, AuthUser, ChangePasswordRequest, LoginRequest, MessageResponse,
    ProtectedResponse, RegisterRequest, UpdateProfileRequest,
};
use crate::services::auth::auth_response;

/// `POST /api/auth/register`: create a password account and sign it in.
pub async fn register_handler(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> AppResult<Json<AuthResponse>> {
    let user = state
        .credentials
        .register(
            &body.name,
            &body.email,
            &body.password,
            body.profile_image.as_deref(),
        )
        .await?;
    Ok(Json(auth_response(&state, user)?))
}

/// `POST /api/auth/login`: authenticate with email + password.
pub async fn login_handler(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    let user = state.credentials.verify(&body.email, &body.password).await?;
    Ok(Json(auth_response(&state, user)?))
}

/// `GET /api/auth/protected`: echo the authenticated caller.
pub async fn protected_handler(
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
) -> Json<ProtectedResponse> {
    Json(ProtectedResponse {
        msg: "This is a protected route".into(),
        user: user.into(),
    })
}

/// `PUT /api/auth/change-password`
pub async fn change_password_handler(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
    Json(body): Json<ChangePasswordRequest>,
) -> AppResult<Json<MessageResponse>> {
    state
        .credentials
        .change_password(&user.id, &body.old_password, &body.new_password)
        .await?;
    Ok(Json(MessageResponse::new("Password updated successfully")))
}

/// `PUT /api/auth/update-profile`
pub async fn update_profile_handler(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
    Json(body): Json<UpdateProfileRequest>,
) -> AppResult<Json<AuthUser>> {
    let updated = state
        .credentials
        .update_profile(
            &user.id,
            body.name.as_deref(),
            body.profile_image.as_deref(),
        )
        .await?;
    Ok(Json(updated.into()))
}
