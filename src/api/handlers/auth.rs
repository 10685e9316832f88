//! Auth handlers: login, logout, verify.

use axum::extract::State;
use axum::http::HeaderMap;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::auth_guard::{AdminSession, bearer_token};
use crate::api::dto::{LoginRequest, LoginResponse, MessageResponse};
use crate::api::extract::ApiJson;
use crate::app_state::AppState;
use crate::error::{CmsError, ErrorResponse};

/// `POST /api/auth/login`: Exchange the admin credentials for a token.
///
/// # Errors
///
/// Returns [`CmsError::InvalidCredentials`] on a mismatch.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Auth",
    summary = "Sign in",
    description = "Checks the admin credential pair and issues an opaque session token.",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed in", body = LoginResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse),
    )
)]
pub async fn login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> Result<Json<LoginResponse>, CmsError> {
    let session = state.auth.login(&req.username, &req.password).await?;
    Ok(Json(LoginResponse {
        success: true,
        message: "Login successful".to_string(),
        token: Some(session.token),
        expires_at: Some(session.expires_at.to_rfc3339()),
    }))
}

/// `POST /api/auth/logout`: Revoke the presented token, if any.
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    tag = "Auth",
    summary = "Sign out",
    description = "Revokes the bearer token. Succeeds even without a token.",
    responses(
        (status = 200, description = "Signed out", body = MessageResponse),
    ),
    security(("bearer" = []))
)]
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Json<MessageResponse> {
    if let Some(token) = bearer_token(&headers) {
        state.auth.logout(token).await;
    }
    Json(MessageResponse::ok("Logout successful"))
}

/// `GET /api/auth/verify`: Check that the bearer token is live.
#[utoipa::path(
    get,
    path = "/api/auth/verify",
    tag = "Auth",
    summary = "Verify token",
    responses(
        (status = 200, description = "Token is valid", body = MessageResponse),
        (status = 401, description = "Missing, unknown or expired token", body = ErrorResponse),
    ),
    security(("bearer" = []))
)]
pub async fn verify(_admin: AdminSession) -> Json<MessageResponse> {
    Json(MessageResponse::ok("Token is valid"))
}

/// Auth routes, relative to `/api`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
        .route("/auth/verify", get(verify))
}
