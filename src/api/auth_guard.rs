//! Admin authorization for protected handlers.
//!
//! Handlers opt in by taking an [`AdminSession`] argument. Being an
//! extractor rather than a router layer lets one path mix public and
//! admin methods (`GET /api/blogs/{id}` vs `PUT /api/blogs/{id}`).

use axum::extract::FromRequestParts;
use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use crate::app_state::AppState;
use crate::error::CmsError;
use crate::service::Session;

/// Proof that the request carried a live admin session.
#[derive(Debug, Clone)]
pub struct AdminSession(pub Session);

impl FromRequestParts<AppState> for AdminSession {
    type Rejection = CmsError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)
            .ok_or_else(|| CmsError::Unauthorized("No token provided".to_string()))?;
        let session = state.auth.verify(token).await?;
        Ok(Self(session))
    }
}

/// Returns the token of an `Authorization: Bearer <token>` header.
#[must_use]
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}
