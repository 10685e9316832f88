//! Server error types with HTTP status code mapping.
//!
//! [`CmsError`] is the central error type of the content server. Each
//! variant maps to a numeric code, an HTTP status and a JSON body, so a
//! bad request never takes the process down.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ResourceKind;

/// JSON body of every error response.
///
/// ```json
/// { "success": false, "message": "blog post not found: 42", "code": 2001 }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Always `false`.
    pub success: bool,
    /// Human-readable error message.
    pub message: String,
    /// Numeric error code.
    pub code: u32,
}

/// Server-side error enum with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category          | HTTP Status                  |
/// |-----------|-------------------|------------------------------|
/// | 1000–1999 | Validation        | 400 Bad Request              |
/// | 2000–2999 | State / Not Found | 404 Not Found / 409 Conflict |
/// | 3000–3999 | Server            | 500 Internal Server Error    |
/// | 4000–4999 | Authorization     | 401 Unauthorized             |
#[derive(Debug, thiserror::Error)]
pub enum CmsError {
    /// No record with the given id in the collection.
    #[error("{kind} not found: {id}")]
    NotFound {
        /// Collection that was searched.
        kind: ResourceKind,
        /// Requested id.
        id: String,
    },

    /// Malformed or invalid request payload.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The write would violate a uniqueness constraint.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Username or password did not match.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Missing, unknown or expired session token.
    #[error("{0}")]
    Unauthorized(String),

    /// Storage backend failure.
    #[error("persistence error: {0}")]
    Persistence(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl CmsError {
    /// Shorthand for [`CmsError::NotFound`].
    #[must_use]
    pub fn not_found(kind: ResourceKind, id: impl ToString) -> Self {
        Self::NotFound {
            kind,
            id: id.to_string(),
        }
    }

    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::InvalidRequest(_) => 1001,
            Self::NotFound { .. } => 2001,
            Self::Conflict(_) => 2002,
            Self::Internal(_) => 3000,
            Self::Persistence(_) => 3001,
            Self::InvalidCredentials => 4001,
            Self::Unauthorized(_) => 4002,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::InvalidCredentials | Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Persistence(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for CmsError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        let body = ErrorResponse {
            success: false,
            message: self.to_string(),
            code: self.error_code(),
        };
        (status, axum::Json(body)).into_response()
    }
}

impl From<JsonRejection> for CmsError {
    fn from(rejection: JsonRejection) -> Self {
        Self::InvalidRequest(rejection.body_text())
    }
}

impl From<serde_json::Error> for CmsError {
    fn from(err: serde_json::Error) -> Self {
        Self::Persistence(format!("serialization: {err}"))
    }
}

impl From<std::io::Error> for CmsError {
    fn from(err: std::io::Error) -> Self {
        Self::Persistence(err.to_string())
    }
}

impl From<sqlx::Error> for CmsError {
    fn from(err: sqlx::Error) -> Self {
        Self::Persistence(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_match_categories() {
        assert_eq!(
            CmsError::not_found(ResourceKind::Blog, "9").status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            CmsError::InvalidRequest(String::new()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            CmsError::Conflict(String::new()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            CmsError::InvalidCredentials.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            CmsError::Persistence(String::new()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn not_found_message_names_the_resource() {
        let err = CmsError::not_found(ResourceKind::Gallery, "abc");
        assert_eq!(err.to_string(), "gallery image not found: abc");
        assert_eq!(err.error_code(), 2001);
    }

    #[test]
    fn response_carries_status() {
        let response = CmsError::InvalidCredentials.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
