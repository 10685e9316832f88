//! Request extractors shared by the handlers.

use axum::extract::FromRequest;

use crate::error::CmsError;

/// `axum::Json` whose rejection renders as a [`CmsError`] body, so a
/// malformed payload gets the same JSON error shape as every other 400.
#[derive(Debug, Clone, Copy, Default, FromRequest)]
#[from_request(via(axum::Json), rejection(CmsError))]
pub struct ApiJson<T>(pub T);
