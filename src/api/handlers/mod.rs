//! REST endpoint handlers organized by resource.

pub mod auth;
pub mod blog;
pub mod contact;
pub mod gallery;
pub mod subscriber;
pub mod system;

use axum::Router;

use crate::app_state::AppState;

/// Composes all resource routes, relative to `/api`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(auth::routes())
        .merge(blog::routes())
        .merge(gallery::routes())
        .merge(contact::routes())
        .merge(subscriber::routes())
        .merge(system::routes())
}
