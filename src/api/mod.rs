//! REST API layer: route handlers, DTOs, extractors and router composition.
//!
//! All endpoints are mounted under `/api`. The OpenAPI document lives at
//! `/api-docs/openapi.json`; with the `swagger-ui` feature the explorer is
//! served at `/swagger-ui`.

pub mod auth_guard;
pub mod dto;
pub mod extract;
pub mod handlers;
pub mod openapi;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

use crate::app_state::AppState;
use crate::config::ServerConfig;

pub use openapi::ApiDoc;

/// Builds the API router with all REST endpoints, state still unbound.
pub fn build_router() -> Router<AppState> {
    Router::new()
        .nest("/api", handlers::routes())
        .merge(docs_router())
}

/// Builds the complete application: API, docs, optional static front
/// end, and the tracing, timeout and CORS layers.
pub fn build_app(state: AppState, config: &ServerConfig) -> Router {
    let mut router = build_router();

    if let Some(dir) = &config.static_dir {
        tracing::info!(dir = %dir.display(), "serving static front end");
        let spa = ServeDir::new(dir).not_found_service(ServeFile::new(dir.join("index.html")));
        router = router.fallback_service(spa);
    }

    #[allow(deprecated)]
    let timeout = TimeoutLayer::new(config.request_timeout);

    router
        .layer(TraceLayer::new_for_http())
        .layer(timeout)
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[cfg(feature = "swagger-ui")]
fn docs_router() -> Router<AppState> {
    use utoipa_swagger_ui::SwaggerUi;

    Router::new().merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}

#[cfg(not(feature = "swagger-ui"))]
fn docs_router() -> Router<AppState> {
    use axum::Json;
    use axum::routing::get;

    Router::new().route(
        "/api-docs/openapi.json",
        get(|| async { Json(ApiDoc::openapi()) }),
    )
}
