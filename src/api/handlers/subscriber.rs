//! Newsletter subscriber handlers. Subscribing is public, everything else
//! is admin.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::http::header::CONTENT_TYPE;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::auth_guard::AdminSession;
use crate::api::dto::MessageResponse;
use crate::api::extract::ApiJson;
use crate::app_state::AppState;
use crate::domain::{
    EmailSubscriber, ResourceId, SubscriberDraft, SubscriberFilter, SubscriberPatch,
};
use crate::error::{CmsError, ErrorResponse};

/// `GET /api/subscribers`: Subscribers, optionally filtered.
///
/// # Errors
///
/// Returns [`CmsError`] on storage failure.
#[utoipa::path(
    get,
    path = "/api/subscribers",
    tag = "Subscribers",
    summary = "List subscribers",
    params(SubscriberFilter),
    responses(
        (status = 200, description = "Matching subscribers", body = Vec<EmailSubscriber>),
        (status = 401, description = "Admin session required", body = ErrorResponse),
    ),
    security(("bearer" = []))
)]
pub async fn list_subscribers(
    _admin: AdminSession,
    State(state): State<AppState>,
    Query(filter): Query<SubscriberFilter>,
) -> Result<Json<Vec<EmailSubscriber>>, CmsError> {
    Ok(Json(state.subscribers.list_filtered(&filter).await?))
}

/// `GET /api/subscribers/export`: Active addresses as plain text.
///
/// # Errors
///
/// Returns [`CmsError`] on storage failure.
#[utoipa::path(
    get,
    path = "/api/subscribers/export",
    tag = "Subscribers",
    summary = "Export active emails",
    description = "One address per line, active subscribers only.",
    responses(
        (status = 200, description = "Address list", body = String, content_type = "text/plain"),
        (status = 401, description = "Admin session required", body = ErrorResponse),
    ),
    security(("bearer" = []))
)]
pub async fn export_subscribers(
    _admin: AdminSession,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, CmsError> {
    let body = state.subscribers.export_active().await?;
    Ok(([(CONTENT_TYPE, "text/plain; charset=utf-8")], body))
}

/// `GET /api/subscribers/{id}`: One subscriber.
///
/// # Errors
///
/// Returns [`CmsError::NotFound`] for an unknown id.
#[utoipa::path(
    get,
    path = "/api/subscribers/{id}",
    tag = "Subscribers",
    summary = "Get a subscriber",
    params(("id" = String, Path, description = "Subscriber id")),
    responses(
        (status = 200, description = "The subscriber", body = EmailSubscriber),
        (status = 404, description = "Subscriber not found", body = ErrorResponse),
    ),
    security(("bearer" = []))
)]
pub async fn get_subscriber(
    _admin: AdminSession,
    State(state): State<AppState>,
    Path(id): Path<ResourceId>,
) -> Result<Json<EmailSubscriber>, CmsError> {
    Ok(Json(state.subscribers.get(&id).await?))
}

/// `POST /api/subscribers`: Subscribe to the newsletter.
///
/// # Errors
///
/// Returns [`CmsError::Conflict`] if the address is already subscribed.
#[utoipa::path(
    post,
    path = "/api/subscribers",
    tag = "Subscribers",
    summary = "Subscribe",
    request_body = SubscriberDraft,
    responses(
        (status = 201, description = "Subscribed", body = EmailSubscriber),
        (status = 400, description = "Invalid payload", body = ErrorResponse),
        (status = 409, description = "Already subscribed", body = ErrorResponse),
    )
)]
pub async fn create_subscriber(
    State(state): State<AppState>,
    ApiJson(draft): ApiJson<SubscriberDraft>,
) -> Result<(StatusCode, Json<EmailSubscriber>), CmsError> {
    let subscriber = state.subscribers.subscribe(draft).await?;
    Ok((StatusCode::CREATED, Json(subscriber)))
}

/// `PUT /api/subscribers/{id}`: Update a subscriber.
///
/// # Errors
///
/// Returns [`CmsError::NotFound`] for an unknown id or
/// [`CmsError::Conflict`] when the new address is taken.
#[utoipa::path(
    put,
    path = "/api/subscribers/{id}",
    tag = "Subscribers",
    summary = "Update a subscriber",
    params(("id" = String, Path, description = "Subscriber id")),
    request_body = SubscriberPatch,
    responses(
        (status = 200, description = "Subscriber updated", body = EmailSubscriber),
        (status = 404, description = "Subscriber not found", body = ErrorResponse),
        (status = 409, description = "Address taken", body = ErrorResponse),
    ),
    security(("bearer" = []))
)]
pub async fn update_subscriber(
    _admin: AdminSession,
    State(state): State<AppState>,
    Path(id): Path<ResourceId>,
    ApiJson(patch): ApiJson<SubscriberPatch>,
) -> Result<Json<EmailSubscriber>, CmsError> {
    Ok(Json(state.subscribers.update_subscriber(&id, patch).await?))
}

/// `DELETE /api/subscribers/{id}`: Remove a subscriber.
///
/// # Errors
///
/// Returns [`CmsError::NotFound`] for an unknown id.
#[utoipa::path(
    delete,
    path = "/api/subscribers/{id}",
    tag = "Subscribers",
    summary = "Delete a subscriber",
    params(("id" = String, Path, description = "Subscriber id")),
    responses(
        (status = 200, description = "Subscriber deleted", body = MessageResponse),
        (status = 404, description = "Subscriber not found", body = ErrorResponse),
    ),
    security(("bearer" = []))
)]
pub async fn delete_subscriber(
    _admin: AdminSession,
    State(state): State<AppState>,
    Path(id): Path<ResourceId>,
) -> Result<Json<MessageResponse>, CmsError> {
    state.subscribers.delete(&id).await?;
    Ok(Json(MessageResponse::ok("Subscriber deleted successfully")))
}

/// Subscriber routes, relative to `/api`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/subscribers", get(list_subscribers).post(create_subscriber))
        .route("/subscribers/export", get(export_subscribers))
        .route(
            "/subscribers/{id}",
            get(get_subscriber)
                .put(update_subscriber)
                .delete(delete_subscriber),
        )
}
