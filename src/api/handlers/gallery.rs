//! Gallery image handlers.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::auth_guard::AdminSession;
use crate::api::dto::MessageResponse;
use crate::api::extract::ApiJson;
use crate::app_state::AppState;
use crate::domain::{GalleryDraft, GalleryImage, GalleryPatch, ResourceId};
use crate::error::{CmsError, ErrorResponse};

/// `GET /api/gallery`: Slider images.
///
/// # Errors
///
/// Returns [`CmsError`] on storage failure.
#[utoipa::path(
    get,
    path = "/api/gallery",
    tag = "Gallery",
    summary = "List images",
    responses(
        (status = 200, description = "All images", body = Vec<GalleryImage>),
    )
)]
pub async fn list_images(
    State(state): State<AppState>,
) -> Result<Json<Vec<GalleryImage>>, CmsError> {
    Ok(Json(state.gallery.list().await?))
}

/// `GET /api/gallery/{id}`: One image.
///
/// # Errors
///
/// Returns [`CmsError::NotFound`] for an unknown id.
#[utoipa::path(
    get,
    path = "/api/gallery/{id}",
    tag = "Gallery",
    summary = "Get an image",
    params(("id" = String, Path, description = "Image id")),
    responses(
        (status = 200, description = "The image", body = GalleryImage),
        (status = 404, description = "Image not found", body = ErrorResponse),
    )
)]
pub async fn get_image(
    State(state): State<AppState>,
    Path(id): Path<ResourceId>,
) -> Result<Json<GalleryImage>, CmsError> {
    Ok(Json(state.gallery.get(&id).await?))
}

/// `POST /api/gallery`: Add an image.
///
/// # Errors
///
/// Returns [`CmsError::InvalidRequest`] on an invalid draft.
#[utoipa::path(
    post,
    path = "/api/gallery",
    tag = "Gallery",
    summary = "Add an image",
    description = "`image_file` is a URL or a `data:` URI.",
    request_body = GalleryDraft,
    responses(
        (status = 201, description = "Image added", body = GalleryImage),
        (status = 400, description = "Invalid payload", body = ErrorResponse),
        (status = 401, description = "Admin session required", body = ErrorResponse),
    ),
    security(("bearer" = []))
)]
pub async fn create_image(
    _admin: AdminSession,
    State(state): State<AppState>,
    ApiJson(draft): ApiJson<GalleryDraft>,
) -> Result<(StatusCode, Json<GalleryImage>), CmsError> {
    let image = state.gallery.create(draft).await?;
    Ok((StatusCode::CREATED, Json(image)))
}

/// `PUT /api/gallery/{id}`: Rename or replace an image.
///
/// # Errors
///
/// Returns [`CmsError::NotFound`] for an unknown id.
#[utoipa::path(
    put,
    path = "/api/gallery/{id}",
    tag = "Gallery",
    summary = "Update an image",
    params(("id" = String, Path, description = "Image id")),
    request_body = GalleryPatch,
    responses(
        (status = 200, description = "Image updated", body = GalleryImage),
        (status = 404, description = "Image not found", body = ErrorResponse),
    ),
    security(("bearer" = []))
)]
pub async fn update_image(
    _admin: AdminSession,
    State(state): State<AppState>,
    Path(id): Path<ResourceId>,
    ApiJson(patch): ApiJson<GalleryPatch>,
) -> Result<Json<GalleryImage>, CmsError> {
    Ok(Json(state.gallery.update(&id, patch).await?))
}

/// `DELETE /api/gallery/{id}`: Remove an image.
///
/// # Errors
///
/// Returns [`CmsError::NotFound`] for an unknown id.
#[utoipa::path(
    delete,
    path = "/api/gallery/{id}",
    tag = "Gallery",
    summary = "Delete an image",
    params(("id" = String, Path, description = "Image id")),
    responses(
        (status = 200, description = "Image deleted", body = MessageResponse),
        (status = 404, description = "Image not found", body = ErrorResponse),
    ),
    security(("bearer" = []))
)]
pub async fn delete_image(
    _admin: AdminSession,
    State(state): State<AppState>,
    Path(id): Path<ResourceId>,
) -> Result<Json<MessageResponse>, CmsError> {
    state.gallery.delete(&id).await?;
    Ok(Json(MessageResponse::ok("Gallery image deleted successfully")))
}

/// Gallery routes, relative to `/api`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/gallery", get(list_images).post(create_image))
        .route(
            "/gallery/{id}",
            get(get_image).put(update_image).delete(delete_image),
        )
}
