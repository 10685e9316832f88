//! Blog post handlers.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::auth_guard::AdminSession;
use crate::api::dto::MessageResponse;
use crate::api::extract::ApiJson;
use crate::app_state::AppState;
use crate::domain::{BlogDraft, BlogPatch, BlogPost, ResourceId};
use crate::error::{CmsError, ErrorResponse};

/// `GET /api/blogs`: Every post, drafts included.
///
/// # Errors
///
/// Returns [`CmsError`] on storage failure.
#[utoipa::path(
    get,
    path = "/api/blogs",
    tag = "Blogs",
    summary = "List all posts",
    responses(
        (status = 200, description = "All posts in creation order", body = Vec<BlogPost>),
        (status = 401, description = "Admin session required", body = ErrorResponse),
    ),
    security(("bearer" = []))
)]
pub async fn list_blogs(
    _admin: AdminSession,
    State(state): State<AppState>,
) -> Result<Json<Vec<BlogPost>>, CmsError> {
    Ok(Json(state.blogs.list().await?))
}

/// `GET /api/blogs/public`: Published posts only.
///
/// # Errors
///
/// Returns [`CmsError`] on storage failure.
#[utoipa::path(
    get,
    path = "/api/blogs/public",
    tag = "Blogs",
    summary = "List published posts",
    responses(
        (status = 200, description = "Published posts in creation order", body = Vec<BlogPost>),
    )
)]
pub async fn list_public_blogs(
    State(state): State<AppState>,
) -> Result<Json<Vec<BlogPost>>, CmsError> {
    Ok(Json(state.blogs.list_public().await?))
}

/// `GET /api/blogs/{id}`: One post.
///
/// # Errors
///
/// Returns [`CmsError::NotFound`] for an unknown id.
#[utoipa::path(
    get,
    path = "/api/blogs/{id}",
    tag = "Blogs",
    summary = "Get a post",
    params(("id" = String, Path, description = "Post id")),
    responses(
        (status = 200, description = "The post", body = BlogPost),
        (status = 404, description = "Post not found", body = ErrorResponse),
    )
)]
pub async fn get_blog(
    State(state): State<AppState>,
    Path(id): Path<ResourceId>,
) -> Result<Json<BlogPost>, CmsError> {
    Ok(Json(state.blogs.get(&id).await?))
}

/// `POST /api/blogs`: Create a post.
///
/// # Errors
///
/// Returns [`CmsError::InvalidRequest`] on an invalid draft.
#[utoipa::path(
    post,
    path = "/api/blogs",
    tag = "Blogs",
    summary = "Create a post",
    request_body = BlogDraft,
    responses(
        (status = 201, description = "Post created", body = BlogPost),
        (status = 400, description = "Invalid payload", body = ErrorResponse),
        (status = 401, description = "Admin session required", body = ErrorResponse),
    ),
    security(("bearer" = []))
)]
pub async fn create_blog(
    _admin: AdminSession,
    State(state): State<AppState>,
    ApiJson(draft): ApiJson<BlogDraft>,
) -> Result<(StatusCode, Json<BlogPost>), CmsError> {
    let post = state.blogs.create(draft).await?;
    Ok((StatusCode::CREATED, Json(post)))
}

/// `PUT /api/blogs/{id}`: Update a post.
///
/// # Errors
///
/// Returns [`CmsError::NotFound`] for an unknown id or
/// [`CmsError::InvalidRequest`] on an invalid patch.
#[utoipa::path(
    put,
    path = "/api/blogs/{id}",
    tag = "Blogs",
    summary = "Update a post",
    params(("id" = String, Path, description = "Post id")),
    request_body = BlogPatch,
    responses(
        (status = 200, description = "Post updated", body = BlogPost),
        (status = 400, description = "Invalid payload", body = ErrorResponse),
        (status = 404, description = "Post not found", body = ErrorResponse),
    ),
    security(("bearer" = []))
)]
pub async fn update_blog(
    _admin: AdminSession,
    State(state): State<AppState>,
    Path(id): Path<ResourceId>,
    ApiJson(patch): ApiJson<BlogPatch>,
) -> Result<Json<BlogPost>, CmsError> {
    Ok(Json(state.blogs.update(&id, patch).await?))
}

/// `DELETE /api/blogs/{id}`: Delete a post.
///
/// # Errors
///
/// Returns [`CmsError::NotFound`] for an unknown id.
#[utoipa::path(
    delete,
    path = "/api/blogs/{id}",
    tag = "Blogs",
    summary = "Delete a post",
    params(("id" = String, Path, description = "Post id")),
    responses(
        (status = 200, description = "Post deleted", body = MessageResponse),
        (status = 404, description = "Post not found", body = ErrorResponse),
    ),
    security(("bearer" = []))
)]
pub async fn delete_blog(
    _admin: AdminSession,
    State(state): State<AppState>,
    Path(id): Path<ResourceId>,
) -> Result<Json<MessageResponse>, CmsError> {
    state.blogs.delete(&id).await?;
    Ok(Json(MessageResponse::ok("Blog deleted successfully")))
}

/// Blog routes, relative to `/api`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/blogs", get(list_blogs).post(create_blog))
        .route("/blogs/public", get(list_public_blogs))
        .route(
            "/blogs/{id}",
            get(get_blog).put(update_blog).delete(delete_blog),
        )
}
