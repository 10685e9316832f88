//! Contact form handlers. Submitting is public, everything else is admin.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::auth_guard::AdminSession;
use crate::api::dto::MessageResponse;
use crate::api::extract::ApiJson;
use crate::app_state::AppState;
use crate::domain::{ContactDraft, ContactFilter, ContactPatch, ContactSubmission, ResourceId};
use crate::error::{CmsError, ErrorResponse};

/// `GET /api/contacts`: Submissions, optionally filtered.
///
/// # Errors
///
/// Returns [`CmsError`] on storage failure.
#[utoipa::path(
    get,
    path = "/api/contacts",
    tag = "Contacts",
    summary = "List submissions",
    params(ContactFilter),
    responses(
        (status = 200, description = "Matching submissions", body = Vec<ContactSubmission>),
        (status = 401, description = "Admin session required", body = ErrorResponse),
    ),
    security(("bearer" = []))
)]
pub async fn list_contacts(
    _admin: AdminSession,
    State(state): State<AppState>,
    Query(filter): Query<ContactFilter>,
) -> Result<Json<Vec<ContactSubmission>>, CmsError> {
    Ok(Json(state.contacts.list_filtered(&filter).await?))
}

/// `GET /api/contacts/{id}`: One submission.
///
/// # Errors
///
/// Returns [`CmsError::NotFound`] for an unknown id.
#[utoipa::path(
    get,
    path = "/api/contacts/{id}",
    tag = "Contacts",
    summary = "Get a submission",
    params(("id" = String, Path, description = "Submission id")),
    responses(
        (status = 200, description = "The submission", body = ContactSubmission),
        (status = 404, description = "Submission not found", body = ErrorResponse),
    ),
    security(("bearer" = []))
)]
pub async fn get_contact(
    _admin: AdminSession,
    State(state): State<AppState>,
    Path(id): Path<ResourceId>,
) -> Result<Json<ContactSubmission>, CmsError> {
    Ok(Json(state.contacts.get(&id).await?))
}

/// `POST /api/contacts`: Submit the contact form.
///
/// # Errors
///
/// Returns [`CmsError::InvalidRequest`] on an invalid submission.
#[utoipa::path(
    post,
    path = "/api/contacts",
    tag = "Contacts",
    summary = "Submit the contact form",
    description = "New submissions always start as `pending`.",
    request_body = ContactDraft,
    responses(
        (status = 201, description = "Submission stored", body = ContactSubmission),
        (status = 400, description = "Invalid payload", body = ErrorResponse),
    )
)]
pub async fn create_contact(
    State(state): State<AppState>,
    ApiJson(draft): ApiJson<ContactDraft>,
) -> Result<(StatusCode, Json<ContactSubmission>), CmsError> {
    let contact = state.contacts.create(draft).await?;
    Ok((StatusCode::CREATED, Json(contact)))
}

/// `PUT /api/contacts/{id}`: Update a submission, typically its status.
///
/// # Errors
///
/// Returns [`CmsError::NotFound`] for an unknown id.
#[utoipa::path(
    put,
    path = "/api/contacts/{id}",
    tag = "Contacts",
    summary = "Update a submission",
    params(("id" = String, Path, description = "Submission id")),
    request_body = ContactPatch,
    responses(
        (status = 200, description = "Submission updated", body = ContactSubmission),
        (status = 400, description = "Invalid payload", body = ErrorResponse),
        (status = 404, description = "Submission not found", body = ErrorResponse),
    ),
    security(("bearer" = []))
)]
pub async fn update_contact(
    _admin: AdminSession,
    State(state): State<AppState>,
    Path(id): Path<ResourceId>,
    ApiJson(patch): ApiJson<ContactPatch>,
) -> Result<Json<ContactSubmission>, CmsError> {
    Ok(Json(state.contacts.update(&id, patch).await?))
}

/// `DELETE /api/contacts/{id}`: Delete a submission.
///
/// # Errors
///
/// Returns [`CmsError::NotFound`] for an unknown id.
#[utoipa::path(
    delete,
    path = "/api/contacts/{id}",
    tag = "Contacts",
    summary = "Delete a submission",
    params(("id" = String, Path, description = "Submission id")),
    responses(
        (status = 200, description = "Submission deleted", body = MessageResponse),
        (status = 404, description = "Submission not found", body = ErrorResponse),
    ),
    security(("bearer" = []))
)]
pub async fn delete_contact(
    _admin: AdminSession,
    State(state): State<AppState>,
    Path(id): Path<ResourceId>,
) -> Result<Json<MessageResponse>, CmsError> {
    state.contacts.delete(&id).await?;
    Ok(Json(MessageResponse::ok("Contact deleted successfully")))
}

/// Contact routes, relative to `/api`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/contacts", get(list_contacts).post(create_contact))
        .route(
            "/contacts/{id}",
            get(get_contact).put(update_contact).delete(delete_contact),
        )
}
