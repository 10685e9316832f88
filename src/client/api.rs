//! Typed HTTP client for the content API.
//!
//! Every request carries `Authorization: Bearer <token>` when a token is
//! stored. A `401` on any call other than sign-in clears the stored token
//! and fires the optional unauthorized hook (the front end's redirect to
//! the login page) before surfacing [`ClientError::Unauthorized`].

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;

use super::error::ClientError;
use super::local_store::LocalStore;
use super::token::TokenStore;
use crate::api::dto::{HealthResponse, LoginRequest, LoginResponse, MessageResponse};
use crate::domain::{
    BlogDraft, BlogPatch, BlogPost, ContactDraft, ContactFilter, ContactPatch, ContactSubmission,
    EmailSubscriber, GalleryDraft, GalleryImage, GalleryPatch, Record, ResourceId, SubscriberDraft,
    SubscriberFilter, SubscriberPatch,
};
use crate::error::ErrorResponse;

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Connection settings for [`ApiClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// API root, e.g. `http://localhost:8080/api`.
    pub base_url: String,
    /// Per-request timeout. A timed-out call counts as failed.
    pub timeout: Duration,
}

impl ClientConfig {
    /// Config for `base_url` with the default timeout.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new("http://localhost:8080/api")
    }
}

type UnauthorizedHook = Arc<dyn Fn() + Send + Sync>;

/// Client for the content API. Cheap to clone.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    tokens: TokenStore,
    on_unauthorized: Option<UnauthorizedHook>,
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("tokens", &self.tokens)
            .field("on_unauthorized", &self.on_unauthorized.is_some())
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Builds a client keeping its token in `store`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Transport`] if the HTTP client cannot be
    /// constructed.
    pub fn new(config: &ClientConfig, store: Arc<dyn LocalStore>) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            tokens: TokenStore::new(store),
            on_unauthorized: None,
        })
    }

    /// Registers a callback run after a `401` cleared the stored token.
    #[must_use]
    pub fn with_unauthorized_hook(mut self, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_unauthorized = Some(Arc::new(hook));
        self
    }

    /// The token store requests are signed from.
    #[must_use]
    pub fn tokens(&self) -> &TokenStore {
        &self.tokens
    }

    /// API root without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Typed handle on the collection `R`.
    #[must_use]
    pub fn resource<R: Record>(&self) -> RemoteResource<R> {
        RemoteResource {
            client: self.clone(),
            _record: PhantomData,
        }
    }

    // ── Auth ────────────────────────────────────────────────────────────

    /// Signs in and stores the issued token.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidCredentials`] on a refused sign-in;
    /// the unauthorized hook is not fired.
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginResponse, ClientError> {
        let body = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };
        let response = self
            .request(Method::POST, "/auth/login")
            .json(&body)
            .send()
            .await?;
        if response.status() == StatusCode::UNAUTHORIZED {
            return Err(ClientError::InvalidCredentials);
        }
        let login: LoginResponse = decode(response).await?;
        match &login.token {
            Some(token) if login.success => self.tokens.set(token)?,
            _ => return Err(ClientError::InvalidCredentials),
        }
        tracing::info!(username, "signed in");
        Ok(login)
    }

    /// Signs out. The local token is cleared even if the call fails.
    ///
    /// # Errors
    ///
    /// Returns the error of the remote call, after clearing the token.
    pub async fn logout(&self) -> Result<MessageResponse, ClientError> {
        let result = self.send(self.request(Method::POST, "/auth/logout")).await;
        self.tokens.clear();
        result
    }

    /// Checks the stored token with the server.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Unauthorized`] for a dead session.
    pub async fn verify(&self) -> Result<MessageResponse, ClientError> {
        self.send(self.request(Method::GET, "/auth/verify")).await
    }

    // ── Blogs ───────────────────────────────────────────────────────────

    /// Every post (admin).
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on any failed call.
    pub async fn list_blogs(&self) -> Result<Vec<BlogPost>, ClientError> {
        self.list_records().await
    }

    /// Published posts.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on any failed call.
    pub async fn list_public_blogs(&self) -> Result<Vec<BlogPost>, ClientError> {
        self.send(self.request(Method::GET, "/blogs/public")).await
    }

    /// One post.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::NotFound`] for an unknown id.
    pub async fn get_blog(&self, id: &ResourceId) -> Result<BlogPost, ClientError> {
        self.get_record(id).await
    }

    /// Creates a post (admin).
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on any failed call.
    pub async fn create_blog(&self, draft: &BlogDraft) -> Result<BlogPost, ClientError> {
        self.create_record::<BlogPost>(draft).await
    }

    /// Updates a post (admin).
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::NotFound`] for an unknown id.
    pub async fn update_blog(&self, id: &ResourceId, patch: &BlogPatch) -> Result<BlogPost, ClientError> {
        self.update_record::<BlogPost>(id, patch).await
    }

    /// Deletes a post (admin).
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::NotFound`] for an unknown id.
    pub async fn delete_blog(&self, id: &ResourceId) -> Result<MessageResponse, ClientError> {
        self.delete_record::<BlogPost>(id).await
    }

    // ── Gallery ─────────────────────────────────────────────────────────

    /// Slider images.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on any failed call.
    pub async fn list_gallery(&self) -> Result<Vec<GalleryImage>, ClientError> {
        self.list_records().await
    }

    /// One image.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::NotFound`] for an unknown id.
    pub async fn get_gallery_image(&self, id: &ResourceId) -> Result<GalleryImage, ClientError> {
        self.get_record(id).await
    }

    /// Adds an image (admin).
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on any failed call.
    pub async fn create_gallery_image(&self, draft: &GalleryDraft) -> Result<GalleryImage, ClientError> {
        self.create_record::<GalleryImage>(draft).await
    }

    /// Updates an image (admin).
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::NotFound`] for an unknown id.
    pub async fn update_gallery_image(
        &self,
        id: &ResourceId,
        patch: &GalleryPatch,
    ) -> Result<GalleryImage, ClientError> {
        self.update_record::<GalleryImage>(id, patch).await
    }

    /// Deletes an image (admin).
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::NotFound`] for an unknown id.
    pub async fn delete_gallery_image(&self, id: &ResourceId) -> Result<MessageResponse, ClientError> {
        self.delete_record::<GalleryImage>(id).await
    }

    // ── Contacts ────────────────────────────────────────────────────────

    /// Submissions matching `filter` (admin).
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on any failed call.
    pub async fn list_contacts(&self, filter: &ContactFilter) -> Result<Vec<ContactSubmission>, ClientError> {
        self.send(self.request(Method::GET, "/contacts").query(filter))
            .await
    }

    /// One submission (admin).
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::NotFound`] for an unknown id.
    pub async fn get_contact(&self, id: &ResourceId) -> Result<ContactSubmission, ClientError> {
        self.get_record(id).await
    }

    /// Submits the contact form.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on any failed call.
    pub async fn submit_contact(&self, draft: &ContactDraft) -> Result<ContactSubmission, ClientError> {
        self.create_record::<ContactSubmission>(draft).await
    }

    /// Updates a submission, typically its status (admin).
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::NotFound`] for an unknown id.
    pub async fn update_contact(
        &self,
        id: &ResourceId,
        patch: &ContactPatch,
    ) -> Result<ContactSubmission, ClientError> {
        self.update_record::<ContactSubmission>(id, patch).await
    }

    /// Deletes a submission (admin).
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::NotFound`] for an unknown id.
    pub async fn delete_contact(&self, id: &ResourceId) -> Result<MessageResponse, ClientError> {
        self.delete_record::<ContactSubmission>(id).await
    }

    // ── Subscribers ─────────────────────────────────────────────────────

    /// Subscribers matching `filter` (admin).
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on any failed call.
    pub async fn list_subscribers(
        &self,
        filter: &SubscriberFilter,
    ) -> Result<Vec<EmailSubscriber>, ClientError> {
        self.send(self.request(Method::GET, "/subscribers").query(filter))
            .await
    }

    /// One subscriber (admin).
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::NotFound`] for an unknown id.
    pub async fn get_subscriber(&self, id: &ResourceId) -> Result<EmailSubscriber, ClientError> {
        self.get_record(id).await
    }

    /// Subscribes to the newsletter.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Status`] with `409` for a known address.
    pub async fn subscribe(&self, draft: &SubscriberDraft) -> Result<EmailSubscriber, ClientError> {
        self.create_record::<EmailSubscriber>(draft).await
    }

    /// Updates a subscriber (admin).
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::NotFound`] for an unknown id.
    pub async fn update_subscriber(
        &self,
        id: &ResourceId,
        patch: &SubscriberPatch,
    ) -> Result<EmailSubscriber, ClientError> {
        self.update_record::<EmailSubscriber>(id, patch).await
    }

    /// Deletes a subscriber (admin).
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::NotFound`] for an unknown id.
    pub async fn delete_subscriber(&self, id: &ResourceId) -> Result<MessageResponse, ClientError> {
        self.delete_record::<EmailSubscriber>(id).await
    }

    /// Active subscriber addresses, one per line (admin).
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on any failed call.
    pub async fn export_subscribers(&self) -> Result<String, ClientError> {
        let response = self
            .request(Method::GET, "/subscribers/export")
            .send()
            .await?;
        let response = self.check_status(response).await?;
        Ok(response.text().await?)
    }

    // ── System ──────────────────────────────────────────────────────────

    /// Server health.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on any failed call.
    pub async fn health(&self) -> Result<HealthResponse, ClientError> {
        self.send(self.request(Method::GET, "/health")).await
    }

    // ── Plumbing ────────────────────────────────────────────────────────

    async fn list_records<R: Record>(&self) -> Result<Vec<R>, ClientError> {
        self.send(self.request(Method::GET, R::KIND.path())).await
    }

    async fn get_record<R: Record>(&self, id: &ResourceId) -> Result<R, ClientError> {
        self.send(self.request(Method::GET, &item_path::<R>(id))).await
    }

    async fn create_record<R: Record>(&self, draft: &R::Draft) -> Result<R, ClientError> {
        self.send(self.request(Method::POST, R::KIND.path()).json(draft))
            .await
    }

    async fn update_record<R: Record>(&self, id: &ResourceId, patch: &R::Patch) -> Result<R, ClientError> {
        self.send(self.request(Method::PUT, &item_path::<R>(id)).json(patch))
            .await
    }

    async fn delete_record<R: Record>(&self, id: &ResourceId) -> Result<MessageResponse, ClientError> {
        self.send(self.request(Method::DELETE, &item_path::<R>(id)))
            .await
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.http.request(method, format!("{}{path}", self.base_url));
        match self.tokens.get() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, ClientError> {
        let response = builder.send().await?;
        let response = self.check_status(response).await?;
        decode(response).await
    }

    /// Maps non-2xx responses to errors, handling `401` on the way.
    async fn check_status(&self, response: Response) -> Result<Response, ClientError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorResponse>(&body)
            .map(|e| e.message)
            .unwrap_or(body);

        if status == StatusCode::UNAUTHORIZED {
            self.tokens.clear();
            if let Some(hook) = &self.on_unauthorized {
                hook();
            }
            tracing::warn!(%message, "session rejected, token cleared");
            return Err(ClientError::Unauthorized(message));
        }
        if status == StatusCode::NOT_FOUND {
            return Err(ClientError::NotFound(message));
        }
        Err(ClientError::Status { status, message })
    }
}

/// Decodes a 2xx body, rejecting payloads that carry an `error` field.
async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let bytes = response.bytes().await?;
    let value: serde_json::Value =
        serde_json::from_slice(&bytes).map_err(|e| ClientError::Decode(e.to_string()))?;
    if let Some(error) = value.get("error") {
        let message = error
            .as_str()
            .map_or_else(|| error.to_string(), str::to_string);
        return Err(ClientError::ErrorPayload(message));
    }
    serde_json::from_value(value).map_err(|e| ClientError::Decode(e.to_string()))
}

fn item_path<R: Record>(id: &ResourceId) -> String {
    format!("{}/{id}", R::KIND.path())
}

/// Remote CRUD operations on one collection.
///
/// Implemented by [`RemoteResource`] and by the fallback decorator, so
/// callers can hold either behind the same interface.
#[async_trait]
pub trait ResourceApi<R: Record>: Send + Sync {
    /// Every record.
    async fn list(&self) -> Result<Vec<R>, ClientError>;

    /// One record.
    async fn get(&self, id: &ResourceId) -> Result<R, ClientError>;

    /// Creates a record from `draft`.
    async fn create(&self, draft: R::Draft) -> Result<R, ClientError>;

    /// Merges `patch` into the record.
    async fn update(&self, id: &ResourceId, patch: R::Patch) -> Result<R, ClientError>;

    /// Deletes the record.
    async fn delete(&self, id: &ResourceId) -> Result<(), ClientError>;
}

/// [`ResourceApi`] over HTTP, obtained from [`ApiClient::resource`].
#[derive(Debug)]
pub struct RemoteResource<R> {
    client: ApiClient,
    _record: PhantomData<fn() -> R>,
}

impl<R> Clone for RemoteResource<R> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            _record: PhantomData,
        }
    }
}

#[async_trait]
impl<R: Record> ResourceApi<R> for RemoteResource<R> {
    async fn list(&self) -> Result<Vec<R>, ClientError> {
        self.client.list_records().await
    }

    async fn get(&self, id: &ResourceId) -> Result<R, ClientError> {
        self.client.get_record(id).await
    }

    async fn create(&self, draft: R::Draft) -> Result<R, ClientError> {
        self.client.create_record::<R>(&draft).await
    }

    async fn update(&self, id: &ResourceId, patch: R::Patch) -> Result<R, ClientError> {
        self.client.update_record::<R>(id, &patch).await
    }

    async fn delete(&self, id: &ResourceId) -> Result<(), ClientError> {
        self.client.delete_record::<R>(id).await.map(|_| ())
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::client::local_store::MemoryLocalStore;

    fn client(base: &str) -> ApiClient {
        let Ok(client) = ApiClient::new(&ClientConfig::new(base), Arc::new(MemoryLocalStore::new()))
        else {
            panic!("client should build");
        };
        client
    }

    #[test]
    fn default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert!(config.base_url.ends_with("/api"));
    }

    #[test]
    fn trailing_slash_is_trimmed() {
        assert_eq!(client("http://localhost:1/api/").base_url(), "http://localhost:1/api");
    }

    #[test]
    fn item_paths_follow_collections() {
        let id = ResourceId::from("42");
        assert_eq!(item_path::<GalleryImage>(&id), "/gallery/42");
        assert_eq!(item_path::<EmailSubscriber>(&id), "/subscribers/42");
    }

    #[tokio::test]
    async fn unreachable_server_is_a_transport_error() {
        let api = client("http://127.0.0.1:9/api");
        let result = api.health().await;
        assert!(matches!(
            result,
            Err(ClientError::Transport(_) | ClientError::Timeout)
        ));
    }

    #[test]
    fn debug_does_not_leak_hook() {
        let api = client("http://localhost:1/api").with_unauthorized_hook(|| {});
        assert!(format!("{api:?}").contains("on_unauthorized: true"));
    }
}
