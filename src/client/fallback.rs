//! Remote-first resource access with a local-storage fallback.
//!
//! [`FallbackResource`] decorates any [`ResourceApi`]. Each call goes to
//! the remote first. A failed read is answered from a [`LocalCache`]
//! unless the session was rejected. A failed write is applied locally only
//! when the server was never reached (see
//! [`ClientError::allows_write_fallback`]); a 4xx verdict is returned as is.
//!
//! ```text
//! Attempting Remote ─┬─ ok ──────────────────────────────▶ Remote
//!                    └─ err ─▶ Attempting Local ─┬─ ok ──▶ Local
//!                                                └─ err ─▶ Cleared
//! ```
//!
//! There is no retry of the remote call and no reconciliation once the
//! remote is back: local and server state may diverge.

use std::sync::Arc;

use async_trait::async_trait;

use super::api::{ApiClient, RemoteResource, ResourceApi};
use super::cache::{LocalCache, SaveOutcome};
use super::error::ClientError;
use super::local_store::LocalStore;
use super::storage_events::StorageEvents;
use crate::domain::{GalleryImage, Record, ResourceId};

/// Storage key of the gallery fallback list.
pub const GALLERY_CACHE_KEY: &str = "galleryImages";

/// Terminal state of one write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The remote accepted the write.
    Remote,
    /// The remote failed; the write landed in local storage.
    Local,
    /// The remote failed and local storage could not hold the result; the
    /// cached entries were dropped.
    Cleared,
}

impl From<SaveOutcome> for WriteOutcome {
    fn from(outcome: SaveOutcome) -> Self {
        match outcome {
            SaveOutcome::Saved | SaveOutcome::Truncated { .. } => Self::Local,
            SaveOutcome::Cleared => Self::Cleared,
        }
    }
}

/// [`ResourceApi`] decorator adding the local fallback.
#[derive(Debug)]
pub struct FallbackResource<R, A = RemoteResource<R>> {
    remote: A,
    cache: LocalCache<R>,
}

/// Gallery access as the public site uses it: the live API, falling back
/// to the three default images plus whatever was cached under
/// [`GALLERY_CACHE_KEY`].
#[must_use]
pub fn gallery(
    client: &ApiClient,
    store: Arc<dyn LocalStore>,
    events: StorageEvents,
) -> FallbackResource<GalleryImage> {
    let cache = LocalCache::new(GALLERY_CACHE_KEY, store, events)
        .with_defaults(GalleryImage::fallback_defaults());
    FallbackResource::new(client.resource(), cache)
}

impl<R: Record, A: ResourceApi<R>> FallbackResource<R, A> {
    /// Wraps `remote` with `cache` as the fallback.
    #[must_use]
    pub fn new(remote: A, cache: LocalCache<R>) -> Self {
        Self { remote, cache }
    }

    /// The fallback cache.
    #[must_use]
    pub fn cache(&self) -> &LocalCache<R> {
        &self.cache
    }

    /// Creates a record and reports where it landed.
    ///
    /// # Errors
    ///
    /// Returns the remote error unchanged when the server handled and
    /// refused the write, or [`ClientError::Invalid`] if the draft cannot
    /// be stored locally.
    pub async fn create_with_outcome(&self, draft: R::Draft) -> Result<(R, WriteOutcome), ClientError> {
        match self.remote.create(draft.clone()).await {
            Ok(record) => Ok((record, WriteOutcome::Remote)),
            Err(err) if err.allows_write_fallback() => {
                self.log_fallback("create", &err);
                let (record, saved) = self.cache.insert_local(draft)?;
                let outcome = WriteOutcome::from(saved);
                tracing::info!(kind = %R::KIND, id = %record.id(), ?outcome, "created locally");
                Ok((record, outcome))
            }
            Err(err) => Err(err),
        }
    }

    /// Updates a record and reports where the change landed.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::NotFound`] if the server was unreachable and
    /// the id is not cached locally, or the remote error when the server
    /// refused the write.
    pub async fn update_with_outcome(
        &self,
        id: &ResourceId,
        patch: R::Patch,
    ) -> Result<(R, WriteOutcome), ClientError> {
        match self.remote.update(id, patch.clone()).await {
            Ok(record) => Ok((record, WriteOutcome::Remote)),
            Err(err) if err.allows_write_fallback() => {
                self.log_fallback("update", &err);
                let (record, saved) = self.cache.update_local(id, patch)?;
                Ok((record, WriteOutcome::from(saved)))
            }
            Err(err) => Err(err),
        }
    }

    /// Deletes a record and reports where the change landed. Deleting an
    /// id that is not cached locally still succeeds.
    ///
    /// # Errors
    ///
    /// Returns the remote error when the server refused the delete.
    pub async fn delete_with_outcome(&self, id: &ResourceId) -> Result<WriteOutcome, ClientError> {
        match self.remote.delete(id).await {
            Ok(()) => Ok(WriteOutcome::Remote),
            Err(err) if err.allows_write_fallback() => {
                self.log_fallback("delete", &err);
                Ok(self
                    .cache
                    .remove_local(id)
                    .map_or(WriteOutcome::Local, WriteOutcome::from))
            }
            Err(err) => Err(err),
        }
    }

    fn log_fallback(&self, operation: &str, err: &ClientError) {
        tracing::warn!(
            kind = %R::KIND,
            key = self.cache.key(),
            operation,
            error = %err,
            "remote call failed, using local storage"
        );
    }
}

#[async_trait]
impl<R: Record, A: ResourceApi<R>> ResourceApi<R> for FallbackResource<R, A> {
    async fn list(&self) -> Result<Vec<R>, ClientError> {
        match self.remote.list().await {
            Ok(records) => Ok(records),
            Err(err) if err.allows_fallback() => {
                self.log_fallback("list", &err);
                Ok(self.cache.combined())
            }
            Err(err) => Err(err),
        }
    }

    async fn get(&self, id: &ResourceId) -> Result<R, ClientError> {
        match self.remote.get(id).await {
            Ok(record) => Ok(record),
            Err(err) if err.allows_fallback() => {
                self.log_fallback("get", &err);
                self.cache
                    .combined()
                    .into_iter()
                    .find(|r| r.id() == id)
                    .ok_or_else(|| ClientError::NotFound(format!("{} {id}", R::KIND)))
            }
            Err(err) => Err(err),
        }
    }

    async fn create(&self, draft: R::Draft) -> Result<R, ClientError> {
        self.create_with_outcome(draft).await.map(|(record, _)| record)
    }

    async fn update(&self, id: &ResourceId, patch: R::Patch) -> Result<R, ClientError> {
        self.update_with_outcome(id, patch)
            .await
            .map(|(record, _)| record)
    }

    async fn delete(&self, id: &ResourceId) -> Result<(), ClientError> {
        self.delete_with_outcome(id).await.map(|_| ())
    }
}
