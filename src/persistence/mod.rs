//! Persistence layer: the [`Repository`] abstraction and its backends.
//!
//! Handlers and services only ever see `Arc<dyn Repository<R>>`, so the
//! backing store can be swapped without touching them:
//!
//! - [`MemoryRepository`]: process-local, lost on restart (default).
//! - [`JsonFileRepository`]: one JSON snapshot file per collection.
//! - [`PostgresRepository`]: one JSONB row per record via `sqlx::PgPool`.

pub mod json_file;
pub mod memory;
pub mod postgres;

use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

pub use json_file::JsonFileRepository;
pub use memory::MemoryRepository;
pub use postgres::PostgresRepository;

use crate::domain::{Record, ResourceId};
use crate::error::CmsError;

/// Storage for one collection of records.
///
/// All implementations keep insertion order for [`Repository::list`] and
/// leave the collection untouched when an operation fails.
#[async_trait]
pub trait Repository<R: Record>: fmt::Debug + Send + Sync {
    /// Returns every record in insertion order.
    ///
    /// # Errors
    ///
    /// Returns [`CmsError::Persistence`] on backend failure.
    async fn list(&self) -> Result<Vec<R>, CmsError>;

    /// Returns the record with the given id.
    ///
    /// # Errors
    ///
    /// Returns [`CmsError::NotFound`] if no record matches.
    async fn get(&self, id: &ResourceId) -> Result<R, CmsError>;

    /// Appends a record.
    ///
    /// # Errors
    ///
    /// Returns [`CmsError::Conflict`] if the id is already taken.
    async fn insert(&self, record: R) -> Result<R, CmsError>;

    /// Merges `patch` into the stored record and returns the result.
    ///
    /// # Errors
    ///
    /// Returns [`CmsError::NotFound`] if no record matches.
    async fn update(&self, id: &ResourceId, patch: R::Patch, now: DateTime<Utc>)
    -> Result<R, CmsError>;

    /// Removes a record and returns it.
    ///
    /// # Errors
    ///
    /// Returns [`CmsError::NotFound`] if no record matches.
    async fn remove(&self, id: &ResourceId) -> Result<R, CmsError>;

    /// Returns the number of stored records.
    ///
    /// # Errors
    ///
    /// Returns [`CmsError::Persistence`] on backend failure.
    async fn len(&self) -> Result<usize, CmsError>;

    /// Returns `true` if the collection is empty.
    ///
    /// # Errors
    ///
    /// Returns [`CmsError::Persistence`] on backend failure.
    async fn is_empty(&self) -> Result<bool, CmsError> {
        Ok(self.len().await? == 0)
    }
}
