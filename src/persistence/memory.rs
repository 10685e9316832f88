//! Process-local repository backed by an ordered `Vec`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use super::Repository;
use crate::domain::{Record, ResourceId};
use crate::error::CmsError;

/// In-memory collection guarded by a [`tokio::sync::RwLock`].
///
/// # Concurrency
///
/// - Reads run concurrently.
/// - Writes are serialized; an update or removal holds the write lock for
///   the whole lookup-and-mutate step, so no interleaving can observe a
///   half-applied patch.
#[derive(Debug)]
pub struct MemoryRepository<R> {
    records: RwLock<Vec<R>>,
}

impl<R: Record> MemoryRepository<R> {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::with_records(Vec::new())
    }

    /// Creates a repository holding `records`, in the given order.
    #[must_use]
    pub fn with_records(records: Vec<R>) -> Self {
        Self {
            records: RwLock::new(records),
        }
    }

    /// Returns a clone of the current contents.
    pub async fn snapshot(&self) -> Vec<R> {
        self.records.read().await.clone()
    }

    /// Swaps the contents for `records`.
    pub async fn replace(&self, records: Vec<R>) {
        *self.records.write().await = records;
    }

    /// Consumes the repository, returning its contents.
    #[must_use]
    pub fn into_records(self) -> Vec<R> {
        self.records.into_inner()
    }
}

impl<R: Record> Default for MemoryRepository<R> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<R: Record> Repository<R> for MemoryRepository<R> {
    async fn list(&self) -> Result<Vec<R>, CmsError> {
        Ok(self.snapshot().await)
    }

    async fn get(&self, id: &ResourceId) -> Result<R, CmsError> {
        let records = self.records.read().await;
        records
            .iter()
            .find(|r| r.id() == id)
            .cloned()
            .ok_or_else(|| CmsError::not_found(R::KIND, id))
    }

    async fn insert(&self, record: R) -> Result<R, CmsError> {
        let mut records = self.records.write().await;
        if records.iter().any(|r| r.id() == record.id()) {
            return Err(CmsError::Conflict(format!(
                "{} {} already exists",
                R::KIND,
                record.id()
            )));
        }
        records.push(record.clone());
        Ok(record)
    }

    async fn update(
        &self,
        id: &ResourceId,
        patch: R::Patch,
        now: DateTime<Utc>,
    ) -> Result<R, CmsError> {
        let mut records = self.records.write().await;
        let record = records
            .iter_mut()
            .find(|r| r.id() == id)
            .ok_or_else(|| CmsError::not_found(R::KIND, id))?;
        record.apply_patch(patch, now);
        Ok(record.clone())
    }

    async fn remove(&self, id: &ResourceId) -> Result<R, CmsError> {
        let mut records = self.records.write().await;
        let index = records
            .iter()
            .position(|r| r.id() == id)
            .ok_or_else(|| CmsError::not_found(R::KIND, id))?;
        Ok(records.remove(index))
    }

    async fn len(&self) -> Result<usize, CmsError> {
        Ok(self.records.read().await.len())
    }
}
