//! Repository that snapshots its collection to a JSON file.
//!
//! Each mutation is applied to a staged copy of the collection, which is
//! written to a sibling temp file and renamed over the target. Only then
//! does the copy replace the in-memory state, so a failed write leaves
//! both memory and disk at the previous snapshot.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use super::{MemoryRepository, Repository};
use crate::domain::{Record, ResourceId};
use crate::error::CmsError;

/// File-backed repository. Reads are served from memory.
#[derive(Debug)]
pub struct JsonFileRepository<R> {
    path: PathBuf,
    inner: MemoryRepository<R>,
    /// Serializes stage-write-commit so snapshots land in mutation order.
    write_guard: Mutex<()>,
}

impl<R: Record> JsonFileRepository<R> {
    /// Opens the collection stored at `path`, creating parent directories.
    ///
    /// A missing file yields an empty collection.
    ///
    /// # Errors
    ///
    /// Returns [`CmsError::Persistence`] if the file exists but cannot be
    /// read or parsed.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, CmsError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await?;
        }

        let records = match tokio::fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice::<Vec<R>>(&bytes)?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(err) => return Err(err.into()),
        };

        tracing::debug!(path = %path.display(), count = records.len(), kind = %R::KIND, "collection loaded");
        Ok(Self {
            path,
            inner: MemoryRepository::with_records(records),
            write_guard: Mutex::new(()),
        })
    }

    /// Path of the snapshot file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Copy of the current collection to apply a mutation to.
    async fn stage(&self) -> MemoryRepository<R> {
        MemoryRepository::with_records(self.inner.snapshot().await)
    }

    /// Writes `staged` to disk, then makes it the live collection.
    async fn commit(&self, staged: MemoryRepository<R>) -> Result<(), CmsError> {
        let records = staged.into_records();
        let bytes = serde_json::to_vec_pretty(&records)?;
        let tmp = self.path.with_extension("json.tmp");
        if let Err(err) = write_then_rename(&tmp, &self.path, bytes).await {
            tracing::error!(path = %self.path.display(), error = %err, "snapshot write failed");
            return Err(err.into());
        }
        self.inner.replace(records).await;
        Ok(())
    }
}

async fn write_then_rename(tmp: &Path, target: &Path, bytes: Vec<u8>) -> std::io::Result<()> {
    tokio::fs::write(tmp, bytes).await?;
    tokio::fs::rename(tmp, target).await
}

#[async_trait]
impl<R: Record> Repository<R> for JsonFileRepository<R> {
    async fn list(&self) -> Result<Vec<R>, CmsError> {
        self.inner.list().await
    }

    async fn get(&self, id: &ResourceId) -> Result<R, CmsError> {
        self.inner.get(id).await
    }

    async fn insert(&self, record: R) -> Result<R, CmsError> {
        let _guard = self.write_guard.lock().await;
        let staged = self.stage().await;
        let stored = staged.insert(record).await?;
        self.commit(staged).await?;
        Ok(stored)
    }

    async fn update(
        &self,
        id: &ResourceId,
        patch: R::Patch,
        now: DateTime<Utc>,
    ) -> Result<R, CmsError> {
        let _guard = self.write_guard.lock().await;
        let staged = self.stage().await;
        let updated = staged.update(id, patch, now).await?;
        self.commit(staged).await?;
        Ok(updated)
    }

    async fn remove(&self, id: &ResourceId) -> Result<R, CmsError> {
        let _guard = self.write_guard.lock().await;
        let staged = self.stage().await;
        let removed = staged.remove(id).await?;
        self.commit(staged).await?;
        Ok(removed)
    }

    async fn len(&self) -> Result<usize, CmsError> {
        self.inner.len().await
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::{BlogDraft, BlogPatch, BlogPost};

    fn post(title: &str) -> BlogPost {
        BlogPost::from_draft(
            ResourceId::new(),
            BlogDraft {
                title: title.to_string(),
                content: "C".to_string(),
                image_name: None,
                image_file: None,
                published: false,
            },
            Utc::now(),
        )
    }

    #[tokio::test]
    async fn survives_reopen() {
        let Ok(dir) = tempfile::tempdir() else {
            panic!("tempdir");
        };
        let path = dir.path().join("blogs.json");

        let Ok(repo) = JsonFileRepository::<BlogPost>::open(&path).await else {
            panic!("open failed");
        };
        let first = post("first");
        let id = first.id.clone();
        let _ = repo.insert(first).await;
        let _ = repo.insert(post("second")).await;
        let patch = BlogPatch {
            published: Some(true),
            ..BlogPatch::default()
        };
        let _ = repo.update(&id, patch, Utc::now()).await;
        drop(repo);

        let Ok(reopened) = JsonFileRepository::<BlogPost>::open(&path).await else {
            panic!("reopen failed");
        };
        let Ok(list) = reopened.list().await else {
            panic!("list failed");
        };
        let titles: Vec<&str> = list.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["first", "second"]);
        assert!(list.first().is_some_and(|p| p.published));
    }

    #[tokio::test]
    async fn missing_file_is_empty() {
        let Ok(dir) = tempfile::tempdir() else {
            panic!("tempdir");
        };
        let path = dir.path().join("nested").join("gallery.json");
        let Ok(repo) = JsonFileRepository::<BlogPost>::open(&path).await else {
            panic!("open failed");
        };
        assert!(repo.is_empty().await.unwrap_or(false));
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn corrupt_file_is_an_error() {
        let Ok(dir) = tempfile::tempdir() else {
            panic!("tempdir");
        };
        let path = dir.path().join("blogs.json");
        let _ = std::fs::write(&path, b"not json");
        let result = JsonFileRepository::<BlogPost>::open(&path).await;
        assert!(matches!(result, Err(CmsError::Persistence(_))));
    }

    #[tokio::test]
    async fn failed_remove_leaves_file_alone() {
        let Ok(dir) = tempfile::tempdir() else {
            panic!("tempdir");
        };
        let path = dir.path().join("blogs.json");
        let Ok(repo) = JsonFileRepository::<BlogPost>::open(&path).await else {
            panic!("open failed");
        };
        let _ = repo.insert(post("kept")).await;
        let before = std::fs::read(&path).unwrap_or_default();

        let result = repo.remove(&ResourceId::from("ghost")).await;
        assert!(matches!(result, Err(CmsError::NotFound { .. })));
        assert_eq!(std::fs::read(&path).unwrap_or_default(), before);
    }

    #[tokio::test]
    async fn failed_snapshot_write_changes_nothing() {
        let Ok(dir) = tempfile::tempdir() else {
            panic!("tempdir");
        };
        let path = dir.path().join("blogs.json");
        let Ok(repo) = JsonFileRepository::<BlogPost>::open(&path).await else {
            panic!("open failed");
        };
        let kept = post("kept");
        let kept_id = kept.id.clone();
        let _ = repo.insert(kept).await;
        let before = std::fs::read(&path).unwrap_or_default();

        // A directory squatting on the temp path makes every write fail.
        let blocker = path.with_extension("json.tmp");
        let _ = std::fs::create_dir(&blocker);

        let result = repo.insert(post("lost")).await;
        assert!(matches!(result, Err(CmsError::Persistence(_))));
        let patch = BlogPatch {
            title: Some("renamed".to_string()),
            ..BlogPatch::default()
        };
        assert!(repo.update(&kept_id, patch, Utc::now()).await.is_err());
        assert!(repo.remove(&kept_id).await.is_err());

        let Ok(list) = repo.list().await else {
            panic!("list failed");
        };
        let titles: Vec<&str> = list.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["kept"]);
        assert_eq!(std::fs::read(&path).unwrap_or_default(), before);

        let _ = std::fs::remove_dir(&blocker);
        assert!(repo.insert(post("recovered")).await.is_ok());
        assert_eq!(repo.len().await.ok(), Some(2));
    }
}
