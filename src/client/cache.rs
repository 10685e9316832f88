//! Local-storage cache backing the offline fallback.
//!
//! A [`LocalCache`] owns one storage key holding a JSON array of records
//! plus a fixed list of defaults shown ahead of them. Writes follow the
//! quota policy:
//!
//! 1. write the full list;
//! 2. on failure keep only the most recent [`RETAINED_ON_QUOTA`] entries
//!    and retry once;
//! 3. if that fails too, remove the key. The cached entries are lost.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use chrono::Utc;

use super::error::{ClientError, StorageError};
use super::local_store::LocalStore;
use super::storage_events::{StorageChangeKind, StorageEvents};
use crate::domain::{Record, ResourceId};

/// Entries kept when a full write does not fit.
pub const RETAINED_ON_QUOTA: usize = 10;

/// How a cache write ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Every entry was written.
    Saved,
    /// Only the most recent `kept` entries fit.
    Truncated {
        /// Entries that survived.
        kept: usize,
    },
    /// Nothing fit; the key was removed.
    Cleared,
}

/// Cached list of `R` under one storage key.
pub struct LocalCache<R> {
    key: String,
    defaults: Vec<R>,
    store: Arc<dyn LocalStore>,
    events: StorageEvents,
    /// Serializes read-modify-write cycles within this process.
    write_lock: Mutex<()>,
}

impl<R: fmt::Debug> fmt::Debug for LocalCache<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalCache")
            .field("key", &self.key)
            .field("defaults", &self.defaults.len())
            .field("store", &self.store)
            .finish_non_exhaustive()
    }
}

impl<R: Record> LocalCache<R> {
    /// Creates a cache over `key` with no defaults.
    #[must_use]
    pub fn new(key: impl Into<String>, store: Arc<dyn LocalStore>, events: StorageEvents) -> Self {
        Self {
            key: key.into(),
            defaults: Vec::new(),
            store,
            events,
            write_lock: Mutex::new(()),
        }
    }

    /// Sets the records shown ahead of the cached ones.
    #[must_use]
    pub fn with_defaults(mut self, defaults: Vec<R>) -> Self {
        self.defaults = defaults;
        self
    }

    /// Storage key.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Fixed defaults.
    #[must_use]
    pub fn defaults(&self) -> &[R] {
        &self.defaults
    }

    /// Bus notified on every successful write.
    #[must_use]
    pub fn events(&self) -> &StorageEvents {
        &self.events
    }

    /// Cached entries, oldest first. Missing, unreadable or corrupt
    /// storage reads as empty.
    #[must_use]
    pub fn entries(&self) -> Vec<R> {
        let raw = match self.store.get_item(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(err) => {
                tracing::warn!(key = %self.key, error = %err, "local cache unreadable");
                return Vec::new();
            }
        };
        serde_json::from_str(&raw).unwrap_or_else(|err| {
            tracing::warn!(key = %self.key, error = %err, "local cache corrupt, ignoring");
            Vec::new()
        })
    }

    /// Defaults followed by cached entries.
    #[must_use]
    pub fn combined(&self) -> Vec<R> {
        let mut all = self.defaults.clone();
        all.extend(self.entries());
        all
    }

    /// Writes `entries` under the quota policy.
    pub fn save(&self, entries: &[R]) -> SaveOutcome {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.save_locked(entries)
    }

    /// Id for a record created offline: the current time in milliseconds,
    /// bumped past every numeric id already present.
    #[must_use]
    pub fn next_local_id(&self, existing: &[R]) -> ResourceId {
        let now = u64::try_from(Utc::now().timestamp_millis()).unwrap_or(1).max(1);
        let highest = self
            .defaults
            .iter()
            .chain(existing)
            .filter_map(|r| r.id().as_millis())
            .max()
            .unwrap_or(0);
        ResourceId::from_millis(now.max(highest.saturating_add(1)))
    }

    /// Creates a record from `draft` in the cache.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Invalid`] if the draft fails validation;
    /// nothing is written.
    pub fn insert_local(&self, draft: R::Draft) -> Result<(R, SaveOutcome), ClientError> {
        R::validate_draft(&draft).map_err(|e| ClientError::Invalid(e.to_string()))?;
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut entries = self.entries();
        let record = R::from_draft(self.next_local_id(&entries), draft, Utc::now());
        entries.push(record.clone());
        let outcome = self.save_locked(&entries);
        Ok((record, outcome))
    }

    /// Merges `patch` into a cached record.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Invalid`] if the patch fails validation or
    /// [`ClientError::NotFound`] if the id is not cached.
    pub fn update_local(&self, id: &ResourceId, patch: R::Patch) -> Result<(R, SaveOutcome), ClientError> {
        R::validate_patch(&patch).map_err(|e| ClientError::Invalid(e.to_string()))?;
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut entries = self.entries();
        let record = entries
            .iter_mut()
            .find(|r| r.id() == id)
            .ok_or_else(|| ClientError::NotFound(format!("{} {id} is not cached locally", R::KIND)))?;
        record.apply_patch(patch, Utc::now());
        let updated = record.clone();
        let outcome = self.save_locked(&entries);
        Ok((updated, outcome))
    }

    /// Drops a cached record. Returns `None` when the id was not cached,
    /// in which case nothing is written.
    pub fn remove_local(&self, id: &ResourceId) -> Option<SaveOutcome> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut entries = self.entries();
        let before = entries.len();
        entries.retain(|r| r.id() != id);
        (entries.len() != before).then(|| self.save_locked(&entries))
    }

    fn save_locked(&self, entries: &[R]) -> SaveOutcome {
        let first = match self.write(entries) {
            Ok(()) => return SaveOutcome::Saved,
            Err(err) => err,
        };

        let recent = entries
            .get(entries.len().saturating_sub(RETAINED_ON_QUOTA)..)
            .unwrap_or(entries);
        tracing::warn!(
            key = %self.key,
            error = %first,
            total = entries.len(),
            kept = recent.len(),
            "local cache write failed, retrying with most recent entries"
        );
        match self.write(recent) {
            Ok(()) => SaveOutcome::Truncated { kept: recent.len() },
            Err(err) => {
                tracing::warn!(key = %self.key, error = %err, "local cache cleared, entries lost");
                if let Err(err) = self.store.remove_item(&self.key) {
                    tracing::warn!(key = %self.key, error = %err, "could not remove local cache");
                }
                self.events.publish(&self.key, StorageChangeKind::Removed);
                SaveOutcome::Cleared
            }
        }
    }

    fn write(&self, entries: &[R]) -> Result<(), StorageError> {
        let raw = serde_json::to_string(entries)?;
        self.store.set_item(&self.key, &raw)?;
        self.events.publish(&self.key, StorageChangeKind::Set);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::client::local_store::MemoryLocalStore;
    use crate::domain::{GalleryDraft, GalleryImage, GalleryPatch};

    const KEY: &str = "galleryImages";

    fn draft(name: &str) -> GalleryDraft {
        GalleryDraft {
            image_name: name.to_string(),
            image_file: format!("data:image/png;base64,{}", "A".repeat(1000)),
        }
    }

    fn insert(cache: &LocalCache<GalleryImage>, draft: GalleryDraft) -> (GalleryImage, SaveOutcome) {
        let Ok(created) = cache.insert_local(draft) else {
            panic!("draft should be valid");
        };
        created
    }

    fn cache(store: Arc<dyn LocalStore>) -> LocalCache<GalleryImage> {
        LocalCache::new(KEY, store, StorageEvents::default())
            .with_defaults(GalleryImage::fallback_defaults())
    }

    /// Approximate stored size of `n` entries built from [`draft`].
    fn size_of(n: usize) -> usize {
        let entries: Vec<GalleryImage> = (0..n)
            .map(|i| {
                GalleryImage::from_draft(
                    ResourceId::from_millis(1_700_000_000_000 + i as u64),
                    draft(&format!("img{i:02}")),
                    Utc::now(),
                )
            })
            .collect();
        serde_json::to_string(&entries).map_or(0, |s| s.len()) + KEY.len()
    }

    #[test]
    fn combined_is_defaults_then_entries() {
        let store: Arc<dyn LocalStore> = Arc::new(MemoryLocalStore::new());
        let cache = cache(store);
        let (created, outcome) = insert(&cache, draft("dock"));
        assert_eq!(outcome, SaveOutcome::Saved);

        let combined = cache.combined();
        assert_eq!(combined.len(), 4);
        let ids: Vec<&str> = combined.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids.get(..3), Some(&["1", "2", "3"][..]));
        assert_eq!(combined.last().map(|r| &r.id), Some(&created.id));
    }

    #[test]
    fn local_ids_are_positive_and_unique() {
        let store: Arc<dyn LocalStore> = Arc::new(MemoryLocalStore::new());
        let cache = cache(store);
        let mut seen = std::collections::HashSet::new();
        for i in 0..25 {
            let (record, _) = insert(&cache, draft(&format!("img{i}")));
            assert!(record.id.as_millis().is_some_and(|n| n > 0));
            assert!(seen.insert(record.id));
        }
    }

    #[test]
    fn corrupt_storage_reads_as_empty() {
        let backing = Arc::new(MemoryLocalStore::new());
        let _ = backing.set_item(KEY, "{not json");
        let cache = cache(backing);
        assert!(cache.entries().is_empty());
        assert_eq!(cache.combined().len(), 3);
    }

    #[test]
    fn quota_truncates_to_most_recent_ten() {
        // Room for 11 entries but not 12.
        let quota = (size_of(11) + size_of(12)) / 2;
        let backing = Arc::new(MemoryLocalStore::with_quota(quota));
        let cache = cache(Arc::clone(&backing) as Arc<dyn LocalStore>);
        for i in 0..11 {
            let (_, outcome) = insert(&cache, draft(&format!("img{i:02}")));
            assert_eq!(outcome, SaveOutcome::Saved);
        }

        let (newest, outcome) = insert(&cache, draft("img11"));
        assert_eq!(outcome, SaveOutcome::Truncated { kept: RETAINED_ON_QUOTA });

        let entries = cache.entries();
        assert_eq!(entries.len(), RETAINED_ON_QUOTA);
        assert_eq!(entries.first().map(|r| r.image_name.as_str()), Some("img02"));
        assert_eq!(entries.last().map(|r| &r.id), Some(&newest.id));
    }

    #[test]
    fn quota_clears_when_even_ten_do_not_fit() {
        let quota = (size_of(3) + size_of(4)) / 2;
        let backing = Arc::new(MemoryLocalStore::with_quota(quota));
        let cache = cache(Arc::clone(&backing) as Arc<dyn LocalStore>);
        let mut rx = cache.events().subscribe();
        for i in 0..3 {
            let _ = insert(&cache, draft(&format!("img{i:02}")));
        }
        assert_eq!(cache.entries().len(), 3);

        let before = backing.get_item(KEY);
        assert!(matches!(before, Ok(Some(_))));

        let oversized = GalleryDraft {
            image_name: "huge".to_string(),
            image_file: "B".repeat(quota),
        };
        let (_, outcome) = insert(&cache, oversized);
        assert_eq!(outcome, SaveOutcome::Cleared);
        assert_eq!(backing.get_item(KEY), Ok(None));
        assert_eq!(cache.combined().len(), 3);

        let mut last = None;
        while let Ok(change) = rx.try_recv() {
            last = Some(change.kind);
        }
        assert_eq!(last, Some(StorageChangeKind::Removed));
    }

    #[test]
    fn update_and_remove_local() {
        let store: Arc<dyn LocalStore> = Arc::new(MemoryLocalStore::new());
        let cache = cache(store);
        let (record, _) = insert(&cache, draft("dock"));

        let patch = GalleryPatch {
            image_name: Some("harbour".to_string()),
            image_file: None,
        };
        let Ok((updated, _)) = cache.update_local(&record.id, patch) else {
            panic!("update should succeed");
        };
        assert_eq!(updated.image_name, "harbour");
        assert_eq!(updated.created_at, record.created_at);

        assert!(matches!(
            cache.update_local(&ResourceId::from("1"), GalleryPatch::default()),
            Err(ClientError::NotFound(_))
        ));

        assert_eq!(cache.remove_local(&record.id), Some(SaveOutcome::Saved));
        assert_eq!(cache.remove_local(&record.id), None);
        assert!(cache.entries().is_empty());
    }

    #[test]
    fn invalid_local_writes_are_refused() {
        let store: Arc<dyn LocalStore> = Arc::new(MemoryLocalStore::new());
        let cache = cache(store);
        let blank = GalleryDraft {
            image_name: "  ".to_string(),
            image_file: String::new(),
        };
        assert!(matches!(cache.insert_local(blank), Err(ClientError::Invalid(_))));
        assert!(cache.entries().is_empty());

        let (record, _) = insert(&cache, draft("dock"));
        let patch = GalleryPatch {
            image_name: Some(String::new()),
            image_file: None,
        };
        assert!(matches!(
            cache.update_local(&record.id, patch),
            Err(ClientError::Invalid(_))
        ));
        assert_eq!(
            cache.entries().first().map(|r| r.image_name.as_str()),
            Some("dock")
        );
    }

    #[test]
    fn successful_write_is_broadcast() {
        let store: Arc<dyn LocalStore> = Arc::new(MemoryLocalStore::new());
        let cache = cache(store);
        let mut rx = cache.events().subscribe();
        let _ = insert(&cache, draft("dock"));
        let Ok(change) = rx.try_recv() else {
            panic!("expected a storage change");
        };
        assert_eq!(change.key, KEY);
        assert_eq!(change.kind, StorageChangeKind::Set);
    }
}
