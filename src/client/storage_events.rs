//! Broadcast channel for local-storage changes.
//!
//! [`StorageEvents`] wraps a [`tokio::sync::broadcast`] channel. Every
//! successful write through a [`super::LocalCache`] publishes a
//! [`StorageChange`], so other views over the same key can refresh
//! without a network round-trip.

use chrono::{DateTime, Utc};
use tokio::sync::broadcast;

/// Default channel capacity.
pub const DEFAULT_CAPACITY: usize = 64;

/// What happened to the key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageChangeKind {
    /// The key now holds a new value.
    Set,
    /// The key was removed.
    Removed,
}

/// One change to a storage key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageChange {
    /// Key that changed.
    pub key: String,
    /// Kind of change.
    pub kind: StorageChangeKind,
    /// When the change was written.
    pub timestamp: DateTime<Utc>,
}

/// Broadcast bus for [`StorageChange`]s.
///
/// When the ring buffer is full, the oldest changes are dropped for
/// lagging receivers.
#[derive(Debug, Clone)]
pub struct StorageEvents {
    sender: broadcast::Sender<StorageChange>,
}

impl StorageEvents {
    /// Creates a bus with the given channel capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Publishes a change to all subscribers.
    ///
    /// Returns the number of receivers that got it; with no receivers the
    /// change is dropped.
    pub fn publish(&self, key: &str, kind: StorageChangeKind) -> usize {
        let change = StorageChange {
            key: key.to_string(),
            kind,
            timestamp: Utc::now(),
        };
        self.sender.send(change).unwrap_or(0)
    }

    /// Creates a receiver for all future changes.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<StorageChange> {
        self.sender.subscribe()
    }

    /// Returns the current number of active receivers.
    #[must_use]
    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for StorageEvents {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
