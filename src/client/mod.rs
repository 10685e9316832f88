//! Client library for the content API.
//!
//! - [`ApiClient`]: typed HTTP calls with bearer-token handling.
//! - [`FallbackResource`]: remote-first access that falls back to a
//!   [`LocalCache`] when the API is unreachable (used for the gallery).
//! - [`LocalStore`]: the synchronous, quota-bounded key/value storage the
//!   token and the cache live in.

pub mod api;
pub mod cache;
pub mod error;
pub mod fallback;
pub mod local_store;
pub mod storage_events;
pub mod token;

pub use api::{ApiClient, ClientConfig, RemoteResource, ResourceApi};
pub use cache::{LocalCache, SaveOutcome};
pub use error::{ClientError, StorageError};
pub use fallback::{FallbackResource, GALLERY_CACHE_KEY, WriteOutcome, gallery};
pub use local_store::{FileLocalStore, LocalStore, MemoryLocalStore};
pub use storage_events::{StorageChange, StorageChangeKind, StorageEvents};
pub use token::{AUTH_TOKEN_KEY, TokenStore};
