//! # clickexpress-cms
//!
//! Content server and resilient API client for the Click Express
//! logistics website.
//!
//! The server exposes CRUD endpoints for blog posts, gallery images,
//! contact submissions and newsletter subscribers behind a single admin
//! sign-in. The client side wraps those endpoints in a typed HTTP client
//! and keeps the gallery usable offline through a local-storage fallback.
//!
//! ## Architecture
//!
//! ```text
//! Browser / ApiClient
//!     │
//!     ├── REST Handlers + AdminSession guard (api/)
//!     │
//!     ├── ResourceService<R>, AuthService (service/)
//!     │
//!     ├── Repository<R> (persistence/)
//!     │     ├── MemoryRepository
//!     │     ├── JsonFileRepository
//!     │     └── PostgresRepository
//!     │
//!     └── Record types (domain/)
//!
//! client/
//!     ApiClient ── RemoteResource<R> ──┐
//!                                      ├── FallbackResource<R>
//!     LocalStore ── LocalCache<R> ─────┘        │
//!                        └── StorageEvents ◀────┘
//! ```

pub mod api;
pub mod app_state;
pub mod client;
pub mod config;
pub mod domain;
pub mod error;
pub mod persistence;
pub mod service;
