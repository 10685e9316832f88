//! Service layer: business logic orchestration.
//!
//! [`ResourceService`] validates and stamps records before handing them to
//! an injected repository. [`AuthService`] owns the admin credential pair
//! and the session table.

pub mod auth_service;
pub mod resource_service;

pub use auth_service::{AuthService, Session, TOKEN_PREFIX};
pub use resource_service::ResourceService;
