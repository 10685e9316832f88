//! Data Transfer Objects for REST request/response serialization.
//!
//! Resource bodies are the domain records themselves; this module only
//! holds the envelopes that have no domain counterpart.

pub mod auth_dto;
pub mod common_dto;

pub use auth_dto::*;
pub use common_dto::*;
