//! The record contract shared by every CRUD-managed collection.
//!
//! Blog posts, gallery images, contact submissions and email subscribers
//! all implement [`Record`]. Repositories, services, HTTP handlers and the
//! client-side fallback cache are written once against this trait.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::ResourceId;
use crate::error::CmsError;

/// Discriminator for the resource collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    /// Blog posts.
    Blog,
    /// Gallery images.
    Gallery,
    /// Contact form submissions.
    Contact,
    /// Newsletter subscribers.
    Subscriber,
}

impl ResourceKind {
    /// Collection name used as storage discriminator and URL segment.
    #[must_use]
    pub const fn collection(self) -> &'static str {
        match self {
            Self::Blog => "blogs",
            Self::Gallery => "gallery",
            Self::Contact => "contacts",
            Self::Subscriber => "subscribers",
        }
    }

    /// API path of the collection relative to `/api`.
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::Blog => "/blogs",
            Self::Gallery => "/gallery",
            Self::Contact => "/contacts",
            Self::Subscriber => "/subscribers",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Blog => "blog post",
            Self::Gallery => "gallery image",
            Self::Contact => "contact submission",
            Self::Subscriber => "subscriber",
        };
        f.write_str(label)
    }
}

/// A flat, individually addressable entity stored in one collection.
///
/// `Draft` is the create payload; the store assigns the id and both
/// timestamps. `Patch` is the update payload; provided fields overwrite
/// the stored ones, `id` and `created_at` never change.
pub trait Record:
    Clone + fmt::Debug + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// Create payload.
    type Draft: Clone + fmt::Debug + Serialize + DeserializeOwned + Send + Sync + 'static;
    /// Update payload.
    type Patch: Clone + fmt::Debug + Serialize + DeserializeOwned + Send + Sync + 'static;

    /// Collection this record belongs to.
    const KIND: ResourceKind;

    /// Record identifier.
    fn id(&self) -> &ResourceId;

    /// Creation timestamp.
    fn created_at(&self) -> DateTime<Utc>;

    /// Last modification timestamp.
    fn updated_at(&self) -> DateTime<Utc>;

    /// Builds a stored record from a draft. Both timestamps are `now`.
    fn from_draft(id: ResourceId, draft: Self::Draft, now: DateTime<Utc>) -> Self;

    /// Merges `patch` over `self` and advances `updated_at`.
    fn apply_patch(&mut self, patch: Self::Patch, now: DateTime<Utc>);

    /// Checks a create payload.
    ///
    /// # Errors
    ///
    /// Returns [`CmsError::InvalidRequest`] describing the first invalid field.
    fn validate_draft(draft: &Self::Draft) -> Result<(), CmsError>;

    /// Checks an update payload.
    ///
    /// # Errors
    ///
    /// Returns [`CmsError::InvalidRequest`] describing the first invalid field.
    fn validate_patch(patch: &Self::Patch) -> Result<(), CmsError>;
}

/// Returns the new `updated_at` for a record touched at `now`.
///
/// Never moves backwards, even if the wall clock does.
#[must_use]
pub fn advance(created_at: DateTime<Utc>, updated_at: DateTime<Utc>, now: DateTime<Utc>) -> DateTime<Utc> {
    now.max(updated_at).max(created_at)
}

/// Fails when `value` is empty after trimming.
///
/// # Errors
///
/// Returns [`CmsError::InvalidRequest`] naming `field`.
pub fn require_text(field: &str, value: &str) -> Result<(), CmsError> {
    if value.trim().is_empty() {
        return Err(CmsError::InvalidRequest(format!("{field} must not be empty")));
    }
    Ok(())
}

/// Fails when `value` is longer than `max` characters.
///
/// # Errors
///
/// Returns [`CmsError::InvalidRequest`] naming `field`.
pub fn limit_len(field: &str, value: &str, max: usize) -> Result<(), CmsError> {
    if value.chars().count() > max {
        return Err(CmsError::InvalidRequest(format!(
            "{field} must be at most {max} characters"
        )));
    }
    Ok(())
}

/// Fails unless `value` has the shape `local@domain.tld`.
///
/// # Errors
///
/// Returns [`CmsError::InvalidRequest`] naming `field`.
pub fn require_email(field: &str, value: &str) -> Result<(), CmsError> {
    let value = value.trim();
    let valid = value.split_once('@').is_some_and(|(local, domain)| {
        !local.is_empty()
            && !domain.contains('@')
            && domain
                .split_once('.')
                .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
            && !value.contains(char::is_whitespace)
    });
    if !valid {
        return Err(CmsError::InvalidRequest(format!(
            "{field} is not a valid email address"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    #[test]
    fn advance_never_goes_backwards() {
        let created = Utc::now();
        let updated = created + Duration::seconds(10);
        let stale_clock = created - Duration::seconds(5);
        assert_eq!(advance(created, updated, stale_clock), updated);

        let later = updated + Duration::seconds(1);
        assert_eq!(advance(created, updated, later), later);
    }

    #[test]
    fn email_shape() {
        assert!(require_email("email", "john.doe@example.com").is_ok());
        assert!(require_email("email", " jane@example.co ").is_ok());
        assert!(require_email("email", "nobody").is_err());
        assert!(require_email("email", "@example.com").is_err());
        assert!(require_email("email", "a@b").is_err());
        assert!(require_email("email", "a b@example.com").is_err());
        assert!(require_email("email", "a@b@example.com").is_err());
    }

    #[test]
    fn text_limits() {
        assert!(require_text("title", "  ").is_err());
        assert!(require_text("title", "T").is_ok());
        assert!(limit_len("title", "abc", 3).is_ok());
        assert!(limit_len("title", "abcd", 3).is_err());
    }

    #[test]
    fn kind_paths() {
        assert_eq!(ResourceKind::Gallery.path(), "/gallery");
        assert_eq!(ResourceKind::Contact.collection(), "contacts");
        assert_eq!(ResourceKind::Blog.to_string(), "blog post");
    }
}
