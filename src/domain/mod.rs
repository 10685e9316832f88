//! Domain layer: record types and the contract they share.
//!
//! Every collection the site manages (blog posts, gallery images, contact
//! submissions, newsletter subscribers) is a flat record implementing
//! [`Record`]. Seed content for a fresh server lives in [`seed`].

pub mod blog;
pub mod contact;
pub mod gallery;
pub mod record;
pub mod resource_id;
pub mod seed;
pub mod subscriber;

pub use blog::{BlogDraft, BlogPatch, BlogPost};
pub use contact::{ContactDraft, ContactFilter, ContactPatch, ContactStatus, ContactSubmission};
pub use gallery::{GalleryDraft, GalleryImage, GalleryPatch};
pub use record::{Record, ResourceKind};
pub use resource_id::ResourceId;
pub use subscriber::{EmailSubscriber, SubscriberDraft, SubscriberFilter, SubscriberPatch};
