//! Gallery images shown in the home page slider.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::record::{Record, ResourceKind, advance, require_text};
use super::ResourceId;
use crate::error::CmsError;

/// A stored gallery image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct GalleryImage {
    /// Image identifier.
    pub id: ResourceId,
    /// Caption, also used as alt text.
    pub image_name: String,
    /// Image source (URL or data URI).
    pub image_file: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl GalleryImage {
    /// The three images shown when neither the API nor the local cache
    /// can provide anything.
    #[must_use]
    pub fn fallback_defaults() -> Vec<Self> {
        let epoch = DateTime::<Utc>::default();
        [
            ("1", "Truck fleet", "/assets/gallery 1.jpg"),
            ("2", "Container yard", "/assets/gallery2.png"),
            ("3", "Port operations", "/assets/gallery3.jpg"),
        ]
        .into_iter()
        .map(|(id, name, file)| Self {
            id: ResourceId::from(id),
            image_name: name.to_string(),
            image_file: file.to_string(),
            created_at: epoch,
            updated_at: epoch,
        })
        .collect()
    }
}

/// Request body for `POST /api/gallery`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct GalleryDraft {
    /// Caption.
    pub image_name: String,
    /// Image source (URL or data URI).
    pub image_file: String,
}

/// Request body for `PUT /api/gallery/{id}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct GalleryPatch {
    /// New caption.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_name: Option<String>,
    /// New image source.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_file: Option<String>,
}

impl Record for GalleryImage {
    type Draft = GalleryDraft;
    type Patch = GalleryPatch;

    const KIND: ResourceKind = ResourceKind::Gallery;

    fn id(&self) -> &ResourceId {
        &self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    fn from_draft(id: ResourceId, draft: GalleryDraft, now: DateTime<Utc>) -> Self {
        Self {
            id,
            image_name: draft.image_name.trim().to_string(),
            image_file: draft.image_file.trim().to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    fn apply_patch(&mut self, patch: GalleryPatch, now: DateTime<Utc>) {
        if let Some(name) = patch.image_name {
            self.image_name = name.trim().to_string();
        }
        if let Some(file) = patch.image_file {
            self.image_file = file.trim().to_string();
        }
        self.updated_at = advance(self.created_at, self.updated_at, now);
    }

    fn validate_draft(draft: &GalleryDraft) -> Result<(), CmsError> {
        require_text("image_name", &draft.image_name)?;
        require_text("image_file", &draft.image_file)
    }

    fn validate_patch(patch: &GalleryPatch) -> Result<(), CmsError> {
        if let Some(name) = &patch.image_name {
            require_text("image_name", name)?;
        }
        if let Some(file) = &patch.image_file {
            require_text("image_file", file)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn three_fallback_defaults_in_order() {
        let defaults = GalleryImage::fallback_defaults();
        let names: Vec<&str> = defaults.iter().map(|i| i.image_name.as_str()).collect();
        assert_eq!(names, vec!["Truck fleet", "Container yard", "Port operations"]);
        let ids: Vec<&str> = defaults.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "3"]);
    }

    #[test]
    fn requires_name_and_source() {
        let missing_src = GalleryDraft {
            image_name: "Dock".to_string(),
            image_file: String::new(),
        };
        assert!(GalleryImage::validate_draft(&missing_src).is_err());

        let ok = GalleryDraft {
            image_name: "Dock".to_string(),
            image_file: "https://cdn.example.com/dock.jpg".to_string(),
        };
        assert!(GalleryImage::validate_draft(&ok).is_ok());
    }

    #[test]
    fn patch_keeps_created_at() {
        let now = Utc::now();
        let mut image = GalleryImage::from_draft(
            ResourceId::new(),
            GalleryDraft {
                image_name: "Dock".to_string(),
                image_file: "/a.jpg".to_string(),
            },
            now,
        );
        image.apply_patch(
            GalleryPatch {
                image_name: Some("Harbour".to_string()),
                image_file: None,
            },
            now,
        );
        assert_eq!(image.image_name, "Harbour");
        assert_eq!(image.image_file, "/a.jpg");
        assert_eq!(image.created_at, now);
        assert!(image.updated_at >= image.created_at);
    }
}
