//! Blog posts shown on the public blog page and managed from the console.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::record::{Record, ResourceKind, advance, limit_len, require_text};
use super::ResourceId;
use crate::error::CmsError;

/// Maximum title length in characters.
pub const MAX_TITLE_LEN: usize = 200;

/// A stored blog post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct BlogPost {
    /// Post identifier.
    pub id: ResourceId,
    /// Headline.
    pub title: String,
    /// Body text. Paragraphs are separated by blank lines.
    pub content: String,
    /// Display name of the attached image, if any.
    #[serde(default)]
    pub image_name: Option<String>,
    /// Attached image (URL or data URI), if any.
    #[serde(default)]
    pub image_file: Option<String>,
    /// Whether the post is visible on the public site.
    #[serde(default)]
    pub published: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl BlogPost {
    /// Splits the body into non-empty paragraphs.
    pub fn paragraphs(&self) -> impl Iterator<Item = &str> {
        self.content
            .split("\n\n")
            .map(str::trim)
            .filter(|p| !p.is_empty())
    }
}

/// Request body for `POST /api/blogs`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BlogDraft {
    /// Headline.
    pub title: String,
    /// Body text.
    pub content: String,
    /// Display name of the attached image.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_name: Option<String>,
    /// Attached image (URL or data URI).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_file: Option<String>,
    /// Visibility on the public site. Defaults to `false`.
    #[serde(default)]
    pub published: bool,
}

/// Request body for `PUT /api/blogs/{id}`. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct BlogPatch {
    /// New headline.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// New body text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// New image display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_name: Option<String>,
    /// New image reference.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_file: Option<String>,
    /// New visibility.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published: Option<bool>,
}

impl Record for BlogPost {
    type Draft = BlogDraft;
    type Patch = BlogPatch;

    const KIND: ResourceKind = ResourceKind::Blog;

    fn id(&self) -> &ResourceId {
        &self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    fn from_draft(id: ResourceId, draft: BlogDraft, now: DateTime<Utc>) -> Self {
        Self {
            id,
            title: draft.title.trim().to_string(),
            content: draft.content,
            image_name: draft.image_name,
            image_file: draft.image_file,
            published: draft.published,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply_patch(&mut self, patch: BlogPatch, now: DateTime<Utc>) {
        if let Some(title) = patch.title {
            self.title = title.trim().to_string();
        }
        if let Some(content) = patch.content {
            self.content = content;
        }
        if patch.image_name.is_some() {
            self.image_name = patch.image_name;
        }
        if patch.image_file.is_some() {
            self.image_file = patch.image_file;
        }
        if let Some(published) = patch.published {
            self.published = published;
        }
        self.updated_at = advance(self.created_at, self.updated_at, now);
    }

    fn validate_draft(draft: &BlogDraft) -> Result<(), CmsError> {
        require_text("title", &draft.title)?;
        limit_len("title", draft.title.trim(), MAX_TITLE_LEN)?;
        require_text("content", &draft.content)
    }

    fn validate_patch(patch: &BlogPatch) -> Result<(), CmsError> {
        if let Some(title) = &patch.title {
            require_text("title", title)?;
            limit_len("title", title.trim(), MAX_TITLE_LEN)?;
        }
        if let Some(content) = &patch.content {
            require_text("content", content)?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn draft(title: &str, content: &str) -> BlogDraft {
        BlogDraft {
            title: title.to_string(),
            content: content.to_string(),
            image_name: None,
            image_file: None,
            published: false,
        }
    }

    #[test]
    fn from_draft_sets_equal_timestamps() {
        let now = Utc::now();
        let post = BlogPost::from_draft(ResourceId::new(), draft(" T ", "C"), now);
        assert_eq!(post.title, "T");
        assert_eq!(post.created_at, post.updated_at);
        assert!(!post.published);
    }

    #[test]
    fn patch_merges_only_provided_fields() {
        let now = Utc::now();
        let mut post = BlogPost::from_draft(ResourceId::new(), draft("T", "C"), now);
        let later = now + Duration::seconds(3);

        post.apply_patch(
            BlogPatch {
                published: Some(true),
                ..BlogPatch::default()
            },
            later,
        );

        assert_eq!(post.title, "T");
        assert_eq!(post.content, "C");
        assert!(post.published);
        assert_eq!(post.created_at, now);
        assert_eq!(post.updated_at, later);
    }

    #[test]
    fn validation_rejects_blank_and_long_titles() {
        assert!(BlogPost::validate_draft(&draft("", "C")).is_err());
        assert!(BlogPost::validate_draft(&draft("T", "   ")).is_err());
        assert!(BlogPost::validate_draft(&draft(&"x".repeat(MAX_TITLE_LEN + 1), "C")).is_err());
        assert!(BlogPost::validate_draft(&draft("T", "C")).is_ok());

        let patch = BlogPatch {
            title: Some(" ".to_string()),
            ..BlogPatch::default()
        };
        assert!(BlogPost::validate_patch(&patch).is_err());
    }

    #[test]
    fn paragraphs_split_on_blank_lines() {
        let post = BlogPost::from_draft(
            ResourceId::new(),
            draft("T", "First.\n\nSecond.\n\n\n\nThird."),
            Utc::now(),
        );
        let paragraphs: Vec<&str> = post.paragraphs().collect();
        assert_eq!(paragraphs, vec!["First.", "Second.", "Third."]);
    }

    #[test]
    fn draft_published_defaults_to_false() {
        let parsed = serde_json::from_str::<BlogDraft>(r#"{"title":"T","content":"C"}"#);
        let Ok(parsed) = parsed else {
            panic!("draft should parse");
        };
        assert!(!parsed.published);
    }
}
