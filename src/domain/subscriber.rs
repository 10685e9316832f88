//! Newsletter subscribers collected by the footer sign-up form.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::record::{Record, ResourceKind, advance, require_email};
use super::ResourceId;
use crate::error::CmsError;

/// A stored email subscriber.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct EmailSubscriber {
    /// Subscriber identifier.
    pub id: ResourceId,
    /// Email address, unique among subscribers (case-insensitive).
    pub email: String,
    /// Optional first name.
    #[serde(default)]
    pub first_name: Option<String>,
    /// Optional last name.
    #[serde(default)]
    pub last_name: Option<String>,
    /// Whether newsletters are sent to this address.
    pub is_active: bool,
    /// Subscription timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl EmailSubscriber {
    /// Returns `true` if `email` names the same mailbox as this subscriber.
    #[must_use]
    pub fn same_email(&self, email: &str) -> bool {
        self.email.eq_ignore_ascii_case(email.trim())
    }
}

fn default_active() -> bool {
    true
}

/// Request body for `POST /api/subscribers`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SubscriberDraft {
    /// Email address.
    pub email: String,
    /// Optional first name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    /// Optional last name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    /// Defaults to `true`.
    #[serde(default = "default_active")]
    pub is_active: bool,
}

/// Request body for `PUT /api/subscribers/{id}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct SubscriberPatch {
    /// New email address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// New first name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    /// New last name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    /// Activate or deactivate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

/// Query filter for `GET /api/subscribers`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SubscriberFilter {
    /// Only active (`true`) or inactive (`false`) subscribers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    /// Case-insensitive search over email, first and last name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub q: Option<String>,
}

impl SubscriberFilter {
    /// Returns `true` if `subscriber` passes the filter.
    #[must_use]
    pub fn matches(&self, subscriber: &EmailSubscriber) -> bool {
        if let Some(active) = self.active
            && subscriber.is_active != active
        {
            return false;
        }
        match self.q.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(term) => {
                let term = term.to_lowercase();
                std::iter::once(Some(&subscriber.email))
                    .chain([subscriber.first_name.as_ref(), subscriber.last_name.as_ref()])
                    .flatten()
                    .any(|field| field.to_lowercase().contains(&term))
            }
        }
    }
}

impl Record for EmailSubscriber {
    type Draft = SubscriberDraft;
    type Patch = SubscriberPatch;

    const KIND: ResourceKind = ResourceKind::Subscriber;

    fn id(&self) -> &ResourceId {
        &self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    fn from_draft(id: ResourceId, draft: SubscriberDraft, now: DateTime<Utc>) -> Self {
        Self {
            id,
            email: draft.email.trim().to_string(),
            first_name: draft.first_name,
            last_name: draft.last_name,
            is_active: draft.is_active,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply_patch(&mut self, patch: SubscriberPatch, now: DateTime<Utc>) {
        if let Some(email) = patch.email {
            self.email = email.trim().to_string();
        }
        if patch.first_name.is_some() {
            self.first_name = patch.first_name;
        }
        if patch.last_name.is_some() {
            self.last_name = patch.last_name;
        }
        if let Some(active) = patch.is_active {
            self.is_active = active;
        }
        self.updated_at = advance(self.created_at, self.updated_at, now);
    }

    fn validate_draft(draft: &SubscriberDraft) -> Result<(), CmsError> {
        require_email("email", &draft.email)
    }

    fn validate_patch(patch: &SubscriberPatch) -> Result<(), CmsError> {
        match &patch.email {
            Some(email) => require_email("email", email),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn subscriber(email: &str, first: Option<&str>, active: bool) -> EmailSubscriber {
        EmailSubscriber::from_draft(
            ResourceId::new(),
            SubscriberDraft {
                email: email.to_string(),
                first_name: first.map(str::to_string),
                last_name: None,
                is_active: active,
            },
            Utc::now(),
        )
    }

    #[test]
    fn draft_defaults_to_active() {
        let Ok(draft) = serde_json::from_str::<SubscriberDraft>(r#"{"email":"a@b.com"}"#) else {
            panic!("draft should parse");
        };
        assert!(draft.is_active);
    }

    #[test]
    fn email_comparison_ignores_case() {
        let sub = subscriber("John.Doe@Example.com", None, true);
        assert!(sub.same_email(" john.doe@example.COM "));
        assert!(!sub.same_email("jane@example.com"));
    }

    #[test]
    fn filter_active_and_name() {
        let john = subscriber("john@example.com", Some("John"), true);
        let bob = subscriber("bob@example.com", None, false);

        let active = SubscriberFilter {
            active: Some(true),
            q: None,
        };
        assert!(active.matches(&john));
        assert!(!active.matches(&bob));

        let by_name = SubscriberFilter {
            active: None,
            q: Some("joh".to_string()),
        };
        assert!(by_name.matches(&john));
        assert!(!by_name.matches(&bob));
    }
}
