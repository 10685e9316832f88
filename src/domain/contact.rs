//! Contact form submissions ("Get a Quote") and their triage status.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::record::{Record, ResourceKind, advance, limit_len, require_email, require_text};
use super::ResourceId;
use crate::error::CmsError;

/// Maximum message length in characters.
pub const MAX_MESSAGE_LEN: usize = 5_000;

/// Triage status of a submission.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ContactStatus {
    /// Not yet opened by an administrator.
    #[default]
    Pending,
    /// Opened, no reply sent.
    Read,
    /// Answered.
    Replied,
}

impl ContactStatus {
    /// Wire name of the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Read => "read",
            Self::Replied => "replied",
        }
    }
}

impl fmt::Display for ContactStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContactStatus {
    type Err = CmsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "read" => Ok(Self::Read),
            "replied" => Ok(Self::Replied),
            other => Err(CmsError::InvalidRequest(format!(
                "unknown contact status: {other}"
            ))),
        }
    }
}

/// A stored contact form submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ContactSubmission {
    /// Submission identifier.
    pub id: ResourceId,
    /// Sender's full name.
    pub name: String,
    /// Sender's email address.
    pub email: String,
    /// Optional phone number.
    #[serde(default)]
    pub phone: Option<String>,
    /// Optional subject line.
    #[serde(default)]
    pub subject: Option<String>,
    /// Message body.
    pub message: String,
    /// Triage status.
    #[serde(default)]
    pub status: ContactStatus,
    /// Submission timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Request body for `POST /api/contacts`.
///
/// The status of a new submission is always `pending`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ContactDraft {
    /// Sender's full name.
    pub name: String,
    /// Sender's email address.
    pub email: String,
    /// Optional phone number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Optional subject line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    /// Message body.
    pub message: String,
}

/// Request body for `PUT /api/contacts/{id}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct ContactPatch {
    /// New triage status.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ContactStatus>,
    /// Corrected name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Corrected email.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Corrected phone.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Corrected subject.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    /// Corrected message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ContactPatch {
    /// A patch that only changes the status.
    #[must_use]
    pub fn status(status: ContactStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }
}

/// Query filter for `GET /api/contacts`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ContactFilter {
    /// Only submissions with this status.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ContactStatus>,
    /// Case-insensitive search over name, email and message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub q: Option<String>,
}

impl ContactFilter {
    /// Returns `true` if `contact` passes the filter.
    #[must_use]
    pub fn matches(&self, contact: &ContactSubmission) -> bool {
        if let Some(status) = self.status
            && contact.status != status
        {
            return false;
        }
        match self.q.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(term) => {
                let term = term.to_lowercase();
                [&contact.name, &contact.email, &contact.message]
                    .iter()
                    .any(|field| field.to_lowercase().contains(&term))
            }
        }
    }
}

impl Record for ContactSubmission {
    type Draft = ContactDraft;
    type Patch = ContactPatch;

    const KIND: ResourceKind = ResourceKind::Contact;

    fn id(&self) -> &ResourceId {
        &self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    fn from_draft(id: ResourceId, draft: ContactDraft, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: draft.name.trim().to_string(),
            email: draft.email.trim().to_string(),
            phone: draft.phone,
            subject: draft.subject,
            message: draft.message,
            status: ContactStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply_patch(&mut self, patch: ContactPatch, now: DateTime<Utc>) {
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(name) = patch.name {
            self.name = name.trim().to_string();
        }
        if let Some(email) = patch.email {
            self.email = email.trim().to_string();
        }
        if patch.phone.is_some() {
            self.phone = patch.phone;
        }
        if patch.subject.is_some() {
            self.subject = patch.subject;
        }
        if let Some(message) = patch.message {
            self.message = message;
        }
        self.updated_at = advance(self.created_at, self.updated_at, now);
    }

    fn validate_draft(draft: &ContactDraft) -> Result<(), CmsError> {
        require_text("name", &draft.name)?;
        require_email("email", &draft.email)?;
        require_text("message", &draft.message)?;
        limit_len("message", &draft.message, MAX_MESSAGE_LEN)
    }

    fn validate_patch(patch: &ContactPatch) -> Result<(), CmsError> {
        if let Some(name) = &patch.name {
            require_text("name", name)?;
        }
        if let Some(email) = &patch.email {
            require_email("email", email)?;
        }
        if let Some(message) = &patch.message {
            require_text("message", message)?;
            limit_len("message", message, MAX_MESSAGE_LEN)?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn submission(name: &str, email: &str, message: &str) -> ContactSubmission {
        ContactSubmission::from_draft(
            ResourceId::new(),
            ContactDraft {
                name: name.to_string(),
                email: email.to_string(),
                phone: None,
                subject: None,
                message: message.to_string(),
            },
            Utc::now(),
        )
    }

    #[test]
    fn new_submissions_are_pending() {
        let contact = submission("John Doe", "john@example.com", "Quote please");
        assert_eq!(contact.status, ContactStatus::Pending);
    }

    #[test]
    fn legacy_new_status_is_rejected() {
        let parsed = serde_json::from_str::<ContactStatus>("\"new\"");
        assert!(parsed.is_err());
        assert!("new".parse::<ContactStatus>().is_err());

        let Ok(read) = serde_json::from_str::<ContactStatus>("\"read\"") else {
            panic!("read should parse");
        };
        assert_eq!(read, ContactStatus::Read);
    }

    #[test]
    fn filter_by_status_and_term() {
        let mut contact = submission("Jane Smith", "jane@example.com", "Logistics for e-commerce");
        contact.status = ContactStatus::Read;

        let by_status = ContactFilter {
            status: Some(ContactStatus::Read),
            q: None,
        };
        assert!(by_status.matches(&contact));

        let wrong_status = ContactFilter {
            status: Some(ContactStatus::Replied),
            q: None,
        };
        assert!(!wrong_status.matches(&contact));

        let by_term = ContactFilter {
            status: None,
            q: Some("E-COMMERCE".to_string()),
        };
        assert!(by_term.matches(&contact));

        let blank = ContactFilter {
            status: None,
            q: Some("  ".to_string()),
        };
        assert!(blank.matches(&contact));
    }

    #[test]
    fn draft_requires_valid_email() {
        let draft = ContactDraft {
            name: "Bob".to_string(),
            email: "bob-at-example".to_string(),
            phone: None,
            subject: None,
            message: "Urgent delivery".to_string(),
        };
        assert!(ContactSubmission::validate_draft(&draft).is_err());
    }
}
