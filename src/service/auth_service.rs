//! Admin sign-in and server-side sessions.
//!
//! Tokens are opaque (`cx_` followed by a random UUID in simple form) and
//! only mean something while they sit in the session table. Nothing about
//! a token can be checked from its shape alone.

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::error::CmsError;

/// Prefix of every issued token.
pub const TOKEN_PREFIX: &str = "cx_";

/// A live admin session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Bearer token handed to the client.
    pub token: String,
    /// User the session belongs to.
    pub username: String,
    /// When the session was created.
    pub issued_at: DateTime<Utc>,
    /// When the session stops being accepted.
    pub expires_at: DateTime<Utc>,
}

impl Session {
    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Checks the admin credential pair and tracks issued sessions.
pub struct AuthService {
    username: String,
    password: String,
    ttl: chrono::Duration,
    sessions: RwLock<HashMap<String, Session>>,
}

impl fmt::Debug for AuthService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthService")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl AuthService {
    /// Creates a service accepting exactly one credential pair.
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>, ttl: Duration) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            ttl: chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::MAX),
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Signs in and returns a fresh session.
    ///
    /// # Errors
    ///
    /// Returns [`CmsError::InvalidCredentials`] if the pair does not match.
    pub async fn login(&self, username: &str, password: &str) -> Result<Session, CmsError> {
        if username != self.username || password != self.password {
            tracing::warn!(username, "rejected sign-in");
            return Err(CmsError::InvalidCredentials);
        }

        let now = Utc::now();
        let session = Session {
            token: format!("{TOKEN_PREFIX}{}", uuid::Uuid::new_v4().simple()),
            username: username.to_string(),
            issued_at: now,
            expires_at: now.checked_add_signed(self.ttl).unwrap_or(DateTime::<Utc>::MAX_UTC),
        };

        let mut sessions = self.sessions.write().await;
        sessions.retain(|_, s| !s.is_expired(now));
        sessions.insert(session.token.clone(), session.clone());
        drop(sessions);

        tracing::info!(username, "admin signed in");
        Ok(session)
    }

    /// Returns the session behind `token`.
    ///
    /// # Errors
    ///
    /// Returns [`CmsError::Unauthorized`] for unknown or expired tokens.
    /// Expired sessions are dropped from the table.
    pub async fn verify(&self, token: &str) -> Result<Session, CmsError> {
        let now = Utc::now();
        let found = self.sessions.read().await.get(token).cloned();
        match found {
            Some(session) if !session.is_expired(now) => Ok(session),
            Some(_) => {
                self.sessions.write().await.remove(token);
                tracing::debug!("expired session evicted");
                Err(CmsError::Unauthorized("Session expired".to_string()))
            }
            None => Err(CmsError::Unauthorized("Invalid token".to_string())),
        }
    }

    /// Revokes `token`. Returns whether a session was removed.
    pub async fn logout(&self, token: &str) -> bool {
        let removed = self.sessions.write().await.remove(token).is_some();
        if removed {
            tracing::info!("admin signed out");
        }
        removed
    }

    /// Number of sessions in the table, expired ones included.
    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}
