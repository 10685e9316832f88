//! Persistence of the admin bearer token.

use std::sync::Arc;

use super::error::StorageError;
use super::local_store::LocalStore;

/// Storage key holding the bearer token.
pub const AUTH_TOKEN_KEY: &str = "authToken";

/// Reads and writes the bearer token in a [`LocalStore`].
#[derive(Debug, Clone)]
pub struct TokenStore {
    store: Arc<dyn LocalStore>,
}

impl TokenStore {
    /// Creates a token store over `store`.
    #[must_use]
    pub fn new(store: Arc<dyn LocalStore>) -> Self {
        Self { store }
    }

    /// Returns the stored token, if any. Unreadable storage counts as
    /// signed out.
    #[must_use]
    pub fn get(&self) -> Option<String> {
        match self.store.get_item(AUTH_TOKEN_KEY) {
            Ok(token) => token.filter(|t| !t.is_empty()),
            Err(err) => {
                tracing::warn!(error = %err, "could not read stored token");
                None
            }
        }
    }

    /// Stores `token`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the store rejects the write.
    pub fn set(&self, token: &str) -> Result<(), StorageError> {
        self.store.set_item(AUTH_TOKEN_KEY, token)
    }

    /// Forgets the stored token.
    pub fn clear(&self) {
        if let Err(err) = self.store.remove_item(AUTH_TOKEN_KEY) {
            tracing::warn!(error = %err, "could not clear stored token");
        }
    }
}
