//! Client-side error types.

use reqwest::StatusCode;

/// Failure of a local key/value store.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StorageError {
    /// The write would push the store past its byte quota.
    #[error("storage quota exceeded: {needed} bytes needed, {quota} allowed")]
    QuotaExceeded {
        /// Total bytes the store would hold after the write.
        needed: usize,
        /// Configured quota.
        quota: usize,
    },

    /// Key cannot be used with this store.
    #[error("invalid storage key: {0:?}")]
    InvalidKey(String),

    /// Underlying I/O failure.
    #[error("storage I/O error: {0}")]
    Io(String),

    /// A previous holder of the store lock panicked.
    #[error("storage lock poisoned")]
    Poisoned,

    /// Stored value could not be encoded or decoded.
    #[error("storage serialization error: {0}")]
    Serialization(String),
}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Failure of an API call.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Connection could not be made or broke mid-request.
    #[error("transport error: {0}")]
    Transport(String),

    /// No response within the configured timeout.
    #[error("request timed out")]
    Timeout,

    /// The server rejected the session. The stored token has been cleared.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Sign-in was refused.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Unknown id, on the server or in the local fallback list.
    #[error("not found: {0}")]
    NotFound(String),

    /// Any other non-2xx response.
    #[error("HTTP {status}: {message}")]
    Status {
        /// Response status.
        status: StatusCode,
        /// Server-provided message, or the raw body.
        message: String,
    },

    /// 2xx response whose body carries an `error` field.
    #[error("server reported an error: {0}")]
    ErrorPayload(String),

    /// 2xx response with an unexpected body.
    #[error("could not decode response: {0}")]
    Decode(String),

    /// Local storage failure.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// A locally applied write failed record validation.
    #[error("invalid record: {0}")]
    Invalid(String),
}

impl ClientError {
    /// Whether the local fallback may answer a failed read.
    ///
    /// Session rejections and refused sign-ins must reach the caller.
    #[must_use]
    pub const fn allows_fallback(&self) -> bool {
        !matches!(
            self,
            Self::Unauthorized(_) | Self::InvalidCredentials | Self::Invalid(_)
        )
    }

    /// Whether a failed write may be applied to local storage instead.
    ///
    /// Only failures where the server never handled the request qualify:
    /// transport errors, timeouts and 5xx responses (a gateway answering
    /// for a server that is down). A 4xx is the server's verdict on the
    /// write and is returned as is.
    #[must_use]
    pub fn allows_write_fallback(&self) -> bool {
        match self {
            Self::Transport(_) | Self::Timeout => true,
            Self::Status { status, .. } => status.is_server_error(),
            _ => false,
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}
