//! Error types for remote credential store operations.

use thiserror::Error;

/// Result type for credential store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Errors a credential store can report.
///
/// Absence is a structured kind of its own ([`StoreError::NotFound`]) so that
/// callers never have to inspect message text to tell "gone" from "broken".
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The addressed credential or folder does not exist.
    #[error("{resource} not found (404)")]
    NotFound { resource: String },

    /// The store answered with a non-success status other than 404.
    #[error("HTTP request failed with status {status}: {message}")]
    Http { status: u16, message: String },

    /// The store could not be reached or the request timed out.
    #[error("Transport error: {0}")]
    Transport(String),

    /// A credential payload could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl StoreError {
    /// Create a not found error.
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound { resource: resource.into() }
    }

    /// Create an HTTP status error.
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self::Http { status, message: message.into() }
    }

    /// Create a transport error.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    /// Create a serialization error.
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization(message.into())
    }

    /// True when the store reported the addressed object as absent.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// HTTP status associated with this error, if any.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::NotFound { .. } => Some(404),
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for StoreError {
    fn from(error: reqwest::Error) -> Self {
        match error.status() {
            Some(status) if status == reqwest::StatusCode::NOT_FOUND => {
                Self::not_found(error.url().map(|u| u.path().to_string()).unwrap_or_default())
            }
            Some(status) => Self::http(status.as_u16(), error.to_string()),
            None => Self::transport(error.to_string()),
        }
    }
}
