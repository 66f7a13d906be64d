//! Error types for the admin dashboard

use thiserror::Error;

/// Admin error type
///
/// Every variant is recoverable: the state container that produced it is
/// back in its pre-action state and the action can simply be retried.
#[derive(Error, Debug)]
pub enum AdminError {
    /// Local input check failed, nothing was sent
    #[error("{0}")]
    Validation(String),

    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// Non-2xx response, message taken from the error body when present
    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("network error: {0}")]
    Network(String),

    #[error("unexpected response: {0}")]
    Decode(String),

    #[error("configuration error: {0}")]
    Config(String),

    /// Operation not allowed in the container's current state
    #[error("invalid state: {0}")]
    InvalidState(String),

    #[error(transparent)]
    Forms(#[from] chapel_forms::FormsError),

    #[error(transparent)]
    Pages(#[from] chapel_pages::PagesError),
}

impl AdminError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for AdminError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            Self::Decode(e.to_string())
        } else {
            Self::Network(e.to_string())
        }
    }
}

impl From<serde_json::Error> for AdminError {
    fn from(e: serde_json::Error) -> Self {
        Self::Decode(e.to_string())
    }
}

/// Result type for the admin dashboard
pub type Result<T> = std::result::Result<T, AdminError>;
