//! Error types for page documents

use thiserror::Error;

/// Pages error type
#[derive(Error, Debug)]
pub enum PagesError {
    /// Document JSON does not describe known blocks
    #[error("invalid page document: {0}")]
    InvalidDocument(String),

    /// Block props outside their allowed range
    #[error("invalid props for {block}: {reason}")]
    InvalidProps { block: String, reason: String },

    /// Two blocks share an id
    #[error("duplicate block id: {0}")]
    DuplicateId(String),

    /// No block with this id
    #[error("block not found: {0}")]
    BlockNotFound(String),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for pages
pub type Result<T> = std::result::Result<T, PagesError>;
