//! Error types for form schemas and sessions

use thiserror::Error;

/// Forms error type
#[derive(Error, Debug)]
pub enum FormsError {
    /// Two fields share the same value key
    #[error("duplicate field name: {0}")]
    DuplicateName(String),

    /// Field name is empty or not a word identifier
    #[error("invalid field name: {0:?}")]
    InvalidName(String),

    /// No field with this id or name
    #[error("field not found: {0}")]
    FieldNotFound(String),

    /// Required visible fields left empty
    #[error("missing required fields: {}", .0.join(", "))]
    MissingRequired(Vec<String>),

    /// Position outside the field list
    #[error("position out of range: {0}")]
    OutOfRange(usize),

    /// Document is JSON but neither the canonical nor the legacy shape
    #[error("unsupported form document: {0}")]
    UnsupportedShape(String),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for forms
pub type Result<T> = std::result::Result<T, FormsError>;
