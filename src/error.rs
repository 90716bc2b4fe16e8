//! Error types for questionnaire extraction
//!
//! Every error that names a document carries its `fileName` so a batch caller
//! can report which input failed.

use std::io;
use thiserror::Error;

/// Errors that can occur while reading or extracting a questionnaire
#[derive(Error, Debug)]
pub enum ExtractError {
    /// A required input was absent
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A structurally required node was missing or duplicated
    #[error("Malformed document '{file}': {detail}")]
    MalformedDocument { file: String, detail: String },

    /// The input is not a Word document package
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// ZIP archive error
    #[error("ZIP archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// XML parsing or writing error
    #[error("XML error: {0}")]
    Xml(String),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ExtractError {
    pub(crate) fn malformed(file: Option<&str>, detail: impl Into<String>) -> Self {
        Self::MalformedDocument {
            file: file.unwrap_or("<unnamed>").to_string(),
            detail: detail.into(),
        }
    }

    pub(crate) fn xml(err: impl std::fmt::Display) -> Self {
        Self::Xml(err.to_string())
    }
}

/// Result type for extraction operations
pub type Result<T> = std::result::Result<T, ExtractError>;
