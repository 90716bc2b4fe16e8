//! questionnaires: response extraction for Word questionnaires
//!
//! This library reads Microsoft Word (.docx) documents, simplifies their
//! OpenXML markup and extracts form-field or content-control responses into
//! questionnaire records that can be written as XML, delimited text or JSON.

pub mod config;
pub mod document;
pub mod error;
pub mod export;
pub mod factory;

use serde::{Deserialize, Serialize};

use document::{Questionnaire, SimplifiedNode};

/// Which kind of response a questionnaire collects
#[derive(clap::ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExtractionMode {
    /// Structured document tags (text, checkbox, date, drop-down controls)
    ContentControls,
    /// Legacy form fields delimited by field characters
    #[default]
    FormFields,
}

impl ExtractionMode {
    /// Interpret the interactive selector: `0` for content controls, `1` for form fields
    pub fn from_selector(selector: &str) -> Option<Self> {
        match selector.trim() {
            "0" => Some(ExtractionMode::ContentControls),
            "1" => Some(ExtractionMode::FormFields),
            _ => None,
        }
    }

    /// Run this mode's extractor over a simplified document
    pub fn extract(self, document: &SimplifiedNode) -> error::Result<Questionnaire> {
        match self {
            ExtractionMode::ContentControls => document::extract_content_controls(document),
            ExtractionMode::FormFields => document::extract_form_fields(document),
        }
    }
}

/// Export format options
#[derive(clap::ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ExportFormat {
    Xml,
    Json,
    /// Comma-separated
    #[default]
    Csv,
    /// Pipe-separated
    Psv,
    /// Tab-separated
    Tsv,
}

impl ExportFormat {
    /// Resolve a caller-supplied format token; unknown or absent tokens mean csv
    pub fn from_token(token: Option<&str>) -> Self {
        match token.map(|t| t.trim().to_ascii_lowercase()).as_deref() {
            Some("xml") => ExportFormat::Xml,
            Some("json") => ExportFormat::Json,
            Some("psv") => ExportFormat::Psv,
            Some("tsv") => ExportFormat::Tsv,
            _ => ExportFormat::Csv,
        }
    }

    /// Cell separator for the delimited formats
    pub fn delimiter(self) -> Option<&'static str> {
        match self {
            ExportFormat::Csv => Some(","),
            ExportFormat::Psv => Some("|"),
            ExportFormat::Tsv => Some("\t"),
            ExportFormat::Xml | ExportFormat::Json => None,
        }
    }
}

// Re-export commonly used types
pub use document::{FieldValue, RawNode, ResponseField};
pub use error::{ExtractError, Result};
pub use factory::{process_content_controls, process_form_fields, DocumentResult};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selector() {
        assert_eq!(ExtractionMode::from_selector("0"), Some(ExtractionMode::ContentControls));
        assert_eq!(ExtractionMode::from_selector(" 1\n"), Some(ExtractionMode::FormFields));
        assert_eq!(ExtractionMode::from_selector("2"), None);
    }

    #[test]
    fn test_format_tokens() {
        assert_eq!(ExportFormat::from_token(Some("XML")), ExportFormat::Xml);
        assert_eq!(ExportFormat::from_token(Some("tsv")), ExportFormat::Tsv);
        assert_eq!(ExportFormat::from_token(Some("xlsx")), ExportFormat::Csv);
        assert_eq!(ExportFormat::from_token(None), ExportFormat::Csv);
        assert_eq!(ExportFormat::Psv.delimiter(), Some("|"));
    }
}
