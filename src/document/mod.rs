//! Document reading, simplification and response extraction
//!
//! This module turns Microsoft Word (.docx) packages into raw node trees,
//! simplifies them, and extracts questionnaire responses from the result.

pub mod io;
pub mod loader;
pub mod models;
pub mod parsing;
pub mod query;
pub mod simplify;

pub use io::{read_document_xml, validate_docx_file, validate_uploads, UploadError};
pub use loader::{load_directory, load_document, LoadedDirectory};
pub use models::*;
pub use parsing::{as_boolean, extract_content_controls, extract_form_fields};
pub use query::Descendants;
pub use simplify::simplify;
