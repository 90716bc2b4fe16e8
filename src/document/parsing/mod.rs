//! Response extraction from simplified document trees
//!
//! Two extractors walk the same simplified tree: legacy form fields delimited
//! by field characters, and content controls (structured document tags).

pub mod content_controls;
pub mod form_fields;

pub use content_controls::extract_content_controls;
pub use form_fields::{as_boolean, extract_form_fields};
