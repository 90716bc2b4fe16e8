//! Document package reading and validation
//!
//! This module opens `.docx` packages, parses the main document part into a
//! raw node tree and validates files and uploads before extraction.

use quick_xml::NsReader;
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::{Namespace, ResolveResult};
use std::io::{Cursor, Read};
use std::path::Path;
use thiserror::Error;
use zip::ZipArchive;

use super::models::*;
use crate::error::{ExtractError, Result};

/// Main document part inside a WordprocessingML package
pub const DOCUMENT_PART: &str = "word/document.xml";

/// Extensions accepted by the upload validator
pub const UPLOAD_EXTENSIONS: [&str; 2] = ["docx", "docm"];

/// What a path in a questionnaire directory turned out to be
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Docx,
    /// Word 97-2003 binary document, needs conversion first
    LegacyDoc,
    /// Word lock or temporary file (`~$name.docx`)
    Temporary,
    Other,
}

/// Classify a path by extension and temp-file marker
pub fn classify_file(file_path: &Path) -> FileKind {
    let file_name = file_path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("");
    let extension = file_path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match extension.as_str() {
        "docx" | "doc" if file_name.contains('~') => FileKind::Temporary,
        "docx" => FileKind::Docx,
        "doc" => FileKind::LegacyDoc,
        _ => FileKind::Other,
    }
}

/// Validates that the file can be handed to the package reader
pub fn validate_docx_file(file_path: &Path) -> Result<()> {
    match classify_file(file_path) {
        FileKind::Docx => Ok(()),
        FileKind::LegacyDoc => Err(ExtractError::UnsupportedFormat(format!(
            "{} is a Word 97-2003 document; convert it to .docx first",
            file_path.display()
        ))),
        FileKind::Temporary => Err(ExtractError::UnsupportedFormat(format!(
            "{} contains a tilde character; it may be a temporary file",
            file_path.display()
        ))),
        FileKind::Other => Err(ExtractError::UnsupportedFormat(format!(
            "{} is not a Microsoft Word document (.docx)",
            file_path.display()
        ))),
    }
}

/// Name recorded for a document: its file name without extension
pub fn document_name(file_path: &Path) -> String {
    file_path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("Untitled Document")
        .to_string()
}

/// Read the main document part of a `.docx` package into a raw node tree
///
/// The root is stamped with a `fileName` attribute.
pub fn read_document_xml(bytes: &[u8], file_name: &str) -> Result<RawNode> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;

    if archive.by_name(DOCUMENT_PART).is_err() {
        // Check if it might be an Excel file
        if archive.by_name("xl/workbook.xml").is_ok() {
            return Err(ExtractError::UnsupportedFormat(format!(
                "{file_name} appears to be an Excel file (.xlsx)"
            )));
        }

        return Err(ExtractError::UnsupportedFormat(format!(
            "{file_name} is missing {DOCUMENT_PART}"
        )));
    }

    let mut xml = String::new();
    archive.by_name(DOCUMENT_PART)?.read_to_string(&mut xml)?;

    let mut root = parse_xml(&xml)?;
    root.set_attribute(QualifiedName::plain(FILE_NAME), file_name);
    Ok(root)
}

/// Parse an XML string into a raw node tree with resolved namespaces
pub fn parse_xml(xml: &str) -> Result<RawNode> {
    let mut reader = NsReader::from_str(xml);
    reader.config_mut().trim_text(false); // w:t may carry significant spaces

    let mut buf = Vec::new();
    let mut stack: Vec<RawNode> = Vec::new();
    let mut root: Option<RawNode> = None;

    loop {
        match reader.read_event_into(&mut buf).map_err(ExtractError::xml)? {
            Event::Start(ref e) => {
                stack.push(open_element(&reader, e)?);
            }
            Event::Empty(ref e) => {
                let node = open_element(&reader, e)?;
                attach(&mut stack, &mut root, node);
            }
            Event::End(_) => {
                if let Some(node) = stack.pop() {
                    attach(&mut stack, &mut root, node);
                }
            }
            Event::Text(ref e) => {
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&e.unescape().map_err(ExtractError::xml)?);
                }
            }
            Event::CData(ref e) => {
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&String::from_utf8_lossy(e));
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    root.ok_or_else(|| ExtractError::InvalidInput("document part has no root element".to_string()))
}

fn open_element<R>(reader: &NsReader<R>, element: &BytesStart) -> Result<RawNode> {
    let (namespace, local) = reader.resolve_element(element.name());
    let mut node = RawNode::new(QualifiedName {
        namespace: namespace_uri(namespace),
        local: String::from_utf8_lossy(local.as_ref()).into_owned(),
    });

    for attribute in element.attributes() {
        let attribute = attribute.map_err(ExtractError::xml)?;
        if attribute.key.as_namespace_binding().is_some() {
            continue;
        }
        let (namespace, local) = reader.resolve_attribute(attribute.key);
        let value = attribute.unescape_value().map_err(ExtractError::xml)?;
        node.attributes.push(RawAttribute {
            name: QualifiedName {
                namespace: namespace_uri(namespace),
                local: String::from_utf8_lossy(local.as_ref()).into_owned(),
            },
            value: value.into_owned(),
        });
    }

    Ok(node)
}

fn namespace_uri(resolved: ResolveResult) -> Option<String> {
    match resolved {
        ResolveResult::Bound(Namespace(uri)) => Some(String::from_utf8_lossy(uri).into_owned()),
        _ => None,
    }
}

fn attach(stack: &mut [RawNode], root: &mut Option<RawNode>, node: RawNode) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(node),
        None => {
            if root.is_none() {
                *root = Some(node);
            }
        }
    }
}

/// Reasons an uploaded batch is rejected before extraction
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UploadError {
    #[error("No files uploaded.")]
    NoFiles,

    #[error("Invalid file length: {0}")]
    EmptyFile(String),

    #[error("Invalid file format: {0}")]
    DisallowedExtension(String),
}

/// Validate a batch of uploads given as `(file name, length)` pairs
///
/// Every offending file is reported, not just the first.
pub fn validate_uploads<'a, I>(uploads: I) -> std::result::Result<(), Vec<UploadError>>
where
    I: IntoIterator<Item = (&'a str, u64)>,
{
    let mut errors = Vec::new();
    let mut count = 0;

    for (file_name, length) in uploads {
        count += 1;
        if length == 0 {
            errors.push(UploadError::EmptyFile(file_name.to_string()));
        }

        let extension = Path::new(file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("");
        if !UPLOAD_EXTENSIONS
            .iter()
            .any(|allowed| extension.eq_ignore_ascii_case(allowed))
        {
            errors.push(UploadError::DisallowedExtension(file_name.to_string()));
        }
    }

    if count == 0 {
        return Err(vec![UploadError::NoFiles]);
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
