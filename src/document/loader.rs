//! Document loading
//!
//! This module reads `.docx` files from disk and hands back raw document
//! trees ready for the extraction pipeline. Every document is loaded on its
//! own; one unreadable file never prevents the others from loading.

use log::{debug, warn};
use std::path::{Path, PathBuf};

use super::io::{FileKind, classify_file, document_name, read_document_xml, validate_docx_file};
use super::models::RawNode;
use crate::error::{ExtractError, Result};

/// Load a single `.docx` file as a raw document tree stamped with its name
pub async fn load_document(file_path: &Path) -> Result<RawNode> {
    // Validate file type before attempting to parse
    validate_docx_file(file_path)?;

    let bytes = tokio::fs::read(file_path).await?;
    debug!("read {} ({} bytes)", file_path.display(), bytes.len());

    read_document_xml(&bytes, &document_name(file_path))
}

/// Outcome of loading every questionnaire in a directory
#[derive(Debug, Default)]
pub struct LoadedDirectory {
    pub documents: Vec<RawNode>,
    /// Files that looked like documents but could not be read
    pub failures: Vec<(PathBuf, ExtractError)>,
    /// Legacy `.doc` files that need conversion before they can be read
    pub unconverted: Vec<PathBuf>,
}

/// Load every `.docx` questionnaire in a directory
///
/// Temporary files and non-Word files are skipped. Fails only when the
/// directory cannot be read or holds no files at all.
pub async fn load_directory(directory: &Path) -> Result<LoadedDirectory> {
    let mut entries = tokio::fs::read_dir(directory).await?;
    let mut files = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        if entry.file_type().await?.is_file() {
            files.push(entry.path());
        }
    }

    if files.is_empty() {
        return Err(ExtractError::InvalidInput(format!(
            "Directory is empty: {}",
            directory.display()
        )));
    }
    files.sort();

    let mut loaded = LoadedDirectory::default();
    for path in files {
        match classify_file(&path) {
            FileKind::Docx => match load_document(&path).await {
                Ok(document) => loaded.documents.push(document),
                Err(err) => {
                    warn!("could not read {}: {err}", path.display());
                    loaded.failures.push((path, err));
                }
            },
            FileKind::LegacyDoc => {
                warn!("skipping {}: convert it to .docx first", path.display());
                loaded.unconverted.push(path);
            }
            FileKind::Temporary | FileKind::Other => {
                debug!("skipping {}", path.display());
            }
        }
    }

    Ok(loaded)
}
