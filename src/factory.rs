//! Questionnaire factory
//!
//! Runs the simplify-then-extract pipeline over a batch of raw documents.
//! Documents share nothing, so the batch fans out across the rayon pool; the
//! walk inside each document stays sequential. A failing document yields an
//! error in its own slot and never disturbs the others.

use log::{info, warn};
use rayon::prelude::*;

use crate::ExtractionMode;
use crate::document::{FILE_NAME, Questionnaire, RawNode, simplify};
use crate::error::{ExtractError, Result};

/// Extraction outcome for one input document
#[derive(Debug)]
pub struct DocumentResult {
    /// The `fileName` stamped on the input root, if any
    pub file_name: Option<String>,
    pub outcome: Result<Questionnaire>,
}

/// Simplify one raw document and extract its responses
pub fn process_document(document: &RawNode, mode: ExtractionMode) -> Result<Questionnaire> {
    let simplified = simplify(document)?;
    mode.extract(&simplified)
}

/// Run the pipeline over every document, one result per input
///
/// Uses the current rayon pool; wrap the call in `ThreadPool::install` to
/// bound the number of workers.
pub fn process(documents: &[RawNode], mode: ExtractionMode) -> Vec<DocumentResult> {
    let results: Vec<DocumentResult> = documents
        .par_iter()
        .map(|document| DocumentResult {
            file_name: document.plain_attribute(FILE_NAME).map(str::to_string),
            outcome: process_document(document, mode),
        })
        .collect();

    let failed = results.iter().filter(|r| r.outcome.is_err()).count();
    info!(
        "extracted {} of {} documents ({mode:?})",
        results.len() - failed,
        results.len()
    );
    results
}

pub fn process_form_fields(documents: &[RawNode]) -> Vec<DocumentResult> {
    process(documents, ExtractionMode::FormFields)
}

pub fn process_content_controls(documents: &[RawNode]) -> Vec<DocumentResult> {
    process(documents, ExtractionMode::ContentControls)
}

/// Successful records and per-document failures of one batch
#[derive(Debug, Default)]
pub struct BatchReport {
    pub questionnaires: Vec<Questionnaire>,
    pub failures: Vec<(String, ExtractError)>,
}

impl BatchReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

impl FromIterator<DocumentResult> for BatchReport {
    fn from_iter<I: IntoIterator<Item = DocumentResult>>(results: I) -> Self {
        let mut report = BatchReport::default();
        for result in results {
            match result.outcome {
                Ok(questionnaire) => report.questionnaires.push(questionnaire),
                Err(err) => {
                    let name = result.file_name.unwrap_or_else(|| "<unnamed>".to_string());
                    warn!("extraction failed for {name}: {err}");
                    report.failures.push((name, err));
                }
            }
        }
        report
    }
}
