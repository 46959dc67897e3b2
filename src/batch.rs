//! Batch generation with partial-success handling and zip packaging.

use crate::context::DocumentContext;
use crate::documents::{DocumentCode, DocumentDefinition};
use crate::generator::{GeneratedDocument, generate};
use crate::templates::TemplateSource;
use crate::utils::sanitize_file_component;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::io::{Cursor, Write};
use thiserror::Error;
use tracing::{info, instrument, warn};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

const ARCHIVE_COMPRESSION_LEVEL: i32 = 6;

#[derive(Debug, Error)]
pub enum BatchError {
    #[error("no documents were generated for '{subject}' ({attempted} attempted)")]
    NoDocumentsGenerated {
        subject: String,
        attempted: usize,
        failures: Vec<BatchFailure>,
    },
    #[error("archive could not be written: {0}")]
    Archive(String),
}

/// Result of a batch run: what succeeded, what failed and why.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResult<T> {
    pub succeeded: Vec<T>,
    pub failed: Vec<BatchFailure>,
    pub summary: BatchSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchFailure {
    /// Position of the definition in the requested list.
    pub index: usize,
    pub doc_code: DocumentCode,
    pub error: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchSummary {
    pub attempted: usize,
    pub success_count: usize,
    pub failure_count: usize,
    /// Percentage, 0-100.
    pub success_rate: f64,
}

impl<T> BatchResult<T> {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            succeeded: Vec::with_capacity(capacity),
            failed: Vec::new(),
            summary: BatchSummary::default(),
        }
    }

    pub fn add_success(&mut self, item: T) {
        self.succeeded.push(item);
        self.summary.success_count += 1;
    }

    pub fn add_failure(&mut self, index: usize, doc_code: DocumentCode, error: String) {
        self.failed.push(BatchFailure {
            index,
            doc_code,
            error,
        });
        self.summary.failure_count += 1;
    }

    pub fn finalize(mut self, attempted: usize) -> Self {
        self.summary.attempted = attempted;
        if attempted > 0 {
            self.summary.success_rate =
                (self.summary.success_count as f64 / attempted as f64) * 100.0;
        }
        self
    }

    pub fn is_partial_success(&self) -> bool {
        !self.succeeded.is_empty() && !self.failed.is_empty()
    }

    pub fn is_complete_failure(&self) -> bool {
        self.succeeded.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestEntry {
    pub doc_code: DocumentCode,
    pub file_name: String,
}

/// A packed archive plus the manifest of the documents inside it.
#[derive(Debug, Clone)]
pub struct DocumentSet {
    pub archive_name: String,
    pub archive: Vec<u8>,
    pub manifest: Vec<ManifestEntry>,
    pub failures: Vec<BatchFailure>,
    pub summary: BatchSummary,
}

impl DocumentSet {
    pub fn is_partial(&self) -> bool {
        !self.failures.is_empty()
    }
}

/// Runs every definition in order; a failing definition is logged and left
/// out, never aborting the batch.
pub fn generate_all(
    definitions: &[DocumentDefinition],
    context: &DocumentContext,
    templates: &dyn TemplateSource,
) -> BatchResult<GeneratedDocument> {
    let mut result = BatchResult::with_capacity(definitions.len());
    for (index, definition) in definitions.iter().enumerate() {
        match generate(definition, context, templates) {
            Ok(document) => result.add_success(document),
            Err(err) => {
                warn!(
                    index,
                    code = %definition.code,
                    error = %err,
                    "document generation failed; continuing with the rest of the batch"
                );
                result.add_failure(index, definition.code, err.to_string());
            }
        }
    }
    result.finalize(definitions.len())
}

#[instrument(skip_all, fields(subject = %context.subject_display_name(), definitions = definitions.len()))]
pub fn generate_set(
    definitions: &[DocumentDefinition],
    context: &DocumentContext,
    templates: &dyn TemplateSource,
) -> Result<DocumentSet, BatchError> {
    let result = generate_all(definitions, context, templates);
    if result.is_complete_failure() {
        return Err(BatchError::NoDocumentsGenerated {
            subject: context.subject_display_name(),
            attempted: definitions.len(),
            failures: result.failed,
        });
    }

    let (archive, manifest) = pack_archive(&result.succeeded, context.issued_on())?;
    let archive_name = archive_name(&context.subject_display_name(), context.issued_on());

    if result.is_partial_success() {
        warn!(
            archive = %archive_name,
            succeeded = result.summary.success_count,
            failed = result.summary.failure_count,
            "document set is partial"
        );
    } else {
        info!(archive = %archive_name, documents = manifest.len(), "document set generated");
    }

    Ok(DocumentSet {
        archive_name,
        archive,
        manifest,
        failures: result.failed,
        summary: result.summary,
    })
}

/// `<display-name>_<YYYYMMDD>.zip`
pub fn archive_name(display_name: &str, date: NaiveDate) -> String {
    format!(
        "{}_{}.zip",
        sanitize_file_component(display_name),
        date.format("%Y%m%d")
    )
}

/// Packs documents into a deflate-compressed zip. Entries keep the documents'
/// order; repeated file names get ` (2)`, ` (3)`, ... before the extension.
/// Entry timestamps are pinned to `date` so the same input packs to the same
/// bytes.
pub fn pack_archive(
    documents: &[GeneratedDocument],
    date: NaiveDate,
) -> Result<(Vec<u8>, Vec<ManifestEntry>), BatchError> {
    let timestamp = zip::DateTime::from_date_and_time(
        date.year().clamp(1980, 2107) as u16,
        date.month() as u8,
        date.day() as u8,
        0,
        0,
        0,
    )
    .unwrap_or_default();
    let options = FileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .compression_level(Some(ARCHIVE_COMPRESSION_LEVEL))
        .last_modified_time(timestamp);

    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let mut used = HashSet::new();
    let mut manifest = Vec::with_capacity(documents.len());

    for document in documents {
        let entry_name = unique_entry_name(&document.file_name, &mut used);
        writer
            .start_file(entry_name.as_str(), options)
            .map_err(|err| BatchError::Archive(err.to_string()))?;
        writer
            .write_all(&document.content)
            .map_err(|err| BatchError::Archive(err.to_string()))?;
        manifest.push(ManifestEntry {
            doc_code: document.code,
            file_name: entry_name,
        });
    }

    let cursor = writer
        .finish()
        .map_err(|err| BatchError::Archive(err.to_string()))?;
    Ok((cursor.into_inner(), manifest))
}

fn unique_entry_name(file_name: &str, used: &mut HashSet<String>) -> String {
    let base = sanitize_file_component(file_name);
    if used.insert(base.clone()) {
        return base;
    }
    let (stem, ext) = match base.rfind('.') {
        Some(pos) if pos > 0 => base.split_at(pos),
        _ => (base.as_str(), ""),
    };
    let mut n = 2;
    loop {
        let candidate = format!("{stem} ({n}){ext}");
        if used.insert(candidate.clone()) {
            return candidate;
        }
        n += 1;
    }
}
