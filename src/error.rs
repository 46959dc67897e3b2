//! Error taxonomy shared by the service façade and the CLI.
//!
//! Each component keeps its own `thiserror` enum. [`EngineError`] wraps them
//! for callers, and [`ErrorCode`] classifies any of them into a stable code
//! with a category and an operator-facing hint.

use crate::batch::BatchError;
use crate::context::ContextError;
use crate::documents::{DocumentCode, RegistryError};
use crate::generator::GenerateError;
use crate::records::StoreError;
use crate::survey::{FormError, ParseError};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(i32)]
pub enum ErrorCode {
    /// Student, company or case id does not resolve
    RecordNotFound = 1001,
    /// Student exists but is not linked to a company yet
    MissingPrerequisite = 1002,
    /// Record store could not answer
    StoreUnavailable = 1003,
    /// Requested document code is not registered
    UnknownDocument = 1004,
    /// Template file is absent
    TemplateMissing = 2001,
    /// Template exists but is not a readable workbook
    TemplateUnreadable = 2002,
    /// Every document of a batch failed
    NoDocumentsGenerated = 2003,
    /// Workbook or archive serialization failed
    OutputFailed = 2004,
    /// Uploaded workbook is not a survey form
    UnrecognizedFormat = 3001,
    /// Uploaded survey lost its correlation key
    MissingCorrelationKey = 3002,
    /// Uploaded bytes are not a workbook at all
    MalformedUpload = 3003,
    /// Registry rejected a definition at startup
    InvalidDefinition = 4001,
    InternalError = 5000,
}

impl ErrorCode {
    pub fn code(&self) -> i32 {
        *self as i32
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorCode::StoreUnavailable | ErrorCode::InternalError)
    }

    pub fn category(&self) -> &'static str {
        match self {
            ErrorCode::RecordNotFound | ErrorCode::UnknownDocument => "not_found",
            ErrorCode::MissingPrerequisite => "precondition",
            ErrorCode::StoreUnavailable => "dependency",
            ErrorCode::TemplateMissing | ErrorCode::TemplateUnreadable => "template",
            ErrorCode::NoDocumentsGenerated | ErrorCode::OutputFailed => "generation",
            ErrorCode::UnrecognizedFormat
            | ErrorCode::MissingCorrelationKey
            | ErrorCode::MalformedUpload => "upload",
            ErrorCode::InvalidDefinition => "configuration",
            ErrorCode::InternalError => "internal",
        }
    }

    /// What an operator can do about it.
    pub fn guidance(&self) -> &'static str {
        match self {
            ErrorCode::RecordNotFound => "Check the id against the student or company list.",
            ErrorCode::MissingPrerequisite => {
                "Link the student to a company before generating documents."
            }
            ErrorCode::StoreUnavailable => "Retry once the record store is reachable.",
            ErrorCode::UnknownDocument => "Use one of the registered document codes.",
            ErrorCode::TemplateMissing => {
                "Place the template in the template directory or run scaffold-templates."
            }
            ErrorCode::TemplateUnreadable => "Re-save the template as .xlsx.",
            ErrorCode::NoDocumentsGenerated => {
                "Check the template directory; every template in the set failed."
            }
            ErrorCode::OutputFailed => "Retry; if it persists, check disk space.",
            ErrorCode::UnrecognizedFormat => {
                "Upload the survey form exported by this system, without renaming its sheet."
            }
            ErrorCode::MissingCorrelationKey => {
                "Re-export the survey for the company; the hidden id column was removed."
            }
            ErrorCode::MalformedUpload => "Upload an .xlsx file.",
            ErrorCode::InvalidDefinition => "Fix the document definition and restart.",
            ErrorCode::InternalError => "Report this with the log output.",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({})", self, self.code())
    }
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Context(#[from] ContextError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Generate(#[from] GenerateError),
    #[error(transparent)]
    Batch(#[from] BatchError),
    #[error(transparent)]
    Form(#[from] FormError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error("document {0} is not registered")]
    UnknownDocument(DocumentCode),
    #[error("company '{0}' not found")]
    CompanyNotFound(String),
    #[error("background task failed: {0}")]
    Task(String),
}

impl EngineError {
    pub fn code(&self) -> ErrorCode {
        match self {
            EngineError::Context(ContextError::NotFound { .. }) => ErrorCode::RecordNotFound,
            EngineError::Context(ContextError::MissingPrerequisite { .. }) => {
                ErrorCode::MissingPrerequisite
            }
            EngineError::Context(ContextError::Store(_)) | EngineError::Store(_) => {
                ErrorCode::StoreUnavailable
            }
            EngineError::Generate(GenerateError::TemplateMissing { .. }) => {
                ErrorCode::TemplateMissing
            }
            EngineError::Generate(GenerateError::TemplateUnreadable { .. }) => {
                ErrorCode::TemplateUnreadable
            }
            EngineError::Generate(GenerateError::Serialize { .. })
            | EngineError::Batch(BatchError::Archive(_))
            | EngineError::Form(_) => ErrorCode::OutputFailed,
            EngineError::Batch(BatchError::NoDocumentsGenerated { .. }) => {
                ErrorCode::NoDocumentsGenerated
            }
            EngineError::Parse(ParseError::UnrecognizedFormat { .. }) => {
                ErrorCode::UnrecognizedFormat
            }
            EngineError::Parse(ParseError::MissingCorrelationKey { .. }) => {
                ErrorCode::MissingCorrelationKey
            }
            EngineError::Parse(ParseError::Malformed(_)) => ErrorCode::MalformedUpload,
            EngineError::Registry(_) => ErrorCode::InvalidDefinition,
            EngineError::UnknownDocument(_) => ErrorCode::UnknownDocument,
            EngineError::CompanyNotFound(_) => ErrorCode::RecordNotFound,
            EngineError::Task(_) => ErrorCode::InternalError,
        }
    }

    pub fn report(&self) -> ErrorReport {
        let code = self.code();
        ErrorReport {
            code,
            category: code.category(),
            message: self.to_string(),
            guidance: code.guidance(),
            retryable: code.is_retryable(),
        }
    }
}

/// Serializable summary printed by the CLI.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorReport {
    pub code: ErrorCode,
    pub category: &'static str,
    pub message: String,
    pub guidance: &'static str,
    pub retryable: bool,
}

impl fmt::Display for ErrorReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}\nHint: {}", self.code, self.message, self.guidance)
    }
}

pub type EngineResult<T> = std::result::Result<T, EngineError>;
