pub mod batch;
pub mod coerce;
pub mod config;
pub mod context;
pub mod documents;
pub mod era;
pub mod error;
pub mod generator;
pub mod logging;
pub mod model;
pub mod records;
pub mod service;
pub mod styles;
pub mod survey;
pub mod templates;
pub mod utils;
pub mod workbook;

pub use batch::{BatchError, DocumentSet, ManifestEntry};
pub use config::{CliArgs, EngineConfig};
pub use context::{ContextBuilder, ContextError, DocumentContext};
pub use documents::{DocumentCode, DocumentDefinition, DocumentRegistry};
pub use error::{EngineError, EngineResult, ErrorCode, ErrorReport};
pub use generator::{GenerateError, GeneratedDocument, MappingOutcome};
pub use logging::{LoggingConfig, init_logging};
pub use model::{CaseId, CompanyId, SchoolProfile, StudentId};
pub use records::{InMemoryRecordStore, RecordStore};
pub use service::DocumentService;
pub use survey::{LayoutContract, ParsedSurvey, SURVEY_LAYOUT};
pub use templates::{DirTemplateSource, TemplateSource};
