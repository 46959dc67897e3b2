//! Entry points used by the CLI and by embedding applications.
//!
//! Every operation is synchronous and self-contained: it opens its own
//! workbooks and shares nothing mutable with concurrent calls. The `_async`
//! variants move that work onto tokio's blocking pool.

use crate::batch::{DocumentSet, generate_set};
use crate::config::EngineConfig;
use crate::context::{ContextBuilder, DocumentContext};
use crate::documents::{DocumentCode, DocumentRegistry};
use crate::error::{EngineError, EngineResult};
use crate::generator::{GeneratedDocument, generate};
use crate::log_slow_operation;
use crate::model::{CompanyId, SchoolProfile, StudentId};
use crate::records::{InMemoryRecordStore, RecordStore};
use crate::survey::{
    LayoutContract, ParsedSurvey, SURVEY_LAYOUT, SurveyAnswers, SurveyInput, parse_form,
    write_form_bytes,
};
use crate::templates::{DirTemplateSource, TemplateSource, scaffold_directory};
use anyhow::Context as _;
use chrono::{Local, NaiveDate};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::instrument;

const SLOW_BATCH_MS: u64 = 2_000;

pub struct DocumentService {
    store: Arc<dyn RecordStore>,
    registry: Arc<DocumentRegistry>,
    templates: Arc<dyn TemplateSource>,
    school: Arc<SchoolProfile>,
    layout: LayoutContract,
}

impl DocumentService {
    pub fn new(
        store: Arc<dyn RecordStore>,
        registry: Arc<DocumentRegistry>,
        templates: Arc<dyn TemplateSource>,
        school: Arc<SchoolProfile>,
    ) -> Self {
        Self {
            store,
            registry,
            templates,
            school,
            layout: SURVEY_LAYOUT,
        }
    }

    pub fn with_layout(mut self, layout: LayoutContract) -> Self {
        self.layout = layout;
        self
    }

    /// Wires the standard registry, a directory template source and the
    /// configured records file.
    pub fn from_config(config: &EngineConfig) -> anyhow::Result<Self> {
        let records = config
            .records_file
            .as_ref()
            .context("no records file configured")?;
        let store = InMemoryRecordStore::load(records)?;
        let registry = DocumentRegistry::standard().context("standard document catalog")?;
        Ok(Self::new(
            Arc::new(store),
            Arc::new(registry),
            Arc::new(DirTemplateSource::new(&config.template_dir)),
            Arc::new(config.school.clone()),
        ))
    }

    pub fn registry(&self) -> &DocumentRegistry {
        &self.registry
    }

    pub fn layout(&self) -> &LayoutContract {
        &self.layout
    }

    pub fn build_context(
        &self,
        student: &StudentId,
        issued_on: NaiveDate,
    ) -> EngineResult<DocumentContext> {
        let builder = ContextBuilder::new(self.store.as_ref(), self.school.clone());
        Ok(builder.build(student, issued_on)?)
    }

    pub fn generate_document_set(&self, student: &StudentId) -> EngineResult<DocumentSet> {
        self.generate_document_set_on(student, today())
    }

    /// Generates every registered document for the student and packs the
    /// successes into one archive.
    #[instrument(skip(self), fields(student = %student))]
    pub fn generate_document_set_on(
        &self,
        student: &StudentId,
        issued_on: NaiveDate,
    ) -> EngineResult<DocumentSet> {
        let started = Instant::now();
        let context = self.build_context(student, issued_on)?;
        let set = generate_set(
            self.registry.definitions(),
            &context,
            self.templates.as_ref(),
        )?;
        log_slow_operation!(
            started.elapsed(),
            SLOW_BATCH_MS,
            archive = %set.archive_name,
            "document set finished"
        );
        Ok(set)
    }

    #[instrument(skip(self), fields(student = %student, code = %code))]
    pub fn generate_document(
        &self,
        student: &StudentId,
        code: DocumentCode,
        issued_on: NaiveDate,
    ) -> EngineResult<GeneratedDocument> {
        let definition = self
            .registry
            .get(code)
            .ok_or(EngineError::UnknownDocument(code))?;
        let context = self.build_context(student, issued_on)?;
        Ok(generate(definition, &context, self.templates.as_ref())?)
    }

    /// Gathers what the survey writer needs for `company`. Answers from a
    /// previous upload win over the company master record.
    pub fn survey_input(&self, company: &CompanyId, as_of: NaiveDate) -> EngineResult<SurveyInput> {
        let snapshot = self
            .store
            .company(company)?
            .ok_or_else(|| EngineError::CompanyNotFound(company.to_string()))?;
        let answers = match self.store.survey_answers(company)? {
            Some(previous) => previous,
            None => SurveyAnswers::from_company(&snapshot),
        };
        Ok(SurveyInput {
            company_id: company.clone(),
            display_name: snapshot.name.clone(),
            answers,
            staff: self.store.company_staff(company)?,
            financials: self.store.company_financials(company)?,
            as_of,
        })
    }

    pub fn build_survey_form(&self, company: &CompanyId) -> EngineResult<Vec<u8>> {
        self.build_survey_form_on(company, today())
    }

    #[instrument(skip(self), fields(company = %company))]
    pub fn build_survey_form_on(
        &self,
        company: &CompanyId,
        as_of: NaiveDate,
    ) -> EngineResult<Vec<u8>> {
        let input = self.survey_input(company, as_of)?;
        Ok(write_form_bytes(&self.layout, &input)?)
    }

    pub fn parse_survey_form(&self, bytes: &[u8]) -> EngineResult<ParsedSurvey> {
        Ok(parse_form(&self.layout, bytes)?)
    }

    /// Writes a scaffold for every registered template into `dir`.
    pub fn scaffold_templates(&self, dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
        scaffold_directory(&self.registry, dir)
    }

    pub async fn generate_document_set_async(
        self: &Arc<Self>,
        student: StudentId,
        issued_on: NaiveDate,
    ) -> EngineResult<DocumentSet> {
        let service = Arc::clone(self);
        run_blocking(move || service.generate_document_set_on(&student, issued_on)).await
    }

    pub async fn build_survey_form_async(
        self: &Arc<Self>,
        company: CompanyId,
        as_of: NaiveDate,
    ) -> EngineResult<Vec<u8>> {
        let service = Arc::clone(self);
        run_blocking(move || service.build_survey_form_on(&company, as_of)).await
    }

    pub async fn parse_survey_form_async(
        self: &Arc<Self>,
        bytes: Vec<u8>,
    ) -> EngineResult<ParsedSurvey> {
        let service = Arc::clone(self);
        run_blocking(move || service.parse_survey_form(&bytes)).await
    }
}

async fn run_blocking<T, F>(work: F) -> EngineResult<T>
where
    T: Send + 'static,
    F: FnOnce() -> EngineResult<T> + Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|err| EngineError::Task(err.to_string()))?
}

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}
