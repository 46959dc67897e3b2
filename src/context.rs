//! Document context assembly.

use crate::model::{
    CaseSnapshot, CompanySnapshot, SchoolProfile, StudentId, StudentSnapshot,
};
use crate::records::{RecordStore, StoreError};
use chrono::NaiveDate;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ContextError {
    #[error("{kind} '{id}' not found")]
    NotFound { kind: &'static str, id: String },
    #[error("student '{student}' has no linked {missing} yet")]
    MissingPrerequisite {
        student: String,
        missing: &'static str,
    },
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Immutable snapshot consumed by mapping accessors.
///
/// Built once per generation request. There is deliberately no mutating API:
/// accessors only ever see `&DocumentContext`.
#[derive(Debug, Clone)]
pub struct DocumentContext {
    student: StudentSnapshot,
    company: CompanySnapshot,
    case: Option<CaseSnapshot>,
    school: Arc<SchoolProfile>,
    issued_on: NaiveDate,
}

impl DocumentContext {
    pub fn new(
        student: StudentSnapshot,
        company: CompanySnapshot,
        case: Option<CaseSnapshot>,
        school: Arc<SchoolProfile>,
        issued_on: NaiveDate,
    ) -> Self {
        Self {
            student,
            company,
            case,
            school,
            issued_on,
        }
    }

    pub fn student(&self) -> &StudentSnapshot {
        &self.student
    }

    pub fn company(&self) -> &CompanySnapshot {
        &self.company
    }

    pub fn case(&self) -> Option<&CaseSnapshot> {
        self.case.as_ref()
    }

    pub fn school(&self) -> &SchoolProfile {
        &self.school
    }

    pub fn issued_on(&self) -> NaiveDate {
        self.issued_on
    }

    /// Human-facing name of the subject, used for file and archive names.
    pub fn subject_display_name(&self) -> String {
        self.student.display_name()
    }
}

pub struct ContextBuilder<'a> {
    store: &'a dyn RecordStore,
    school: Arc<SchoolProfile>,
}

impl<'a> ContextBuilder<'a> {
    pub fn new(store: &'a dyn RecordStore, school: Arc<SchoolProfile>) -> Self {
        Self { store, school }
    }

    /// Resolves the student and its linked records into a context dated
    /// `issued_on`.
    ///
    /// The linked company is required. The linked case is optional; mappings
    /// that need it fail individually when it is absent.
    pub fn build(
        &self,
        student_id: &StudentId,
        issued_on: NaiveDate,
    ) -> Result<DocumentContext, ContextError> {
        let student = self
            .store
            .student(student_id)?
            .ok_or_else(|| ContextError::NotFound {
                kind: "student",
                id: student_id.to_string(),
            })?;

        let company_id =
            student
                .company_id
                .clone()
                .ok_or_else(|| ContextError::MissingPrerequisite {
                    student: student_id.to_string(),
                    missing: "company",
                })?;
        let company = self
            .store
            .company(&company_id)?
            .ok_or_else(|| ContextError::NotFound {
                kind: "company",
                id: company_id.to_string(),
            })?;

        let case = match student.case_id.as_ref() {
            Some(case_id) => Some(self.store.case(case_id)?.ok_or_else(|| {
                ContextError::NotFound {
                    kind: "case",
                    id: case_id.to_string(),
                }
            })?),
            None => None,
        };

        tracing::debug!(
            student = %student_id,
            company = %company.id,
            has_case = case.is_some(),
            "document context built"
        );

        Ok(DocumentContext::new(
            student,
            company,
            case,
            self.school.clone(),
            issued_on,
        ))
    }
}
