//! Record store collaborator.
//!
//! The engine only ever reads from the store. Production deployments plug in
//! their database-backed implementation; the CLI and the tests use
//! [`InMemoryRecordStore`], which can be loaded from a YAML or JSON fixture.

use crate::model::{
    CaseId, CaseSnapshot, CompanyId, CompanySnapshot, StudentId, StudentSnapshot,
};
use crate::survey::{FinancialRow, StaffRow, SurveyAnswers};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record store unavailable: {0}")]
    Unavailable(String),
    #[error("record store query failed: {0}")]
    Query(String),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Read-only lookup capability over the school's records.
pub trait RecordStore: Send + Sync {
    fn student(&self, id: &StudentId) -> StoreResult<Option<StudentSnapshot>>;

    fn company(&self, id: &CompanyId) -> StoreResult<Option<CompanySnapshot>>;

    fn case(&self, id: &CaseId) -> StoreResult<Option<CaseSnapshot>>;

    /// Survey answers captured from a previous upload, if any.
    fn survey_answers(&self, company: &CompanyId) -> StoreResult<Option<SurveyAnswers>>;

    fn company_staff(&self, company: &CompanyId) -> StoreResult<Vec<StaffRow>>;

    fn company_financials(&self, company: &CompanyId) -> StoreResult<Vec<FinancialRow>>;
}

/// Serialized form of an in-memory store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordSet {
    pub students: Vec<StudentSnapshot>,
    pub companies: Vec<CompanySnapshot>,
    pub cases: Vec<CaseSnapshot>,
    pub surveys: Vec<CompanySurveyRecord>,
}

/// Everything previously collected from one company's survey.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanySurveyRecord {
    pub company_id: CompanyId,
    #[serde(default)]
    pub answers: Option<SurveyAnswers>,
    #[serde(default)]
    pub staff: Vec<StaffRow>,
    #[serde(default)]
    pub financials: Vec<FinancialRow>,
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryRecordStore {
    students: HashMap<StudentId, StudentSnapshot>,
    companies: HashMap<CompanyId, CompanySnapshot>,
    cases: HashMap<CaseId, CaseSnapshot>,
    surveys: HashMap<CompanyId, CompanySurveyRecord>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_record_set(set: RecordSet) -> Self {
        let mut store = Self::new();
        for student in set.students {
            store.insert_student(student);
        }
        for company in set.companies {
            store.insert_company(company);
        }
        for case in set.cases {
            store.insert_case(case);
        }
        for survey in set.surveys {
            store.insert_survey(survey);
        }
        store
    }

    /// Loads a record set from a `.yaml`/`.yml` or `.json` file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read records file {:?}", path))?;
        let ext = path
            .extension()
            .and_then(|os| os.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();

        let set: RecordSet = match ext.as_str() {
            "yaml" | "yml" => serde_yaml::from_str(&contents)
                .with_context(|| format!("failed to parse YAML records {:?}", path))?,
            "json" => serde_json::from_str(&contents)
                .with_context(|| format!("failed to parse JSON records {:?}", path))?,
            other => anyhow::bail!("unsupported records extension: {other}"),
        };

        tracing::debug!(
            path = %path.display(),
            students = set.students.len(),
            companies = set.companies.len(),
            "loaded record set"
        );
        Ok(Self::from_record_set(set))
    }

    pub fn insert_student(&mut self, student: StudentSnapshot) {
        self.students.insert(student.id.clone(), student);
    }

    pub fn insert_company(&mut self, company: CompanySnapshot) {
        self.companies.insert(company.id.clone(), company);
    }

    pub fn insert_case(&mut self, case: CaseSnapshot) {
        self.cases.insert(case.id.clone(), case);
    }

    pub fn insert_survey(&mut self, survey: CompanySurveyRecord) {
        self.surveys.insert(survey.company_id.clone(), survey);
    }
}

impl RecordStore for InMemoryRecordStore {
    fn student(&self, id: &StudentId) -> StoreResult<Option<StudentSnapshot>> {
        Ok(self.students.get(id).cloned())
    }

    fn company(&self, id: &CompanyId) -> StoreResult<Option<CompanySnapshot>> {
        Ok(self.companies.get(id).cloned())
    }

    fn case(&self, id: &CaseId) -> StoreResult<Option<CaseSnapshot>> {
        Ok(self.cases.get(id).cloned())
    }

    fn survey_answers(&self, company: &CompanyId) -> StoreResult<Option<SurveyAnswers>> {
        Ok(self
            .surveys
            .get(company)
            .and_then(|survey| survey.answers.clone()))
    }

    fn company_staff(&self, company: &CompanyId) -> StoreResult<Vec<StaffRow>> {
        Ok(self
            .surveys
            .get(company)
            .map(|survey| survey.staff.clone())
            .unwrap_or_default())
    }

    fn company_financials(&self, company: &CompanyId) -> StoreResult<Vec<FinancialRow>> {
        Ok(self
            .surveys
            .get(company)
            .map(|survey| survey.financials.clone())
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = r#"
students:
  - id: S-100
    family_name: TRAN
    given_name: THI MAI
    company_id: C-7
companies:
  - id: C-7
    name: 株式会社サンプル
    employee_count: 42
surveys:
  - company_id: C-7
    staff:
      - name: LE VAN B
        nationality: Vietnam
"#;

    #[test]
    fn load_yaml_record_set() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("records.yaml");
        fs::write(&path, FIXTURE).expect("write fixture");

        let store = InMemoryRecordStore::load(&path).expect("load");
        let student = store
            .student(&StudentId::new("S-100"))
            .expect("lookup")
            .expect("present");
        assert_eq!(student.company_id, Some(CompanyId::new("C-7")));

        let staff = store.company_staff(&CompanyId::new("C-7")).expect("staff");
        assert_eq!(staff.len(), 1);
        assert_eq!(staff[0].position, "");
        assert!(
            store
                .survey_answers(&CompanyId::new("C-7"))
                .expect("answers")
                .is_none()
        );
    }

    #[test]
    fn load_rejects_unknown_extension() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("records.toml");
        fs::write(&path, "").expect("write fixture");
        assert!(InMemoryRecordStore::load(&path).is_err());
    }
}
