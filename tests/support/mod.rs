#![allow(dead_code)]

use std::collections::BTreeMap;
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::NaiveDate;
use school_docs::documents::DocumentDefinition;
use school_docs::model::{CaseSnapshot, CompanySnapshot, StudentSnapshot};
use school_docs::records::{CompanySurveyRecord, RecordSet};
use school_docs::survey::{FinancialRow, StaffRow, SurveyAnswers};
use school_docs::templates::scaffold_template;
use school_docs::workbook::workbook_to_bytes;
use school_docs::{
    CaseId, CompanyId, DocumentRegistry, DocumentService, InMemoryRecordStore, SchoolProfile,
    StudentId,
};
use tempfile::{TempDir, tempdir};
use umya_spreadsheet::{self, Spreadsheet};

pub const STUDENT: &str = "S-001";
pub const STUDENT_WITHOUT_CASE: &str = "S-002";
pub const STUDENT_WITHOUT_COMPANY: &str = "S-003";
pub const COMPANY: &str = "C-001";
pub const CASE: &str = "K-001";

pub struct TestWorkspace {
    _tempdir: TempDir,
    root: PathBuf,
}

impl TestWorkspace {
    pub fn new() -> Self {
        let tempdir = tempdir().expect("tempdir");
        let root = tempdir.path().to_path_buf();
        Self {
            _tempdir: tempdir,
            root,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    pub fn write(&self, name: &str, bytes: &[u8]) -> PathBuf {
        let path = self.path(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create dir");
        }
        std::fs::write(&path, bytes).expect("write file");
        path
    }

    pub fn write_records(&self, records: &RecordSet) -> PathBuf {
        let yaml = serde_yaml::to_string(records).expect("records yaml");
        self.write("records.yaml", yaml.as_bytes())
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

pub fn issue_date() -> NaiveDate {
    date(2024, 6, 3)
}

pub fn school() -> SchoolProfile {
    SchoolProfile {
        name: "東京日本語学院".into(),
        principal: "山田 太郎".into(),
        postal_code: Some("160-0022".into()),
        address: "東京都新宿区新宿1-1-1".into(),
        phone: Some("03-1234-5678".into()),
        registration_number: Some("JP-0001".into()),
    }
}

fn student(id: &str, company: Option<&str>, case: Option<&str>) -> StudentSnapshot {
    StudentSnapshot {
        id: StudentId::new(id),
        family_name: "NGUYEN".into(),
        given_name: "VAN AN".into(),
        name_kana: Some("グエン ヴァン アン".into()),
        nationality: Some("ベトナム".into()),
        birth_date: Some(date(2000, 5, 14)),
        gender: Some("男".into()),
        passport_number: Some("C1234567".into()),
        residence_card_number: Some("AB12345678CD".into()),
        course: Some("進学2年コース".into()),
        enrolled_on: Some(date(2023, 4, 1)),
        expected_graduation: Some(date(2025, 3, 31)),
        address: Some("東京都新宿区".into()),
        attendance_rate: Some(96.5),
        jlpt_level: Some("N2".into()),
        company_id: company.map(CompanyId::new),
        case_id: case.map(CaseId::new),
    }
}

pub fn company() -> CompanySnapshot {
    CompanySnapshot {
        id: CompanyId::new(COMPANY),
        name: "株式会社サンプル".into(),
        representative: Some("佐藤 一郎".into()),
        postal_code: Some("100-0001".into()),
        address: Some("東京都千代田区".into()),
        phone: Some("03-0000-0000".into()),
        industry: Some("製造業".into()),
        employee_count: Some(120),
    }
}

pub fn case() -> CaseSnapshot {
    CaseSnapshot {
        id: CaseId::new(CASE),
        job_title: Some("機械オペレーター".into()),
        work_location: Some("埼玉工場".into()),
        monthly_salary: Some(230_000),
        contract_start: Some(date(2025, 4, 1)),
        contract_end: Some(date(2028, 3, 31)),
        weekly_hours: Some(40.0),
        status: Some("内定".into()),
    }
}

pub fn records() -> RecordSet {
    RecordSet {
        students: vec![
            student(STUDENT, Some(COMPANY), Some(CASE)),
            student(STUDENT_WITHOUT_CASE, Some(COMPANY), None),
            student(STUDENT_WITHOUT_COMPANY, None, None),
        ],
        companies: vec![company()],
        cases: vec![case()],
        surveys: Vec::new(),
    }
}

pub fn records_with_survey(staff: usize) -> RecordSet {
    let mut set = records();
    set.surveys.push(CompanySurveyRecord {
        company_id: CompanyId::new(COMPANY),
        answers: Some(SurveyAnswers {
            company_name: Some("株式会社サンプル".into()),
            established_year: Some(1998),
            capital: Some(30_000_000),
            foreign_employee_count: Some(staff as i64),
            contact_email: Some("hr@example.co.jp".into()),
            ..SurveyAnswers::default()
        }),
        staff: (0..staff)
            .map(|i| StaffRow {
                name: format!("STAFF {}", i + 1),
                nationality: "ベトナム".into(),
                position: "製造".into(),
                hired_on: "2022-04-01".into(),
                residence_status: "特定技能1号".into(),
            })
            .collect(),
        financials: vec![FinancialRow {
            fiscal_year: 2023,
            revenue: Some(1_200_000_000),
            ordinary_income: Some(45_000_000),
        }],
    });
    set
}

pub fn store(records: RecordSet) -> Arc<InMemoryRecordStore> {
    Arc::new(InMemoryRecordStore::from_record_set(records))
}

/// Scaffold of `definition` with a marker the generator must not touch.
pub fn template_for(definition: &DocumentDefinition) -> Vec<u8> {
    let mut book = scaffold_template(definition).expect("scaffold");
    let first = definition.sheet_names()[0];
    let sheet = book.get_sheet_by_name_mut(first).expect("first sheet");
    sheet.get_cell_mut("A30").set_value_string("様式第1号");
    workbook_to_bytes(&book).expect("template bytes")
}

pub fn standard_templates() -> BTreeMap<String, Vec<u8>> {
    let registry = DocumentRegistry::standard().expect("registry");
    registry
        .definitions()
        .iter()
        .map(|def| (def.template_file.to_string(), template_for(def)))
        .collect()
}

pub fn service(records: RecordSet, templates: BTreeMap<String, Vec<u8>>) -> DocumentService {
    DocumentService::new(
        store(records),
        Arc::new(DocumentRegistry::standard().expect("registry")),
        Arc::new(templates),
        Arc::new(school()),
    )
}

pub fn build_book<F>(f: F) -> Vec<u8>
where
    F: FnOnce(&mut Spreadsheet),
{
    let mut book = umya_spreadsheet::new_file();
    f(&mut book);
    workbook_to_bytes(&book).expect("workbook bytes")
}

/// Entry names and contents of a zip archive, in archive order.
pub fn unzip(bytes: &[u8]) -> Vec<(String, Vec<u8>)> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).expect("zip archive");
    (0..archive.len())
        .map(|i| {
            let mut entry = archive.by_index(i).expect("zip entry");
            let mut content = Vec::new();
            entry.read_to_end(&mut content).expect("read entry");
            (entry.name().to_string(), content)
        })
        .collect()
}
