mod support;

use std::sync::Arc;

use assert_matches::assert_matches;
use school_docs::config::{CliArgs, EngineConfig};
use school_docs::documents::DocumentCode;
use school_docs::templates::scaffold_directory;
use school_docs::{
    CompanyId, DocumentRegistry, DocumentService, EngineError, ErrorCode, StudentId,
};
use support::*;

#[test]
fn single_document_uses_the_registry() {
    let service = service(records(), standard_templates());
    let doc = service
        .generate_document(&StudentId::new(STUDENT), DocumentCode::RecommendationLetter, issue_date())
        .expect("document");
    assert_eq!(doc.code, DocumentCode::RecommendationLetter);
    assert_eq!(doc.file_name, "推薦書_NGUYEN VAN AN.xlsx");
    assert!(doc.report.iter().any(|o| o.field == "addressee" && o.is_written()));
}

#[test]
fn unregistered_code_is_reported() {
    let registry = DocumentRegistry::builder().build();
    let service = DocumentService::new(
        store(records()),
        Arc::new(registry),
        Arc::new(standard_templates()),
        Arc::new(school()),
    );
    let err = service
        .generate_document(&StudentId::new(STUDENT), DocumentCode::EmploymentTerms, issue_date())
        .expect_err("unknown");
    assert_matches!(err, EngineError::UnknownDocument(DocumentCode::EmploymentTerms));
    assert_eq!(err.code(), ErrorCode::UnknownDocument);
}

#[test]
fn context_failures_surface_with_codes() {
    let service = service(records(), standard_templates());
    let err = service
        .generate_document_set_on(&StudentId::new(STUDENT_WITHOUT_COMPANY), issue_date())
        .expect_err("no company");
    assert_eq!(err.code(), ErrorCode::MissingPrerequisite);

    let err = service
        .generate_document_set_on(&StudentId::new("S-404"), issue_date())
        .expect_err("no student");
    assert_eq!(err.code(), ErrorCode::RecordNotFound);
}

#[test]
fn survey_falls_back_to_the_company_record() {
    let service = service(records(), standard_templates());
    let input = service
        .survey_input(&CompanyId::new(COMPANY), issue_date())
        .expect("input");
    assert_eq!(input.answers.company_name.as_deref(), Some("株式会社サンプル"));
    assert_eq!(input.answers.employee_count, Some(120));
    assert_eq!(input.answers.capital, None);
    assert!(input.staff.is_empty());

    let err = service
        .build_survey_form_on(&CompanyId::new("C-404"), issue_date())
        .expect_err("unknown company");
    assert_matches!(err, EngineError::CompanyNotFound(_));
}

#[test]
fn survey_upload_errors_carry_guidance() {
    let service = service(records(), standard_templates());
    let err = service.parse_survey_form(b"garbage").expect_err("malformed");
    let report = err.report();
    assert_eq!(report.code, ErrorCode::MalformedUpload);
    assert_eq!(report.category, "upload");
}

#[tokio::test]
async fn async_facade_runs_on_the_blocking_pool() {
    let service = Arc::new(service(records_with_survey(2), standard_templates()));

    let set = service
        .generate_document_set_async(StudentId::new(STUDENT), issue_date())
        .await
        .expect("set");
    assert_eq!(set.manifest.len(), 4);

    let bytes = service
        .build_survey_form_async(CompanyId::new(COMPANY), issue_date())
        .await
        .expect("form");
    let parsed = service.parse_survey_form_async(bytes).await.expect("parsed");
    assert_eq!(parsed.staff.len(), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn concurrent_requests_do_not_interfere() {
    let service = Arc::new(service(records(), standard_templates()));
    let students = [STUDENT, STUDENT_WITHOUT_CASE, STUDENT, STUDENT_WITHOUT_CASE];

    let handles: Vec<_> = students
        .iter()
        .map(|id| {
            let service = Arc::clone(&service);
            let id = StudentId::new(*id);
            tokio::spawn(async move { service.generate_document_set_async(id, issue_date()).await })
        })
        .collect();
    let mut results = Vec::new();
    for handle in handles {
        results.push(handle.await.expect("join").expect("set"));
    }

    assert_eq!(results[0].manifest, results[2].manifest);
    assert_eq!(results[1].manifest, results[3].manifest);
    assert_eq!(results[1].manifest.len(), 4);
    assert!(results.iter().all(|set| !set.is_partial()));
}

#[test]
fn service_wires_from_config_files() {
    let workspace = TestWorkspace::new();
    let records_path = workspace.write_records(&records());
    let templates = workspace.path("templates");
    let registry = DocumentRegistry::standard().expect("registry");
    let written = scaffold_directory(&registry, &templates).expect("scaffold");
    assert_eq!(written.len(), 4);

    let config_path = workspace.write(
        "school.yaml",
        "template_dir: templates\nrecords: records.yaml\nschool:\n  name: 東京日本語学院\n  principal: 山田 太郎\n  address: 東京都新宿区\n"
            .as_bytes(),
    );
    let config = EngineConfig::from_args(CliArgs {
        config: Some(config_path),
        issued_on: Some(issue_date()),
        ..CliArgs::default()
    })
    .expect("config");
    config.validate().expect("valid");
    assert_eq!(config.records_file.as_deref(), Some(records_path.as_path()));

    let service = DocumentService::from_config(&config).expect("service");
    let set = service
        .generate_document_set_on(&StudentId::new(STUDENT), issue_date())
        .expect("set");
    assert!(!set.is_partial());
    assert_eq!(unzip(&set.archive).len(), 4);
}
