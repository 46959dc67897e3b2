mod support;

use std::sync::Arc;

use assert_matches::assert_matches;
use school_docs::batch::{BatchError, generate_set, pack_archive};
use school_docs::context::DocumentContext;
use school_docs::documents::DocumentCode;
use school_docs::generator::GeneratedDocument;
use school_docs::{ContextBuilder, DocumentRegistry, StudentId};
use support::*;

fn context() -> DocumentContext {
    let store = store(records());
    ContextBuilder::new(store.as_ref(), Arc::new(school()))
        .build(&StudentId::new(STUDENT), issue_date())
        .expect("context")
}

#[test]
fn one_missing_template_does_not_sink_the_set() {
    let registry = DocumentRegistry::standard().expect("registry");
    let definitions = &registry.definitions()[..3];
    let mut templates = standard_templates();
    templates.remove(definitions[1].template_file);

    let set = generate_set(definitions, &context(), &templates).expect("partial set");

    assert!(set.is_partial());
    assert_eq!(set.archive_name, "NGUYEN VAN AN_20240603.zip");
    assert_eq!(set.summary.attempted, 3);
    assert_eq!(set.summary.success_count, 2);
    assert_eq!(set.failures.len(), 1);
    assert_eq!(set.failures[0].index, 1);
    assert_eq!(set.failures[0].doc_code, definitions[1].code);

    let codes: Vec<_> = set.manifest.iter().map(|e| e.doc_code).collect();
    assert_eq!(codes, vec![definitions[0].code, definitions[2].code]);

    let entries = unzip(&set.archive);
    let names: Vec<_> = entries.iter().map(|(name, _)| name.clone()).collect();
    let manifest_names: Vec<_> = set.manifest.iter().map(|e| e.file_name.clone()).collect();
    assert_eq!(names, manifest_names);
    for (_, content) in &entries {
        assert!(school_docs::workbook::open_workbook(content).is_ok());
    }
}

#[test]
fn every_template_missing_is_an_error() {
    let registry = DocumentRegistry::standard().expect("registry");
    let templates = std::collections::BTreeMap::new();
    let err = generate_set(registry.definitions(), &context(), &templates).expect_err("empty");
    assert_matches!(
        err,
        BatchError::NoDocumentsGenerated { attempted: 4, ref failures, .. } if failures.len() == 4
    );
}

#[test]
fn duplicate_file_names_get_distinct_entries() {
    let doc = |code| GeneratedDocument {
        code,
        file_name: "証明書.xlsx".into(),
        content: b"x".to_vec(),
        report: Vec::new(),
    };
    let docs = vec![
        doc(DocumentCode::EnrollmentCertificate),
        doc(DocumentCode::AttendanceCertificate),
    ];
    let (archive, manifest) = pack_archive(&docs, issue_date()).expect("archive");
    let names: Vec<_> = unzip(&archive).into_iter().map(|(name, _)| name).collect();
    assert_eq!(names, vec!["証明書.xlsx", "証明書 (2).xlsx"]);
    assert_eq!(manifest[1].file_name, "証明書 (2).xlsx");
}

#[test]
fn packing_is_deterministic_for_a_given_date() {
    let registry = DocumentRegistry::standard().expect("registry");
    let templates = standard_templates();
    let first = generate_set(registry.definitions(), &context(), &templates).expect("set");
    let second = generate_set(registry.definitions(), &context(), &templates).expect("set");
    assert_eq!(first.manifest, second.manifest);
    assert!(!first.is_partial());
    assert_eq!(first.manifest.len(), 4);
}
