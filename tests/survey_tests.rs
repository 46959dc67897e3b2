mod support;

use assert_matches::assert_matches;
use proptest::prelude::*;
use school_docs::model::CompanyId;
use school_docs::survey::{
    FinancialRow, FormError, ParseError, SURVEY_LAYOUT, StaffRow, SurveyAnswers, SurveyInput,
    build_form, parse_form, write_form_bytes,
};
use school_docs::workbook::{cell_text, open_workbook, workbook_to_bytes};
use support::*;
use umya_spreadsheet::Spreadsheet;

fn exported(staff: usize) -> Vec<u8> {
    let service = service(records_with_survey(staff), standard_templates());
    service
        .build_survey_form_on(&CompanyId::new(COMPANY), issue_date())
        .expect("survey form")
}

fn edit<F>(bytes: &[u8], f: F) -> Vec<u8>
where
    F: FnOnce(&mut Spreadsheet),
{
    let mut book = open_workbook(bytes).expect("open");
    f(&mut book);
    workbook_to_bytes(&book).expect("bytes")
}

fn edit_sheet<F>(bytes: &[u8], f: F) -> Vec<u8>
where
    F: FnOnce(&mut umya_spreadsheet::Worksheet),
{
    edit(bytes, |book| {
        f(book
            .get_sheet_by_name_mut(SURVEY_LAYOUT.sheet_name)
            .expect("survey sheet"))
    })
}

#[test]
fn untouched_export_reads_back_what_was_written() {
    let bytes = exported(3);
    let parsed = parse_form(&SURVEY_LAYOUT, &bytes).expect("parsed");
    let expected = records_with_survey(3).surveys.remove(0);

    assert_eq!(parsed.company_id.as_str(), COMPANY);
    assert_eq!(Some(parsed.answers), expected.answers);
    assert_eq!(parsed.staff, expected.staff);
    assert_eq!(parsed.financials, expected.financials);
    assert!(parsed.warnings.is_empty());
}

#[test]
fn staff_table_is_capped_at_its_declared_size() {
    let bytes = exported(12);
    let book = open_workbook(&bytes).expect("open");
    let sheet = book.get_sheet_by_name(SURVEY_LAYOUT.sheet_name).expect("sheet");
    assert_eq!(cell_text(sheet, "A30"), "STAFF 10");
    // row 31 is outside the table and stays empty
    assert_eq!(cell_text(sheet, "A31"), "");

    let parsed = parse_form(&SURVEY_LAYOUT, &bytes).expect("parsed");
    assert_eq!(parsed.staff.len(), 10);
}

#[test]
fn rows_typed_below_the_table_are_ignored() {
    let bytes = edit_sheet(&exported(10), |sheet| {
        sheet.get_cell_mut("A31").set_value_string("EXTRA PERSON");
    });
    let parsed = parse_form(&SURVEY_LAYOUT, &bytes).expect("parsed");
    assert_eq!(parsed.staff.len(), 10);
    assert!(parsed.staff.iter().all(|row| row.name != "EXTRA PERSON"));
}

#[test]
fn blank_staff_rows_in_the_middle_are_skipped() {
    let bytes = edit_sheet(&exported(3), |sheet| {
        for column in ["A", "B", "C", "D", "E"] {
            sheet
                .get_cell_mut(format!("{column}22").as_str())
                .set_value_string("");
        }
    });
    let parsed = parse_form(&SURVEY_LAYOUT, &bytes).expect("parsed");
    let names: Vec<_> = parsed.staff.iter().map(|row| row.name.as_str()).collect();
    assert_eq!(names, vec!["STAFF 1", "STAFF 3"]);
}

#[test]
fn cleared_correlation_key_is_rejected() {
    let bytes = edit_sheet(&exported(1), |sheet| {
        sheet.get_cell_mut("Z1").set_value_string("");
    });
    assert_matches!(
        parse_form(&SURVEY_LAYOUT, &bytes),
        Err(ParseError::MissingCorrelationKey { .. })
    );
}

#[test]
fn renamed_sheet_is_not_recognized() {
    let bytes = edit(&exported(1), |book| {
        book.get_sheet_by_name_mut(SURVEY_LAYOUT.sheet_name)
            .expect("sheet")
            .set_name("Sheet1");
    });
    assert_matches!(
        parse_form(&SURVEY_LAYOUT, &bytes),
        Err(ParseError::UnrecognizedFormat { .. })
    );
}

#[test]
fn non_workbook_upload_is_malformed() {
    assert_matches!(
        parse_form(&SURVEY_LAYOUT, b"PK\x03\x04 truncated"),
        Err(ParseError::Malformed(_))
    );
}

#[test]
fn financial_rows_need_a_year_label_and_an_amount() {
    let bytes = edit_sheet(&exported(0), |sheet| {
        sheet.get_cell_mut("A34").set_value_string("FY?");
        sheet.get_cell_mut("B34").set_value_number(5_000_000.0);
        // A35 keeps its "2022年度" label but has no amounts
        sheet.get_cell_mut("B36").set_value_string("12,345,000");
        sheet.get_cell_mut("C36").set_value_string("△");
    });
    let parsed = parse_form(&SURVEY_LAYOUT, &bytes).expect("parsed");
    assert_eq!(
        parsed.financials,
        vec![FinancialRow {
            fiscal_year: 2021,
            revenue: Some(12_345_000),
            ordinary_income: None,
        }]
    );
    assert_eq!(parsed.warnings.len(), 1);
    assert!(parsed.warnings[0].starts_with("C36"));
}

#[test]
fn typed_amounts_are_tolerated() {
    let bytes = edit_sheet(&exported(0), |sheet| {
        sheet.get_cell_mut("B13").set_value_string("３０，０００，０００円");
        sheet.get_cell_mut("B14").set_value_string(" 1,200 ");
        sheet.get_cell_mut("B12").set_value_string("創業100年");
        sheet.get_cell_mut("B34").set_value_string("(1,500)");
    });
    let parsed = parse_form(&SURVEY_LAYOUT, &bytes).expect("parsed");
    assert_eq!(parsed.answers.capital, Some(30_000_000));
    assert_eq!(parsed.answers.employee_count, Some(1_200));
    assert_eq!(parsed.answers.established_year, None);
    assert_eq!(parsed.warnings.len(), 1);
    assert_eq!(parsed.financials[0].revenue, Some(-1_500));
}

#[test]
fn writer_lists_the_three_latest_closed_fiscal_years() {
    let input = SurveyInput {
        company_id: CompanyId::new("C-9"),
        display_name: "テスト".into(),
        answers: SurveyAnswers::default(),
        staff: Vec::new(),
        financials: Vec::new(),
        as_of: date(2025, 3, 31),
    };
    let book = build_form(&SURVEY_LAYOUT, &input).expect("form");
    let sheet = book.get_sheet_by_name(SURVEY_LAYOUT.sheet_name).expect("sheet");
    let labels: Vec<_> = ["A34", "A35", "A36"]
        .iter()
        .map(|cell| cell_text(sheet, cell))
        .collect();
    assert_eq!(labels, vec!["2023年度", "2022年度", "2021年度"]);
}

fn bare_input(id: &str) -> SurveyInput {
    SurveyInput {
        company_id: CompanyId::new(id),
        display_name: "テスト".into(),
        answers: SurveyAnswers::default(),
        staff: Vec::new(),
        financials: Vec::new(),
        as_of: date(2024, 6, 3),
    }
}

#[test]
fn correlation_key_reads_back_exactly() {
    for id in ["V1.0", "C 001", "会社-1", "1042"] {
        let bytes = write_form_bytes(&SURVEY_LAYOUT, &bare_input(id)).expect("form");
        let parsed = parse_form(&SURVEY_LAYOUT, &bytes).expect("parsed");
        assert_eq!(parsed.company_id.as_str(), id);
    }
}

#[test]
fn key_that_would_read_back_differently_is_not_exported() {
    assert_matches!(
        build_form(&SURVEY_LAYOUT, &bare_input("1042.0")),
        Err(FormError::UnreadableKey { .. })
    );
    assert_matches!(
        build_form(&SURVEY_LAYOUT, &bare_input("  ")),
        Err(FormError::UnreadableKey { .. })
    );
}

#[test]
fn text_keeps_surrounding_spaces() {
    let mut input = bare_input("C-7");
    input.answers.company_name = Some("  ACME  ".into());
    input.answers.industry = Some("   ".into());
    input.staff.push(StaffRow {
        name: " LE VAN C".into(),
        ..StaffRow::default()
    });
    let bytes = write_form_bytes(&SURVEY_LAYOUT, &input).expect("form");
    let parsed = parse_form(&SURVEY_LAYOUT, &bytes).expect("parsed");

    assert_eq!(parsed.answers.company_name.as_deref(), Some("  ACME  "));
    assert_eq!(parsed.answers.industry, None);
    assert_eq!(parsed.staff[0].name, " LE VAN C");
}

fn word() -> impl Strategy<Value = String> {
    "[A-Za-z0-9ァ-ヶ]{1,12}"
}

fn padded_word() -> impl Strategy<Value = String> {
    (" {0,2}", word(), " {0,2}").prop_map(|(lead, core, trail)| format!("{lead}{core}{trail}"))
}

fn answers() -> impl Strategy<Value = SurveyAnswers> {
    (
        proptest::option::of(padded_word()),
        proptest::option::of(word()),
        proptest::option::of(word()),
        proptest::option::of(1900i64..2030),
        proptest::option::of(0i64..1_000_000_000_000),
        proptest::option::of(0i64..100_000),
        proptest::option::of(word()),
    )
        .prop_map(
            |(company_name, address, industry, established_year, capital, employees, contact)| {
                SurveyAnswers {
                    company_name,
                    address,
                    industry,
                    established_year,
                    capital,
                    employee_count: employees,
                    contact_person: contact,
                    ..SurveyAnswers::default()
                }
            },
        )
}

fn staff_row() -> impl Strategy<Value = StaffRow> {
    (word(), word(), word()).prop_map(|(name, nationality, position)| StaffRow {
        name,
        nationality,
        position,
        ..StaffRow::default()
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn export_then_import_preserves_supplied_data(
        answers in answers(),
        staff in proptest::collection::vec(staff_row(), 0..14),
        revenue in proptest::option::of(0i64..10_000_000_000),
    ) {
        let as_of = date(2024, 6, 3);
        let financials = match revenue {
            Some(revenue) => vec![FinancialRow { fiscal_year: 2022, revenue: Some(revenue), ordinary_income: None }],
            None => Vec::new(),
        };
        let input = SurveyInput {
            company_id: CompanyId::new("C-42"),
            display_name: "prop".into(),
            answers: answers.clone(),
            staff: staff.clone(),
            financials: financials.clone(),
            as_of,
        };
        let bytes = write_form_bytes(&SURVEY_LAYOUT, &input).expect("form");
        let parsed = parse_form(&SURVEY_LAYOUT, &bytes).expect("parsed");

        prop_assert_eq!(parsed.company_id.as_str(), "C-42");
        prop_assert_eq!(parsed.answers, answers);
        let kept: Vec<_> = staff.into_iter().take(10).collect();
        prop_assert_eq!(parsed.staff, kept);
        prop_assert_eq!(parsed.financials, financials);
        prop_assert!(parsed.warnings.is_empty());
    }
}
