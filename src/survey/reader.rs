use super::layout::{LayoutContract, StaffSection};
use super::{AnswerValue, FieldKind, FinancialRow, ParsedSurvey, StaffRow, SurveyAnswers};
use crate::coerce::{extract_year, parse_integer};
use crate::model::CompanyId;
use crate::utils::cell_address;
use crate::workbook::{cell_text, is_blank, open_workbook};
use thiserror::Error;
use tracing::{debug, info, instrument, warn};
use umya_spreadsheet::Worksheet;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("workbook has no sheet named '{sheet}'; not a survey form")]
    UnrecognizedFormat { sheet: String },
    #[error("correlation key in {cell} is missing or invalid")]
    MissingCorrelationKey { cell: String },
    #[error("workbook could not be opened: {0}")]
    Malformed(String),
}

/// Reads a filled-in survey. The correlation key must be present; everything
/// else is best effort, with unreadable cells reported as warnings. Text is
/// returned as typed, surrounding spaces included; whitespace-only cells are
/// blank.
#[instrument(skip_all, fields(bytes = bytes.len()))]
pub fn parse_form(layout: &LayoutContract, bytes: &[u8]) -> Result<ParsedSurvey, ParseError> {
    let book = open_workbook(bytes).map_err(ParseError::Malformed)?;
    let sheet =
        book.get_sheet_by_name(layout.sheet_name)
            .ok_or_else(|| ParseError::UnrecognizedFormat {
                sheet: layout.sheet_name.to_string(),
            })?;

    let key_cell = layout.correlation_cell();
    let company_id = CompanyId::parse(&cell_text(sheet, &key_cell))
        .ok_or(ParseError::MissingCorrelationKey { cell: key_cell })?;

    let mut warnings = Vec::new();
    let answers = read_answers(sheet, layout, &mut warnings);
    let staff = read_staff(sheet, &layout.staff);
    let financials = read_financials(sheet, layout, &mut warnings);

    if !warnings.is_empty() {
        warn!(company = %company_id, count = warnings.len(), "survey parsed with warnings");
    }
    info!(
        company = %company_id,
        staff = staff.len(),
        financial_years = financials.len(),
        "survey form parsed"
    );

    Ok(ParsedSurvey {
        company_id,
        answers,
        staff,
        financials,
        warnings,
    })
}

fn read_answers(
    sheet: &Worksheet,
    layout: &LayoutContract,
    warnings: &mut Vec<String>,
) -> SurveyAnswers {
    let mut answers = SurveyAnswers::default();
    for slot in layout.fields {
        let address = layout.value_cell(slot.row);
        let raw = cell_text(sheet, &address);
        if is_blank(&raw) {
            continue;
        }
        match slot.field.kind() {
            FieldKind::Text => answers.set(slot.field, AnswerValue::Text(raw)),
            FieldKind::Integer => match parse_integer(&raw) {
                Some(number) => answers.set(slot.field, AnswerValue::Integer(number)),
                None => warnings.push(format!(
                    "{address} ({}): '{raw}' is not a number",
                    slot.field.label()
                )),
            },
        }
    }
    answers
}

/// A row counts only when its name cell is filled. Reading stops at the
/// declared maximum regardless of what lies below.
fn read_staff(sheet: &Worksheet, section: &StaffSection) -> Vec<StaffRow> {
    let mut rows = Vec::new();
    for index in 0..section.max_rows {
        let Some(row) = section.row(index) else {
            break;
        };
        let read = |column: u32| cell_text(sheet, &cell_address(column, row));
        let name = read(section.name_column);
        if is_blank(&name) {
            continue;
        }
        rows.push(StaffRow {
            name,
            nationality: read(section.nationality_column),
            position: read(section.position_column),
            hired_on: read(section.hired_on_column),
            residence_status: read(section.residence_status_column),
        });
    }
    rows
}

/// Keeps rows whose label carries a four-digit year and that hold at least one
/// amount.
fn read_financials(
    sheet: &Worksheet,
    layout: &LayoutContract,
    warnings: &mut Vec<String>,
) -> Vec<FinancialRow> {
    let section = layout.financial;
    let mut rows = Vec::new();
    for index in 0..section.rows {
        let Some(row) = section.row(index) else {
            break;
        };
        let label = cell_text(sheet, &cell_address(section.label_column, row));
        let Some(fiscal_year) = extract_year(&label) else {
            debug!(row, %label, "financial row has no year label; dropped");
            continue;
        };
        let mut amount = |column: u32| {
            let address = cell_address(column, row);
            let raw = cell_text(sheet, &address);
            if is_blank(&raw) {
                return None;
            }
            let parsed = parse_integer(&raw);
            if parsed.is_none() {
                warnings.push(format!("{address} ({label}): '{raw}' is not an amount"));
            }
            parsed
        };
        let entry = FinancialRow {
            fiscal_year,
            revenue: amount(section.revenue_column),
            ordinary_income: amount(section.income_column),
        };
        if entry.is_empty() {
            debug!(row, fiscal_year, "financial row has no amounts; dropped");
        } else {
            rows.push(entry);
        }
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::survey::SURVEY_LAYOUT;
    use crate::workbook::workbook_to_bytes;
    use assert_matches::assert_matches;

    fn blank_form() -> umya_spreadsheet::Spreadsheet {
        let mut book = umya_spreadsheet::new_file_empty_worksheet();
        book.new_sheet(SURVEY_LAYOUT.sheet_name).expect("sheet");
        book
    }

    #[test]
    fn missing_sheet_is_unrecognized() {
        let book = umya_spreadsheet::new_file();
        let bytes = workbook_to_bytes(&book).expect("bytes");
        assert_matches!(
            parse_form(&SURVEY_LAYOUT, &bytes),
            Err(ParseError::UnrecognizedFormat { .. })
        );
    }

    #[test]
    fn blank_correlation_key_is_rejected() {
        let bytes = workbook_to_bytes(&blank_form()).expect("bytes");
        assert_matches!(
            parse_form(&SURVEY_LAYOUT, &bytes),
            Err(ParseError::MissingCorrelationKey { cell }) if cell == "Z1"
        );
    }

    #[test]
    fn numeric_key_written_as_float_is_accepted() {
        let mut book = blank_form();
        let sheet = book
            .get_sheet_by_name_mut(SURVEY_LAYOUT.sheet_name)
            .expect("sheet");
        sheet.get_cell_mut("Z1").set_value_string("1042.0");
        sheet.get_cell_mut("B14").set_value_string("約30名");
        let bytes = workbook_to_bytes(&book).expect("bytes");

        let parsed = parse_form(&SURVEY_LAYOUT, &bytes).expect("parsed");
        assert_eq!(parsed.company_id.as_str(), "1042");
        assert_eq!(parsed.answers.employee_count, None);
        assert_eq!(parsed.warnings.len(), 1);
    }
}
