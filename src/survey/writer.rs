use super::layout::{FinancialSection, LayoutContract};
use super::{AnswerValue, FinancialRow, StaffRow, SurveyInput, latest_closed_fiscal_year};
use crate::styles::{self, apply_cell_style};
use crate::utils::{cell_address, column_number_to_name};
use crate::workbook::workbook_to_bytes;
use thiserror::Error;
use tracing::{debug, info, instrument};
use umya_spreadsheet::{Spreadsheet, Worksheet};

#[derive(Debug, Error)]
pub enum FormError {
    #[error("failed to create sheet '{sheet}': {reason}")]
    Sheet { sheet: String, reason: String },
    #[error("company id '{id}' cannot be stored as a correlation key")]
    UnreadableKey { id: String },
    #[error("survey form could not be serialized: {0}")]
    Serialize(String),
}

/// Builds the survey workbook for one company. The result depends only on
/// `layout` and `input`.
#[instrument(skip_all, fields(company = %input.company_id))]
pub fn build_form(layout: &LayoutContract, input: &SurveyInput) -> Result<Spreadsheet, FormError> {
    if !input.company_id.is_cell_safe() {
        return Err(FormError::UnreadableKey {
            id: input.company_id.to_string(),
        });
    }
    let mut book = umya_spreadsheet::new_file_empty_worksheet();
    let sheet = book
        .new_sheet(layout.sheet_name)
        .map_err(|reason| FormError::Sheet {
            sheet: layout.sheet_name.to_string(),
            reason: reason.to_string(),
        })?;

    write_header(sheet, layout, input);
    write_fields(sheet, layout, input);
    let staff_written = write_staff(sheet, layout, &input.staff);
    write_financials(sheet, layout, input);
    write_correlation_key(sheet, layout, input);
    set_column_widths(sheet, layout);

    info!(
        staff_rows = staff_written,
        staff_dropped = input.staff.len().saturating_sub(staff_written),
        "survey form built"
    );
    Ok(book)
}

pub fn write_form_bytes(layout: &LayoutContract, input: &SurveyInput) -> Result<Vec<u8>, FormError> {
    let book = build_form(layout, input)?;
    workbook_to_bytes(&book).map_err(FormError::Serialize)
}

fn merged_row(layout: &LayoutContract, first_column: u32, row: u32) -> String {
    format!(
        "{}:{}",
        cell_address(first_column, row),
        cell_address(layout.last_column, row)
    )
}

fn write_header(sheet: &mut Worksheet, layout: &LayoutContract, input: &SurveyInput) {
    let title = cell_address(1, layout.title_row);
    sheet.get_cell_mut(title.as_str()).set_value_string(layout.title);
    apply_cell_style(sheet, &title, &styles::TITLE);
    sheet.add_merge_cells(merged_row(layout, 1, layout.title_row));

    sheet
        .get_cell_mut(cell_address(1, layout.subject_name_row).as_str())
        .set_value_string(format!("企業名: {}", input.display_name));
    sheet
        .get_cell_mut(cell_address(1, layout.subject_id_row).as_str())
        .set_value_string(format!("企業ID: {}", input.company_id));
}

fn write_fields(sheet: &mut Worksheet, layout: &LayoutContract, input: &SurveyInput) {
    let section = cell_address(1, layout.fields_title_row);
    sheet
        .get_cell_mut(section.as_str())
        .set_value_string("1. 企業情報");
    apply_cell_style(sheet, &section, &styles::SECTION);

    for slot in layout.fields {
        let label = layout.label_cell(slot.row);
        sheet
            .get_cell_mut(label.as_str())
            .set_value_string(slot.field.label());
        apply_cell_style(sheet, &label, &styles::LABEL);

        let value = layout.value_cell(slot.row);
        match input.answers.get(slot.field) {
            Some(AnswerValue::Text(text)) => {
                sheet.get_cell_mut(value.as_str()).set_value_string(text);
            }
            Some(AnswerValue::Integer(number)) => {
                sheet
                    .get_cell_mut(value.as_str())
                    .set_value_number(number as f64);
            }
            None => {}
        }
        apply_cell_style(sheet, &value, &styles::INPUT);
        sheet.add_merge_cells(merged_row(layout, layout.value_column, slot.row));
    }
}

fn write_staff(sheet: &mut Worksheet, layout: &LayoutContract, staff: &[StaffRow]) -> usize {
    let section = layout.staff;
    let title = cell_address(1, section.title_row);
    sheet
        .get_cell_mut(title.as_str())
        .set_value_string(format!("2. 外国人従業員（最大{}名）", section.max_rows));
    apply_cell_style(sheet, &title, &styles::SECTION);

    for (column, header) in section.headers() {
        let address = cell_address(column, section.header_row);
        sheet.get_cell_mut(address.as_str()).set_value_string(header);
        apply_cell_style(sheet, &address, &styles::HEADER);
    }

    let mut written = 0;
    for index in 0..section.max_rows {
        let Some(row) = section.row(index) else {
            break;
        };
        let entry = staff.get(index as usize);
        for (column, _) in section.headers() {
            let address = cell_address(column, row);
            if let Some(entry) = entry {
                let value = staff_value(layout, entry, column);
                if !value.is_empty() {
                    sheet.get_cell_mut(address.as_str()).set_value_string(value);
                }
            }
            apply_cell_style(sheet, &address, &styles::INPUT);
        }
        if entry.is_some() {
            written += 1;
        }
    }
    if staff.len() > written {
        debug!(
            supplied = staff.len(),
            capacity = section.max_rows,
            "staff rows beyond the table capacity were not written"
        );
    }
    written
}

fn staff_value<'a>(layout: &LayoutContract, row: &'a StaffRow, column: u32) -> &'a str {
    let section = layout.staff;
    if column == section.name_column {
        &row.name
    } else if column == section.nationality_column {
        &row.nationality
    } else if column == section.position_column {
        &row.position
    } else if column == section.hired_on_column {
        &row.hired_on
    } else if column == section.residence_status_column {
        &row.residence_status
    } else {
        ""
    }
}

/// Years listed newest first, ending at the latest closed fiscal year.
pub fn listed_fiscal_years(section: &FinancialSection, input: &SurveyInput) -> Vec<i32> {
    let latest = latest_closed_fiscal_year(input.as_of);
    (0..section.rows as i32).map(|offset| latest - offset).collect()
}

fn write_financials(sheet: &mut Worksheet, layout: &LayoutContract, input: &SurveyInput) {
    let section = layout.financial;
    let title = cell_address(1, section.title_row);
    sheet
        .get_cell_mut(title.as_str())
        .set_value_string("3. 財務状況（直近決算）");
    apply_cell_style(sheet, &title, &styles::SECTION);

    for (column, header) in section.headers() {
        let address = cell_address(column, section.header_row);
        sheet.get_cell_mut(address.as_str()).set_value_string(header);
        apply_cell_style(sheet, &address, &styles::HEADER);
    }

    for (index, year) in listed_fiscal_years(&section, input).into_iter().enumerate() {
        let Some(row) = section.row(index as u32) else {
            break;
        };
        let label = cell_address(section.label_column, row);
        sheet
            .get_cell_mut(label.as_str())
            .set_value_string(FinancialSection::year_label(year));
        apply_cell_style(sheet, &label, &styles::LABEL);

        let known = input
            .financials
            .iter()
            .find(|entry| entry.fiscal_year == year);
        let revenue = cell_address(section.revenue_column, row);
        let income = cell_address(section.income_column, row);
        write_amount(sheet, &revenue, known.and_then(|r: &FinancialRow| r.revenue));
        write_amount(sheet, &income, known.and_then(|r| r.ordinary_income));
    }
}

fn write_amount(sheet: &mut Worksheet, address: &str, amount: Option<i64>) {
    if let Some(amount) = amount {
        sheet.get_cell_mut(address).set_value_number(amount as f64);
    }
    apply_cell_style(sheet, address, &styles::INPUT_AMOUNT);
}

fn write_correlation_key(sheet: &mut Worksheet, layout: &LayoutContract, input: &SurveyInput) {
    sheet
        .get_cell_mut(layout.correlation_cell().as_str())
        .set_value_string(input.company_id.as_str());
    sheet
        .get_column_dimension_mut(&column_number_to_name(layout.correlation_column))
        .set_hidden(true);
}

fn set_column_widths(sheet: &mut Worksheet, layout: &LayoutContract) {
    sheet
        .get_column_dimension_mut(&column_number_to_name(layout.label_column))
        .set_width(24.0);
    for column in layout.value_column..=layout.last_column {
        sheet
            .get_column_dimension_mut(&column_number_to_name(column))
            .set_width(18.0);
    }
}
