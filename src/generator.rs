//! Template-driven document writer.
//!
//! Opens a template, evaluates each [`CellMapping`] against the context and
//! writes the coerced value into its cell. Individual mappings fail softly:
//! every mapping produces a [`MappingOutcome`] describing what happened to it.

use crate::coerce::{FieldValue, excel_serial};
use crate::context::DocumentContext;
use crate::documents::{CellFormat, CellMapping, DocumentCode, DocumentDefinition};
use crate::templates::TemplateSource;
use crate::utils::{cell_address, parse_cell_address};
use crate::workbook::{cell_number_format, open_workbook, workbook_to_bytes};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};
use umya_spreadsheet::{Spreadsheet, Worksheet};

const DATE_FORMAT_CODE: &str = "yyyy/m/d";

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("template '{template}' not found")]
    TemplateMissing { template: String },
    #[error("template '{template}' could not be read: {reason}")]
    TemplateUnreadable { template: String, reason: String },
    #[error("document {code} could not be serialized: {reason}")]
    Serialize { code: DocumentCode, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", content = "detail", rename_all = "snake_case")]
pub enum SkipReason {
    SheetMissing,
    InvalidAddress,
    AccessorFailed(String),
    /// Accessor returned nothing; the template's content stays as is.
    Empty,
    CoercionFailed(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MappingStatus {
    Written { cell: String },
    Skipped(SkipReason),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MappingOutcome {
    pub field: &'static str,
    pub sheet: &'static str,
    pub cell: &'static str,
    #[serde(flatten)]
    pub status: MappingStatus,
}

impl MappingOutcome {
    pub fn is_written(&self) -> bool {
        matches!(self.status, MappingStatus::Written { .. })
    }

    pub fn skip_reason(&self) -> Option<&SkipReason> {
        match &self.status {
            MappingStatus::Skipped(reason) => Some(reason),
            MappingStatus::Written { .. } => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct GeneratedDocument {
    pub code: DocumentCode,
    pub file_name: String,
    pub content: Vec<u8>,
    pub report: Vec<MappingOutcome>,
}

impl GeneratedDocument {
    pub fn written_count(&self) -> usize {
        self.report.iter().filter(|o| o.is_written()).count()
    }

    /// Mappings that were skipped for a reason other than an empty value.
    pub fn failures(&self) -> impl Iterator<Item = &MappingOutcome> {
        self.report
            .iter()
            .filter(|o| !matches!(o.skip_reason(), None | Some(SkipReason::Empty)))
    }
}

#[instrument(skip_all, fields(code = %definition.code, template = definition.template_file))]
pub fn generate(
    definition: &DocumentDefinition,
    context: &DocumentContext,
    templates: &dyn TemplateSource,
) -> Result<GeneratedDocument, GenerateError> {
    let bytes = templates.load(definition.template_file)?;
    let mut book =
        open_workbook(&bytes).map_err(|reason| GenerateError::TemplateUnreadable {
            template: definition.template_file.to_string(),
            reason,
        })?;

    let report = apply_mappings(&mut book, definition.mappings, context);

    let content = workbook_to_bytes(&book).map_err(|reason| GenerateError::Serialize {
        code: definition.code,
        reason,
    })?;
    let file_name = definition.file_name(context);

    let document = GeneratedDocument {
        code: definition.code,
        file_name,
        content,
        report,
    };
    info!(
        file_name = %document.file_name,
        written = document.written_count(),
        failed = document.failures().count(),
        bytes = document.content.len(),
        "document generated"
    );
    Ok(document)
}

/// Evaluates a mapping table against an open workbook.
pub fn apply_mappings(
    book: &mut Spreadsheet,
    mappings: &[CellMapping],
    context: &DocumentContext,
) -> Vec<MappingOutcome> {
    mappings
        .iter()
        .map(|mapping| MappingOutcome {
            field: mapping.field,
            sheet: mapping.sheet,
            cell: mapping.cell,
            status: apply_mapping(book, mapping, context),
        })
        .collect()
}

fn apply_mapping(
    book: &mut Spreadsheet,
    mapping: &CellMapping,
    context: &DocumentContext,
) -> MappingStatus {
    let Some(sheet) = book.get_sheet_by_name_mut(mapping.sheet) else {
        warn!(
            field = mapping.field,
            sheet = mapping.sheet,
            "sheet missing from template; mapping skipped"
        );
        return MappingStatus::Skipped(SkipReason::SheetMissing);
    };

    let Some((column, row)) = parse_cell_address(mapping.cell) else {
        warn!(
            field = mapping.field,
            cell = mapping.cell,
            "invalid cell address; mapping skipped"
        );
        return MappingStatus::Skipped(SkipReason::InvalidAddress);
    };

    let value = match mapping.evaluate(context) {
        Ok(Some(value)) if !value.is_blank() => value,
        Ok(_) => return MappingStatus::Skipped(SkipReason::Empty),
        Err(err) => {
            warn!(field = mapping.field, error = %err, "value accessor failed; mapping skipped");
            return MappingStatus::Skipped(SkipReason::AccessorFailed(err.to_string()));
        }
    };

    let target = merge_anchor(sheet, column, row).unwrap_or_else(|| mapping.cell.to_string());
    match write_cell(sheet, &target, mapping.format, &value) {
        Ok(()) => MappingStatus::Written { cell: target },
        Err(reason) => {
            warn!(
                field = mapping.field,
                format = %mapping.format,
                %reason,
                "value could not be coerced; mapping skipped"
            );
            MappingStatus::Skipped(SkipReason::CoercionFailed(reason))
        }
    }
}

/// When `(column, row)` sits inside a merged region but is not its top-left
/// cell, returns the region's anchor. Merges themselves are never touched.
fn merge_anchor(sheet: &Worksheet, column: u32, row: u32) -> Option<String> {
    sheet.get_merge_cells().iter().find_map(|range| {
        let text = range.get_range();
        let (start, end) = text.split_once(':')?;
        let (c1, r1) = parse_cell_address(start)?;
        let (c2, r2) = parse_cell_address(end)?;
        let inside = (c1..=c2).contains(&column) && (r1..=r2).contains(&row);
        if inside && (column, row) != (c1, r1) {
            debug!(range = %text, "redirecting write to merge anchor");
            Some(cell_address(c1, r1))
        } else {
            None
        }
    })
}

fn write_cell(
    sheet: &mut Worksheet,
    address: &str,
    format: CellFormat,
    value: &FieldValue,
) -> Result<(), String> {
    match format {
        CellFormat::Text => {
            sheet
                .get_cell_mut(address)
                .set_value_string(value.to_text());
        }
        CellFormat::Number => {
            let number = value
                .to_number()
                .ok_or_else(|| format!("'{value}' is not numeric"))?;
            sheet.get_cell_mut(address).set_value_number(number);
        }
        CellFormat::Date => {
            let date = value
                .to_date()
                .ok_or_else(|| format!("'{value}' is not a date"))?;
            if cell_number_format(sheet, address).is_none() {
                sheet
                    .get_style_mut(address)
                    .get_number_format_mut()
                    .set_format_code(DATE_FORMAT_CODE);
            }
            sheet
                .get_cell_mut(address)
                .set_value_number(excel_serial(date));
        }
    }
    Ok(())
}
