//! Declarative document definitions.
//!
//! Each document type is a table of [`CellMapping`]s plus a template file and
//! an output-naming function. One generic interpreter
//! ([`crate::generator::generate`]) evaluates every table, so there is no
//! per-document writer code.

pub mod catalog;

use crate::coerce::FieldValue;
use crate::context::DocumentContext;
use crate::model::CaseSnapshot;
use crate::utils::parse_cell_address;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use strum::{AsRefStr, Display, EnumIter, EnumString};
use thiserror::Error;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    AsRefStr,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum DocumentCode {
    EnrollmentCertificate,
    AttendanceCertificate,
    EmploymentTerms,
    RecommendationLetter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum CellFormat {
    #[default]
    Text,
    Date,
    Number,
}

/// Failure raised by a value accessor. Always recoverable: the mapping is
/// skipped and generation continues.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AccessError {
    #[error("context has no linked {0}")]
    MissingRelation(&'static str),
    #[error("{0}")]
    Invalid(String),
}

pub type AccessResult = Result<Option<FieldValue>, AccessError>;

/// Pure function from the context to one cell value.
pub type ValueAccessor = fn(&DocumentContext) -> AccessResult;

/// Binds one semantic field to one fixed cell.
#[derive(Clone, Copy)]
pub struct CellMapping {
    pub field: &'static str,
    pub sheet: &'static str,
    pub cell: &'static str,
    pub format: CellFormat,
    pub accessor: ValueAccessor,
}

impl CellMapping {
    pub const fn new(
        field: &'static str,
        sheet: &'static str,
        cell: &'static str,
        format: CellFormat,
        accessor: ValueAccessor,
    ) -> Self {
        Self {
            field,
            sheet,
            cell,
            format,
            accessor,
        }
    }

    pub const fn text(
        field: &'static str,
        sheet: &'static str,
        cell: &'static str,
        accessor: ValueAccessor,
    ) -> Self {
        Self::new(field, sheet, cell, CellFormat::Text, accessor)
    }

    pub const fn date(
        field: &'static str,
        sheet: &'static str,
        cell: &'static str,
        accessor: ValueAccessor,
    ) -> Self {
        Self::new(field, sheet, cell, CellFormat::Date, accessor)
    }

    pub const fn number(
        field: &'static str,
        sheet: &'static str,
        cell: &'static str,
        accessor: ValueAccessor,
    ) -> Self {
        Self::new(field, sheet, cell, CellFormat::Number, accessor)
    }

    pub fn evaluate(&self, context: &DocumentContext) -> AccessResult {
        (self.accessor)(context)
    }
}

impl std::fmt::Debug for CellMapping {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CellMapping")
            .field("field", &self.field)
            .field("sheet", &self.sheet)
            .field("cell", &self.cell)
            .field("format", &self.format)
            .finish()
    }
}

#[derive(Clone, Copy)]
pub struct DocumentDefinition {
    pub code: DocumentCode,
    pub title: &'static str,
    pub template_file: &'static str,
    pub mappings: &'static [CellMapping],
    pub output_name: fn(&DocumentContext) -> String,
}

impl DocumentDefinition {
    pub fn file_name(&self, context: &DocumentContext) -> String {
        (self.output_name)(context)
    }

    /// Sheet names referenced by the mappings, in first-use order.
    pub fn sheet_names(&self) -> Vec<&'static str> {
        let mut seen = HashSet::new();
        self.mappings
            .iter()
            .filter(|mapping| seen.insert(mapping.sheet))
            .map(|mapping| mapping.sheet)
            .collect()
    }
}

impl std::fmt::Debug for DocumentDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentDefinition")
            .field("code", &self.code)
            .field("template_file", &self.template_file)
            .field("mappings", &self.mappings.len())
            .finish()
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("document code {0} registered twice")]
    DuplicateCode(DocumentCode),
    #[error("document {code}: mapping '{field}' has invalid cell address '{cell}'")]
    InvalidAddress {
        code: DocumentCode,
        field: &'static str,
        cell: &'static str,
    },
}

/// Ordered catalog of document definitions.
///
/// Populated once through [`RegistryBuilder`] and read-only afterwards.
#[derive(Debug, Clone)]
pub struct DocumentRegistry {
    definitions: Vec<DocumentDefinition>,
}

impl DocumentRegistry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// The school's standard document set.
    pub fn standard() -> Result<Self, RegistryError> {
        catalog::STANDARD_DOCUMENTS
            .iter()
            .try_fold(Self::builder(), |builder, definition| {
                builder.register(*definition)
            })
            .map(RegistryBuilder::build)
    }

    pub fn get(&self, code: DocumentCode) -> Option<&DocumentDefinition> {
        self.definitions.iter().find(|def| def.code == code)
    }

    pub fn definitions(&self) -> &[DocumentDefinition] {
        &self.definitions
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

#[derive(Debug, Default)]
pub struct RegistryBuilder {
    definitions: Vec<DocumentDefinition>,
}

impl RegistryBuilder {
    /// Appends a definition, rejecting duplicate codes and malformed cell
    /// addresses up front.
    pub fn register(mut self, definition: DocumentDefinition) -> Result<Self, RegistryError> {
        if self.definitions.iter().any(|def| def.code == definition.code) {
            return Err(RegistryError::DuplicateCode(definition.code));
        }
        if let Some(bad) = definition
            .mappings
            .iter()
            .find(|mapping| parse_cell_address(mapping.cell).is_none())
        {
            return Err(RegistryError::InvalidAddress {
                code: definition.code,
                field: bad.field,
                cell: bad.cell,
            });
        }
        self.definitions.push(definition);
        Ok(self)
    }

    pub fn build(self) -> DocumentRegistry {
        DocumentRegistry {
            definitions: self.definitions,
        }
    }
}

// Accessor helpers used by the catalog tables.

pub fn text(value: impl Into<String>) -> AccessResult {
    Ok(Some(FieldValue::Text(value.into())))
}

pub fn opt_text(value: Option<&str>) -> AccessResult {
    Ok(value.map(|v| FieldValue::Text(v.to_string())))
}

pub fn opt_date(value: Option<NaiveDate>) -> AccessResult {
    Ok(value.map(FieldValue::Date))
}

pub fn opt_number(value: Option<f64>) -> AccessResult {
    Ok(value.map(FieldValue::Number))
}

pub fn opt_integer(value: Option<i64>) -> AccessResult {
    Ok(value.map(FieldValue::from))
}

pub fn linked_case(context: &DocumentContext) -> Result<&CaseSnapshot, AccessError> {
    context.case().ok_or(AccessError::MissingRelation("case"))
}
