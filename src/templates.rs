//! Template lookup and scaffolding.

use crate::documents::{DocumentDefinition, DocumentRegistry};
use crate::generator::GenerateError;
use crate::utils::{cell_address, parse_cell_address};
use crate::workbook::workbook_to_bytes;
use anyhow::Context;
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::info;
use umya_spreadsheet::Spreadsheet;

/// Supplies raw template bytes by file name.
pub trait TemplateSource: Send + Sync {
    fn load(&self, template_file: &str) -> Result<Vec<u8>, GenerateError>;
}

/// Templates stored as files in one directory.
#[derive(Debug, Clone)]
pub struct DirTemplateSource {
    root: PathBuf,
}

impl DirTemplateSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, template_file: &str) -> Option<PathBuf> {
        let relative = Path::new(template_file);
        let escapes = relative.is_absolute()
            || relative
                .components()
                .any(|c| matches!(c, std::path::Component::ParentDir));
        if escapes {
            None
        } else {
            Some(self.root.join(relative))
        }
    }
}

impl TemplateSource for DirTemplateSource {
    fn load(&self, template_file: &str) -> Result<Vec<u8>, GenerateError> {
        let path = self
            .resolve(template_file)
            .ok_or_else(|| GenerateError::TemplateMissing {
                template: template_file.to_string(),
            })?;
        fs::read(&path).map_err(|err| match err.kind() {
            ErrorKind::NotFound => GenerateError::TemplateMissing {
                template: template_file.to_string(),
            },
            _ => GenerateError::TemplateUnreadable {
                template: template_file.to_string(),
                reason: err.to_string(),
            },
        })
    }
}

/// In-memory templates keyed by file name.
impl TemplateSource for BTreeMap<String, Vec<u8>> {
    fn load(&self, template_file: &str) -> Result<Vec<u8>, GenerateError> {
        self.get(template_file)
            .cloned()
            .ok_or_else(|| GenerateError::TemplateMissing {
                template: template_file.to_string(),
            })
    }
}

/// Builds a bare workbook holding every sheet a definition writes to, with
/// each field's name as a label in the cell left of its target.
///
/// Operators restyle these into the real office templates; the generator only
/// depends on the sheet names and target addresses staying put.
pub fn scaffold_template(definition: &DocumentDefinition) -> Result<Spreadsheet, String> {
    let mut book = umya_spreadsheet::new_file_empty_worksheet();
    for sheet_name in definition.sheet_names() {
        book.new_sheet(sheet_name)
            .map_err(|err| format!("failed to create sheet {sheet_name}: {err}"))?;
    }

    for mapping in definition.mappings {
        let Some((column, row)) = parse_cell_address(mapping.cell) else {
            continue;
        };
        let Some(sheet) = book.get_sheet_by_name_mut(mapping.sheet) else {
            continue;
        };
        if column > 1 {
            sheet
                .get_cell_mut(cell_address(column - 1, row).as_str())
                .set_value_string(mapping.field);
        }
    }

    if let Some(sheet) = definition
        .sheet_names()
        .first()
        .and_then(|name| book.get_sheet_by_name_mut(name))
    {
        sheet.get_cell_mut("A1").set_value_string(definition.title);
    }

    Ok(book)
}

/// Writes a scaffold for every template the registry names. Files that
/// already exist are left untouched.
pub fn scaffold_directory(registry: &DocumentRegistry, dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    fs::create_dir_all(dir)
        .with_context(|| format!("failed to create template directory {:?}", dir))?;
    let mut written = Vec::new();
    for definition in registry.definitions() {
        let path = dir.join(definition.template_file);
        if path.exists() {
            info!(path = %path.display(), "template exists; not overwritten");
            continue;
        }
        let book = scaffold_template(definition).map_err(anyhow::Error::msg)?;
        let bytes = workbook_to_bytes(&book).map_err(anyhow::Error::msg)?;
        fs::write(&path, bytes).with_context(|| format!("failed to write {:?}", path))?;
        info!(path = %path.display(), code = %definition.code, "template scaffolded");
        written.push(path);
    }
    Ok(written)
}
