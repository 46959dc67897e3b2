//! Byte-level workbook I/O and cell reads.
//!
//! Every call opens its own `Spreadsheet` from its own buffer; nothing here
//! caches or shares workbook state between calls.

use std::io::Cursor;
use umya_spreadsheet::{Spreadsheet, Worksheet};

pub fn open_workbook(bytes: &[u8]) -> Result<Spreadsheet, String> {
    umya_spreadsheet::reader::xlsx::read_reader(Cursor::new(bytes), true)
        .map_err(|err| err.to_string())
}

pub fn workbook_to_bytes(book: &Spreadsheet) -> Result<Vec<u8>, String> {
    let mut cursor = Cursor::new(Vec::new());
    umya_spreadsheet::writer::xlsx::write_writer(book, &mut cursor)
        .map_err(|err| err.to_string())?;
    Ok(cursor.into_inner())
}

/// Plain text of a cell exactly as stored. Rich text runs are concatenated.
/// Missing cells read as an empty string.
pub fn cell_text(sheet: &Worksheet, address: &str) -> String {
    sheet
        .get_cell(address)
        .map(|cell| cell.get_value().into_owned())
        .unwrap_or_default()
}

/// Whether a cell read by [`cell_text`] holds nothing but whitespace.
pub fn is_blank(text: &str) -> bool {
    text.trim().is_empty()
}

/// Number format code of a cell, if the template sets one other than General.
pub fn cell_number_format(sheet: &Worksheet, address: &str) -> Option<String> {
    let cell = sheet.get_cell(address)?;
    let code = cell.get_style().get_number_format()?.get_format_code();
    if code.eq_ignore_ascii_case("general") {
        None
    } else {
        Some(code.to_string())
    }
}
