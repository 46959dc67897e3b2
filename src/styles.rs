//! Small style presets for generated forms.

use umya_spreadsheet::structs::VerticalAlignmentValues;
use umya_spreadsheet::{Border, PatternValues, Style, Worksheet};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CellStyle {
    pub bold: bool,
    pub font_size: Option<f64>,
    /// ARGB, e.g. `FFFFF2CC`.
    pub fill: Option<&'static str>,
    pub border: Option<&'static str>,
    pub wrap_text: bool,
    pub number_format: Option<&'static str>,
}

pub const TITLE: CellStyle = CellStyle {
    bold: true,
    font_size: Some(14.0),
    fill: None,
    border: None,
    wrap_text: false,
    number_format: None,
};

pub const SECTION: CellStyle = CellStyle {
    bold: true,
    font_size: Some(11.0),
    fill: None,
    border: None,
    wrap_text: false,
    number_format: None,
};

pub const HEADER: CellStyle = CellStyle {
    bold: true,
    font_size: None,
    fill: Some("FFD9E1F2"),
    border: Some(Border::BORDER_THIN),
    wrap_text: true,
    number_format: None,
};

pub const LABEL: CellStyle = CellStyle {
    bold: false,
    font_size: None,
    fill: Some("FFF2F2F2"),
    border: Some(Border::BORDER_THIN),
    wrap_text: true,
    number_format: None,
};

/// Cells the company is expected to fill in.
pub const INPUT: CellStyle = CellStyle {
    bold: false,
    font_size: None,
    fill: Some("FFFFF2CC"),
    border: Some(Border::BORDER_THIN),
    wrap_text: false,
    number_format: None,
};

pub const INPUT_AMOUNT: CellStyle = CellStyle {
    number_format: Some("#,##0"),
    ..INPUT
};

pub fn apply_cell_style(sheet: &mut Worksheet, address: &str, preset: &CellStyle) {
    apply_to_style(sheet.get_style_mut(address), preset);
}

fn apply_to_style(style: &mut Style, preset: &CellStyle) {
    let font = style.get_font_mut();
    if preset.bold {
        font.set_bold(true);
    }
    if let Some(size) = preset.font_size {
        font.set_size(size);
    }

    if let Some(argb) = preset.fill {
        let pattern = style.get_fill_mut().get_pattern_fill_mut();
        pattern.set_pattern_type(PatternValues::Solid);
        pattern.get_foreground_color_mut().set_argb(argb);
    }

    if let Some(border_style) = preset.border {
        let borders = style.get_borders_mut();
        borders.get_left_border_mut().set_border_style(border_style);
        borders.get_right_border_mut().set_border_style(border_style);
        borders.get_top_border_mut().set_border_style(border_style);
        borders.get_bottom_border_mut().set_border_style(border_style);
    }

    let alignment = style.get_alignment_mut();
    alignment.set_vertical(VerticalAlignmentValues::Center);
    if preset.wrap_text {
        alignment.set_wrap_text(true);
    }

    if let Some(code) = preset.number_format {
        style.get_number_format_mut().set_format_code(code);
    }
}
