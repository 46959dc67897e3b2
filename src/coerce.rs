//! Value coercion shared by the document writer and the survey reader.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A value produced by a mapping accessor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum FieldValue {
    Text(String),
    Number(f64),
    Date(NaiveDate),
}

impl FieldValue {
    /// Empty strings count as "no value": they never overwrite template content.
    pub fn is_blank(&self) -> bool {
        match self {
            FieldValue::Text(text) => text.trim().is_empty(),
            FieldValue::Number(number) => !number.is_finite(),
            FieldValue::Date(_) => false,
        }
    }

    pub fn to_text(&self) -> String {
        match self {
            FieldValue::Text(text) => text.clone(),
            FieldValue::Number(number) => number_to_text(*number),
            FieldValue::Date(date) => date.format("%Y/%m/%d").to_string(),
        }
    }

    pub fn to_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(number) if number.is_finite() => Some(*number),
            FieldValue::Number(_) => None,
            FieldValue::Text(text) => parse_amount(text),
            FieldValue::Date(_) => None,
        }
    }

    pub fn to_date(&self) -> Option<NaiveDate> {
        match self {
            FieldValue::Date(date) => Some(*date),
            FieldValue::Text(text) => parse_date(text),
            FieldValue::Number(_) => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Number(value as f64)
    }
}

impl From<NaiveDate> for FieldValue {
    fn from(value: NaiveDate) -> Self {
        FieldValue::Date(value)
    }
}

/// Renders a number without a trailing `.0` when it is integral.
pub fn number_to_text(number: f64) -> String {
    if number.fract() == 0.0 && number.abs() < 1e15 {
        format!("{}", number as i64)
    } else {
        format!("{}", number)
    }
}

// European style grouping: "12.345.000". A single dot with three trailing
// digits stays a decimal point.
static DOT_GROUPED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^-?\d{1,3}(\.\d{3}){2,}$").expect("valid regex"));

static YEAR_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:^|\D)(\d{4})(?:\D|$)").expect("valid regex"));

const DASHES: &[char] = &['-', '—', '–', '―', '－', 'ー', '‐'];
const GROUP_SEPARATORS: &[char] = &['、', '\'', '’', '_'];
const SPACES: &[char] = &[' ', '\u{00A0}', '\u{2009}', '\u{202F}', '\u{3000}', '\t'];

/// Parses an amount typed by a human.
///
/// Thousands separators in several punctuation styles are stripped, full-width
/// digits are folded to ASCII, a currency mark or trailing `円` is ignored and
/// accounting parentheses mean negative. Empty or dash-only input is `None`,
/// never zero.
pub fn parse_amount(raw: &str) -> Option<f64> {
    let folded: String = raw
        .trim()
        .chars()
        .filter(|ch| !SPACES.contains(ch))
        .map(fold_full_width)
        .collect();

    let mut text = folded.as_str();
    text = text.trim_start_matches(['¥', '￥', '$']);
    text = text.trim_end_matches('円');
    if text.is_empty() || text.chars().all(|ch| DASHES.contains(&ch)) {
        return None;
    }

    let (negative, text) = match text.strip_prefix('(').and_then(|t| t.strip_suffix(')')) {
        Some(inner) => (true, inner),
        None => (false, text),
    };
    let text = match text.strip_prefix(['－', '−']) {
        Some(rest) => format!("-{rest}"),
        None => text.to_string(),
    };

    let stripped: String = text
        .chars()
        .filter(|ch| !GROUP_SEPARATORS.contains(ch))
        .map(|ch| if ch == '，' { ',' } else { ch })
        .collect();
    let digits = normalize_marks(&stripped)?;

    let value = digits.parse::<f64>().ok().filter(|v| v.is_finite())?;
    Some(if negative { -value } else { value })
}

/// Resolves `.` and `,` into a plain decimal string.
///
/// With both marks present the later one is the decimal point and the other
/// groups thousands, so `1.234,5` and `1,234.5` agree. A comma alone groups
/// thousands; a dot alone is a decimal point unless it groups in threes at
/// least twice. A decimal mark that repeats is not a number.
fn normalize_marks(text: &str) -> Option<String> {
    let last_dot = text.rfind('.');
    let last_comma = text.rfind(',');
    let (decimal, grouping) = match (last_dot, last_comma) {
        (Some(dot), Some(comma)) if dot > comma => ('.', ','),
        (Some(_), Some(_)) => (',', '.'),
        (None, Some(_)) => return Some(text.replace(',', "")),
        (Some(_), None) if DOT_GROUPED.is_match(text) => return Some(text.replace('.', "")),
        (Some(_), None) | (None, None) => return Some(text.to_string()),
    };
    let (whole, fraction) = text.rsplit_once(decimal)?;
    if whole.contains(decimal) {
        return None;
    }
    let whole = whole.replace(grouping, "");
    Some(format!("{whole}.{fraction}"))
}

/// [`parse_amount`] rounded to a whole number.
pub fn parse_integer(raw: &str) -> Option<i64> {
    let value = parse_amount(raw)?;
    let rounded = value.round();
    if rounded.abs() > i64::MAX as f64 {
        return None;
    }
    Some(rounded as i64)
}

fn fold_full_width(ch: char) -> char {
    match ch {
        '０'..='９' => char::from_u32(ch as u32 - '０' as u32 + '0' as u32).unwrap_or(ch),
        '．' => '.',
        _ => ch,
    }
}

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%Y.%m.%d", "%Y年%m月%d日"];

pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let folded: String = raw.trim().chars().map(fold_full_width).collect();
    if folded.is_empty() {
        return None;
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(&folded, fmt).ok())
        .or_else(|| {
            // Timestamps such as 2024-04-01T09:00:00 keep only their date part.
            folded
                .get(..10)
                .and_then(|head| NaiveDate::parse_from_str(head, "%Y-%m-%d").ok())
        })
}

/// Extracts the first standalone 4-digit year from a label such as `2024年度`.
pub fn extract_year(label: &str) -> Option<i32> {
    let folded: String = label.chars().map(fold_full_width).collect();
    YEAR_TOKEN
        .captures(&folded)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<i32>().ok())
}

/// Spreadsheet serial day number (1900 date system).
pub fn excel_serial(date: NaiveDate) -> f64 {
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30).unwrap_or(NaiveDate::MIN);
    (date - epoch).num_days() as f64
}
