pub fn column_number_to_name(column: u32) -> String {
    let mut column = column;
    let mut name = String::new();
    while column > 0 {
        let rem = ((column - 1) % 26) as u8;
        name.insert(0, (b'A' + rem) as char);
        column = (column - 1) / 26;
    }
    name
}

pub fn column_name_to_number(name: &str) -> Option<u32> {
    if name.is_empty() || name.len() > 3 {
        return None;
    }
    let mut column = 0u32;
    for ch in name.chars() {
        if !ch.is_ascii_alphabetic() {
            return None;
        }
        column = column * 26 + (ch.to_ascii_uppercase() as u32 - 'A' as u32 + 1);
    }
    (column <= MAX_COLUMN).then_some(column)
}

pub fn cell_address(column: u32, row: u32) -> String {
    format!("{}{}", column_number_to_name(column), row)
}

const MAX_COLUMN: u32 = 16_384;
const MAX_ROW: u32 = 1_048_576;

/// Splits an A1-style address into `(column, row)`, both 1-based.
///
/// Absolute markers (`$B$4`) are accepted. Ranges, sheet-qualified
/// addresses and anything outside the sheet grid are rejected.
pub fn parse_cell_address(address: &str) -> Option<(u32, u32)> {
    let cleaned: String = address.trim().chars().filter(|ch| *ch != '$').collect();
    let split = cleaned.find(|ch: char| ch.is_ascii_digit())?;
    let (letters, digits) = cleaned.split_at(split);
    let column = column_name_to_number(letters)?;
    if !digits.chars().all(|ch| ch.is_ascii_digit()) {
        return None;
    }
    let row = digits.parse::<u32>().ok()?;
    if row == 0 || row > MAX_ROW {
        return None;
    }
    Some((column, row))
}

/// Replaces characters that are not allowed in file or archive entry names.
pub fn sanitize_file_component(raw: &str) -> String {
    let cleaned: String = raw
        .trim()
        .chars()
        .map(|ch| match ch {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            ch if ch.is_control() => '_',
            ch => ch,
        })
        .collect();
    let cleaned = cleaned.trim_matches('.').trim().to_string();
    if cleaned.is_empty() {
        "unnamed".to_string()
    } else {
        cleaned
    }
}
