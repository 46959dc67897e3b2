//! Record snapshots handed to the engine by the record store.
//!
//! Snapshots are plain read-only values. The engine never writes them back;
//! whatever the store returns is what gets rendered.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! record_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

record_id!(
    /// Identifier of a student record (the subject of generated documents).
    StudentId
);
record_id!(
    /// Identifier of a partner company. Doubles as the survey correlation key.
    CompanyId
);
record_id!(
    /// Identifier of a placement case linking a student to a company.
    CaseId
);

impl CompanyId {
    const MAX_LENGTH: usize = 64;

    /// Parses a correlation key read back from a spreadsheet cell.
    ///
    /// Any non-blank text is a key; surrounding whitespace is dropped. An
    /// all-digit key written back by spreadsheet software as `1024.0` is
    /// normalised to `1024`. Other keys are kept verbatim, so `V1.0` stays
    /// `V1.0`.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        let key = match trimmed.strip_suffix(".0") {
            Some(head) if !head.is_empty() && head.bytes().all(|b| b.is_ascii_digit()) => head,
            _ => trimmed,
        };
        if key.is_empty() || key.chars().count() > Self::MAX_LENGTH {
            return None;
        }
        Some(Self(key.to_string()))
    }

    /// Whether this id survives a write to a cell and a [`CompanyId::parse`]
    /// back unchanged.
    pub fn is_cell_safe(&self) -> bool {
        Self::parse(&self.0).as_ref() == Some(self)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentSnapshot {
    pub id: StudentId,
    pub family_name: String,
    pub given_name: String,
    #[serde(default)]
    pub name_kana: Option<String>,
    #[serde(default)]
    pub nationality: Option<String>,
    #[serde(default)]
    pub birth_date: Option<NaiveDate>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub passport_number: Option<String>,
    #[serde(default)]
    pub residence_card_number: Option<String>,
    #[serde(default)]
    pub course: Option<String>,
    #[serde(default)]
    pub enrolled_on: Option<NaiveDate>,
    #[serde(default)]
    pub expected_graduation: Option<NaiveDate>,
    #[serde(default)]
    pub address: Option<String>,
    /// Attendance rate as a percentage (0-100).
    #[serde(default)]
    pub attendance_rate: Option<f64>,
    #[serde(default)]
    pub jlpt_level: Option<String>,
    #[serde(default)]
    pub company_id: Option<CompanyId>,
    #[serde(default)]
    pub case_id: Option<CaseId>,
}

impl StudentSnapshot {
    /// Name as printed on documents: family name first, separated by a space.
    pub fn display_name(&self) -> String {
        match (self.family_name.trim(), self.given_name.trim()) {
            ("", given) => given.to_string(),
            (family, "") => family.to_string(),
            (family, given) => format!("{family} {given}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanySnapshot {
    pub id: CompanyId,
    pub name: String,
    #[serde(default)]
    pub representative: Option<String>,
    #[serde(default)]
    pub postal_code: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub industry: Option<String>,
    #[serde(default)]
    pub employee_count: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseSnapshot {
    pub id: CaseId,
    #[serde(default)]
    pub job_title: Option<String>,
    #[serde(default)]
    pub work_location: Option<String>,
    #[serde(default)]
    pub monthly_salary: Option<i64>,
    #[serde(default)]
    pub contract_start: Option<NaiveDate>,
    #[serde(default)]
    pub contract_end: Option<NaiveDate>,
    #[serde(default)]
    pub weekly_hours: Option<f64>,
    #[serde(default)]
    pub status: Option<String>,
}

/// Fixed organisational constants printed on every document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchoolProfile {
    pub name: String,
    pub principal: String,
    #[serde(default)]
    pub postal_code: Option<String>,
    pub address: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub registration_number: Option<String>,
}

impl Default for SchoolProfile {
    fn default() -> Self {
        Self {
            name: "School".to_string(),
            principal: String::new(),
            postal_code: None,
            address: String::new(),
            phone: None,
            registration_number: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn company_id_parse_accepts_plain_and_numeric_forms() {
        assert_eq!(CompanyId::parse(" C-001 "), Some(CompanyId::new("C-001")));
        assert_eq!(CompanyId::parse("1024.0"), Some(CompanyId::new("1024")));
        assert_eq!(CompanyId::parse(""), None);
        assert_eq!(CompanyId::parse("   "), None);
        assert_eq!(CompanyId::parse("株式会社"), Some(CompanyId::new("株式会社")));
        assert_eq!(CompanyId::parse("a b"), Some(CompanyId::new("a b")));
    }

    #[test]
    fn only_all_digit_keys_lose_a_trailing_zero_fraction() {
        assert_eq!(CompanyId::parse("V1.0"), Some(CompanyId::new("V1.0")));
        assert_eq!(CompanyId::parse(".0"), Some(CompanyId::new(".0")));
        assert_eq!(CompanyId::parse("7.0"), Some(CompanyId::new("7")));
    }

    #[test]
    fn cell_safety_matches_parse() {
        assert!(CompanyId::new("C 001").is_cell_safe());
        assert!(CompanyId::new("会社-1").is_cell_safe());
        assert!(!CompanyId::new("1024.0").is_cell_safe());
        assert!(!CompanyId::new(" padded").is_cell_safe());
        assert!(!CompanyId::new("").is_cell_safe());
        assert!(!CompanyId::new("x".repeat(65)).is_cell_safe());
    }

    #[test]
    fn display_name_handles_missing_parts() {
        let mut student = StudentSnapshot {
            id: StudentId::new("S1"),
            family_name: "NGUYEN".into(),
            given_name: "VAN AN".into(),
            name_kana: None,
            nationality: None,
            birth_date: None,
            gender: None,
            passport_number: None,
            residence_card_number: None,
            course: None,
            enrolled_on: None,
            expected_graduation: None,
            address: None,
            attendance_rate: None,
            jlpt_level: None,
            company_id: None,
            case_id: None,
        };
        assert_eq!(student.display_name(), "NGUYEN VAN AN");
        student.given_name.clear();
        assert_eq!(student.display_name(), "NGUYEN");
    }
}
