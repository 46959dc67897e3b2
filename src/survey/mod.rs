//! Company survey form: export to a partner company and re-import its edits.
//!
//! The writer and reader share one [`LayoutContract`], so a row or column can
//! only move in one place.

pub mod layout;
pub mod reader;
pub mod writer;

pub use layout::{FieldSlot, FinancialSection, LayoutContract, StaffSection, SURVEY_LAYOUT};
pub use reader::{ParseError, parse_form};
pub use writer::{FormError, build_form, write_form_bytes};

use crate::model::CompanyId;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SurveyField {
    CompanyName,
    Representative,
    PostalCode,
    Address,
    Phone,
    Industry,
    EstablishedYear,
    Capital,
    EmployeeCount,
    ForeignEmployeeCount,
    ContactPerson,
    ContactEmail,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Integer,
}

impl SurveyField {
    pub fn kind(self) -> FieldKind {
        match self {
            SurveyField::EstablishedYear
            | SurveyField::Capital
            | SurveyField::EmployeeCount
            | SurveyField::ForeignEmployeeCount => FieldKind::Integer,
            _ => FieldKind::Text,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SurveyField::CompanyName => "企業名",
            SurveyField::Representative => "代表者名",
            SurveyField::PostalCode => "郵便番号",
            SurveyField::Address => "所在地",
            SurveyField::Phone => "電話番号",
            SurveyField::Industry => "業種",
            SurveyField::EstablishedYear => "設立年",
            SurveyField::Capital => "資本金（円）",
            SurveyField::EmployeeCount => "従業員数",
            SurveyField::ForeignEmployeeCount => "外国人従業員数",
            SurveyField::ContactPerson => "担当者名",
            SurveyField::ContactEmail => "担当者メールアドレス",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnswerValue {
    Text(String),
    Integer(i64),
}

/// Flat key/value answers of the survey's first section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurveyAnswers {
    pub company_name: Option<String>,
    pub representative: Option<String>,
    pub postal_code: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub industry: Option<String>,
    pub established_year: Option<i64>,
    pub capital: Option<i64>,
    pub employee_count: Option<i64>,
    pub foreign_employee_count: Option<i64>,
    pub contact_person: Option<String>,
    pub contact_email: Option<String>,
}

impl SurveyAnswers {
    pub fn get(&self, field: SurveyField) -> Option<AnswerValue> {
        let text = |v: &Option<String>| v.clone().map(AnswerValue::Text);
        let int = |v: &Option<i64>| v.map(AnswerValue::Integer);
        match field {
            SurveyField::CompanyName => text(&self.company_name),
            SurveyField::Representative => text(&self.representative),
            SurveyField::PostalCode => text(&self.postal_code),
            SurveyField::Address => text(&self.address),
            SurveyField::Phone => text(&self.phone),
            SurveyField::Industry => text(&self.industry),
            SurveyField::EstablishedYear => int(&self.established_year),
            SurveyField::Capital => int(&self.capital),
            SurveyField::EmployeeCount => int(&self.employee_count),
            SurveyField::ForeignEmployeeCount => int(&self.foreign_employee_count),
            SurveyField::ContactPerson => text(&self.contact_person),
            SurveyField::ContactEmail => text(&self.contact_email),
        }
    }

    /// Stores a value. A value of the wrong kind for the field is ignored.
    pub fn set(&mut self, field: SurveyField, value: AnswerValue) {
        match (field, value) {
            (SurveyField::CompanyName, AnswerValue::Text(v)) => self.company_name = Some(v),
            (SurveyField::Representative, AnswerValue::Text(v)) => self.representative = Some(v),
            (SurveyField::PostalCode, AnswerValue::Text(v)) => self.postal_code = Some(v),
            (SurveyField::Address, AnswerValue::Text(v)) => self.address = Some(v),
            (SurveyField::Phone, AnswerValue::Text(v)) => self.phone = Some(v),
            (SurveyField::Industry, AnswerValue::Text(v)) => self.industry = Some(v),
            (SurveyField::EstablishedYear, AnswerValue::Integer(v)) => {
                self.established_year = Some(v)
            }
            (SurveyField::Capital, AnswerValue::Integer(v)) => self.capital = Some(v),
            (SurveyField::EmployeeCount, AnswerValue::Integer(v)) => self.employee_count = Some(v),
            (SurveyField::ForeignEmployeeCount, AnswerValue::Integer(v)) => {
                self.foreign_employee_count = Some(v)
            }
            (SurveyField::ContactPerson, AnswerValue::Text(v)) => self.contact_person = Some(v),
            (SurveyField::ContactEmail, AnswerValue::Text(v)) => self.contact_email = Some(v),
            (field, _) => {
                tracing::debug!(%field, "answer kind does not match field; ignored");
            }
        }
    }

    /// Seeds answers from the company's master record for a first export.
    pub fn from_company(company: &crate::model::CompanySnapshot) -> Self {
        Self {
            company_name: Some(company.name.clone()),
            representative: company.representative.clone(),
            postal_code: company.postal_code.clone(),
            address: company.address.clone(),
            phone: company.phone.clone(),
            industry: company.industry.clone(),
            employee_count: company.employee_count,
            ..Self::default()
        }
    }
}

/// One row of the staff table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StaffRow {
    pub name: String,
    pub nationality: String,
    pub position: String,
    pub hired_on: String,
    pub residence_status: String,
}

/// One fiscal year of the financial table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinancialRow {
    pub fiscal_year: i32,
    #[serde(default)]
    pub revenue: Option<i64>,
    #[serde(default)]
    pub ordinary_income: Option<i64>,
}

impl FinancialRow {
    pub fn is_empty(&self) -> bool {
        self.revenue.is_none() && self.ordinary_income.is_none()
    }
}

/// Everything the writer needs. The writer is a pure function of this value.
#[derive(Debug, Clone)]
pub struct SurveyInput {
    pub company_id: CompanyId,
    pub display_name: String,
    pub answers: SurveyAnswers,
    pub staff: Vec<StaffRow>,
    pub financials: Vec<FinancialRow>,
    /// Date the form is prepared; drives which fiscal years are listed.
    pub as_of: NaiveDate,
}

/// Result of importing a filled-in survey.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedSurvey {
    pub company_id: CompanyId,
    pub answers: SurveyAnswers,
    pub staff: Vec<StaffRow>,
    pub financials: Vec<FinancialRow>,
    /// Cells that held something but could not be read as their field's type.
    pub warnings: Vec<String>,
}

/// Fiscal years start in April. Returns the most recent year that has
/// closed as of `date`.
pub fn latest_closed_fiscal_year(date: NaiveDate) -> i32 {
    let current = if date.month() >= 4 {
        date.year()
    } else {
        date.year() - 1
    };
    current - 1
}
