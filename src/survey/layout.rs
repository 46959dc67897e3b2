use super::SurveyField;
use crate::utils::cell_address;

/// Row of the key/value section bound to one field. The label sits in the
/// contract's label column, the answer in its value column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSlot {
    pub field: SurveyField,
    pub row: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaffSection {
    pub title_row: u32,
    pub header_row: u32,
    pub first_row: u32,
    pub max_rows: u32,
    pub name_column: u32,
    pub nationality_column: u32,
    pub position_column: u32,
    pub hired_on_column: u32,
    pub residence_status_column: u32,
}

impl StaffSection {
    /// Sheet row of the `index`-th entry, or `None` past the declared maximum.
    pub fn row(&self, index: u32) -> Option<u32> {
        (index < self.max_rows).then(|| self.first_row + index)
    }

    pub fn headers(&self) -> [(u32, &'static str); 5] {
        [
            (self.name_column, "氏名"),
            (self.nationality_column, "国籍"),
            (self.position_column, "職種"),
            (self.hired_on_column, "雇用開始日"),
            (self.residence_status_column, "在留資格"),
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FinancialSection {
    pub title_row: u32,
    pub header_row: u32,
    pub first_row: u32,
    pub rows: u32,
    pub label_column: u32,
    pub revenue_column: u32,
    pub income_column: u32,
}

impl FinancialSection {
    pub fn row(&self, index: u32) -> Option<u32> {
        (index < self.rows).then(|| self.first_row + index)
    }

    pub fn headers(&self) -> [(u32, &'static str); 3] {
        [
            (self.label_column, "年度"),
            (self.revenue_column, "売上高（円）"),
            (self.income_column, "経常利益（円）"),
        ]
    }

    pub fn year_label(year: i32) -> String {
        format!("{year}年度")
    }
}

/// The single-sheet layout shared by the survey writer and reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutContract {
    pub sheet_name: &'static str,
    pub title: &'static str,
    pub title_row: u32,
    pub subject_name_row: u32,
    pub subject_id_row: u32,
    /// Rightmost column of the title and value merges.
    pub last_column: u32,
    pub fields_title_row: u32,
    pub label_column: u32,
    pub value_column: u32,
    pub fields: &'static [FieldSlot],
    pub staff: StaffSection,
    pub financial: FinancialSection,
    pub correlation_column: u32,
    pub correlation_row: u32,
}

const STANDARD_FIELDS: &[FieldSlot] = &[
    FieldSlot { field: SurveyField::CompanyName, row: 6 },
    FieldSlot { field: SurveyField::Representative, row: 7 },
    FieldSlot { field: SurveyField::PostalCode, row: 8 },
    FieldSlot { field: SurveyField::Address, row: 9 },
    FieldSlot { field: SurveyField::Phone, row: 10 },
    FieldSlot { field: SurveyField::Industry, row: 11 },
    FieldSlot { field: SurveyField::EstablishedYear, row: 12 },
    FieldSlot { field: SurveyField::Capital, row: 13 },
    FieldSlot { field: SurveyField::EmployeeCount, row: 14 },
    FieldSlot { field: SurveyField::ForeignEmployeeCount, row: 15 },
    FieldSlot { field: SurveyField::ContactPerson, row: 16 },
    FieldSlot { field: SurveyField::ContactEmail, row: 17 },
];

pub const SURVEY_LAYOUT: LayoutContract = LayoutContract {
    sheet_name: "企業調査票",
    title: "受入企業調査票",
    title_row: 1,
    subject_name_row: 2,
    subject_id_row: 3,
    last_column: 5,
    fields_title_row: 5,
    label_column: 1,
    value_column: 2,
    fields: STANDARD_FIELDS,
    staff: StaffSection {
        title_row: 19,
        header_row: 20,
        first_row: 21,
        max_rows: 10,
        name_column: 1,
        nationality_column: 2,
        position_column: 3,
        hired_on_column: 4,
        residence_status_column: 5,
    },
    financial: FinancialSection {
        title_row: 32,
        header_row: 33,
        first_row: 34,
        rows: 3,
        label_column: 1,
        revenue_column: 2,
        income_column: 3,
    },
    // Column Z, hidden.
    correlation_column: 26,
    correlation_row: 1,
};

impl LayoutContract {
    pub fn correlation_cell(&self) -> String {
        cell_address(self.correlation_column, self.correlation_row)
    }

    pub fn label_cell(&self, row: u32) -> String {
        cell_address(self.label_column, row)
    }

    pub fn value_cell(&self, row: u32) -> String {
        cell_address(self.value_column, row)
    }
}

impl Default for LayoutContract {
    fn default() -> Self {
        SURVEY_LAYOUT
    }
}
