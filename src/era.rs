//! Japanese calendar era (wareki) conversion.
//!
//! Boundaries are exact start dates. A date falling early in a transition
//! year belongs to the previous era, e.g. 2019-04-30 is 平成31年 and
//! 2019-05-01 is 令和元年.

use chrono::{Datelike, NaiveDate};
use std::fmt;
use strum::{AsRefStr, Display, EnumIter, IntoEnumIterator};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr, EnumIter)]
pub enum Era {
    #[strum(serialize = "明治")]
    Meiji,
    #[strum(serialize = "大正")]
    Taisho,
    #[strum(serialize = "昭和")]
    Showa,
    #[strum(serialize = "平成")]
    Heisei,
    #[strum(serialize = "令和")]
    Reiwa,
}

impl Era {
    /// First day of the era in the Gregorian calendar.
    pub fn start(self) -> NaiveDate {
        let (y, m, d) = match self {
            // Gregorian dates before 1873 are proleptic; Meiji is included so
            // historical birth dates still render.
            Era::Meiji => (1868, 10, 23),
            Era::Taisho => (1912, 7, 30),
            Era::Showa => (1926, 12, 25),
            Era::Heisei => (1989, 1, 8),
            Era::Reiwa => (2019, 5, 1),
        };
        NaiveDate::from_ymd_opt(y, m, d).unwrap_or(NaiveDate::MIN)
    }

    pub fn for_date(date: NaiveDate) -> Option<Era> {
        Era::iter().rev().find(|era| date >= era.start())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EraDate {
    pub era: Era,
    pub year: i32,
    pub month: u32,
    pub day: u32,
}

impl EraDate {
    pub fn from_date(date: NaiveDate) -> Option<Self> {
        let era = Era::for_date(date)?;
        Some(Self {
            era,
            year: date.year() - era.start().year() + 1,
            month: date.month(),
            day: date.day(),
        })
    }

    /// Year part only, e.g. `令和6年`.
    pub fn year_label(&self) -> String {
        if self.year == 1 {
            format!("{}元年", self.era)
        } else {
            format!("{}{}年", self.era, self.year)
        }
    }
}

impl fmt::Display for EraDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}月{}日", self.year_label(), self.month, self.day)
    }
}

/// Formats a date as `令和6年4月1日`, falling back to `2024年4月1日` for dates
/// before the first supported era.
pub fn format_wareki(date: NaiveDate) -> String {
    match EraDate::from_date(date) {
        Some(era_date) => era_date.to_string(),
        None => format!("{}年{}月{}日", date.year(), date.month(), date.day()),
    }
}
