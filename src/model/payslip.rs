use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{cell, opt_cell, to_cells};
use crate::sheets::Row;

pub mod col {
    pub const EMAIL: usize = 0;
    pub const MONTH: usize = 1;
    pub const YEAR: usize = 2;
    pub const URL: usize = 3;
    pub const DEPARTMENT: usize = 4;
    pub const LAST: usize = DEPARTMENT;
}

const MONTH_NAMES: [&str; 12] = [
    "january", "february", "march", "april", "may", "june", "july", "august", "september",
    "october", "november", "december",
];

/// Logically keyed by (email, month, year) but never checked for duplicates.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Payslip {
    pub email: String,
    #[schema(example = "March")]
    pub month: String,
    #[schema(example = "2026")]
    pub year: String,
    pub url: Option<String>,
    pub department: Option<String>,
}

impl Payslip {
    pub fn from_row(row: &Row) -> Option<Self> {
        Some(Self {
            email: opt_cell(row, col::EMAIL)?,
            month: cell(row, col::MONTH),
            year: cell(row, col::YEAR),
            url: opt_cell(row, col::URL),
            department: opt_cell(row, col::DEPARTMENT),
        })
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct NewPayslip {
    pub email: String,
    /// Month name or number 1-12.
    #[schema(example = "March")]
    pub month: String,
    #[schema(example = "2026")]
    pub year: String,
    #[schema(example = "https://drive.google.com/file/d/abc/view")]
    pub url: String,
}

impl NewPayslip {
    pub fn month_is_valid(&self) -> bool {
        let month = self.month.trim();
        match month.parse::<u32>() {
            Ok(n) => (1..=12).contains(&n),
            Err(_) => MONTH_NAMES.contains(&month.to_ascii_lowercase().as_str()),
        }
    }

    pub fn year_is_valid(&self) -> bool {
        let year = self.year.trim();
        year.len() == 4 && year.chars().all(|c| c.is_ascii_digit())
    }

    pub fn to_row(&self, department: &str) -> Row {
        to_cells([
            self.email.trim(),
            self.month.trim(),
            self.year.trim(),
            self.url.trim(),
            department,
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn payslip(month: &str, year: &str) -> NewPayslip {
        NewPayslip {
            email: "a@x.com".into(),
            month: month.into(),
            year: year.into(),
            url: "u".into(),
        }
    }

    #[rstest]
    #[case("March", "2026", true)]
    #[case("march", "2026", true)]
    #[case("3", "2026", true)]
    #[case("13", "2026", false)]
    #[case("Marchember", "2026", false)]
    #[case("March", "26", false)]
    fn validates_month_and_year(#[case] month: &str, #[case] year: &str, #[case] ok: bool) {
        let p = payslip(month, year);
        assert_eq!(p.month_is_valid() && p.year_is_valid(), ok);
    }
}
