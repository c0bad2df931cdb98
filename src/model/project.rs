//! Project allocations (kept on the employee row, columns I..K) and the append-only
//! project status log.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::employee::Employee;
use super::{cell, opt_cell, parse_sheet_date, to_cells};
use crate::sheets::Row;

pub const HOURS_PER_WEEKDAY: f64 = 8.0;

/// Weekdays in `[start, today)`. A day counts once it is over.
pub fn weekdays_elapsed(start: NaiveDate, today: NaiveDate) -> i64 {
    let days = (today - start).num_days();
    if days <= 0 {
        return 0;
    }
    let full_weeks = days / 7;
    let mut count = full_weeks * 5;
    let mut day = start + Duration::days(full_weeks * 7);
    while day < today {
        if !matches!(day.weekday(), Weekday::Sat | Weekday::Sun) {
            count += 1;
        }
        day += Duration::days(1);
    }
    count
}

/// `allocated - 8h per elapsed weekday`, never below zero.
pub fn remaining_hours(allocated: f64, start: NaiveDate, today: NaiveDate) -> f64 {
    (allocated - HOURS_PER_WEEKDAY * weekdays_elapsed(start, today) as f64).max(0.0)
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProjectAllocation {
    pub employee_email: String,
    pub project_name: String,
    pub department: String,
    /// Snapshot currently stored in the sheet.
    pub allocated_hours: f64,
    /// Reference date of the stored snapshot.
    pub start_date: String,
    /// Snapshot minus the weekdays consumed since `start_date`.
    pub remaining_hours: f64,
}

impl ProjectAllocation {
    /// `None` unless the employee has a project with a readable hour count. An
    /// unparseable start date is treated as "nothing consumed yet".
    pub fn from_employee(employee: &Employee, today: NaiveDate) -> Option<Self> {
        let project_name = employee.project_name.clone()?;
        let allocated = employee.allocated_hours?;
        let start_date = employee.start_date.clone().unwrap_or_default();
        let remaining = parse_sheet_date(&start_date)
            .map(|start| remaining_hours(allocated, start, today))
            .unwrap_or(allocated);

        Some(Self {
            employee_email: employee.email.clone(),
            project_name,
            department: employee.department.clone(),
            allocated_hours: allocated,
            start_date,
            remaining_hours: remaining,
        })
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewAllocation {
    pub employee_email: String,
    #[schema(example = "Payments")]
    pub project_name: String,
    #[schema(example = 160)]
    pub allocated_hours: f64,
    #[schema(example = "2026-03-02", value_type = String, format = "date")]
    pub start_date: NaiveDate,
    /// Department of the allocating admin; checked against the employee's.
    pub department: Option<String>,
}

pub mod status_col {
    pub const EMPLOYEE_EMAIL: usize = 0;
    pub const PROJECT_NAME: usize = 1;
    pub const TIMESTAMP: usize = 2;
    pub const SCREENSHOT_URL: usize = 3;
    pub const FEEDBACK: usize = 4;
    pub const LAST: usize = FEEDBACK;
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProjectStatus {
    pub employee_email: String,
    pub project_name: String,
    pub timestamp: String,
    #[serde(rename = "screenshotURL")]
    pub screenshot_url: Option<String>,
    pub feedback: String,
}

impl ProjectStatus {
    pub fn from_row(row: &Row) -> Option<Self> {
        Some(Self {
            employee_email: opt_cell(row, status_col::EMPLOYEE_EMAIL)?,
            project_name: cell(row, status_col::PROJECT_NAME),
            timestamp: cell(row, status_col::TIMESTAMP),
            screenshot_url: opt_cell(row, status_col::SCREENSHOT_URL),
            feedback: cell(row, status_col::FEEDBACK),
        })
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewProjectStatus {
    pub employee_email: String,
    pub project_name: String,
    /// Defaults to the submission time.
    pub timestamp: Option<String>,
    #[serde(rename = "screenshotURL")]
    pub screenshot_url: Option<String>,
    #[serde(default)]
    pub feedback: String,
}

impl NewProjectStatus {
    pub fn to_row(&self, timestamp: &str) -> Row {
        to_cells([
            self.employee_email.trim(),
            self.project_name.trim(),
            timestamp,
            self.screenshot_url.as_deref().unwrap_or_default().trim(),
            self.feedback.trim(),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    // 2026-03-02 is a Monday.
    #[rstest]
    #[case(date(2026, 3, 2), 0)]
    #[case(date(2026, 3, 5), 3)]
    #[case(date(2026, 3, 7), 5)]
    #[case(date(2026, 3, 9), 5)]
    #[case(date(2026, 3, 10), 6)]
    #[case(date(2026, 3, 30), 20)]
    #[case(date(2026, 2, 27), 0)]
    fn counts_weekdays_only(#[case] today: NaiveDate, #[case] expected: i64) {
        assert_eq!(weekdays_elapsed(date(2026, 3, 2), today), expected);
    }

    #[test]
    fn three_weekdays_after_a_monday_leaves_136_of_160() {
        assert_eq!(remaining_hours(160.0, date(2026, 3, 2), date(2026, 3, 5)), 136.0);
    }

    #[test]
    fn weekends_do_not_consume_hours() {
        // Saturday start, checked on Monday.
        assert_eq!(remaining_hours(16.0, date(2026, 3, 7), date(2026, 3, 9)), 16.0);
    }

    #[test]
    fn remaining_hours_floor_at_zero() {
        assert_eq!(remaining_hours(16.0, date(2026, 3, 2), date(2026, 4, 2)), 0.0);
    }
}
