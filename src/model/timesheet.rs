use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{cell, format_hours, format_sheet_date, opt_cell, parse_hours, parse_sheet_date, to_cells};
use crate::sheets::Row;

pub mod col {
    pub const EMAIL: usize = 0;
    pub const DATE: usize = 1;
    pub const PROJECT: usize = 2;
    pub const TASK: usize = 3;
    pub const DURATION: usize = 4;
    pub const DEPARTMENT: usize = 5;
    pub const LAST: usize = DEPARTMENT;
}

/// Append-only log entry; duplicates are allowed.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TimesheetEntry {
    pub email: String,
    #[schema(example = "2026-03-02")]
    pub date: String,
    pub project: String,
    pub task: String,
    /// Hours; `None` if the cell is not a number.
    #[schema(example = 7.5)]
    pub duration: Option<f64>,
    pub department: Option<String>,
}

impl TimesheetEntry {
    pub fn from_row(row: &Row) -> Option<Self> {
        Some(Self {
            email: opt_cell(row, col::EMAIL)?,
            date: cell(row, col::DATE),
            project: cell(row, col::PROJECT),
            task: cell(row, col::TASK),
            duration: parse_hours(&cell(row, col::DURATION)),
            department: opt_cell(row, col::DEPARTMENT),
        })
    }

    /// Logged for `day` with a positive number of hours.
    pub fn counts_for(&self, day: NaiveDate) -> bool {
        parse_sheet_date(&self.date) == Some(day) && self.duration.is_some_and(|d| d > 0.0)
    }
}

/// Submission payload. Admins log on behalf of someone through `employeeEmail`;
/// otherwise the entry belongs to `email`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewTimesheet {
    pub employee_email: Option<String>,
    pub email: Option<String>,
    #[schema(example = "Payments")]
    pub project: String,
    #[schema(example = "Code review")]
    pub task: String,
    #[schema(example = 7.5)]
    pub duration: f64,
}

impl NewTimesheet {
    pub fn target_email(&self) -> Option<&str> {
        self.employee_email
            .as_deref()
            .filter(|e| !e.trim().is_empty())
            .or(self.email.as_deref())
            .map(str::trim)
            .filter(|e| !e.is_empty())
    }

    /// The date column is always the submission day, never caller supplied.
    pub fn to_row(&self, email: &str, today: NaiveDate, department: &str) -> Row {
        to_cells([
            email.to_string(),
            format_sheet_date(today),
            self.project.trim().to_string(),
            self.task.trim().to_string(),
            format_hours(self.duration),
            department.to_string(),
        ])
    }
}
