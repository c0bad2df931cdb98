use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

use super::{cell, format_sheet_date, opt_cell, to_cells};
use crate::sheets::Row;

pub mod col {
    pub const EMAIL: usize = 0;
    pub const LEAVE_TYPE: usize = 1;
    pub const START_DATE: usize = 2;
    pub const END_DATE: usize = 3;
    pub const REASON: usize = 4;
    pub const STATUS: usize = 5;
    pub const DEPARTMENT: usize = 6;
    pub const LAST: usize = DEPARTMENT;
}

#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, Display, EnumString, AsRefStr, ToSchema,
)]
#[strum(ascii_case_insensitive)]
pub enum LeaveType {
    Casual,
    Sick,
    Earned,
}

#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, Display, EnumString, AsRefStr, ToSchema,
)]
#[strum(ascii_case_insensitive)]
pub enum LeaveStatus {
    Pending,
    Approved,
    Rejected,
}

impl LeaveStatus {
    /// Pending -> Approved | Rejected; decided requests never move again.
    pub fn can_become(&self, next: LeaveStatus) -> bool {
        matches!(
            (self, next),
            (LeaveStatus::Pending, LeaveStatus::Approved | LeaveStatus::Rejected)
        )
    }

    /// Counts against the monthly casual-leave allowance.
    pub fn is_active(&self) -> bool {
        matches!(self, LeaveStatus::Pending | LeaveStatus::Approved)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeaveRequest {
    #[schema(example = "asha@company.com")]
    pub email: String,
    /// `None` when the stored cell holds an unknown type.
    pub leave_type: Option<LeaveType>,
    #[schema(example = "2026-03-02")]
    pub start_date: String,
    #[schema(example = "2026-03-03")]
    pub end_date: String,
    pub reason: String,
    pub status: Option<LeaveStatus>,
    /// Copied from the employee when the request was filed.
    pub department: Option<String>,
}

impl LeaveRequest {
    pub fn from_row(row: &Row) -> Option<Self> {
        Some(Self {
            email: opt_cell(row, col::EMAIL)?,
            leave_type: cell(row, col::LEAVE_TYPE).trim().parse().ok(),
            start_date: cell(row, col::START_DATE),
            end_date: cell(row, col::END_DATE),
            reason: cell(row, col::REASON),
            status: cell(row, col::STATUS).trim().parse().ok(),
            department: opt_cell(row, col::DEPARTMENT),
        })
    }

    /// Composite key used by status updates and deletes. Exact string comparison,
    /// as stored.
    pub fn has_key(&self, email: &str, start_date: &str) -> bool {
        self.email == email && self.start_date == start_date
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewLeave {
    #[schema(example = "asha@company.com")]
    pub email: String,
    #[schema(example = "Casual")]
    pub leave_type: LeaveType,
    #[schema(example = "2026-03-02", value_type = String, format = "date")]
    pub start_date: NaiveDate,
    #[schema(example = "2026-03-03", value_type = String, format = "date")]
    pub end_date: NaiveDate,
    #[serde(default)]
    pub reason: String,
}

impl NewLeave {
    pub fn to_row(&self, department: &str) -> Row {
        to_cells([
            self.email.trim().to_string(),
            self.leave_type.to_string(),
            format_sheet_date(self.start_date),
            format_sheet_date(self.end_date),
            self.reason.trim().to_string(),
            LeaveStatus::Pending.to_string(),
            department.to_string(),
        ])
    }
}
