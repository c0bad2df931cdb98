use std::collections::HashSet;

use chrono::NaiveDate;
use serde::Serialize;
use utoipa::ToSchema;

use super::{DepartmentDirectory, Repository, validation};
use crate::error::AppResult;
use crate::model::document_request::{self, DocumentRequest};
use crate::model::employee::{self, Employee};
use crate::model::leave_request::{self, LeaveRequest, LeaveStatus};
use crate::model::timesheet::{self, TimesheetEntry};
use crate::sheets::{DOCUMENT_REQUESTS, EMPLOYEES, LEAVE, TIMESHEET};

/// Admin dashboard counters for one department.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentStats {
    pub total_employees: usize,
    pub pending_leaves: usize,
    /// Document requests still Processing.
    pub document_requests: usize,
}

impl Repository {
    pub async fn department_stats(&self, department: &str) -> AppResult<DepartmentStats> {
        validation::required(department, "Department")?;
        let department = department.trim();

        let employees = self.data_rows(EMPLOYEES, employee::col::LAST).await?;
        let leaves = self.data_rows(LEAVE, leave_request::col::LAST).await?;
        let documents = self.data_rows(DOCUMENT_REQUESTS, document_request::col::LAST).await?;
        let directory = DepartmentDirectory::from_rows(&employees);

        let total_employees = employees
            .iter()
            .filter_map(Employee::from_row)
            .filter(|e| e.department.eq_ignore_ascii_case(department))
            .count();
        let pending_leaves = leaves
            .iter()
            .filter_map(LeaveRequest::from_row)
            .filter(|l| l.status == Some(LeaveStatus::Pending))
            .filter(|l| directory.in_department(&l.email, department))
            .count();
        let document_requests = documents
            .iter()
            .filter_map(DocumentRequest::from_row)
            .filter(DocumentRequest::is_open)
            .filter(|d| directory.in_department(&d.email, department))
            .count();

        Ok(DepartmentStats {
            total_employees,
            pending_leaves,
            document_requests,
        })
    }

    /// Employees without a positive-duration timesheet entry dated `day`.
    pub async fn employees_missing_timesheet(&self, day: NaiveDate) -> AppResult<Vec<Employee>> {
        let entries = self.data_rows(TIMESHEET, timesheet::col::LAST).await?;
        let submitted: HashSet<String> = entries
            .iter()
            .filter_map(TimesheetEntry::from_row)
            .filter(|t| t.counts_for(day))
            .map(|t| t.email.trim().to_ascii_lowercase())
            .collect();

        let employees = self.data_rows(EMPLOYEES, employee::col::LAST).await?;
        Ok(employees
            .iter()
            .filter_map(Employee::from_row)
            .filter(|e| !submitted.contains(&e.email.trim().to_ascii_lowercase()))
            .collect())
    }
}
