//! Pre-write checks. Each returns `AppError::Validation` with a message that is
//! safe to show to the caller.

use chrono::Datelike;

use crate::error::{AppError, AppResult};
use crate::model::document_request::DocumentStatus;
use crate::model::employee::NewEmployee;
use crate::model::leave_request::{LeaveRequest, LeaveStatus, LeaveType, NewLeave};
use crate::model::payslip::NewPayslip;
use crate::model::role::Role;
use crate::model::timesheet::NewTimesheet;
use crate::model::{parse_sheet_date, same_email};

pub const CASUAL_LEAVE_TAKEN: &str = "You have already applied for casual leave this month.";

pub fn required(value: &str, field: &str) -> AppResult<()> {
    if value.trim().is_empty() {
        return Err(AppError::validation(format!("{field} is required.")));
    }
    Ok(())
}

pub fn new_leave(new: &NewLeave) -> AppResult<()> {
    required(&new.email, "Email")?;
    required(&new.reason, "Reason")?;
    if new.start_date > new.end_date {
        return Err(AppError::validation("Start date must not be after end date."));
    }
    Ok(())
}

/// At most one active Casual request per employee per calendar month, where the
/// month is that of the new request's start date.
pub fn casual_leave_available(existing: &[LeaveRequest], new: &NewLeave) -> AppResult<()> {
    if new.leave_type != LeaveType::Casual {
        return Ok(());
    }

    let month = (new.start_date.year(), new.start_date.month());
    let taken = existing.iter().any(|leave| {
        same_email(&leave.email, &new.email)
            && leave.leave_type == Some(LeaveType::Casual)
            && leave.status.is_some_and(|s| s.is_active())
            && parse_sheet_date(&leave.start_date).is_some_and(|d| (d.year(), d.month()) == month)
    });

    if taken {
        return Err(AppError::validation(CASUAL_LEAVE_TAKEN));
    }
    Ok(())
}

pub fn leave_transition(current: Option<LeaveStatus>, next: LeaveStatus) -> AppResult<()> {
    match current {
        Some(status) if status.can_become(next) => Ok(()),
        Some(status) => Err(AppError::validation(format!(
            "Leave request is already {status} and cannot become {next}."
        ))),
        None => Err(AppError::validation(
            "Leave request has an unknown status and cannot be changed.",
        )),
    }
}

pub fn document_transition(current: Option<DocumentStatus>, next: DocumentStatus) -> AppResult<()> {
    match current {
        Some(status) if status.can_become(next) => Ok(()),
        Some(status) => Err(AppError::validation(format!(
            "Document request is already {status} and cannot become {next}."
        ))),
        None => Err(AppError::validation(
            "Document request has an unknown status and cannot be changed.",
        )),
    }
}

pub fn new_timesheet(new: &NewTimesheet) -> AppResult<()> {
    if new.target_email().is_none() {
        return Err(AppError::validation("Email is required."));
    }
    required(&new.project, "Project")?;
    required(&new.task, "Task")?;
    if !(new.duration.is_finite() && new.duration > 0.0) {
        return Err(AppError::validation("Duration must be a positive number of hours."));
    }
    Ok(())
}

pub fn role(value: &str) -> AppResult<Role> {
    value
        .trim()
        .parse()
        .map_err(|_| AppError::validation(format!("Unknown role '{}'.", value.trim())))
}

/// Department must be one of `known` unless the Departments sheet is empty.
pub fn department(value: &str, known: &[String]) -> AppResult<()> {
    required(value, "Department")?;
    if known.is_empty() || known.iter().any(|d| d.eq_ignore_ascii_case(value.trim())) {
        return Ok(());
    }
    Err(AppError::validation(format!("Unknown department '{}'.", value.trim())))
}

pub fn new_employee(new: &NewEmployee, known_departments: &[String]) -> AppResult<Role> {
    required(&new.email, "Email")?;
    required(&new.name, "Name")?;
    department(&new.department, known_departments)?;
    role(&new.role)
}

pub fn new_payslip(new: &NewPayslip) -> AppResult<()> {
    required(&new.email, "Email")?;
    required(&new.url, "Payslip URL")?;
    if !new.month_is_valid() {
        return Err(AppError::validation(format!("Invalid month '{}'.", new.month.trim())));
    }
    if !new.year_is_valid() {
        return Err(AppError::validation(format!("Invalid year '{}'.", new.year.trim())));
    }
    Ok(())
}
