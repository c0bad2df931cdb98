use crate::api::document_request::DocumentStatusUpdate;
use crate::api::leave_request::{LeaveKey, LeaveStatusUpdate};
use crate::api::profile::LoginRequest;
use crate::api::project::HoursUpdate;
use crate::api::{DepartmentQuery, EmailRequest};
use crate::model::document_request::{DocumentRequest, DocumentStatus, NewDocumentRequest};
use crate::model::employee::{Employee, EmployeeUpdate, NewEmployee};
use crate::model::holiday::{Holiday, NewHoliday};
use crate::model::leave_request::{LeaveRequest, LeaveStatus, LeaveType, NewLeave};
use crate::model::payslip::{NewPayslip, Payslip};
use crate::model::project::{NewAllocation, NewProjectStatus, ProjectAllocation, ProjectStatus};
use crate::model::role::Role;
use crate::model::timesheet::{NewTimesheet, TimesheetEntry};
use crate::repository::DepartmentStats;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Employee Portal API",
        version = "1.0.0",
        description = r#"
## Employee Portal

Backend for a small company's HR portal. Every record lives in one spreadsheet:
employees, leave, timesheets, holidays, payslips, document requests, project
allocations and progress updates.

### Key Features
- **Profile**: login by email and selected role, department list, dashboard counters
- **Leave**: apply (one casual leave per month), approve or reject, delete
- **Timesheet**: daily work log, evening reminder for anyone who has not logged
- **Documents**: request, reject, or fulfil by uploading the file
- **Projects**: allocate hours, track remaining weekday hours, post progress

### Notes
- Identity is established upstream; the API trusts the email it is given.
- Errors are JSON `{ "message": ... }` with 400, 403, 404, 500 or 502.
- Emails go out asynchronously; a failed email never fails the request.
"#,
    ),
    paths(
        crate::api::profile::login,
        crate::api::profile::profile,
        crate::api::profile::departments,
        crate::api::profile::stats,

        crate::api::employee::list_employees,
        crate::api::employee::create_employee,
        crate::api::employee::update_employee,
        crate::api::employee::delete_employee,

        crate::api::leave_request::my_leaves,
        crate::api::leave_request::apply_leave,
        crate::api::leave_request::admin_leave_requests,
        crate::api::leave_request::update_leave_status,
        crate::api::leave_request::delete_leave_request,

        crate::api::timesheet::my_timesheets,
        crate::api::timesheet::submit_timesheet,
        crate::api::timesheet::submitted_today,
        crate::api::timesheet::admin_timesheets,

        crate::api::holiday::list_holidays,
        crate::api::holiday::add_holiday,
        crate::api::holiday::delete_holiday,

        crate::api::payslip::my_payslips,
        crate::api::payslip::admin_payslips,
        crate::api::payslip::add_payslip,

        crate::api::document_request::my_document_requests,
        crate::api::document_request::submit_document_request,
        crate::api::document_request::admin_document_requests,
        crate::api::document_request::update_document_status,

        crate::api::project::allocate_project,
        crate::api::project::list_projects,
        crate::api::project::department_projects,
        crate::api::project::update_hours,
        crate::api::project::add_project_status,
        crate::api::project::project_status_of,
        crate::api::project::admin_project_status,

        crate::api::upload::upload_photo,
        crate::api::upload::upload_document
    ),
    components(
        schemas(
            LoginRequest,
            EmailRequest,
            DepartmentQuery,
            DepartmentStats,
            Role,
            Employee,
            NewEmployee,
            EmployeeUpdate,
            LeaveType,
            LeaveStatus,
            LeaveRequest,
            NewLeave,
            LeaveStatusUpdate,
            LeaveKey,
            TimesheetEntry,
            NewTimesheet,
            Holiday,
            NewHoliday,
            Payslip,
            NewPayslip,
            DocumentStatus,
            DocumentRequest,
            NewDocumentRequest,
            DocumentStatusUpdate,
            ProjectAllocation,
            NewAllocation,
            HoursUpdate,
            ProjectStatus,
            NewProjectStatus
        )
    ),
    tags(
        (name = "Profile", description = "Login, profile and lookups"),
        (name = "Employee", description = "Employee records"),
        (name = "Leave", description = "Leave requests"),
        (name = "Timesheet", description = "Daily work log"),
        (name = "Holiday", description = "Holiday calendar"),
        (name = "Payslip", description = "Payslip links"),
        (name = "Document", description = "Document requests"),
        (name = "Project", description = "Project allocation and progress"),
        (name = "Upload", description = "Photo and document uploads"),
        (name = "Admin", description = "Department admin operations"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_route_is_documented() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/login",
            "/api/employees/{email}",
            "/api/admin/update-leave-status",
            "/api/timesheets/submitted-today",
            "/api/projects/department/{department}",
            "/api/upload-document",
        ] {
            assert!(doc.paths.paths.contains_key(path), "{path} missing");
        }
    }
}
