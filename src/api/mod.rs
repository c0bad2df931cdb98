pub mod document_request;
pub mod employee;
pub mod holiday;
pub mod leave_request;
pub mod payslip;
pub mod profile;
pub mod project;
pub mod timesheet;
pub mod upload;

use actix_web::HttpResponse;
use serde::Deserialize;
use serde_json::json;
use utoipa::ToSchema;

/// `?department=` filter shared by the admin listings.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct DepartmentQuery {
    #[schema(example = "Engineering")]
    pub department: Option<String>,
}

impl DepartmentQuery {
    pub fn filter(&self) -> Option<&str> {
        self.department
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
    }
}

/// Body of the "list mine" endpoints.
#[derive(Debug, Deserialize, ToSchema)]
pub struct EmailRequest {
    #[schema(example = "asha@company.com", format = "email")]
    pub email: String,
}

pub fn message(text: &str) -> HttpResponse {
    HttpResponse::Ok().json(json!({ "message": text }))
}
