use actix_web::{HttpResponse, web};
use tracing::info;

use super::{DepartmentQuery, message};
use crate::error::AppResult;
use crate::model::employee::{EmployeeUpdate, NewEmployee};
use crate::repository::Repository;

/// List employees
#[utoipa::path(
    get,
    path = "/api/employees",
    params(
        ("department", Query, description = "Only employees of this department (case-insensitive)")
    ),
    responses(
        (status = 200, description = "Employees in sheet order", body = [crate::model::employee::Employee])
    ),
    tag = "Employee"
)]
pub async fn list_employees(
    repo: web::Data<Repository>,
    query: web::Query<DepartmentQuery>,
) -> AppResult<HttpResponse> {
    let employees = repo.list_employees(query.filter()).await?;
    Ok(HttpResponse::Ok().json(employees))
}

/// Create Employee
#[utoipa::path(
    post,
    path = "/api/employees",
    request_body = NewEmployee,
    responses(
        (status = 200, description = "Employee added", body = Object, example = json!({
            "message": "Employee added successfully"
        })),
        (status = 400, description = "Duplicate email, unknown role or department", body = Object, example = json!({
            "message": "An employee with this email already exists."
        }))
    ),
    tag = "Employee"
)]
pub async fn create_employee(
    repo: web::Data<Repository>,
    payload: web::Json<NewEmployee>,
) -> AppResult<HttpResponse> {
    repo.add_employee(&payload).await?;
    Ok(message("Employee added successfully"))
}

/// Update Employee
///
/// Blank fields keep their stored value.
#[utoipa::path(
    put,
    path = "/api/employees/{email}",
    params(
        ("email", Path, description = "Current email of the employee")
    ),
    request_body = EmployeeUpdate,
    responses(
        (status = 200, description = "Updated record", body = crate::model::employee::Employee),
        (status = 404, description = "Employee not found", body = Object, example = json!({
            "message": "User not found."
        }))
    ),
    tag = "Employee"
)]
pub async fn update_employee(
    repo: web::Data<Repository>,
    path: web::Path<String>,
    payload: web::Json<EmployeeUpdate>,
) -> AppResult<HttpResponse> {
    let employee = repo.update_employee(&path, &payload).await?;
    Ok(HttpResponse::Ok().json(employee))
}

#[utoipa::path(
    delete,
    path = "/api/employees/{email}",
    params(
        ("email", Path, description = "Email of the employee to remove")
    ),
    responses(
        (status = 200, description = "Employee deleted", body = Object, example = json!({
            "message": "Employee deleted successfully"
        })),
        (status = 404, description = "Employee not found")
    ),
    tag = "Employee"
)]
pub async fn delete_employee(
    repo: web::Data<Repository>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let email = path.into_inner();
    repo.delete_employee(&email).await?;
    info!(email = %email, "Employee removed through API");
    Ok(message("Employee deleted successfully"))
}
