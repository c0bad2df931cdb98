use actix_web::{HttpResponse, web};
use serde::Deserialize;
use utoipa::ToSchema;

use super::DepartmentQuery;
use crate::error::{AppError, AppResult};
use crate::repository::Repository;

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[schema(example = "asha@company.com", format = "email")]
    pub email: String,
    #[schema(example = "Employee")]
    pub selected_role: String,
}

/// Login
///
/// Identity is checked upstream; this only matches the email to an employee and the
/// stored role to the one picked on the login screen.
#[utoipa::path(
    post,
    path = "/api/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Employee record", body = crate::model::employee::Employee),
        (status = 403, description = "Stored role differs", body = Object, example = json!({
            "message": "Unauthorized: Role mismatch"
        })),
        (status = 404, description = "Unknown email", body = Object, example = json!({
            "message": "User not found."
        }))
    ),
    tag = "Profile"
)]
pub async fn login(
    repo: web::Data<Repository>,
    payload: web::Json<LoginRequest>,
) -> AppResult<HttpResponse> {
    let employee = repo.login(&payload.email, &payload.selected_role).await?;
    Ok(HttpResponse::Ok().json(employee))
}

/// Profile of the signed-in employee
#[utoipa::path(
    post,
    path = "/api/profile",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Employee record", body = crate::model::employee::Employee),
        (status = 403, description = "Stored role differs"),
        (status = 404, description = "Unknown email")
    ),
    tag = "Profile"
)]
pub async fn profile(
    repo: web::Data<Repository>,
    payload: web::Json<LoginRequest>,
) -> AppResult<HttpResponse> {
    let employee = repo.login(&payload.email, &payload.selected_role).await?;
    Ok(HttpResponse::Ok().json(employee))
}

#[utoipa::path(
    get,
    path = "/api/departments",
    responses(
        (status = 200, description = "Department names", body = [String], example = json!(["Engineering", "Finance"]))
    ),
    tag = "Profile"
)]
pub async fn departments(repo: web::Data<Repository>) -> AppResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(repo.list_departments().await?))
}

/// Dashboard counters
#[utoipa::path(
    get,
    path = "/api/admin/stats",
    params(
        ("department", Query, description = "Department to count")
    ),
    responses(
        (status = 200, description = "Counters", body = crate::repository::DepartmentStats),
        (status = 400, description = "Department missing")
    ),
    tag = "Admin"
)]
pub async fn stats(
    repo: web::Data<Repository>,
    query: web::Query<DepartmentQuery>,
) -> AppResult<HttpResponse> {
    let department = query
        .filter()
        .ok_or_else(|| AppError::validation("Department is required."))?;
    Ok(HttpResponse::Ok().json(repo.department_stats(department).await?))
}
