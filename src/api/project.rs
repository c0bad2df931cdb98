use actix_web::{HttpResponse, web};
use serde::Deserialize;
use serde_json::json;
use utoipa::ToSchema;

use super::{DepartmentQuery, message};
use crate::error::AppResult;
use crate::model::project::{NewAllocation, NewProjectStatus};
use crate::repository::Repository;

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HoursUpdate {
    #[schema(example = "Engineering")]
    pub department: String,
    #[schema(example = "Payments")]
    pub project_name: String,
    #[schema(example = 120)]
    pub new_remaining_hours: f64,
}

/// Allocate a project
///
/// Overwrites the employee's current allocation.
#[utoipa::path(
    post,
    path = "/api/projects",
    request_body = NewAllocation,
    responses(
        (status = 200, description = "Project allocated", body = Object, example = json!({
            "message": "Project allocated successfully"
        })),
        (status = 400, description = "Invalid hours or employee outside the given department"),
        (status = 404, description = "Unknown employee")
    ),
    tag = "Project"
)]
pub async fn allocate_project(
    repo: web::Data<Repository>,
    payload: web::Json<NewAllocation>,
) -> AppResult<HttpResponse> {
    repo.allocate_project(&payload).await?;
    Ok(message("Project allocated successfully"))
}

/// List allocations
///
/// Remaining hours are recomputed on every read and written back to the sheet.
#[utoipa::path(
    get,
    path = "/api/projects",
    params(
        ("department", Query, description = "Only allocations of this department")
    ),
    responses(
        (status = 200, description = "Allocations", body = [crate::model::project::ProjectAllocation])
    ),
    tag = "Project"
)]
pub async fn list_projects(
    repo: web::Data<Repository>,
    query: web::Query<DepartmentQuery>,
) -> AppResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(repo.list_projects(query.filter()).await?))
}

#[utoipa::path(
    get,
    path = "/api/projects/department/{department}",
    params(
        ("department", Path, description = "Department name, case-insensitive")
    ),
    responses(
        (status = 200, description = "Allocations", body = [crate::model::project::ProjectAllocation])
    ),
    tag = "Project"
)]
pub async fn department_projects(
    repo: web::Data<Repository>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(repo.list_department_projects(&path).await?))
}

#[utoipa::path(
    put,
    path = "/api/projects/update-hours",
    request_body = HoursUpdate,
    responses(
        (status = 200, description = "Hours updated", body = Object, example = json!({
            "message": "Remaining hours updated successfully",
            "updated": 2
        })),
        (status = 400, description = "Negative hours"),
        (status = 404, description = "Project not found in the department")
    ),
    tag = "Project"
)]
pub async fn update_hours(
    repo: web::Data<Repository>,
    payload: web::Json<HoursUpdate>,
) -> AppResult<HttpResponse> {
    let updated = repo
        .update_project_hours(&payload.department, &payload.project_name, payload.new_remaining_hours)
        .await?;
    Ok(HttpResponse::Ok().json(json!({
        "message": "Remaining hours updated successfully",
        "updated": updated,
    })))
}

/// Post a progress update
#[utoipa::path(
    post,
    path = "/api/project-status",
    request_body = NewProjectStatus,
    responses(
        (status = 200, description = "Stored update", body = crate::model::project::ProjectStatus),
        (status = 404, description = "Unknown employee")
    ),
    tag = "Project"
)]
pub async fn add_project_status(
    repo: web::Data<Repository>,
    payload: web::Json<NewProjectStatus>,
) -> AppResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(repo.add_project_status(&payload).await?))
}

#[utoipa::path(
    get,
    path = "/api/project-status/{email}",
    params(
        ("email", Path, description = "Employee email, exact match")
    ),
    responses(
        (status = 200, description = "Updates posted by this employee", body = [crate::model::project::ProjectStatus])
    ),
    tag = "Project"
)]
pub async fn project_status_of(
    repo: web::Data<Repository>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(repo.list_project_status(&path).await?))
}

#[utoipa::path(
    get,
    path = "/api/admin/project-status",
    params(
        ("department", Query, description = "Only updates of employees currently in this department")
    ),
    responses(
        (status = 200, description = "Progress updates", body = [crate::model::project::ProjectStatus])
    ),
    tag = "Admin"
)]
pub async fn admin_project_status(
    repo: web::Data<Repository>,
    query: web::Query<DepartmentQuery>,
) -> AppResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(repo.list_all_project_status(query.filter()).await?))
}
