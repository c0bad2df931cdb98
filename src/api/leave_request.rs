use actix_web::{HttpResponse, web};
use serde::Deserialize;
use utoipa::ToSchema;

use super::{DepartmentQuery, EmailRequest, message};
use crate::error::AppResult;
use crate::model::leave_request::{LeaveStatus, NewLeave};
use crate::repository::Repository;

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeaveStatusUpdate {
    #[schema(example = "asha@company.com")]
    pub email: String,
    #[schema(example = "2026-03-02")]
    pub start_date: String,
    #[schema(example = "Approved")]
    pub status: LeaveStatus,
}

/// (email, startDate) key of a leave request.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeaveKey {
    #[schema(example = "asha@company.com")]
    pub email: String,
    #[schema(example = "2026-03-02")]
    pub start_date: String,
}

/// Leave history of one employee
#[utoipa::path(
    post,
    path = "/api/leaves",
    request_body = EmailRequest,
    responses(
        (status = 200, description = "Requests filed with exactly this email", body = [crate::model::leave_request::LeaveRequest])
    ),
    tag = "Leave"
)]
pub async fn my_leaves(
    repo: web::Data<Repository>,
    payload: web::Json<EmailRequest>,
) -> AppResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(repo.list_leaves(&payload.email).await?))
}

/// Apply for leave
#[utoipa::path(
    post,
    path = "/api/apply-leave",
    request_body = NewLeave,
    responses(
        (status = 200, description = "Leave applied", body = Object, example = json!({
            "message": "Leave applied successfully"
        })),
        (status = 400, description = "Monthly casual leave already used, or invalid dates", body = Object, example = json!({
            "message": "You have already applied for casual leave this month."
        })),
        (status = 404, description = "Unknown employee")
    ),
    tag = "Leave"
)]
pub async fn apply_leave(
    repo: web::Data<Repository>,
    payload: web::Json<NewLeave>,
) -> AppResult<HttpResponse> {
    repo.apply_leave(&payload).await?;
    Ok(message("Leave applied successfully"))
}

#[utoipa::path(
    get,
    path = "/api/admin/leave-requests",
    params(
        ("department", Query, description = "Only requests of employees currently in this department")
    ),
    responses(
        (status = 200, description = "Leave requests", body = [crate::model::leave_request::LeaveRequest])
    ),
    tag = "Admin"
)]
pub async fn admin_leave_requests(
    repo: web::Data<Repository>,
    query: web::Query<DepartmentQuery>,
) -> AppResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(repo.list_leave_requests(query.filter()).await?))
}

/// Approve or reject a pending request
///
/// The employee is notified by email once the status is stored.
#[utoipa::path(
    post,
    path = "/api/admin/update-leave-status",
    request_body = LeaveStatusUpdate,
    responses(
        (status = 200, description = "Updated request", body = crate::model::leave_request::LeaveRequest),
        (status = 400, description = "Request is not pending"),
        (status = 404, description = "No request with this key")
    ),
    tag = "Admin"
)]
pub async fn update_leave_status(
    repo: web::Data<Repository>,
    payload: web::Json<LeaveStatusUpdate>,
) -> AppResult<HttpResponse> {
    let leave = repo
        .update_leave_status(&payload.email, &payload.start_date, payload.status)
        .await?;
    Ok(HttpResponse::Ok().json(leave))
}

#[utoipa::path(
    delete,
    path = "/api/admin/leave-requests",
    request_body = LeaveKey,
    responses(
        (status = 200, description = "Request deleted", body = Object, example = json!({
            "message": "Leave request deleted successfully"
        })),
        (status = 404, description = "No request with this key")
    ),
    tag = "Admin"
)]
pub async fn delete_leave_request(
    repo: web::Data<Repository>,
    payload: web::Json<LeaveKey>,
) -> AppResult<HttpResponse> {
    repo.delete_leave(&payload.email, &payload.start_date).await?;
    Ok(message("Leave request deleted successfully"))
}
