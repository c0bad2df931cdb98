use actix_web::{HttpResponse, web};

use super::{DepartmentQuery, EmailRequest, message};
use crate::error::AppResult;
use crate::model::payslip::NewPayslip;
use crate::repository::Repository;

#[utoipa::path(
    post,
    path = "/api/payslips",
    request_body = EmailRequest,
    responses(
        (status = 200, description = "Payslips issued to exactly this email", body = [crate::model::payslip::Payslip])
    ),
    tag = "Payslip"
)]
pub async fn my_payslips(
    repo: web::Data<Repository>,
    payload: web::Json<EmailRequest>,
) -> AppResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(repo.list_payslips(&payload.email).await?))
}

#[utoipa::path(
    get,
    path = "/api/admin/payslips",
    params(
        ("department", Query, description = "Only payslips of employees currently in this department")
    ),
    responses(
        (status = 200, description = "Payslips", body = [crate::model::payslip::Payslip])
    ),
    tag = "Admin"
)]
pub async fn admin_payslips(
    repo: web::Data<Repository>,
    query: web::Query<DepartmentQuery>,
) -> AppResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(repo.list_all_payslips(query.filter()).await?))
}

/// Publish a payslip link
#[utoipa::path(
    post,
    path = "/api/admin/payslips",
    request_body = NewPayslip,
    responses(
        (status = 200, description = "Payslip added", body = Object, example = json!({
            "message": "Payslip added successfully"
        })),
        (status = 400, description = "Invalid month, year or url"),
        (status = 404, description = "Unknown employee")
    ),
    tag = "Admin"
)]
pub async fn add_payslip(
    repo: web::Data<Repository>,
    payload: web::Json<NewPayslip>,
) -> AppResult<HttpResponse> {
    repo.add_payslip(&payload).await?;
    Ok(message("Payslip added successfully"))
}
