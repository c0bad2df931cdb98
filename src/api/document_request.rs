use actix_web::{HttpResponse, web};
use serde::Deserialize;
use utoipa::ToSchema;

use super::{DepartmentQuery, EmailRequest};
use crate::error::AppResult;
use crate::model::document_request::{DocumentStatus, NewDocumentRequest};
use crate::repository::Repository;

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DocumentStatusUpdate {
    #[schema(example = "asha@company.com")]
    pub email: String,
    #[schema(example = "Experience Letter")]
    pub document_type: String,
    #[schema(example = "Rejected")]
    pub status: DocumentStatus,
}

#[utoipa::path(
    post,
    path = "/api/document-requests",
    request_body = EmailRequest,
    responses(
        (status = 200, description = "Requests filed with exactly this email", body = [crate::model::document_request::DocumentRequest])
    ),
    tag = "Document"
)]
pub async fn my_document_requests(
    repo: web::Data<Repository>,
    payload: web::Json<EmailRequest>,
) -> AppResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(repo.list_document_requests(&payload.email).await?))
}

#[utoipa::path(
    post,
    path = "/api/submit-document-request",
    request_body = NewDocumentRequest,
    responses(
        (status = 200, description = "Stored request, status Processing", body = crate::model::document_request::DocumentRequest),
        (status = 404, description = "Unknown employee")
    ),
    tag = "Document"
)]
pub async fn submit_document_request(
    repo: web::Data<Repository>,
    payload: web::Json<NewDocumentRequest>,
) -> AppResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(repo.submit_document_request(&payload).await?))
}

#[utoipa::path(
    get,
    path = "/api/admin/document-requests",
    params(
        ("department", Query, description = "Only requests of employees currently in this department")
    ),
    responses(
        (status = 200, description = "Document requests", body = [crate::model::document_request::DocumentRequest])
    ),
    tag = "Admin"
)]
pub async fn admin_document_requests(
    repo: web::Data<Repository>,
    query: web::Query<DepartmentQuery>,
) -> AppResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(repo.list_all_document_requests(query.filter()).await?))
}

/// Close a request without uploading
///
/// Completed is only accepted once a document is attached; use `/upload-document` instead.
#[utoipa::path(
    post,
    path = "/api/admin/update-document-status",
    request_body = DocumentStatusUpdate,
    responses(
        (status = 200, description = "Updated request", body = crate::model::document_request::DocumentRequest),
        (status = 400, description = "Every matching request is already closed, or Completed without a document"),
        (status = 404, description = "No request with this key")
    ),
    tag = "Admin"
)]
pub async fn update_document_status(
    repo: web::Data<Repository>,
    payload: web::Json<DocumentStatusUpdate>,
) -> AppResult<HttpResponse> {
    let request = repo
        .update_document_status(&payload.email, &payload.document_type, payload.status)
        .await?;
    Ok(HttpResponse::Ok().json(request))
}
