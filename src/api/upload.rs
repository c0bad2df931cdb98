//! Multipart uploads. The file goes to blob storage first; the sheet is only written
//! once the stored URL is known.

use actix_multipart::form::{MultipartForm, MultipartFormConfig, bytes::Bytes, text::Text};
use actix_web::{HttpResponse, web};
use serde_json::json;
use tracing::{info, warn};

use crate::error::{AppError, AppResult};
use crate::repository::Repository;
use crate::storage::{self, BlobStorage};

// Room for the text fields on top of the file itself.
const FIELD_ALLOWANCE: usize = 4 * 1024;
const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

#[derive(MultipartForm)]
pub struct PhotoUpload {
    photo: Bytes,
    email: Text<String>,
}

#[derive(MultipartForm)]
pub struct DocumentUpload {
    document: Bytes,
    email: Text<String>,
    #[multipart(rename = "documentType")]
    document_type: Text<String>,
}

/// Form limits for both upload endpoints. Anything over `max_file_bytes` plus the
/// text fields, or a malformed body, is a 400 with the usual `{message}` body.
pub fn form_config(max_file_bytes: usize) -> MultipartFormConfig {
    let limit = max_file_bytes.saturating_add(FIELD_ALLOWANCE);
    MultipartFormConfig::default()
        .total_limit(limit)
        .memory_limit(limit)
        .error_handler(move |e, _req| {
            warn!(error = %e, max_file_bytes, "Upload rejected");
            AppError::validation(format!("Invalid upload: {e}")).into()
        })
}

fn required_text<'a>(value: &'a Text<String>, name: &str) -> AppResult<&'a str> {
    Some(value.trim())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::validation(format!("Missing form field: {name}")))
}

struct StoredFile {
    filename: Option<String>,
    content_type: String,
    bytes: Vec<u8>,
}

fn stored_file(part: Bytes, name: &str) -> AppResult<StoredFile> {
    if part.data.is_empty() {
        return Err(AppError::validation(format!("No file uploaded in field: {name}")));
    }
    Ok(StoredFile {
        content_type: part
            .content_type
            .as_ref()
            .map(|m| m.essence_str().to_string())
            .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string()),
        filename: part.file_name,
        bytes: part.data.to_vec(),
    })
}

/// Upload profile photo
///
/// Multipart fields: `photo` (file) and `email`.
#[utoipa::path(
    post,
    path = "/api/upload-photo",
    request_body(content = String, content_type = "multipart/form-data", description = "Fields: photo (file), email"),
    responses(
        (status = 200, description = "Photo stored", body = Object, example = json!({
            "message": "Photo uploaded successfully",
            "photoURL": "https://files.company.com/photos/asha@company.com-3f1c.jpg"
        })),
        (status = 400, description = "Missing field or file too large"),
        (status = 404, description = "Unknown employee"),
        (status = 502, description = "Blob storage failed")
    ),
    tag = "Upload"
)]
pub async fn upload_photo(
    repo: web::Data<Repository>,
    storage: web::Data<dyn BlobStorage>,
    MultipartForm(form): MultipartForm<PhotoUpload>,
) -> AppResult<HttpResponse> {
    let email = required_text(&form.email, "email")?.to_string();
    let file = stored_file(form.photo, "photo")?;

    let employee = repo.find_employee(&email).await?;
    let key = storage::object_key(storage::PHOTOS, &employee.email, file.filename.as_deref());
    let url = storage.put(&key, &file.content_type, file.bytes).await?;
    repo.set_photo_url(&employee.email, &url).await?;

    info!(email = %employee.email, key = %key, "Profile photo uploaded");
    Ok(HttpResponse::Ok().json(json!({
        "message": "Photo uploaded successfully",
        "photoURL": url,
    })))
}

/// Fulfil a document request
///
/// Multipart fields: `document` (file), `email` and `documentType`. The first open
/// request with that key is completed and the employee is notified once.
#[utoipa::path(
    post,
    path = "/api/upload-document",
    request_body(content = String, content_type = "multipart/form-data", description = "Fields: document (file), email, documentType"),
    responses(
        (status = 200, description = "Document stored and request completed", body = Object, example = json!({
            "message": "Document uploaded successfully",
            "documentURL": "https://files.company.com/documents/asha@company.com-9b2e.pdf"
        })),
        (status = 400, description = "Missing field, file too large or request already closed"),
        (status = 404, description = "No request with this key"),
        (status = 502, description = "Blob storage failed")
    ),
    tag = "Upload"
)]
pub async fn upload_document(
    repo: web::Data<Repository>,
    storage: web::Data<dyn BlobStorage>,
    MultipartForm(form): MultipartForm<DocumentUpload>,
) -> AppResult<HttpResponse> {
    let email = required_text(&form.email, "email")?.to_string();
    let document_type = required_text(&form.document_type, "documentType")?.to_string();
    let file = stored_file(form.document, "document")?;

    // Nothing is stored unless there is a request to complete.
    repo.open_document_request(&email, &document_type).await?;

    let key = storage::object_key(storage::DOCUMENTS, &email, file.filename.as_deref());
    let url = storage.put(&key, &file.content_type, file.bytes).await?;
    let request = repo.attach_document(&email, &document_type, &url).await?;

    info!(email = %request.email, document_type = %request.document_type, key = %key, "Document uploaded");
    Ok(HttpResponse::Ok().json(json!({
        "message": "Document uploaded successfully",
        "documentURL": url,
    })))
}
