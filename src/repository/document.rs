use tracing::info;

use super::{Repository, validation};
use crate::error::{AppError, AppResult};
use crate::model::document_request::{DocumentRequest, DocumentStatus, NewDocumentRequest, col};
use crate::model::to_cells;
use crate::notify::Notification;
use crate::sheets::{CellRange, DOCUMENT_REQUESTS, Row, data_row_number};

/// Index and record of the first open request with this key. `NotFound` when the
/// key is absent, `Validation` when every matching request is already closed.
fn first_open(rows: &[Row], email: &str, document_type: &str) -> AppResult<(usize, DocumentRequest)> {
    let mut seen_closed = None;
    for (i, row) in rows.iter().enumerate() {
        let Some(request) = DocumentRequest::from_row(row) else {
            continue;
        };
        if !request.has_key(email, document_type) {
            continue;
        }
        if request.is_open() {
            return Ok((i, request));
        }
        seen_closed.get_or_insert(request.status);
    }

    match seen_closed {
        Some(status) => Err(AppError::validation(format!(
            "Document request is already {}.",
            status.map(|s| s.to_string()).unwrap_or_else(|| "closed".into())
        ))),
        None => Err(AppError::not_found("Document request not found.")),
    }
}

impl Repository {
    /// Requests made by `email`, compared exactly as stored.
    pub async fn list_document_requests(&self, email: &str) -> AppResult<Vec<DocumentRequest>> {
        let email = email.trim();
        let rows = self.data_rows(DOCUMENT_REQUESTS, col::LAST).await?;
        Ok(rows
            .iter()
            .filter_map(DocumentRequest::from_row)
            .filter(|d| d.email == email)
            .collect())
    }

    pub async fn list_all_document_requests(
        &self,
        department: Option<&str>,
    ) -> AppResult<Vec<DocumentRequest>> {
        let directory = self.directory().await?;
        let rows = self.data_rows(DOCUMENT_REQUESTS, col::LAST).await?;
        Ok(rows
            .iter()
            .filter_map(DocumentRequest::from_row)
            .filter(|d| directory.matches(&d.email, department))
            .collect())
    }

    /// Append a Processing request. Repeated requests for the same type are kept as
    /// separate rows.
    pub async fn submit_document_request(&self, new: &NewDocumentRequest) -> AppResult<DocumentRequest> {
        validation::required(&new.email, "Email")?;
        validation::required(&new.document_type, "Document type")?;

        let department = self
            .resolve_department(&new.email)
            .await?
            .ok_or_else(|| AppError::not_found("Employee not found."))?;
        if let Some(claimed) = new.department.as_deref().map(str::trim).filter(|d| !d.is_empty()) {
            if !claimed.eq_ignore_ascii_case(&department) {
                return Err(AppError::validation(format!(
                    "{} is not in the {claimed} department.",
                    new.email.trim()
                )));
            }
        }

        let row = new.to_row(&department);
        let request = DocumentRequest::from_row(&row)
            .ok_or_else(|| AppError::validation("Email is required."))?;
        self.store.append_row(DOCUMENT_REQUESTS, row).await?;
        info!(email = %request.email, document_type = %request.document_type, "Document requested");
        Ok(request)
    }

    /// The request an upload for (email, documentType) would complete.
    pub async fn open_document_request(&self, email: &str, document_type: &str) -> AppResult<DocumentRequest> {
        let rows = self.data_rows(DOCUMENT_REQUESTS, col::LAST).await?;
        first_open(&rows, email.trim(), document_type.trim()).map(|(_, r)| r)
    }

    /// Move the first open request with this key to `status`. Rejections notify the
    /// employee. Completing needs an attached document, which only `attach_document`
    /// provides, so a bare Completed is refused and the request stays open.
    pub async fn update_document_status(
        &self,
        email: &str,
        document_type: &str,
        status: DocumentStatus,
    ) -> AppResult<DocumentRequest> {
        let (email, document_type) = (email.trim(), document_type.trim());

        let _guard = self.lock(DOCUMENT_REQUESTS).await;
        let rows = self.data_rows(DOCUMENT_REQUESTS, col::LAST).await?;
        let (index, mut request) = first_open(&rows, email, document_type)?;
        validation::document_transition(request.status, status)?;
        if status == DocumentStatus::Completed && request.document_url.is_none() {
            return Err(AppError::validation("Attach a document to complete this request."));
        }

        let row_number = data_row_number(index);
        self.store
            .update_range(
                DOCUMENT_REQUESTS,
                CellRange::cell(col::STATUS, row_number),
                vec![to_cells([status.as_ref()])],
            )
            .await?;
        request.status = Some(status);
        info!(email = %email, document_type = %document_type, status = %status, row = row_number, "Document status updated");

        match (status, request.document_url.as_deref()) {
            (DocumentStatus::Rejected, _) => {
                self.notify(Notification::document_rejected(&request.email, &request.document_type))
            }
            (DocumentStatus::Completed, Some(url)) => {
                self.notify(Notification::document_ready(&request.email, &request.document_type, url))
            }
            _ => {}
        }
        Ok(request)
    }

    /// Attach an uploaded document: writes status Completed and the URL into the
    /// first open request with this key, then queues one "document ready" message.
    pub async fn attach_document(&self, email: &str, document_type: &str, url: &str) -> AppResult<DocumentRequest> {
        let (email, document_type, url) = (email.trim(), document_type.trim(), url.trim());
        validation::required(url, "Document URL")?;

        let _guard = self.lock(DOCUMENT_REQUESTS).await;
        let rows = self.data_rows(DOCUMENT_REQUESTS, col::LAST).await?;
        let (index, mut request) = first_open(&rows, email, document_type)?;

        let row_number = data_row_number(index);
        self.store
            .update_range(
                DOCUMENT_REQUESTS,
                CellRange::row(col::STATUS, col::URL, row_number),
                vec![to_cells([DocumentStatus::Completed.as_ref(), url])],
            )
            .await?;
        request.status = Some(DocumentStatus::Completed);
        request.document_url = Some(url.to_string());
        info!(email = %email, document_type = %document_type, row = row_number, "Document attached");

        self.notify(Notification::document_ready(&request.email, &request.document_type, url));
        Ok(request)
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::fixture;
    use super::*;

    fn request(email: &str, document_type: &str) -> NewDocumentRequest {
        NewDocumentRequest {
            email: email.into(),
            document_type: document_type.into(),
            department: None,
        }
    }

    #[actix_web::test]
    async fn new_request_lists_as_processing_without_url() {
        let f = fixture().await;
        f.repo
            .submit_document_request(&request("meera@company.com", "Experience Letter"))
            .await
            .unwrap();

        let listed = f.repo.list_document_requests("meera@company.com").await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].status, Some(DocumentStatus::Processing));
        assert_eq!(listed[0].document_url, None);
        assert_eq!(listed[0].department.as_deref(), Some("Finance"));
    }

    #[actix_web::test]
    async fn attach_completes_request_and_notifies_once() {
        let mut f = fixture().await;
        f.repo
            .submit_document_request(&request("asha@company.com", "Salary Certificate"))
            .await
            .unwrap();

        let url = "https://files.company.com/documents/asha-salary.pdf";
        f.repo
            .attach_document("asha@company.com", "Salary Certificate", url)
            .await
            .unwrap();

        let listed = f.repo.list_document_requests("asha@company.com").await.unwrap();
        assert_eq!(listed[0].status, Some(DocumentStatus::Completed));
        assert_eq!(listed[0].document_url.as_deref(), Some(url));

        let sent = f.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].subject, "Your Document is Ready: Salary Certificate");
        assert!(sent[0].body.contains(url));

        // Nothing open is left for that key.
        assert!(matches!(
            f.repo.attach_document("asha@company.com", "Salary Certificate", url).await,
            Err(AppError::Validation(_))
        ));
        assert!(f.sent().is_empty());
    }

    #[actix_web::test]
    async fn attach_targets_first_open_duplicate() {
        let f = fixture().await;
        f.store
            .push_raw(DOCUMENT_REQUESTS, &["asha@company.com", "Payslip copy", "Completed", "old-url", "Engineering"])
            .await;
        f.store
            .push_raw(DOCUMENT_REQUESTS, &["asha@company.com", "Payslip copy", "Processing", "", "Engineering"])
            .await;
        f.store
            .push_raw(DOCUMENT_REQUESTS, &["asha@company.com", "Payslip copy", "Processing", "", "Engineering"])
            .await;

        f.repo
            .attach_document("asha@company.com", "Payslip copy", "new-url")
            .await
            .unwrap();
        let urls: Vec<_> = f
            .repo
            .list_document_requests("asha@company.com")
            .await
            .unwrap()
            .into_iter()
            .map(|d| d.document_url)
            .collect();
        assert_eq!(urls, [Some("old-url".to_string()), Some("new-url".to_string()), None]);
    }

    #[actix_web::test]
    async fn missing_request_is_not_found() {
        let f = fixture().await;
        assert!(matches!(
            f.repo.attach_document("asha@company.com", "Visa Letter", "u").await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            f.repo.open_document_request("asha@company.com", "Visa Letter").await,
            Err(AppError::NotFound(_))
        ));
    }

    #[actix_web::test]
    async fn rejection_notifies_and_closes_the_request() {
        let mut f = fixture().await;
        f.repo
            .submit_document_request(&request("asha@company.com", "Visa Letter"))
            .await
            .unwrap();

        let rejected = f
            .repo
            .update_document_status("asha@company.com", "Visa Letter", DocumentStatus::Rejected)
            .await
            .unwrap();
        assert_eq!(rejected.status, Some(DocumentStatus::Rejected));
        assert_eq!(f.sent().len(), 1);

        assert!(matches!(
            f.repo
                .update_document_status("asha@company.com", "Visa Letter", DocumentStatus::Completed)
                .await,
            Err(AppError::Validation(_))
        ));
    }

    #[actix_web::test]
    async fn completing_without_a_document_keeps_request_open() {
        let mut f = fixture().await;
        f.repo
            .submit_document_request(&request("asha@company.com", "Visa Letter"))
            .await
            .unwrap();

        assert!(matches!(
            f.repo
                .update_document_status("asha@company.com", "Visa Letter", DocumentStatus::Completed)
                .await,
            Err(AppError::Validation(_))
        ));
        let listed = f.repo.list_document_requests("asha@company.com").await.unwrap();
        assert_eq!(listed[0].status, Some(DocumentStatus::Processing));
        assert!(f.sent().is_empty());

        let done = f
            .repo
            .attach_document("asha@company.com", "Visa Letter", "https://files/visa.pdf")
            .await
            .unwrap();
        assert_eq!(done.status, Some(DocumentStatus::Completed));
        assert_eq!(f.sent().len(), 1);
    }

    #[actix_web::test]
    async fn claimed_department_must_match_the_directory() {
        let f = fixture().await;
        let mut new = request("asha@company.com", "Visa Letter");
        new.department = Some("Finance".into());
        assert!(matches!(
            f.repo.submit_document_request(&new).await,
            Err(AppError::Validation(_))
        ));
        assert!(f.repo.list_document_requests("asha@company.com").await.unwrap().is_empty());

        new.department = Some(" engineering ".into());
        let stored = f.repo.submit_document_request(&new).await.unwrap();
        assert_eq!(stored.department.as_deref(), Some("Engineering"));
    }

    #[actix_web::test]
    async fn department_listing_follows_current_department() {
        let f = fixture().await;
        f.repo
            .submit_document_request(&request("asha@company.com", "Visa Letter"))
            .await
            .unwrap();
        f.repo
            .submit_document_request(&request("meera@company.com", "Visa Letter"))
            .await
            .unwrap();
        let eng = f.repo.list_all_document_requests(Some("Engineering")).await.unwrap();
        assert_eq!(eng.len(), 1);
        assert_eq!(eng[0].email, "asha@company.com");
    }
}
