use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use derive_more::Display;
use serde_json::json;

pub type AppResult<T> = Result<T, AppError>;

/// Error taxonomy shared by the repository layer and the HTTP handlers.
#[derive(Debug, Clone, Display, PartialEq, Eq)]
pub enum AppError {
    /// Key or row absent (employee, leave row, holiday date, document request).
    #[display(fmt = "{}", _0)]
    NotFound(String),

    /// Business-rule violation or missing required field.
    #[display(fmt = "{}", _0)]
    Validation(String),

    /// The stored role does not match the role the caller selected.
    #[display(fmt = "Unauthorized: Role mismatch")]
    RoleMismatch,

    /// Remote I/O or auth failure on the backing spreadsheet.
    #[display(fmt = "store error: {}", _0)]
    Store(String),

    /// Notification or blob-storage collaborator failure.
    #[display(fmt = "dependency error: {}", _0)]
    Dependency(String),
}

impl std::error::Error for AppError {}

impl AppError {
    pub fn not_found(what: impl Into<String>) -> Self {
        AppError::NotFound(what.into())
    }

    pub fn validation(what: impl Into<String>) -> Self {
        AppError::Validation(what.into())
    }

    pub fn store(err: impl std::fmt::Display) -> Self {
        AppError::Store(err.to_string())
    }

    pub fn dependency(err: impl std::fmt::Display) -> Self {
        AppError::Dependency(err.to_string())
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::RoleMismatch => StatusCode::FORBIDDEN,
            AppError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Dependency(_) => StatusCode::BAD_GATEWAY,
        }
    }

    fn error_response(&self) -> HttpResponse {
        // Remote failures are logged with context where they happen; the client only
        // gets a generic message for them.
        let message = match self {
            AppError::Store(_) => "Server error".to_string(),
            AppError::Dependency(_) => "Upstream service error".to_string(),
            other => other.to_string(),
        };

        HttpResponse::build(self.status_code()).json(json!({ "message": message }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_error_class() {
        assert_eq!(AppError::not_found("x").status_code(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::validation("x").status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::RoleMismatch.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(
            AppError::store("timeout").status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AppError::dependency("smtp").status_code(),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn display_keeps_human_readable_message() {
        assert_eq!(
            AppError::validation("You have already applied for casual leave this month.")
                .to_string(),
            "You have already applied for casual leave this month."
        );
        assert_eq!(AppError::store("503").to_string(), "store error: 503");
    }
}
