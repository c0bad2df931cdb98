use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

use super::{cell, opt_cell, to_cells};
use crate::sheets::Row;

pub mod col {
    pub const EMAIL: usize = 0;
    pub const DOCUMENT_TYPE: usize = 1;
    pub const STATUS: usize = 2;
    pub const URL: usize = 3;
    pub const DEPARTMENT: usize = 4;
    pub const LAST: usize = DEPARTMENT;
}

#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, Display, EnumString, AsRefStr, ToSchema,
)]
#[strum(ascii_case_insensitive)]
pub enum DocumentStatus {
    Processing,
    Completed,
    Rejected,
}

impl DocumentStatus {
    pub fn can_become(&self, next: DocumentStatus) -> bool {
        matches!(
            (self, next),
            (DocumentStatus::Processing, DocumentStatus::Completed | DocumentStatus::Rejected)
        )
    }
}

/// Keyed by (email, documentType), which is not unique: the same document can be
/// requested again.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DocumentRequest {
    pub email: String,
    #[schema(example = "Experience Letter")]
    pub document_type: String,
    pub status: Option<DocumentStatus>,
    #[serde(rename = "documentURL")]
    pub document_url: Option<String>,
    pub department: Option<String>,
}

impl DocumentRequest {
    pub fn from_row(row: &Row) -> Option<Self> {
        Some(Self {
            email: opt_cell(row, col::EMAIL)?,
            document_type: cell(row, col::DOCUMENT_TYPE),
            status: cell(row, col::STATUS).trim().parse().ok(),
            document_url: opt_cell(row, col::URL),
            department: opt_cell(row, col::DEPARTMENT),
        })
    }

    pub fn has_key(&self, email: &str, document_type: &str) -> bool {
        self.email == email && self.document_type == document_type
    }

    pub fn is_open(&self) -> bool {
        self.status == Some(DocumentStatus::Processing)
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewDocumentRequest {
    pub email: String,
    #[schema(example = "Experience Letter")]
    pub document_type: String,
    /// Optional. When given it must match the employee's department.
    pub department: Option<String>,
}

impl NewDocumentRequest {
    pub fn to_row(&self, department: &str) -> Row {
        to_cells([
            self.email.trim(),
            self.document_type.trim(),
            DocumentStatus::Processing.as_ref(),
            "",
            department,
        ])
    }
}
