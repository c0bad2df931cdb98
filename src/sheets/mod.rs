//! Spreadsheet access: the thin adapter the repository layer talks to.

pub mod google;
pub mod memory;
pub mod range;
mod token;

use async_trait::async_trait;

use crate::error::AppResult;
pub use range::{CellRange, data_row_number};
pub use token::ServiceAccountKey;

/// One spreadsheet row as returned by the store. Trailing blank cells are usually
/// missing, so rows are ragged.
pub type Row = Vec<Option<String>>;

pub const EMPLOYEES: &str = "Sheet1";
pub const LEAVE: &str = "Leave";
pub const TIMESHEET: &str = "Timesheet";
pub const HOLIDAYS: &str = "Holidays";
pub const PAYSLIPS: &str = "Payslips";
pub const DOCUMENT_REQUESTS: &str = "DocumentRequests";
pub const PROJECT_STATUS: &str = "ProjectStatus";
pub const DEPARTMENTS: &str = "Departments";

/// Range-level primitives over a single logical spreadsheet.
///
/// None of these calls are transactional. A read followed by a write can race with
/// another writer; callers that scan-then-write serialize through the repository's
/// per-sheet locks, which only covers this process.
#[async_trait]
pub trait TabularStore: Send + Sync {
    async fn read_range(&self, sheet: &str, range: CellRange) -> AppResult<Vec<Row>>;

    async fn append_row(&self, sheet: &str, values: Row) -> AppResult<()>;

    async fn update_range(&self, sheet: &str, range: CellRange, values: Vec<Row>) -> AppResult<()>;

    /// Remove a whole row, shifting the rows below it up. `row_number` is 1-based.
    async fn delete_row(&self, sheet: &str, row_number: u32) -> AppResult<()>;
}
