//! Typed operations over the portal spreadsheet.
//!
//! Every call re-reads the ranges it needs; nothing is cached between calls. Writes
//! that first scan for their target row hold the per-sheet lock from the scan until
//! the write lands, so two requests in this process cannot interleave on one sheet.
//! Other processes writing the same spreadsheet are not covered.

mod directory;
mod document;
mod employee;
mod holiday;
mod leave;
mod payslip;
mod project;
mod stats;
mod timesheet;
pub mod validation;

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;
use tokio::sync::{Mutex, MutexGuard};

pub use directory::DepartmentDirectory;
pub use stats::DepartmentStats;

use crate::error::AppResult;
use crate::model::SHEET_HEADERS;
use crate::notify::{Notification, Outbox};
use crate::sheets::{CellRange, EMPLOYEES, Row, TabularStore};

/// Source of "today" for date stamps and hour consumption.
#[derive(Debug, Clone)]
pub enum Clock {
    /// Current date in the given zone.
    Zone(Tz),
    #[cfg(test)]
    Fixed(NaiveDate),
}

impl Clock {
    pub fn today(&self) -> NaiveDate {
        match self {
            Clock::Zone(tz) => Utc::now().with_timezone(tz).date_naive(),
            #[cfg(test)]
            Clock::Fixed(date) => *date,
        }
    }

    /// Timestamp written into append-only logs.
    pub fn timestamp(&self) -> String {
        match self {
            Clock::Zone(tz) => Utc::now().with_timezone(tz).to_rfc3339(),
            #[cfg(test)]
            Clock::Fixed(date) => format!("{}T00:00:00", crate::model::format_sheet_date(*date)),
        }
    }
}

pub struct Repository {
    store: Arc<dyn TabularStore>,
    outbox: Outbox,
    clock: Clock,
    locks: HashMap<&'static str, Mutex<()>>,
    fallback_lock: Mutex<()>,
}

impl Repository {
    pub fn new(store: Arc<dyn TabularStore>, outbox: Outbox, clock: Clock) -> Self {
        let locks = SHEET_HEADERS
            .iter()
            .map(|(sheet, _)| (*sheet, Mutex::new(())))
            .collect();

        Self {
            store,
            outbox,
            clock,
            locks,
            fallback_lock: Mutex::new(()),
        }
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    /// Serialize scan-then-write sequences on one sheet.
    async fn lock(&self, sheet: &str) -> MutexGuard<'_, ()> {
        match self.locks.get(sheet) {
            Some(lock) => lock.lock().await,
            None => self.fallback_lock.lock().await,
        }
    }

    /// All data rows of a sheet, columns `A..=last_col`. Positions are preserved, so
    /// index `i` lives at sheet row `data_row_number(i)`.
    async fn data_rows(&self, sheet: &str, last_col: usize) -> AppResult<Vec<Row>> {
        self.store.read_range(sheet, CellRange::data(0, last_col)).await
    }

    async fn directory(&self) -> AppResult<DepartmentDirectory> {
        let rows = self.data_rows(EMPLOYEES, crate::model::employee::col::DEPARTMENT).await?;
        Ok(DepartmentDirectory::from_rows(&rows))
    }

    fn notify(&self, notification: Notification) {
        self.outbox.enqueue(notification);
    }
}
