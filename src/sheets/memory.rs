//! In-memory spreadsheet
//!
//! Keeps the same shape as the remote store: every sheet is a list of rows whose
//! first entry is the header, rows are ragged, and rows are addressed positionally.
//! Used by the tests and by `STORE_BACKEND=memory` runs.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{CellRange, Row, TabularStore};
use crate::error::{AppError, AppResult};
use crate::model;

#[derive(Clone, Default)]
pub struct MemoryStore {
    sheets: Arc<RwLock<HashMap<String, Vec<Row>>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A spreadsheet with every portal sheet created and only the header rows filled.
    pub async fn with_portal_sheets() -> Self {
        let store = Self::new();
        for (sheet, header) in model::SHEET_HEADERS {
            store.create_sheet(sheet, header).await;
        }
        store
    }

    pub async fn create_sheet(&self, name: &str, header: &[&str]) {
        let header = header.iter().map(|h| Some(h.to_string())).collect();
        self.sheets.write().await.insert(name.to_string(), vec![header]);
    }

    /// Append raw cells (empty strings become blank cells).
    #[cfg(test)]
    pub async fn push_raw(&self, name: &str, cells: &[&str]) {
        let row = cells
            .iter()
            .map(|c| (!c.is_empty()).then(|| c.to_string()))
            .collect();
        self.sheets
            .write()
            .await
            .entry(name.to_string())
            .or_default()
            .push(row);
    }

    /// Data rows of a sheet (header excluded) exactly as stored.
    #[cfg(test)]
    pub async fn data_rows(&self, name: &str) -> Vec<Row> {
        self.sheets
            .read()
            .await
            .get(name)
            .map(|rows| rows.iter().skip(1).cloned().collect())
            .unwrap_or_default()
    }
}

fn missing_sheet(name: &str) -> AppError {
    AppError::store(format!("Unable to parse range: sheet '{name}' does not exist"))
}

fn trim_trailing_blanks(mut row: Row) -> Row {
    while matches!(row.last(), Some(None)) || matches!(row.last(), Some(Some(s)) if s.is_empty()) {
        row.pop();
    }
    row
}

#[async_trait]
impl TabularStore for MemoryStore {
    async fn read_range(&self, sheet: &str, range: CellRange) -> AppResult<Vec<Row>> {
        let sheets = self.sheets.read().await;
        let rows = sheets.get(sheet).ok_or_else(|| missing_sheet(sheet))?;

        let first = range.start_row.map(|r| r as usize - 1).unwrap_or(0);
        let last = range
            .end_row
            .map(|r| r as usize)
            .unwrap_or(rows.len())
            .min(rows.len());
        if first >= last {
            return Ok(Vec::new());
        }

        let mut out: Vec<Row> = rows[first..last]
            .iter()
            .map(|row| {
                let cells = (range.start_col..=range.end_col)
                    .map(|c| row.get(c).cloned().flatten())
                    .collect();
                trim_trailing_blanks(cells)
            })
            .collect();

        while matches!(out.last(), Some(r) if r.is_empty()) {
            out.pop();
        }
        Ok(out)
    }

    async fn append_row(&self, sheet: &str, values: Row) -> AppResult<()> {
        let mut sheets = self.sheets.write().await;
        let rows = sheets.get_mut(sheet).ok_or_else(|| missing_sheet(sheet))?;
        rows.push(values);
        Ok(())
    }

    async fn update_range(&self, sheet: &str, range: CellRange, values: Vec<Row>) -> AppResult<()> {
        let mut sheets = self.sheets.write().await;
        let rows = sheets.get_mut(sheet).ok_or_else(|| missing_sheet(sheet))?;
        let start_row = range
            .start_row
            .ok_or_else(|| AppError::store(format!("update range {range} has no start row")))?
            as usize
            - 1;

        for (r, values) in values.into_iter().enumerate() {
            let target = start_row + r;
            if rows.len() <= target {
                rows.resize(target + 1, Vec::new());
            }
            let row = &mut rows[target];
            for (c, value) in values.into_iter().enumerate() {
                let col = range.start_col + c;
                if row.len() <= col {
                    row.resize(col + 1, None);
                }
                row[col] = value;
            }
        }
        Ok(())
    }

    async fn delete_row(&self, sheet: &str, row_number: u32) -> AppResult<()> {
        let mut sheets = self.sheets.write().await;
        let rows = sheets.get_mut(sheet).ok_or_else(|| missing_sheet(sheet))?;
        let index = (row_number as usize).checked_sub(1).filter(|i| *i < rows.len());
        match index {
            Some(i) => {
                rows.remove(i);
                Ok(())
            }
            None => Err(AppError::store(format!(
                "row {row_number} is outside sheet '{sheet}'"
            ))),
        }
    }
}
