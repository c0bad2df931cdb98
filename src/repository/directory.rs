use std::collections::HashMap;

use super::Repository;
use crate::error::AppResult;
use crate::model::employee::col;
use crate::model::{cell, opt_cell};
use crate::sheets::Row;

/// Email -> department map built from the employee sheet rows.
///
/// Department-scoped lists resolve every row through this map instead of the
/// department copied onto the row, so a transfer shows up immediately.
#[derive(Debug, Default, Clone)]
pub struct DepartmentDirectory {
    by_email: HashMap<String, String>,
}

fn key(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}

impl DepartmentDirectory {
    /// Build from employee rows already read, so a caller that needs the rows
    /// itself does not read the sheet twice.
    pub fn from_rows(rows: &[Row]) -> Self {
        let mut by_email = HashMap::with_capacity(rows.len());
        for row in rows {
            if let Some(email) = opt_cell(row, col::EMAIL) {
                // First row wins, matching employee lookup.
                by_email
                    .entry(key(&email))
                    .or_insert_with(|| cell(row, col::DEPARTMENT).trim().to_string());
            }
        }
        Self { by_email }
    }

    /// Department of an employee; `None` for unknown emails.
    pub fn department_of(&self, email: &str) -> Option<&str> {
        self.by_email.get(&key(email)).map(String::as_str)
    }

    pub fn in_department(&self, email: &str, department: &str) -> bool {
        self.department_of(email)
            .is_some_and(|d| d.eq_ignore_ascii_case(department.trim()))
    }

    /// `true` when no filter is given, otherwise `in_department`.
    pub fn matches(&self, email: &str, department: Option<&str>) -> bool {
        match department.map(str::trim).filter(|d| !d.is_empty()) {
            Some(d) => self.in_department(email, d),
            None => true,
        }
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.by_email.len()
    }
}

impl Repository {
    /// Department of a single employee. List operations build the whole directory once
    /// instead of calling this per row.
    pub async fn resolve_department(&self, email: &str) -> AppResult<Option<String>> {
        Ok(self.directory().await?.department_of(email).map(str::to_string))
    }
}
