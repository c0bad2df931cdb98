use super::opt_cell;
use crate::sheets::Row;

pub const NAME: usize = 0;

/// `Departments` is a single column of names.
pub fn from_row(row: &Row) -> Option<String> {
    opt_cell(row, NAME).map(|d| d.trim().to_string())
}
