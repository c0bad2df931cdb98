use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{cell, format_sheet_date, opt_cell, to_cells};
use crate::sheets::Row;

pub mod col {
    pub const DATE: usize = 0;
    pub const NAME: usize = 1;
    pub const LAST: usize = NAME;
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Holiday {
    #[schema(example = "2026-08-15")]
    pub date: String,
    #[schema(example = "Independence Day")]
    pub name: String,
}

impl Holiday {
    pub fn from_row(row: &Row) -> Option<Self> {
        Some(Self {
            date: opt_cell(row, col::DATE)?,
            name: cell(row, col::NAME),
        })
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct NewHoliday {
    #[schema(example = "2026-08-15", value_type = String, format = "date")]
    pub date: NaiveDate,
    #[schema(example = "Independence Day")]
    pub name: String,
}

impl NewHoliday {
    pub fn to_row(&self) -> Row {
        to_cells([format_sheet_date(self.date), self.name.trim().to_string()])
    }
}
