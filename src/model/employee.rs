use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::role::Role;
use super::{cell, embeddable_drive_url, opt_cell, parse_hours, to_cells};
use crate::sheets::Row;

/// `Sheet1` column layout.
pub mod col {
    pub const EMAIL: usize = 0;
    pub const NAME: usize = 1;
    pub const DESIGNATION: usize = 2;
    pub const DEPARTMENT: usize = 3;
    pub const CONTACT: usize = 4;
    pub const JOINING_DATE: usize = 5;
    pub const PHOTO_URL: usize = 6;
    pub const ROLE: usize = 7;
    pub const PROJECT_NAME: usize = 8;
    pub const ALLOCATED_HOURS: usize = 9;
    pub const START_DATE: usize = 10;
    pub const LAST: usize = START_DATE;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(example = json!({
    "email": "asha@company.com",
    "name": "Asha Rao",
    "designation": "Engineer",
    "department": "Engineering",
    "contact": "+91 98450 00000",
    "joiningDate": "2024-01-15",
    "photoURL": null,
    "role": "Employee",
    "projectName": "Payments",
    "allocatedHours": 160,
    "startDate": "2026-01-05"
}))]
pub struct Employee {
    pub email: String,
    pub name: String,
    pub designation: String,
    pub department: String,
    pub contact: String,
    pub joining_date: String,
    #[serde(rename = "photoURL")]
    pub photo_url: Option<String>,
    pub role: Role,
    pub project_name: Option<String>,
    pub allocated_hours: Option<f64>,
    pub start_date: Option<String>,
}

impl Employee {
    /// Rows without an email are spacer rows and carry no employee.
    pub fn from_row(row: &Row) -> Option<Self> {
        let email = opt_cell(row, col::EMAIL)?;
        Some(Self {
            email,
            name: cell(row, col::NAME),
            designation: cell(row, col::DESIGNATION),
            department: cell(row, col::DEPARTMENT).trim().to_string(),
            contact: cell(row, col::CONTACT),
            joining_date: cell(row, col::JOINING_DATE),
            photo_url: opt_cell(row, col::PHOTO_URL).map(|u| embeddable_drive_url(&u)),
            role: Role::from_cell(&cell(row, col::ROLE)),
            project_name: opt_cell(row, col::PROJECT_NAME),
            allocated_hours: opt_cell(row, col::ALLOCATED_HOURS).and_then(|h| parse_hours(&h)),
            start_date: opt_cell(row, col::START_DATE),
        })
    }
}

/// Admin "add employee" payload.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewEmployee {
    #[schema(example = "asha@company.com")]
    pub email: String,
    #[schema(example = "Asha Rao")]
    pub name: String,
    #[serde(default)]
    pub designation: String,
    pub department: String,
    #[serde(default)]
    pub contact: String,
    #[serde(default)]
    #[schema(example = "2024-01-15")]
    pub joining_date: String,
    #[schema(example = "Employee")]
    pub role: String,
}

impl NewEmployee {
    /// Columns A..H; photo starts blank and project columns stay untouched.
    pub fn to_row(&self, role: Role) -> Row {
        to_cells([
            self.email.trim(),
            self.name.trim(),
            self.designation.trim(),
            self.department.trim(),
            self.contact.trim(),
            self.joining_date.trim(),
            "",
            role.as_ref(),
        ])
    }
}

/// Partial update: blank or missing fields keep the stored value.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeUpdate {
    pub email: Option<String>,
    pub name: Option<String>,
    pub designation: Option<String>,
    pub department: Option<String>,
    pub contact: Option<String>,
    pub joining_date: Option<String>,
    pub role: Option<String>,
}

impl EmployeeUpdate {
    /// Merge over the stored row and return columns A..H, photo URL preserved as stored.
    pub fn merge(&self, stored: &Row, role: Option<Role>) -> Row {
        fn pick(new: &Option<String>, stored: &Row, index: usize) -> String {
            match new.as_deref().map(str::trim) {
                Some(v) if !v.is_empty() => v.to_string(),
                _ => cell(stored, index),
            }
        }

        to_cells([
            pick(&self.email, stored, col::EMAIL),
            pick(&self.name, stored, col::NAME),
            pick(&self.designation, stored, col::DESIGNATION),
            pick(&self.department, stored, col::DEPARTMENT),
            pick(&self.contact, stored, col::CONTACT),
            pick(&self.joining_date, stored, col::JOINING_DATE),
            cell(stored, col::PHOTO_URL),
            role.map(|r| r.to_string())
                .unwrap_or_else(|| cell(stored, col::ROLE)),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::to_cells;

    #[test]
    fn maps_full_row() {
        let row = to_cells([
            "asha@company.com",
            "Asha",
            "Engineer",
            " Engineering ",
            "123",
            "2024-01-15",
            "https://drive.google.com/file/d/XYZ/view",
            "admin",
            "Payments",
            "160",
            "2026-01-05",
        ]);
        let emp = Employee::from_row(&row).unwrap();
        assert_eq!(emp.department, "Engineering");
        assert_eq!(emp.role, Role::Admin);
        assert_eq!(
            emp.photo_url.as_deref(),
            Some("https://drive.google.com/uc?export=view&id=XYZ")
        );
        assert_eq!(emp.allocated_hours, Some(160.0));
    }

    #[test]
    fn short_rows_leave_optional_columns_empty() {
        let row = to_cells(["old@company.com", "Old Timer"]);
        let emp = Employee::from_row(&row).unwrap();
        assert_eq!(emp.department, "");
        assert_eq!(emp.photo_url, None);
        assert_eq!(emp.role, Role::Employee);
        assert_eq!(emp.project_name, None);
    }

    #[test]
    fn rows_without_email_are_skipped() {
        assert!(Employee::from_row(&to_cells(["", "Nobody"])).is_none());
        assert!(Employee::from_row(&Vec::new()).is_none());
    }

    #[test]
    fn merge_keeps_stored_values_for_blank_fields() {
        let stored = to_cells([
            "a@x.com", "A", "Dev", "Ops", "1", "2024-01-01", "photo", "Employee",
        ]);
        let update = EmployeeUpdate {
            designation: Some("Lead".into()),
            name: Some("  ".into()),
            ..Default::default()
        };
        let merged = update.merge(&stored, None);
        assert_eq!(cell(&merged, col::NAME), "A");
        assert_eq!(cell(&merged, col::DESIGNATION), "Lead");
        assert_eq!(cell(&merged, col::PHOTO_URL), "photo");
        assert_eq!(merged.len(), col::ROLE + 1);
    }
}
