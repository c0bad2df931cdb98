//! Typed records and their fixed column layouts.
//!
//! Column positions are load-bearing: every sheet keeps the order it has always had,
//! and raw rows never leave this module. Readers tolerate ragged rows (older rows
//! predate newer columns) and blank cells.

pub mod department;
pub mod document_request;
pub mod employee;
pub mod holiday;
pub mod leave_request;
pub mod payslip;
pub mod project;
pub mod role;
pub mod timesheet;

use chrono::NaiveDate;

use crate::sheets::{self, Row};

/// Header rows written when a spreadsheet is created from scratch.
pub const SHEET_HEADERS: [(&str, &[&str]); 8] = [
    (
        sheets::EMPLOYEES,
        &[
            "Email", "Name", "Designation", "Department", "Contact", "Joining Date",
            "Photo URL", "Role", "Project Name", "Allocated Hours", "Start Date",
        ],
    ),
    (
        sheets::LEAVE,
        &["Email", "Leave Type", "Start Date", "End Date", "Reason", "Status", "Department"],
    ),
    (
        sheets::TIMESHEET,
        &["Email", "Date", "Project", "Task", "Duration", "Department"],
    ),
    (sheets::HOLIDAYS, &["Date", "Name"]),
    (sheets::PAYSLIPS, &["Email", "Month", "Year", "URL", "Department"]),
    (
        sheets::DOCUMENT_REQUESTS,
        &["Email", "Document Type", "Status", "URL", "Department"],
    ),
    (
        sheets::PROJECT_STATUS,
        &["Employee Email", "Project Name", "Timestamp", "Screenshot URL", "Feedback"],
    ),
    (sheets::DEPARTMENTS, &["Department"]),
];

/// Cell text, or an empty string when the row is too short or the cell is blank.
pub fn cell(row: &Row, index: usize) -> String {
    row.get(index).cloned().flatten().unwrap_or_default()
}

/// Cell text, `None` when missing or whitespace only.
pub fn opt_cell(row: &Row, index: usize) -> Option<String> {
    row.get(index)
        .cloned()
        .flatten()
        .filter(|s| !s.trim().is_empty())
}

/// Build a row for writing; empty strings become blank cells.
pub fn to_cells<I, S>(values: I) -> Row
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    values
        .into_iter()
        .map(|v| {
            let v: String = v.into();
            (!v.is_empty()).then_some(v)
        })
        .collect()
}

/// Emails compare case-insensitively and ignore surrounding whitespace.
pub fn same_email(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}

pub const SHEET_DATE_FORMAT: &str = "%Y-%m-%d";

/// Dates are written ISO; older rows may hold `M/D/YYYY`.
pub fn parse_sheet_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, SHEET_DATE_FORMAT)
        .or_else(|_| NaiveDate::parse_from_str(value, "%m/%d/%Y"))
        .ok()
}

pub fn format_sheet_date(date: NaiveDate) -> String {
    date.format(SHEET_DATE_FORMAT).to_string()
}

pub fn parse_hours(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok().filter(|h| h.is_finite())
}

/// Hours are written without a trailing `.0` so the sheet stays readable.
pub fn format_hours(hours: f64) -> String {
    if hours.fract() == 0.0 {
        format!("{}", hours as i64)
    } else {
        format!("{hours}")
    }
}

const DRIVE_HOST: &str = "drive.google.com";
const DRIVE_FILE_MARKER: &str = "drive.google.com/file/d/";

/// Rewrite a Drive "file view" link into a directly embeddable one. Anything that
/// does not look like a Drive file link is returned unchanged.
pub fn embeddable_drive_url(url: &str) -> String {
    if !url.contains(DRIVE_HOST) {
        return url.to_string();
    }
    let Some(pos) = url.find(DRIVE_FILE_MARKER) else {
        return url.to_string();
    };
    let id: String = url[pos + DRIVE_FILE_MARKER.len()..]
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
        .collect();
    if id.is_empty() {
        return url.to_string();
    }
    format!("https://drive.google.com/uc?export=view&id={id}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn ragged_rows_read_as_blank() {
        let row: Row = vec![Some("a@x.com".into()), None];
        assert_eq!(cell(&row, 0), "a@x.com");
        assert_eq!(cell(&row, 1), "");
        assert_eq!(cell(&row, 7), "");
        assert_eq!(opt_cell(&row, 7), None);
    }

    #[rstest]
    #[case(
        "https://drive.google.com/file/d/1AbC_d-9/view?usp=sharing",
        "https://drive.google.com/uc?export=view&id=1AbC_d-9"
    )]
    #[case(
        "https://drive.google.com/uc?id=1AbC",
        "https://drive.google.com/uc?id=1AbC"
    )]
    #[case("https://cdn.example.com/p.jpg", "https://cdn.example.com/p.jpg")]
    #[case("", "")]
    fn drive_links_become_embeddable(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(embeddable_drive_url(input), expected);
    }

    #[rstest]
    #[case("2026-03-02", Some(NaiveDate::from_ymd_opt(2026, 3, 2).unwrap()))]
    #[case("3/2/2026", Some(NaiveDate::from_ymd_opt(2026, 3, 2).unwrap()))]
    #[case("yesterday", None)]
    fn sheet_dates_accept_both_layouts(#[case] input: &str, #[case] expected: Option<NaiveDate>) {
        assert_eq!(parse_sheet_date(input), expected);
    }

    #[test]
    fn hours_format_without_trailing_zero() {
        assert_eq!(format_hours(136.0), "136");
        assert_eq!(format_hours(7.5), "7.5");
        assert_eq!(parse_hours(" 8 "), Some(8.0));
        assert_eq!(parse_hours("eight"), None);
    }

    #[test]
    fn email_comparison_is_case_insensitive() {
        assert!(same_email("A@x.com ", "a@X.COM"));
        assert!(!same_email("a@x.com", "b@x.com"));
    }
}
