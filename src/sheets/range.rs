//! A1-notation addressing.
//!
//! Sheet rows are 1-based and row 1 always holds the header, so the first data row
//! is row 2. Repository scans work with 0-based indexes into the data rows and go
//! through [`data_row_number`] before addressing a write.

use std::fmt;

#[cfg(test)]
use crate::error::{AppError, AppResult};

/// Sheet row number of the first data row (row 1 is the header).
pub const DATA_START_ROW: u32 = 2;

/// Translate a 0-based index into the data rows returned by a `A2:..` read into the
/// 1-based sheet row it lives on.
pub fn data_row_number(index: usize) -> u32 {
    index as u32 + DATA_START_ROW
}

/// `0 -> "A"`, `25 -> "Z"`, `26 -> "AA"`.
pub fn column_letter(index: usize) -> String {
    let mut n = index + 1;
    let mut letters = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    letters.reverse();
    String::from_utf8(letters).unwrap_or_default()
}

/// Inverse of [`column_letter`]; case-insensitive.
#[cfg(test)]
pub fn column_index(letters: &str) -> Option<usize> {
    if letters.is_empty() {
        return None;
    }
    let mut n: usize = 0;
    for c in letters.chars() {
        if !c.is_ascii_alphabetic() {
            return None;
        }
        n = n * 26 + (c.to_ascii_uppercase() as u8 - b'A') as usize + 1;
    }
    Some(n - 1)
}

/// A rectangular range inside one sheet. `None` rows are open-ended
/// (`A2:F` runs to the last populated row, `A:A` is the whole column).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRange {
    pub start_col: usize,
    pub start_row: Option<u32>,
    pub end_col: usize,
    pub end_row: Option<u32>,
}

impl CellRange {
    /// All data rows between two columns, header excluded.
    pub fn data(start_col: usize, end_col: usize) -> Self {
        Self {
            start_col,
            start_row: Some(DATA_START_ROW),
            end_col,
            end_row: None,
        }
    }

    /// Columns `start_col..=end_col` of a single sheet row.
    pub fn row(start_col: usize, end_col: usize, row: u32) -> Self {
        Self {
            start_col,
            start_row: Some(row),
            end_col,
            end_row: Some(row),
        }
    }

    pub fn cell(col: usize, row: u32) -> Self {
        Self::row(col, col, row)
    }

    #[cfg(test)]
    pub fn width(&self) -> usize {
        self.end_col.saturating_sub(self.start_col) + 1
    }

    #[cfg(test)]
    pub fn parse(a1: &str) -> AppResult<Self> {
        let invalid = || AppError::store(format!("invalid A1 range '{a1}'"));

        let (start, end) = match a1.split_once(':') {
            Some((s, e)) => (s, Some(e)),
            None => (a1, None),
        };
        let (start_col, start_row) = parse_ref(start).ok_or_else(invalid)?;
        let (end_col, end_row) = match end {
            Some(e) => parse_ref(e).ok_or_else(invalid)?,
            None => (start_col, start_row),
        };
        if end_col < start_col {
            return Err(invalid());
        }

        Ok(Self {
            start_col,
            start_row,
            end_col,
            end_row,
        })
    }
}

impl fmt::Display for CellRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let start = format_ref(self.start_col, self.start_row);
        if self.start_col == self.end_col && self.start_row == self.end_row && self.start_row.is_some() {
            return f.write_str(&start);
        }
        write!(f, "{}:{}", start, format_ref(self.end_col, self.end_row))
    }
}

#[cfg(test)]
fn parse_ref(part: &str) -> Option<(usize, Option<u32>)> {
    let split = part
        .find(|c: char| c.is_ascii_digit())
        .unwrap_or(part.len());
    let (letters, digits) = part.split_at(split);
    let col = column_index(letters)?;
    let row = if digits.is_empty() {
        None
    } else {
        match digits.parse::<u32>() {
            Ok(0) | Err(_) => return None,
            Ok(r) => Some(r),
        }
    };
    Some((col, row))
}

fn format_ref(col: usize, row: Option<u32>) -> String {
    match row {
        Some(r) => format!("{}{}", column_letter(col), r),
        None => column_letter(col),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, "A")]
    #[case(5, "F")]
    #[case(25, "Z")]
    #[case(26, "AA")]
    #[case(51, "AZ")]
    #[case(701, "ZZ")]
    fn column_letters_round_trip(#[case] index: usize, #[case] letters: &str) {
        assert_eq!(column_letter(index), letters);
        assert_eq!(column_index(letters), Some(index));
    }

    #[test]
    fn first_data_row_is_sheet_row_two() {
        assert_eq!(data_row_number(0), 2);
        assert_eq!(data_row_number(9), 11);
    }

    #[test]
    fn parses_open_ended_data_range() {
        let range = CellRange::parse("A2:F").unwrap();
        assert_eq!(range, CellRange::data(0, 5));
        assert_eq!(range.width(), 6);
        assert_eq!(range.to_string(), "A2:F");
    }

    #[test]
    fn parses_single_cell() {
        let range = CellRange::parse("F7").unwrap();
        assert_eq!(range, CellRange::cell(5, 7));
        assert_eq!(range.to_string(), "F7");
    }

    #[test]
    fn formats_row_segment() {
        assert_eq!(CellRange::row(8, 10, 4).to_string(), "I4:K4");
        assert_eq!(CellRange::parse("a:a").unwrap().to_string(), "A:A");
    }

    #[rstest]
    #[case("")]
    #[case("2A")]
    #[case("A0")]
    #[case("F2:A")]
    fn rejects_malformed_ranges(#[case] input: &str) {
        assert!(CellRange::parse(input).is_err());
    }
}
