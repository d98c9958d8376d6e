//! Tabular store collaborator
//!
//! The mission table lives in a spreadsheet-like store that a human annotates
//! between generation and analysis. This module defines the operations the
//! pipeline needs from such a store, plus two implementations: an in-memory
//! [`Workbook`] and a JSON-file backed [`JsonFileStore`].
//!
//! Row and column indices are 1-based. Row 1 holds the header, so the data row
//! at 0-based sequence index `i` lives at store row `i + 2`.

mod file;
mod workbook;

pub use file::JsonFileStore;
pub use workbook::{Workbook, Worksheet};

use crate::error::MissionError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Offset between a 0-based data index and its 1-based store row
pub const HEADER_ROW_OFFSET: usize = 2;

/// Convert a 0-based data row index to a store row
pub fn store_row(index: usize) -> usize {
    index + HEADER_ROW_OFFSET
}

/// Header plus data rows, as read from or written to a worksheet
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetTable {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl SheetTable {
    pub fn new(header: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { header, rows }
    }

    /// 0-based position of a named column
    pub fn column(&self, name: &str) -> Option<usize> {
        self.header.iter().position(|h| h.trim() == name)
    }

    /// Cell text, empty when the row is shorter than `col`
    pub fn cell(&self, row: usize, col: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .map(String::as_str)
            .unwrap_or("")
    }

    /// True when the first `width` cells of a row are all blank
    pub fn is_blank_row(&self, row: usize, width: usize) -> bool {
        (0..width).all(|col| self.cell(row, col).trim().is_empty())
    }
}

/// A single-column block of cells, 1-based and inclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellRange {
    pub column: usize,
    pub start_row: usize,
    pub end_row: usize,
}

impl fmt::Display for CellRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let letter = column_letter(self.column);
        write!(f, "{letter}{}:{letter}{}", self.start_row, self.end_row)
    }
}

/// Spreadsheet column name for a 1-based column index (1 → A, 27 → AA)
pub fn column_letter(mut column: usize) -> String {
    let mut letters = Vec::new();
    while column > 0 {
        let rem = (column - 1) % 26;
        letters.push((b'A' + rem as u8) as char);
        column = (column - 1) / 26;
    }
    letters.iter().rev().collect()
}

/// Operations consumed from the tabular store
///
/// Implementations are not expected to coordinate concurrent writers.
pub trait TabularStore {
    /// Whether a worksheet with this name exists
    fn worksheet_exists(&self, name: &str) -> Result<bool, MissionError>;

    /// Create an empty worksheet of the given size
    fn create_worksheet(&mut self, name: &str, rows: usize, cols: usize)
        -> Result<(), MissionError>;

    /// Read row 1 as the header and every following row as data
    fn read_all_rows(&self, worksheet: &str) -> Result<SheetTable, MissionError>;

    /// Write `table` with its top-left cell at (`start_row`, `start_col`)
    ///
    /// When `include_header` is set, the header occupies `start_row` and data
    /// starts on the row below.
    fn write_rows(
        &mut self,
        worksheet: &str,
        start_row: usize,
        start_col: usize,
        table: &SheetTable,
        include_header: bool,
    ) -> Result<(), MissionError>;

    /// Delete rows `start..=end`, shifting later rows up
    fn delete_rows(&mut self, worksheet: &str, start: usize, end: usize)
        -> Result<(), MissionError>;

    fn set_column_width(
        &mut self,
        worksheet: &str,
        column: usize,
        width: u32,
    ) -> Result<(), MissionError>;

    /// Install a per-row formula; `{row}` in the template is the row number
    fn set_cell_formula(
        &mut self,
        worksheet: &str,
        range: CellRange,
        template: &str,
    ) -> Result<(), MissionError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_letters() {
        assert_eq!(column_letter(1), "A");
        assert_eq!(column_letter(6), "F");
        assert_eq!(column_letter(26), "Z");
        assert_eq!(column_letter(27), "AA");
        assert_eq!(column_letter(52), "AZ");
    }

    #[test]
    fn test_cell_range_display() {
        let range = CellRange {
            column: 6,
            start_row: 2,
            end_row: 40,
        };
        assert_eq!(range.to_string(), "F2:F40");
    }

    #[test]
    fn test_blank_row_checks_leading_columns_only() {
        let table = SheetTable::new(
            vec!["a".into(), "b".into(), "c".into()],
            vec![vec!["".into(), " ".into(), "=1".into()], vec!["x".into()]],
        );
        assert!(table.is_blank_row(0, 2));
        assert!(!table.is_blank_row(0, 3));
        assert!(!table.is_blank_row(1, 2));
        assert!(table.is_blank_row(5, 2));
        assert_eq!(store_row(0), 2);
    }
}
