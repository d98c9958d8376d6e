//! JSON-file backed store
//!
//! Wraps a [`Workbook`] and writes it back to disk after every mutation.

use super::{CellRange, SheetTable, TabularStore, Workbook};
use crate::error::MissionError;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Workbook persisted as a single JSON document
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    workbook: Workbook,
}

impl JsonFileStore {
    /// Open the workbook at `path`, starting empty if the file does not exist
    pub fn open(path: impl AsRef<Path>) -> Result<Self, MissionError> {
        let path = path.as_ref().to_path_buf();
        let workbook = if path.exists() {
            let content = fs::read_to_string(&path).map_err(|e| {
                MissionError::StoreUnavailable(format!("cannot read {}: {e}", path.display()))
            })?;
            serde_json::from_str(&content)?
        } else {
            debug!(path = %path.display(), "workbook file missing; starting empty");
            Workbook::new()
        };
        Ok(Self { path, workbook })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn workbook(&self) -> &Workbook {
        &self.workbook
    }

    fn save(&self) -> Result<(), MissionError> {
        let content = serde_json::to_string_pretty(&self.workbook)?;
        fs::write(&self.path, content).map_err(|e| {
            MissionError::StoreUnavailable(format!("cannot write {}: {e}", self.path.display()))
        })
    }
}

impl TabularStore for JsonFileStore {
    fn worksheet_exists(&self, name: &str) -> Result<bool, MissionError> {
        self.workbook.worksheet_exists(name)
    }

    fn create_worksheet(
        &mut self,
        name: &str,
        rows: usize,
        cols: usize,
    ) -> Result<(), MissionError> {
        self.workbook.create_worksheet(name, rows, cols)?;
        self.save()
    }

    fn read_all_rows(&self, worksheet: &str) -> Result<SheetTable, MissionError> {
        self.workbook.read_all_rows(worksheet)
    }

    fn write_rows(
        &mut self,
        worksheet: &str,
        start_row: usize,
        start_col: usize,
        table: &SheetTable,
        include_header: bool,
    ) -> Result<(), MissionError> {
        self.workbook
            .write_rows(worksheet, start_row, start_col, table, include_header)?;
        self.save()
    }

    fn delete_rows(
        &mut self,
        worksheet: &str,
        start: usize,
        end: usize,
    ) -> Result<(), MissionError> {
        self.workbook.delete_rows(worksheet, start, end)?;
        self.save()
    }

    fn set_column_width(
        &mut self,
        worksheet: &str,
        column: usize,
        width: u32,
    ) -> Result<(), MissionError> {
        self.workbook.set_column_width(worksheet, column, width)?;
        self.save()
    }

    fn set_cell_formula(
        &mut self,
        worksheet: &str,
        range: CellRange,
        template: &str,
    ) -> Result<(), MissionError> {
        self.workbook.set_cell_formula(worksheet, range, template)?;
        self.save()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reopen_sees_saved_changes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missions.json");

        let mut store = JsonFileStore::open(&path).unwrap();
        assert!(!path.exists());
        store.create_worksheet("missions", 3, 2).unwrap();
        let table = SheetTable::new(
            vec!["date".to_string(), "type".to_string()],
            vec![vec!["2024-01-15".to_string(), "departure".to_string()]],
        );
        store.write_rows("missions", 1, 1, &table, true).unwrap();

        let reopened = JsonFileStore::open(&path).unwrap();
        let read = reopened.read_all_rows("missions").unwrap();
        assert_eq!(read.header, table.header);
        assert_eq!(read.rows[0], table.rows[0]);
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{not json").unwrap();
        assert!(matches!(
            JsonFileStore::open(&path),
            Err(MissionError::JsonError(_))
        ));
    }
}
