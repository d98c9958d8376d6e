//! In-memory workbook
//!
//! Cells are kept as a dense row-major grid of strings. Formula columns are
//! stored as templates and rendered against the live row number on read, so
//! deleting rows keeps every formula pointing at its own row.

use super::{CellRange, SheetTable, TabularStore};
use crate::error::MissionError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A set of named worksheets
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Workbook {
    worksheets: BTreeMap<String, Worksheet>,
}

/// One worksheet's grid, column widths and formula columns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Worksheet {
    cells: Vec<Vec<String>>,
    cols: usize,
    #[serde(default)]
    column_widths: BTreeMap<usize, u32>,
    #[serde(default)]
    formulas: Vec<FormulaColumn>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct FormulaColumn {
    range: CellRange,
    template: String,
}

impl Worksheet {
    fn new(rows: usize, cols: usize) -> Self {
        Self {
            cells: vec![vec![String::new(); cols]; rows],
            cols,
            column_widths: BTreeMap::new(),
            formulas: Vec::new(),
        }
    }

    pub fn row_count(&self) -> usize {
        self.cells.len()
    }

    pub fn col_count(&self) -> usize {
        self.cols
    }

    pub fn column_width(&self, column: usize) -> Option<u32> {
        self.column_widths.get(&column).copied()
    }

    /// Cell value as the store would display it (1-based coordinates)
    pub fn value(&self, row: usize, col: usize) -> String {
        let formula = self.formulas.iter().rev().find(|f| {
            f.range.column == col && (f.range.start_row..=f.range.end_row).contains(&row)
        });
        if let Some(formula) = formula {
            return formula.template.replace("{row}", &row.to_string());
        }
        self.cells
            .get(row.wrapping_sub(1))
            .and_then(|r| r.get(col.wrapping_sub(1)))
            .cloned()
            .unwrap_or_default()
    }

    fn row_values(&self, row: usize) -> Vec<String> {
        (1..=self.cols).map(|col| self.value(row, col)).collect()
    }

    fn ensure_size(&mut self, rows: usize, cols: usize) {
        if cols > self.cols {
            for row in &mut self.cells {
                row.resize(cols, String::new());
            }
            self.cols = cols;
        }
        if rows > self.cells.len() {
            self.cells.resize(rows, vec![String::new(); self.cols]);
        }
    }

    fn set(&mut self, row: usize, col: usize, value: String) {
        self.ensure_size(row, col);
        self.cells[row - 1][col - 1] = value;
    }

    fn delete(&mut self, start: usize, end: usize) {
        self.cells.drain(start - 1..end);
        let removed = end - start + 1;

        self.formulas.retain_mut(|f| {
            let range = &mut f.range;
            if start > range.end_row {
                return true;
            }
            if end < range.start_row {
                range.start_row -= removed;
                range.end_row -= removed;
                return true;
            }
            if start <= range.start_row && end >= range.end_row {
                return false;
            }
            range.end_row -= end.min(range.end_row) - start + 1;
            range.start_row = range.start_row.min(start);
            true
        });
    }
}

impl Workbook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn worksheet(&self, name: &str) -> Option<&Worksheet> {
        self.worksheets.get(name)
    }

    pub fn worksheet_names(&self) -> impl Iterator<Item = &str> {
        self.worksheets.keys().map(String::as_str)
    }

    fn sheet(&self, name: &str) -> Result<&Worksheet, MissionError> {
        self.worksheets
            .get(name)
            .ok_or_else(|| MissionError::StoreUnavailable(format!("no worksheet named {name:?}")))
    }

    fn sheet_mut(&mut self, name: &str) -> Result<&mut Worksheet, MissionError> {
        self.worksheets
            .get_mut(name)
            .ok_or_else(|| MissionError::StoreUnavailable(format!("no worksheet named {name:?}")))
    }
}

impl TabularStore for Workbook {
    fn worksheet_exists(&self, name: &str) -> Result<bool, MissionError> {
        Ok(self.worksheets.contains_key(name))
    }

    fn create_worksheet(
        &mut self,
        name: &str,
        rows: usize,
        cols: usize,
    ) -> Result<(), MissionError> {
        if self.worksheets.contains_key(name) {
            return Err(MissionError::StoreUnavailable(format!(
                "worksheet {name:?} already exists"
            )));
        }
        self.worksheets
            .insert(name.to_string(), Worksheet::new(rows, cols));
        Ok(())
    }

    fn read_all_rows(&self, worksheet: &str) -> Result<SheetTable, MissionError> {
        let sheet = self.sheet(worksheet)?;
        if sheet.row_count() == 0 {
            return Ok(SheetTable::default());
        }

        let header = sheet.row_values(1);
        let rows = (2..=sheet.row_count()).map(|r| sheet.row_values(r)).collect();
        Ok(SheetTable::new(header, rows))
    }

    fn write_rows(
        &mut self,
        worksheet: &str,
        start_row: usize,
        start_col: usize,
        table: &SheetTable,
        include_header: bool,
    ) -> Result<(), MissionError> {
        if start_row == 0 || start_col == 0 {
            return Err(MissionError::StoreUnavailable(
                "store coordinates are 1-based".to_string(),
            ));
        }
        let sheet = self.sheet_mut(worksheet)?;

        let mut row = start_row;
        if include_header {
            for (offset, value) in table.header.iter().enumerate() {
                sheet.set(row, start_col + offset, value.clone());
            }
            row += 1;
        }
        for values in &table.rows {
            for (offset, value) in values.iter().enumerate() {
                sheet.set(row, start_col + offset, value.clone());
            }
            row += 1;
        }
        Ok(())
    }

    fn delete_rows(
        &mut self,
        worksheet: &str,
        start: usize,
        end: usize,
    ) -> Result<(), MissionError> {
        let sheet = self.sheet_mut(worksheet)?;
        if start == 0 || start > end || end > sheet.row_count() {
            return Err(MissionError::StoreUnavailable(format!(
                "cannot delete rows {start}..={end} from a sheet of {} rows",
                sheet.row_count()
            )));
        }
        sheet.delete(start, end);
        Ok(())
    }

    fn set_column_width(
        &mut self,
        worksheet: &str,
        column: usize,
        width: u32,
    ) -> Result<(), MissionError> {
        self.sheet_mut(worksheet)?
            .column_widths
            .insert(column, width);
        Ok(())
    }

    fn set_cell_formula(
        &mut self,
        worksheet: &str,
        range: CellRange,
        template: &str,
    ) -> Result<(), MissionError> {
        let sheet = self.sheet_mut(worksheet)?;
        sheet.ensure_size(range.end_row, range.column);
        sheet.formulas.push(FormulaColumn {
            range,
            template: template.to_string(),
        });
        Ok(())
    }
}
