//! Append/replace writer
//!
//! Writes a day's mission into a shared worksheet:
//! 1. Create the worksheet (with the comma_count diagnostic column) if absent
//! 2. Delete any rows already holding a mission for the same date
//! 3. Write the new rows at the first blank row
//!
//! The steps are separate store calls and are not atomic. Concurrent writers
//! to the same worksheet are unsupported; the last writer wins.

use crate::error::MissionError;
use crate::schema::{
    mission_table, COLUMN_WIDTHS, COMMA_COUNT_COLUMN, COMMA_COUNT_COLUMN_INDEX,
    COMMA_COUNT_FORMULA, MISSION_COLUMNS, NEW_WORKSHEET_COLS, NEW_WORKSHEET_ROWS,
};
use crate::store::{store_row, CellRange, SheetTable, TabularStore};
use crate::types::MissionRow;
use chrono::NaiveDate;
use tracing::{debug, info};

/// Where a mission was written
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteOutcome {
    /// Whether the worksheet was created by this call
    pub created: bool,
    /// Rows removed because they held a mission for the same date
    pub replaced_rows: usize,
    /// Store row of the first mission row
    pub first_row: usize,
}

/// Writer implementing the replace-then-append protocol
pub struct MissionWriter;

impl MissionWriter {
    pub fn write_mission<S: TabularStore + ?Sized>(
        store: &mut S,
        worksheet: &str,
        date: NaiveDate,
        rows: &[MissionRow],
    ) -> Result<WriteOutcome, MissionError> {
        if let Some(row) = rows.iter().find(|row| row.date != date) {
            return Err(MissionError::InvalidParameters(format!(
                "mission row dated {} does not belong to {date}",
                row.date
            )));
        }

        let created = Self::ensure_worksheet(store, worksheet)?;

        let replaced_rows = Self::delete_same_day(store, worksheet, date)?;

        let table = store.read_all_rows(worksheet)?;
        let sheet_rows = table.rows.len() + 1;
        let insert_at = first_blank_row(&table);
        let mission = mission_table(rows);

        let first_row = store_row(insert_at);
        if created {
            // Header goes on the row above the first data row
            store.write_rows(worksheet, first_row - 1, 1, &mission, true)?;
        } else {
            store.write_rows(worksheet, first_row, 1, &mission, false)?;
        }

        // Rows the sheet grew into have no formula yet
        let last_row = first_row + rows.len().saturating_sub(1);
        if !rows.is_empty() && last_row > sheet_rows {
            Self::extend_comma_count(store, worksheet, first_row.max(sheet_rows + 1), last_row)?;
        }

        info!(
            worksheet,
            %date,
            rows = rows.len(),
            first_row,
            replaced_rows,
            "wrote mission"
        );

        Ok(WriteOutcome {
            created,
            replaced_rows,
            first_row,
        })
    }

    /// Create and provision the worksheet if needed; returns whether it was created
    fn ensure_worksheet<S: TabularStore + ?Sized>(
        store: &mut S,
        worksheet: &str,
    ) -> Result<bool, MissionError> {
        if store.worksheet_exists(worksheet)? {
            return Ok(false);
        }

        store.create_worksheet(worksheet, NEW_WORKSHEET_ROWS, NEW_WORKSHEET_COLS)?;
        for (column, width) in COLUMN_WIDTHS {
            store.set_column_width(worksheet, column, width)?;
        }

        let header = SheetTable::new(vec![COMMA_COUNT_COLUMN.to_string()], Vec::new());
        store.write_rows(worksheet, 1, COMMA_COUNT_COLUMN_INDEX, &header, true)?;

        let range = CellRange {
            column: COMMA_COUNT_COLUMN_INDEX,
            start_row: 2,
            end_row: NEW_WORKSHEET_ROWS,
        };
        store.set_cell_formula(worksheet, range, COMMA_COUNT_FORMULA)?;

        debug!(worksheet, %range, "created worksheet");
        Ok(true)
    }

    /// Cover rows the sheet grew into with the comma_count formula
    fn extend_comma_count<S: TabularStore + ?Sized>(
        store: &mut S,
        worksheet: &str,
        start_row: usize,
        end_row: usize,
    ) -> Result<(), MissionError> {
        let range = CellRange {
            column: COMMA_COUNT_COLUMN_INDEX,
            start_row,
            end_row,
        };
        store.set_cell_formula(worksheet, range, COMMA_COUNT_FORMULA)?;
        debug!(worksheet, %range, "extended comma_count formula");
        Ok(())
    }

    /// Remove every row dated `date`, one contiguous run at a time
    fn delete_same_day<S: TabularStore + ?Sized>(
        store: &mut S,
        worksheet: &str,
        date: NaiveDate,
    ) -> Result<usize, MissionError> {
        let table = store.read_all_rows(worksheet)?;
        let date_text = date.format("%Y-%m-%d").to_string();

        let Some(date_col) = table.column("date") else {
            return Ok(0);
        };

        let matching: Vec<usize> = (0..table.rows.len())
            .filter(|&index| table.cell(index, date_col).trim() == date_text)
            .collect();

        // Bottom-up so earlier row numbers stay valid
        let runs = contiguous_runs(&matching);
        for &(start, end) in runs.iter().rev() {
            store.delete_rows(worksheet, store_row(start), store_row(end))?;
            debug!(
                worksheet,
                start = store_row(start),
                end = store_row(end),
                "deleted same-day rows"
            );
        }

        Ok(matching.len())
    }
}

/// First data row whose mission columns are all blank; past the end if none
fn first_blank_row(table: &SheetTable) -> usize {
    (0..table.rows.len())
        .find(|&index| table.is_blank_row(index, MISSION_COLUMNS.len()))
        .unwrap_or(table.rows.len())
}

/// Group sorted indices into inclusive `(start, end)` runs
fn contiguous_runs(indices: &[usize]) -> Vec<(usize, usize)> {
    let mut runs: Vec<(usize, usize)> = Vec::new();
    for &index in indices {
        match runs.last_mut() {
            Some((_, end)) if *end + 1 == index => *end = index,
            _ => runs.push((index, index)),
        }
    }
    runs
}
