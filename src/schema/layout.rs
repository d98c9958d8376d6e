//! Fixed column layout of the mission worksheet

use crate::store::SheetTable;
use crate::types::MissionRow;

/// Data columns, in generation order
pub const MISSION_COLUMNS: [&str; 5] = ["date", "type", "triggers", "durations", "ethogram"];

/// Header of the store-computed diagnostic column
pub const COMMA_COUNT_COLUMN: &str = "comma_count";

/// 1-based position of the diagnostic column (F)
pub const COMMA_COUNT_COLUMN_INDEX: usize = MISSION_COLUMNS.len() + 1;

/// Commas in the ethogram cell plus one; zero for an empty cell
pub const COMMA_COUNT_FORMULA: &str =
    r#"=IF(LEN(E{row})=0,0,LEN(E{row})-LEN(SUBSTITUTE(E{row},",",""))+1)"#;

/// Size of a freshly created worksheet
pub const NEW_WORKSHEET_ROWS: usize = 40;
pub const NEW_WORKSHEET_COLS: usize = COMMA_COUNT_COLUMN_INDEX;

/// Column widths applied to new worksheets (1-based column, pixels)
pub const COLUMN_WIDTHS: [(usize, u32); 3] = [(1, 100), (3, 160), (5, 400)];

/// Header row for the data columns
pub fn mission_header() -> Vec<String> {
    MISSION_COLUMNS.iter().map(|c| c.to_string()).collect()
}

/// Store cells for one mission row, in [`MISSION_COLUMNS`] order
pub fn mission_cells(row: &MissionRow) -> Vec<String> {
    vec![
        row.date.format("%Y-%m-%d").to_string(),
        row.kind.as_str().to_string(),
        row.triggers.clone(),
        row.duration_seconds.to_string(),
        row.ethogram_raw.clone().unwrap_or_default(),
    ]
}

/// Table of mission rows under the standard header
pub fn mission_table(rows: &[MissionRow]) -> SheetTable {
    SheetTable::new(mission_header(), rows.iter().map(mission_cells).collect())
}
