//! Adapter from store tables to typed mission rows
//!
//! Columns are resolved by header name. Rows left blank by the store are
//! skipped; any other row must parse completely or the whole read fails.

use crate::error::MissionError;
use crate::store::{store_row, SheetTable};
use crate::types::{MissionKind, MissionRow, StoredMissionRow};
use chrono::NaiveDate;

/// Resolved column positions for one table
struct Columns {
    date: usize,
    kind: usize,
    durations: usize,
    triggers: Option<usize>,
    ethogram: Option<usize>,
}

impl Columns {
    fn resolve(table: &SheetTable) -> Result<Self, MissionError> {
        let required = |name: &str| {
            table
                .column(name)
                .ok_or_else(|| MissionError::SchemaError(format!("missing column {name:?}")))
        };

        Ok(Self {
            date: required("date")?,
            kind: required("type")?,
            durations: required("durations")?,
            triggers: table.column("triggers"),
            ethogram: table.column("ethogram"),
        })
    }

    fn all(&self) -> impl Iterator<Item = usize> {
        [Some(self.date), Some(self.kind), Some(self.durations), self.triggers, self.ethogram]
            .into_iter()
            .flatten()
    }
}

/// Adapter for reading mission rows out of a sheet table
pub struct SheetAdapter;

impl SheetAdapter {
    /// Parse every non-blank data row, tagging each with its store row
    pub fn parse_rows(table: &SheetTable) -> Result<Vec<StoredMissionRow>, MissionError> {
        let columns = Columns::resolve(table)?;
        let mut rows = Vec::new();

        for index in 0..table.rows.len() {
            if columns.all().all(|col| table.cell(index, col).trim().is_empty()) {
                continue;
            }
            let row = Self::parse_row(table, &columns, index)?;
            rows.push(StoredMissionRow {
                store_row: store_row(index),
                row,
            });
        }

        Ok(rows)
    }

    fn parse_row(
        table: &SheetTable,
        columns: &Columns,
        index: usize,
    ) -> Result<MissionRow, MissionError> {
        let at = store_row(index);

        let date_text = table.cell(index, columns.date).trim();
        let date = NaiveDate::parse_from_str(date_text, "%Y-%m-%d").map_err(|e| {
            MissionError::SchemaError(format!("row {at}: invalid date {date_text:?}: {e}"))
        })?;

        let kind_text = table.cell(index, columns.kind);
        let kind = MissionKind::parse(kind_text).ok_or_else(|| {
            MissionError::SchemaError(format!("row {at}: invalid type {kind_text:?}"))
        })?;

        let duration_text = table.cell(index, columns.durations).trim();
        let duration_seconds = parse_duration(duration_text).ok_or_else(|| {
            MissionError::SchemaError(format!("row {at}: invalid duration {duration_text:?}"))
        })?;

        let triggers = columns
            .triggers
            .map(|col| table.cell(index, col).trim().to_string())
            .unwrap_or_default();

        let ethogram_raw = columns
            .ethogram
            .map(|col| table.cell(index, col).trim())
            .filter(|raw| !raw.is_empty())
            .map(str::to_string);

        Ok(MissionRow {
            date,
            kind,
            triggers,
            duration_seconds,
            ethogram_raw,
        })
    }
}

/// Positive whole seconds; spreadsheet exports may carry a `.0` suffix
fn parse_duration(text: &str) -> Option<u32> {
    let digits = text.strip_suffix(".0").unwrap_or(text);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse::<u32>().ok().filter(|&value| value > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{mission_header, COMMA_COUNT_COLUMN};
    use pretty_assertions::assert_eq;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    fn table(rows: Vec<Vec<String>>) -> SheetTable {
        let mut header = mission_header();
        header.push(COMMA_COUNT_COLUMN.to_string());
        SheetTable::new(header, rows)
    }

    #[test]
    fn test_parse_rows_assigns_store_rows() {
        let t = table(vec![
            row(&["2024-01-15", "departure", "keys,coat", "12", "A,S", "=F2"]),
            row(&["2024-01-15", "rest", "", "45", "", "=F3"]),
            row(&["", "", "", "", "", "=F4"]),
            row(&["2024-01-16", "departure", "", "30.0", " ", "=F5"]),
        ]);

        let rows = SheetAdapter::parse_rows(&t).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].store_row, 2);
        assert_eq!(rows[0].row.triggers, "keys,coat");
        assert_eq!(rows[0].row.ethogram_raw.as_deref(), Some("A,S"));
        assert_eq!(rows[1].row.kind, MissionKind::Rest);
        assert_eq!(rows[2].store_row, 5);
        assert_eq!(rows[2].row.duration_seconds, 30);
        assert_eq!(rows[2].row.ethogram_raw, None);
    }

    #[test]
    fn test_missing_required_column() {
        let t = SheetTable::new(
            row(&["date", "durations", "ethogram"]),
            vec![row(&["2024-01-15", "12", "A"])],
        );
        let err = SheetAdapter::parse_rows(&t).unwrap_err();
        assert!(matches!(err, MissionError::SchemaError(msg) if msg.contains("type")));
    }

    #[test]
    fn test_malformed_cells_fail_the_read() {
        let bad_rows = [
            row(&["15/01/2024", "departure", "", "12", "A"]),
            row(&["2024-01-15", "nap", "", "12", "A"]),
            row(&["2024-01-15", "departure", "", "", "A"]),
            row(&["2024-01-15", "departure", "", "12.5", "A"]),
            row(&["2024-01-15", "departure", "", "0", "A"]),
            row(&["2024-01-15", "departure", "", "1e1", "A"]),
            row(&["2024-01-15", "departure", "", "+5", "A"]),
        ];
        for bad in bad_rows {
            let t = table(vec![bad.clone()]);
            assert!(
                matches!(SheetAdapter::parse_rows(&t), Err(MissionError::SchemaError(_))),
                "{bad:?}"
            );
        }
    }

    #[test]
    fn test_parse_duration() {
        assert_eq!(parse_duration("40"), Some(40));
        assert_eq!(parse_duration("40.0"), Some(40));
        assert_eq!(parse_duration("-3"), None);
        assert_eq!(parse_duration("abc"), None);
        assert_eq!(parse_duration("1e1"), None);
        assert_eq!(parse_duration("+5"), None);
        assert_eq!(parse_duration("12.5"), None);
        assert_eq!(parse_duration("40.00"), None);
        assert_eq!(parse_duration(".0"), None);
        assert_eq!(parse_duration("99999999999"), None);
    }
}
