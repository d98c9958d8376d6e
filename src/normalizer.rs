//! Ethogram normalization
//!
//! This module turns annotated mission rows into a long-form event stream:
//! - Rest rows are dropped
//! - Each departure's comma-separated codes are exploded into one event each
//! - Codes are resolved against the fixed ethogram
//! - Observations are indexed densely from zero for every call

use crate::error::MissionError;
use crate::ethogram::Behavior;
use crate::schema::SheetAdapter;
use crate::store::SheetTable;
use crate::types::{EthogramEvent, MissionKind, StoredMissionRow};
use tracing::debug;

/// Normalizer for annotated mission rows
pub struct EthogramNormalizer;

impl EthogramNormalizer {
    /// Explode departures into events, in row order then code order
    ///
    /// Fails on the first unrecognized code; no events are returned in that
    /// case.
    pub fn normalize(rows: &[StoredMissionRow]) -> Result<Vec<EthogramEvent>, MissionError> {
        let mut events = Vec::new();

        for stored in rows
            .iter()
            .filter(|stored| stored.row.kind == MissionKind::Departure)
        {
            let Some(raw) = stored.row.ethogram_raw.as_deref() else {
                continue;
            };

            for code in split_codes(raw) {
                let behavior =
                    Behavior::from_code(code).ok_or_else(|| MissionError::UnknownBehaviorCode {
                        code: code.to_string(),
                        store_row: stored.store_row,
                    })?;

                events.push(EthogramEvent {
                    date: stored.row.date,
                    row_origin_index: stored.store_row,
                    observation_index: events.len(),
                    behavior,
                });
            }
        }

        debug!(rows = rows.len(), events = events.len(), "normalized ethogram");
        Ok(events)
    }

    /// Parse a raw store table and normalize it in one step
    pub fn normalize_table(table: &SheetTable) -> Result<Vec<EthogramEvent>, MissionError> {
        let rows = SheetAdapter::parse_rows(table)?;
        Self::normalize(&rows)
    }
}

/// Trimmed, non-empty codes of one annotation cell
///
/// Blank segments (a trailing comma, a doubled comma) carry no observation.
fn split_codes(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(',').map(str::trim).filter(|code| !code.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MissionRow;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn stored(store_row: usize, kind: MissionKind, ethogram: Option<&str>) -> StoredMissionRow {
        StoredMissionRow {
            store_row,
            row: MissionRow {
                date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
                kind,
                triggers: String::new(),
                duration_seconds: 10,
                ethogram_raw: ethogram.map(str::to_string),
            },
        }
    }

    fn labels(events: &[EthogramEvent]) -> Vec<&'static str> {
        events.iter().map(|e| e.behavior.label()).collect()
    }

    #[test]
    fn test_explodes_codes_in_order() {
        let rows = vec![stored(2, MissionKind::Departure, Some("A,S,L"))];
        let events = EthogramNormalizer::normalize(&rows).unwrap();

        assert_eq!(labels(&events), vec!["Away", "Standing", "Lying"]);
        let indices: Vec<usize> = events.iter().map(|e| e.observation_index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
        assert!(events.iter().all(|e| e.row_origin_index == 2));
    }

    #[test]
    fn test_rest_rows_and_empty_annotations_are_skipped() {
        let rows = vec![
            stored(2, MissionKind::Departure, Some(" A , A ")),
            stored(3, MissionKind::Rest, Some("ZZ")),
            stored(4, MissionKind::Departure, None),
            stored(6, MissionKind::Departure, Some("L,")),
        ];
        let events = EthogramNormalizer::normalize(&rows).unwrap();

        assert_eq!(labels(&events), vec!["Away", "Away", "Lying"]);
        let origins: Vec<usize> = events.iter().map(|e| e.row_origin_index).collect();
        assert_eq!(origins, vec![2, 2, 6]);
        let indices: Vec<usize> = events.iter().map(|e| e.observation_index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
    }

    #[test]
    fn test_single_code_rows_yield_one_event_each() {
        let rows = vec![
            stored(2, MissionKind::Departure, Some("W")),
            stored(4, MissionKind::Departure, Some("V")),
        ];
        let events = EthogramNormalizer::normalize(&rows).unwrap();
        assert_eq!(events.len(), rows.len());
        assert_eq!(events[1].behavior_rank(), 6);
    }

    #[test]
    fn test_unknown_code_fails() {
        let rows = vec![
            stored(2, MissionKind::Departure, Some("A")),
            stored(4, MissionKind::Departure, Some("A,ZZ")),
        ];
        let err = EthogramNormalizer::normalize(&rows).unwrap_err();
        match err {
            MissionError::UnknownBehaviorCode { code, store_row } => {
                assert_eq!(code, "ZZ");
                assert_eq!(store_row, 4);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_normalize_table_checks_schema() {
        let table = SheetTable::new(
            vec!["type".to_string(), "durations".to_string(), "ethogram".to_string()],
            vec![vec!["departure".to_string(), "10".to_string(), "A".to_string()]],
        );
        assert!(matches!(
            EthogramNormalizer::normalize_table(&table),
            Err(MissionError::SchemaError(_))
        ));
    }
}
