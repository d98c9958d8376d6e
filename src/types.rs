//! Core types for the mission pipeline
//!
//! This module defines the data structures that flow through each stage:
//! generated mission rows, rows read back from the store, normalized ethogram
//! events, and per-date trend summaries.

use crate::ethogram::Behavior;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Kind of interval in a mission schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissionKind {
    Departure,
    Rest,
}

impl MissionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MissionKind::Departure => "departure",
            MissionKind::Rest => "rest",
        }
    }

    /// Parse the value stored in the `type` column
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "departure" => Some(MissionKind::Departure),
            "rest" => Some(MissionKind::Rest),
            _ => None,
        }
    }
}

/// One row of a mission schedule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissionRow {
    /// Mission date, shared by every row of the mission
    pub date: NaiveDate,
    /// Departure or rest
    #[serde(rename = "type")]
    pub kind: MissionKind,
    /// Comma-joined trigger labels; always empty on rest rows
    pub triggers: String,
    /// Interval length in seconds
    pub duration_seconds: u32,
    /// Comma-separated behavior codes, filled in by the annotator
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ethogram_raw: Option<String>,
}

/// A mission row read back from the store, with its 1-based store row index
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredMissionRow {
    pub store_row: usize,
    #[serde(flatten)]
    pub row: MissionRow,
}

/// One normalized behavior observation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EthogramEvent {
    pub date: NaiveDate,
    /// Store row of the departure this observation came from
    pub row_origin_index: usize,
    /// Dense 0-based index within the read batch
    pub observation_index: usize,
    pub behavior: Behavior,
}

impl EthogramEvent {
    /// Integer position of the behavior in the display ordering
    pub fn behavior_rank(&self) -> usize {
        self.behavior.rank()
    }
}

/// Behavior counts for a single date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedTrend {
    pub date: NaiveDate,
    /// Observed behaviors only; iteration follows display order
    pub counts: BTreeMap<Behavior, u32>,
    pub total: u32,
    pub date_ordinal: i32,
}

impl AggregatedTrend {
    pub fn count(&self, behavior: Behavior) -> u32 {
        self.counts.get(&behavior).copied().unwrap_or(0)
    }
}

/// One point of a behavior proportion series
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProportionPoint {
    pub date: NaiveDate,
    pub date_ordinal: i32,
    pub proportion: f64,
    /// Observation count behind the proportion, used for marker sizing
    pub total: u32,
}

/// One departure in the cross-session duration series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeparturePoint {
    pub departure_number: usize,
    pub date: NaiveDate,
    pub date_ordinal: i32,
    pub duration_seconds: u32,
    /// Trailing mean over the rolling window; absent until the window fills
    pub rolling_avg: Option<f64>,
}

/// First observation of a session, for annotating plots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionMarker {
    pub date: NaiveDate,
    pub observation_index: usize,
}

/// Strictly monotonic day number (days since 0001-01-01, which is day 1)
pub fn date_ordinal(date: NaiveDate) -> i32 {
    date.num_days_from_ce()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_ordinal_is_monotonic() {
        let a = NaiveDate::from_ymd_opt(2023, 12, 31).unwrap();
        let b = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert_eq!(date_ordinal(b) - date_ordinal(a), 1);
        assert_eq!(date_ordinal(NaiveDate::from_ymd_opt(1, 1, 1).unwrap()), 1);
    }

    #[test]
    fn test_mission_kind_parse() {
        assert_eq!(MissionKind::parse("departure"), Some(MissionKind::Departure));
        assert_eq!(MissionKind::parse(" Rest "), Some(MissionKind::Rest));
        assert_eq!(MissionKind::parse("nap"), None);
    }

    #[test]
    fn test_mission_row_serializes_type_column() {
        let row = MissionRow {
            date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            kind: MissionKind::Departure,
            triggers: "keys".to_string(),
            duration_seconds: 12,
            ethogram_raw: None,
        };
        let value = serde_json::to_value(&row).unwrap();
        assert_eq!(value["type"], "departure");
        assert_eq!(value["date"], "2024-01-15");
        assert!(value.get("ethogram_raw").is_none());
    }
}
