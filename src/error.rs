//! Error types for mission generation and ethogram analysis

use chrono::NaiveDate;
use thiserror::Error;

/// Errors that can occur while generating, storing or analysing missions
#[derive(Debug, Error)]
pub enum MissionError {
    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("Schema error: {0}")]
    SchemaError(String),

    #[error("Unknown behavior code {code:?} at store row {store_row}")]
    UnknownBehaviorCode { code: String, store_row: usize },

    #[error("Proportion undefined for {date}: total is zero")]
    DivisionUndefined { date: NaiveDate },

    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}
