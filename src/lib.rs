//! Mission Ethogram - departure-training missions and behavior trends
//!
//! Generates a randomized daily training mission (timed departures separated
//! by rests, with ramping durations and sampled trigger cues), writes it to a
//! shared tabular store for annotation, and turns the annotated sheet back
//! into a normalized event stream and per-date behavior trends.
//!
//! ## Modules
//!
//! - **Generation**: `scheduler`, `triggers`, `mission`
//! - **Storage**: `store`, `schema`, `writer`
//! - **Analysis**: `normalizer`, `trends`, `series`

pub mod config;
pub mod error;
pub mod ethogram;
pub mod mission;
pub mod normalizer;
pub mod pipeline;
pub mod scheduler;
pub mod schema;
pub mod series;
pub mod store;
pub mod trends;
pub mod triggers;
pub mod types;
pub mod writer;

pub use config::MissionConfig;
pub use error::MissionError;
pub use ethogram::{Behavior, ETHOGRAM};
pub use mission::{generate_mission, MissionParams};
pub use normalizer::EthogramNormalizer;
pub use pipeline::{write_daily_mission, MissionProcessor};
pub use store::{JsonFileStore, TabularStore, Workbook};
pub use trends::TrendSummarizer;

/// Crate version, reported by the CLI
pub const MISSION_VERSION: &str = env!("CARGO_PKG_VERSION");
