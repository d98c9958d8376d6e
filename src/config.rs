//! Mission configuration
//!
//! Generation defaults and the target worksheet, loaded from TOML:
//!
//! ```toml
//! worksheet = "missions"
//!
//! [mission]
//! first_duration = 10
//! last_duration = 50
//! noise_factor = 0.8
//! mission_duration = 1200
//! add_triggers = true
//! ```

use crate::error::MissionError;
use crate::mission::{MissionParams, DEFAULT_MISSION_DURATION, DEFAULT_NOISE_FACTOR};
use crate::scheduler::IntervalScheduler;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Default worksheet holding every mission
pub const DEFAULT_WORKSHEET: &str = "missions";

/// Top-level configuration file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MissionConfig {
    pub worksheet: String,
    pub mission: GenerationConfig,
}

/// Generation parameters other than the date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    pub first_duration: u32,
    pub last_duration: u32,
    pub noise_factor: f64,
    pub mission_duration: u32,
    pub add_triggers: bool,
}

impl Default for MissionConfig {
    fn default() -> Self {
        Self {
            worksheet: DEFAULT_WORKSHEET.to_string(),
            mission: GenerationConfig::default(),
        }
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            first_duration: 10,
            last_duration: 50,
            noise_factor: DEFAULT_NOISE_FACTOR,
            mission_duration: DEFAULT_MISSION_DURATION,
            add_triggers: true,
        }
    }
}

impl MissionConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self, MissionError> {
        let config: MissionConfig =
            toml::from_str(content).map_err(|e| MissionError::ConfigError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, MissionError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| MissionError::ConfigError(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<(), MissionError> {
        if self.worksheet.trim().is_empty() {
            return Err(MissionError::ConfigError(
                "worksheet name must not be empty".to_string(),
            ));
        }
        // The date plays no part in validation
        let params = self.mission.params_for(NaiveDate::MIN);
        IntervalScheduler::departure_count(&params.schedule_params())?;
        Ok(())
    }
}

impl GenerationConfig {
    /// Generation parameters for a specific day
    pub fn params_for(&self, date: NaiveDate) -> MissionParams {
        MissionParams {
            first_duration: self.first_duration,
            last_duration: self.last_duration,
            noise_factor: self.noise_factor,
            date,
            mission_duration: self.mission_duration,
            add_triggers: self.add_triggers,
        }
    }
}
