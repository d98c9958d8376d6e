//! Mission assembly
//!
//! Combines the interval schedule with sampled triggers into the ordered
//! row table that is handed to the store.

use crate::error::MissionError;
use crate::scheduler::{IntervalScheduler, ScheduleParams};
use crate::triggers::TriggerSampler;
use crate::types::{MissionKind, MissionRow};
use chrono::NaiveDate;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Default mission length in seconds
pub const DEFAULT_MISSION_DURATION: u32 = 1200;

/// Default jitter floor for departure durations
pub const DEFAULT_NOISE_FACTOR: f64 = 0.8;

/// Parameters for generating one day's mission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissionParams {
    pub first_duration: u32,
    pub last_duration: u32,
    pub noise_factor: f64,
    pub date: NaiveDate,
    pub mission_duration: u32,
    pub add_triggers: bool,
}

impl MissionParams {
    pub fn schedule_params(&self) -> ScheduleParams {
        ScheduleParams {
            first_duration: self.first_duration,
            last_duration: self.last_duration,
            noise_factor: self.noise_factor,
            mission_duration: self.mission_duration,
        }
    }
}

/// Generate a mission: departures and rests interleaved, starting and ending
/// with a departure.
///
/// All randomness comes from `rng`; the same seed yields the same mission.
///
/// # Example
/// ```ignore
/// let mut rng = StdRng::seed_from_u64(42);
/// let rows = generate_mission(&params, &mut rng)?;
/// ```
pub fn generate_mission<R: Rng + ?Sized>(
    params: &MissionParams,
    rng: &mut R,
) -> Result<Vec<MissionRow>, MissionError> {
    MissionAssembler::assemble(params, rng)
}

/// Assembler for mission row tables
pub struct MissionAssembler;

impl MissionAssembler {
    pub fn assemble<R: Rng + ?Sized>(
        params: &MissionParams,
        rng: &mut R,
    ) -> Result<Vec<MissionRow>, MissionError> {
        let schedule = IntervalScheduler::schedule(&params.schedule_params(), rng)?;

        let triggers = if params.add_triggers {
            TriggerSampler::sample_many(rng, schedule.departures.len())
        } else {
            vec![String::new(); schedule.departures.len()]
        };

        let mut rows = Vec::with_capacity(schedule.departures.len() + schedule.rests.len());
        for (i, (duration, trigger_set)) in schedule.departures.iter().zip(triggers).enumerate() {
            if i > 0 {
                rows.push(Self::row(
                    params.date,
                    MissionKind::Rest,
                    String::new(),
                    schedule.rests[i - 1],
                ));
            }
            rows.push(Self::row(
                params.date,
                MissionKind::Departure,
                trigger_set,
                *duration,
            ));
        }

        info!(
            date = %params.date,
            departures = schedule.departures.len(),
            rows = rows.len(),
            "assembled mission"
        );

        Ok(rows)
    }

    fn row(
        date: NaiveDate,
        kind: MissionKind,
        triggers: String,
        duration_seconds: u32,
    ) -> MissionRow {
        MissionRow {
            date,
            kind,
            triggers,
            duration_seconds,
            ethogram_raw: None,
        }
    }
}
