//! Interval scheduling
//!
//! Generates the departure and rest durations of a mission:
//! - Departure count derived from the mission length and mean interval sizes
//! - Rest intervals drawn uniformly from a fixed range
//! - Departures ramp linearly from the first to the last duration, with
//!   multiplicative downward jitter on every departure except the last

use crate::error::MissionError;
use rand::Rng;
use tracing::debug;

/// Rest interval bounds in seconds (lower inclusive, upper exclusive)
pub const REST_INTERVAL_BOUNDS: [u32; 2] = [30, 90];

/// Validated scheduling parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScheduleParams {
    pub first_duration: u32,
    pub last_duration: u32,
    pub noise_factor: f64,
    pub mission_duration: u32,
}

/// Departure and rest durations for one mission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schedule {
    /// One value per departure
    pub departures: Vec<u32>,
    /// One value per gap between departures
    pub rests: Vec<u32>,
}

/// Scheduler for departure/rest intervals
pub struct IntervalScheduler;

impl IntervalScheduler {
    /// Check preconditions and return the departure count
    pub fn departure_count(params: &ScheduleParams) -> Result<usize, MissionError> {
        if params.first_duration == 0 {
            return Err(MissionError::InvalidParameters(
                "first_duration must be positive".to_string(),
            ));
        }
        if params.first_duration > params.last_duration {
            return Err(MissionError::InvalidParameters(format!(
                "first_duration ({}) exceeds last_duration ({})",
                params.first_duration, params.last_duration
            )));
        }
        if !(0.0..=1.0).contains(&params.noise_factor) {
            return Err(MissionError::InvalidParameters(format!(
                "noise_factor must be within [0, 1], got {}",
                params.noise_factor
            )));
        }
        if params.mission_duration == 0 {
            return Err(MissionError::InvalidParameters(
                "mission_duration must be positive".to_string(),
            ));
        }

        // floor(m / (mean(first, last) + mean(rest bounds))) in integer form
        let [rest_lo, rest_hi] = REST_INTERVAL_BOUNDS;
        let denominator = u64::from(params.first_duration)
            + u64::from(params.last_duration)
            + u64::from(rest_lo)
            + u64::from(rest_hi);
        let count = (2 * u64::from(params.mission_duration) / denominator) as usize;

        if count == 0 {
            return Err(MissionError::InvalidParameters(format!(
                "mission_duration ({}s) is too short for a single departure",
                params.mission_duration
            )));
        }

        Ok(count)
    }

    /// Generate a full schedule
    ///
    /// Rest intervals are drawn before departure jitter; callers seeding the
    /// generator rely on that draw order.
    pub fn schedule<R: Rng + ?Sized>(
        params: &ScheduleParams,
        rng: &mut R,
    ) -> Result<Schedule, MissionError> {
        let count = Self::departure_count(params)?;

        let mut rests = Self::rest_intervals(count, rng);
        // One rest per departure is drawn; the trailing one is never used
        rests.truncate(count - 1);

        let departures = Self::departures(params, count, rng);

        debug!(
            departures = departures.len(),
            rests = rests.len(),
            "generated schedule"
        );

        Ok(Schedule { departures, rests })
    }

    /// Draw `count` rest intervals uniformly from the rest bounds
    fn rest_intervals<R: Rng + ?Sized>(count: usize, rng: &mut R) -> Vec<u32> {
        let [lo, hi] = REST_INTERVAL_BOUNDS;
        (0..count).map(|_| rng.gen_range(lo..hi)).collect()
    }

    /// Linear ramp from first to last duration, `count` points inclusive
    fn ramp(first: u32, last: u32, count: usize) -> Vec<f64> {
        match count {
            0 => return Vec::new(),
            1 => return vec![f64::from(first)],
            _ => {}
        }
        let step = f64::from(last - first) / (count - 1) as f64;
        (0..count)
            .map(|i| {
                if i == count - 1 {
                    f64::from(last)
                } else {
                    f64::from(first) + step * i as f64
                }
            })
            .collect()
    }

    /// Jittered departure durations; the last one is pinned to `last_duration`
    ///
    /// Expects parameters already checked by [`Self::departure_count`].
    fn departures<R: Rng + ?Sized>(
        params: &ScheduleParams,
        count: usize,
        rng: &mut R,
    ) -> Vec<u32> {
        let ramp = Self::ramp(params.first_duration, params.last_duration, count);

        let mut departures: Vec<u32> = ramp[..count - 1]
            .iter()
            .map(|&ceiling| {
                let jitter = rng.gen_range(params.noise_factor..=1.0);
                let jittered = (ceiling * jitter).round() as u32;
                // Never below the floor, never above the ramp at this position
                jittered
                    .max(params.first_duration)
                    .min(ceiling.floor() as u32)
            })
            .collect();

        departures.push(params.last_duration);
        departures
    }
}
