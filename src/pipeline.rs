//! Pipeline orchestration
//!
//! This module provides the public API tying the stages together, in both
//! directions of the annotation round trip:
//!
//! Write: Scheduler + TriggerSampler → MissionAssembler → MissionWriter
//! Read:  Store → SheetAdapter → EthogramNormalizer → TrendSummarizer

use crate::error::MissionError;
use crate::ethogram::Behavior;
use crate::mission::{generate_mission, MissionParams};
use crate::normalizer::EthogramNormalizer;
use crate::schema::SheetAdapter;
use crate::series::departure_series;
use crate::store::TabularStore;
use crate::trends::TrendSummarizer;
use crate::types::{
    AggregatedTrend, DeparturePoint, EthogramEvent, MissionRow, ProportionPoint, StoredMissionRow,
};
use crate::writer::{MissionWriter, WriteOutcome};
use rand::Rng;

/// Generate a mission and write it to the store in one call.
///
/// # Arguments
/// * `store` - Store handle holding the shared worksheet
/// * `worksheet` - Worksheet name
/// * `params` - Generation parameters, including the mission date
/// * `rng` - Random source; seed it for reproducible missions
///
/// # Returns
/// The generated rows and where they were written
pub fn write_daily_mission<S: TabularStore + ?Sized, R: Rng + ?Sized>(
    store: &mut S,
    worksheet: &str,
    params: &MissionParams,
    rng: &mut R,
) -> Result<(Vec<MissionRow>, WriteOutcome), MissionError> {
    let rows = generate_mission(params, rng)?;
    let outcome = MissionWriter::write_mission(store, worksheet, params.date, &rows)?;
    Ok((rows, outcome))
}

/// Processor bound to one store and worksheet.
///
/// Every read goes back to the store; nothing derived is cached between calls.
pub struct MissionProcessor<S: TabularStore> {
    store: S,
    worksheet: String,
}

impl<S: TabularStore> MissionProcessor<S> {
    pub fn new(store: S, worksheet: impl Into<String>) -> Self {
        Self {
            store,
            worksheet: worksheet.into(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    pub fn worksheet(&self) -> &str {
        &self.worksheet
    }

    /// Generate today's mission and replace/append it in the worksheet
    pub fn write_mission<R: Rng + ?Sized>(
        &mut self,
        params: &MissionParams,
        rng: &mut R,
    ) -> Result<(Vec<MissionRow>, WriteOutcome), MissionError> {
        write_daily_mission(&mut self.store, &self.worksheet, params, rng)
    }

    /// Mission rows as stored, one per schedule slot
    pub fn read_rows(&self) -> Result<Vec<StoredMissionRow>, MissionError> {
        let table = self.store.read_all_rows(&self.worksheet)?;
        SheetAdapter::parse_rows(&table)
    }

    /// Annotations exploded into one event per observation
    pub fn read_events(&self) -> Result<Vec<EthogramEvent>, MissionError> {
        EthogramNormalizer::normalize(&self.read_rows()?)
    }

    /// Per-date behavior counts
    pub fn summarize(&self) -> Result<Vec<AggregatedTrend>, MissionError> {
        Ok(TrendSummarizer::summarize(&self.read_events()?))
    }

    /// Proportion of `behavior` per date
    pub fn percent_behavior(
        &self,
        behavior: Behavior,
    ) -> Result<Vec<ProportionPoint>, MissionError> {
        TrendSummarizer::percent_behavior(&self.summarize()?, behavior)
    }

    /// Departure durations across sessions with a rolling mean
    pub fn departures(&self, window: usize) -> Result<Vec<DeparturePoint>, MissionError> {
        departure_series(&self.read_rows()?, window)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::MISSION_COLUMNS;
    use crate::store::{SheetTable, Workbook};
    use crate::types::MissionKind;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn params(day: u32) -> MissionParams {
        MissionParams {
            first_duration: 10,
            last_duration: 40,
            noise_factor: 0.8,
            date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            mission_duration: 1200,
            add_triggers: true,
        }
    }

    /// Fill the ethogram cell of every departure, as the annotator would
    fn annotate(store: &mut Workbook, worksheet: &str, code_for: impl Fn(usize) -> &'static str) {
        let table = store.read_all_rows(worksheet).unwrap();
        let ethogram_col = MISSION_COLUMNS.iter().position(|c| *c == "ethogram").unwrap() + 1;

        for (index, stored) in SheetAdapter::parse_rows(&table).unwrap().iter().enumerate() {
            if stored.row.kind != MissionKind::Departure {
                continue;
            }
            let cell = SheetTable::new(vec![], vec![vec![code_for(index).to_string()]]);
            store
                .write_rows(worksheet, stored.store_row, ethogram_col, &cell, false)
                .unwrap();
        }
    }

    #[test]
    fn test_round_trip_through_store() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut processor = MissionProcessor::new(Workbook::new(), "missions");

        let (rows, outcome) = processor.write_mission(&params(1), &mut rng).unwrap();
        assert!(outcome.created);
        assert_eq!(rows.len(), 27);

        let stored: Vec<MissionRow> = processor
            .read_rows()
            .unwrap()
            .into_iter()
            .map(|s| s.row)
            .collect();
        assert_eq!(stored, rows);

        // Unannotated missions produce no events
        assert!(processor.read_events().unwrap().is_empty());
    }

    #[test]
    fn test_annotated_sessions_summarize() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut store = Workbook::new();
        write_daily_mission(&mut store, "missions", &params(1), &mut rng).unwrap();
        write_daily_mission(&mut store, "missions", &params(2), &mut rng).unwrap();
        annotate(&mut store, "missions", |i| if i < 27 { "A,L" } else { "L" });

        let processor = MissionProcessor::new(store, "missions");
        let events = processor.read_events().unwrap();
        // 14 departures per day: two codes each on day one, one on day two
        assert_eq!(events.len(), 14 * 2 + 14);
        assert!(events
            .iter()
            .enumerate()
            .all(|(i, e)| e.observation_index == i));

        let trends = processor.summarize().unwrap();
        assert_eq!(trends.len(), 2);
        assert_eq!(trends[0].total, 28);
        assert_eq!(trends[1].total, 14);

        let lying = processor
            .percent_behavior(Behavior::from_code("L").unwrap())
            .unwrap();
        assert_eq!(lying[0].proportion, 0.5);
        assert_eq!(lying[1].proportion, 1.0);

        let departures = processor.departures(5).unwrap();
        assert_eq!(departures.len(), 28);
        assert_eq!(departures[13].duration_seconds, 40);
        assert!(departures[3].rolling_avg.is_none());
        assert!(departures[4].rolling_avg.is_some());
    }

    #[test]
    fn test_unknown_code_surfaces_from_processor() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut store = Workbook::new();
        write_daily_mission(&mut store, "missions", &params(1), &mut rng).unwrap();
        annotate(&mut store, "missions", |_| "ZZ");

        let processor = MissionProcessor::new(store, "missions");
        assert!(matches!(
            processor.read_events(),
            Err(MissionError::UnknownBehaviorCode { .. })
        ));
    }
}
