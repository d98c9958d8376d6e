//! Cross-session series for plotting

use crate::error::MissionError;
use crate::types::{
    date_ordinal, DeparturePoint, EthogramEvent, MissionKind, SessionMarker, StoredMissionRow,
};

/// Departure durations across every session, with a trailing rolling mean
pub fn departure_series(
    rows: &[StoredMissionRow],
    window: usize,
) -> Result<Vec<DeparturePoint>, MissionError> {
    if window == 0 {
        return Err(MissionError::InvalidParameters(
            "rolling window must be at least one departure".to_string(),
        ));
    }

    let departures: Vec<&StoredMissionRow> = rows
        .iter()
        .filter(|stored| stored.row.kind == MissionKind::Departure)
        .collect();

    let mut running_sum = 0u64;
    let points = departures
        .iter()
        .enumerate()
        .map(|(number, stored)| {
            running_sum += u64::from(stored.row.duration_seconds);
            if number >= window {
                running_sum -= u64::from(departures[number - window].row.duration_seconds);
            }
            let rolling_avg = (number + 1 >= window).then(|| running_sum as f64 / window as f64);

            DeparturePoint {
                departure_number: number,
                date: stored.row.date,
                date_ordinal: date_ordinal(stored.row.date),
                duration_seconds: stored.row.duration_seconds,
                rolling_avg,
            }
        })
        .collect();

    Ok(points)
}

/// First observation of every run of equal dates
pub fn session_starts(events: &[EthogramEvent]) -> Vec<SessionMarker> {
    let mut markers: Vec<SessionMarker> = Vec::new();
    for event in events {
        if markers.last().map(|m| m.date) != Some(event.date) {
            markers.push(SessionMarker {
                date: event.date,
                observation_index: event.observation_index,
            });
        }
    }
    markers
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ethogram::Behavior;
    use crate::types::MissionRow;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 2, day).unwrap()
    }

    fn stored(day: u32, kind: MissionKind, duration_seconds: u32) -> StoredMissionRow {
        StoredMissionRow {
            store_row: 2,
            row: MissionRow {
                date: date(day),
                kind,
                triggers: String::new(),
                duration_seconds,
                ethogram_raw: None,
            },
        }
    }

    #[test]
    fn test_departure_series_rolling_mean() {
        let rows = vec![
            stored(1, MissionKind::Departure, 10),
            stored(1, MissionKind::Rest, 60),
            stored(1, MissionKind::Departure, 20),
            stored(2, MissionKind::Departure, 30),
            stored(2, MissionKind::Rest, 45),
            stored(2, MissionKind::Departure, 50),
        ];
        let series = departure_series(&rows, 2).unwrap();

        let numbers: Vec<usize> = series.iter().map(|p| p.departure_number).collect();
        assert_eq!(numbers, vec![0, 1, 2, 3]);
        let averages: Vec<Option<f64>> = series.iter().map(|p| p.rolling_avg).collect();
        assert_eq!(averages, vec![None, Some(15.0), Some(25.0), Some(40.0)]);
        assert_eq!(series[2].date, date(2));
    }

    #[test]
    fn test_departure_series_rejects_zero_window() {
        assert!(matches!(
            departure_series(&[], 0),
            Err(MissionError::InvalidParameters(_))
        ));
        assert!(departure_series(&[], 3).unwrap().is_empty());
    }

    #[test]
    fn test_session_starts() {
        let behavior = Behavior::from_code("A").unwrap();
        let events: Vec<EthogramEvent> = [1, 1, 2, 2, 2, 5]
            .iter()
            .enumerate()
            .map(|(i, &day)| EthogramEvent {
                date: date(day),
                row_origin_index: 2,
                observation_index: i,
                behavior,
            })
            .collect();

        let markers = session_starts(&events);
        let starts: Vec<(NaiveDate, usize)> = markers
            .iter()
            .map(|m| (m.date, m.observation_index))
            .collect();
        assert_eq!(starts, vec![(date(1), 0), (date(2), 2), (date(5), 5)]);
    }
}
