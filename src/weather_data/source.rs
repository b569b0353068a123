use crate::types::observation::ObservationRecord;
use crate::weather_data::csv_records::parse_station_csv;
use crate::weather_data::dly_records::parse_dly;
use serde::Serialize;
use std::fmt;

/// An upstream format that per-station records can be read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordSource {
    /// `by_station/{id}.csv.gz`
    ByStationCsv,
    /// `all/{id}.dly`
    DailyFixedWidth,
}

impl RecordSource {
    /// Preferred format first.
    pub const FALLBACK_ORDER: [RecordSource; 2] =
        [RecordSource::ByStationCsv, RecordSource::DailyFixedWidth];

    /// Path of the station's file, relative to the archive root.
    pub fn path(&self, station_id: &str) -> String {
        match self {
            RecordSource::ByStationCsv => format!("by_station/{}.csv.gz", station_id),
            RecordSource::DailyFixedWidth => format!("all/{}.dly", station_id),
        }
    }

    /// Normalizes a downloaded body of this format.
    pub fn parse(&self, text: &str) -> Vec<ObservationRecord> {
        match self {
            RecordSource::ByStationCsv => parse_station_csv(text),
            RecordSource::DailyFixedWidth => parse_dly(text),
        }
    }
}

impl fmt::Display for RecordSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordSource::ByStationCsv => write!(f, "by-station CSV"),
            RecordSource::DailyFixedWidth => write!(f, "daily fixed-width"),
        }
    }
}
