//! Parser for the per-station CSV files under `by_station/`.
//!
//! Rows look like `id,YYYYMMDD,element,value,m-flag,q-flag,s-flag,obs-time`.
//! Only date, element and value are kept.

use crate::types::observation::{Element, ObservationRecord};
use chrono::NaiveDate;
use csv::StringRecord;

const DATE_COLUMN: usize = 1;
const ELEMENT_COLUMN: usize = 2;
const VALUE_COLUMN: usize = 3;

/// Parses a by-station CSV body.
///
/// Rows that cannot be read, carry an invalid date or a non-numeric value, or
/// hold the missing marker are dropped individually.
pub(crate) fn parse_station_csv(text: &str) -> Vec<ObservationRecord> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true) // Allow records with varying length
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    reader
        .records()
        .filter_map(Result::ok)
        .filter_map(|row| parse_row(&row))
        .collect()
}

fn parse_row(row: &StringRecord) -> Option<ObservationRecord> {
    let date = NaiveDate::parse_from_str(row.get(DATE_COLUMN)?, "%Y%m%d").ok()?;
    let element = row.get(ELEMENT_COLUMN).filter(|e| !e.is_empty())?;
    let value = parse_value(row.get(VALUE_COLUMN)?)?;
    ObservationRecord::new(date, Element::from_code(element), value)
}

fn parse_value(raw: &str) -> Option<f64> {
    raw.parse::<f64>().ok()
}
