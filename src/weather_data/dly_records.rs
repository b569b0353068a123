//! Parser for the `.dly` fixed-width monthly files under `all/`.
//!
//! Each line holds one station, month and element, followed by 31 day slots of
//! 8 characters (5-character value plus measurement, quality and source flags).

use crate::types::observation::{Element, ObservationRecord};
use crate::utils::{FixedWidthField, FixedWidthLine};
use chrono::NaiveDate;

const YEAR: FixedWidthField = FixedWidthField::new("year", 11, 15);
const MONTH: FixedWidthField = FixedWidthField::new("month", 15, 17);
const ELEMENT: FixedWidthField = FixedWidthField::new("element", 17, 21);
const FIRST_DAY_VALUE: FixedWidthField = FixedWidthField::new("value", 21, 26);

const DAY_SLOT_WIDTH: usize = 8;
const DAYS_PER_LINE: usize = 31;
const LINE_LENGTH: usize = 21 + DAYS_PER_LINE * DAY_SLOT_WIDTH;

pub(crate) fn parse_dly(text: &str) -> Vec<ObservationRecord> {
    text.lines().flat_map(parse_month_line).collect()
}

/// Expands one monthly line into its daily records.
///
/// Short lines and lines with an unreadable header yield nothing. Individual
/// day slots are skipped when the value is unreadable or missing, or when the
/// day does not exist in that month (e.g. Feb 30).
fn parse_month_line(raw: &str) -> Vec<ObservationRecord> {
    let line = FixedWidthLine::new(raw);
    if line.len() < LINE_LENGTH {
        return Vec::new();
    }
    let (Some(year), Some(month), Some(element)) = (
        line.parse::<i32>(&YEAR),
        line.parse::<u32>(&MONTH),
        line.text(&ELEMENT).map(Element::from_code),
    ) else {
        return Vec::new();
    };

    (1..=DAYS_PER_LINE)
        .filter_map(|day| {
            let slot = FIRST_DAY_VALUE.shifted((day - 1) * DAY_SLOT_WIDTH);
            let value = line.parse::<i32>(&slot)?;
            let date = NaiveDate::from_ymd_opt(year, month, day as u32)?;
            ObservationRecord::new(date, element.clone(), f64::from(value))
        })
        .collect()
}
