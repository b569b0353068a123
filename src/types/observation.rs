//! Normalized observation records and the element codes they carry.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// Upstream's reserved "missing observation" marker.
pub const MISSING_VALUE: f64 = -9999.0;

/// A GHCN-Daily measurement category.
///
/// The archive defines dozens of element codes; the common ones get their own
/// variant and everything else is kept verbatim in [`Element::Other`].
///
/// # Examples
///
/// ```
/// use ghcnd::Element;
///
/// assert_eq!("TMAX".parse::<Element>().unwrap(), Element::Tmax);
/// assert_eq!(Element::Tmin.to_string(), "TMIN");
/// assert_eq!(Element::from_code("WT01"), Element::Other("WT01".to_string()));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum Element {
    /// Maximum temperature, tenths of degrees C.
    Tmax,
    /// Minimum temperature, tenths of degrees C.
    Tmin,
    /// Average temperature, tenths of degrees C.
    Tavg,
    /// Precipitation, tenths of mm.
    Prcp,
    /// Snowfall, mm.
    Snow,
    /// Snow depth, mm.
    Snwd,
    Other(String),
}

impl Element {
    pub fn from_code(code: &str) -> Self {
        match code.trim() {
            "TMAX" => Element::Tmax,
            "TMIN" => Element::Tmin,
            "TAVG" => Element::Tavg,
            "PRCP" => Element::Prcp,
            "SNOW" => Element::Snow,
            "SNWD" => Element::Snwd,
            other => Element::Other(other.to_string()),
        }
    }

    pub fn code(&self) -> &str {
        match self {
            Element::Tmax => "TMAX",
            Element::Tmin => "TMIN",
            Element::Tavg => "TAVG",
            Element::Prcp => "PRCP",
            Element::Snow => "SNOW",
            Element::Snwd => "SNWD",
            Element::Other(code) => code,
        }
    }

    /// Converts a raw archive value into its natural unit (degrees C, mm).
    pub fn scale(&self, raw: f64) -> f64 {
        match self {
            Element::Tmax | Element::Tmin | Element::Tavg | Element::Prcp => raw / 10.0,
            _ => raw,
        }
    }
}

impl FromStr for Element {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Element::from_code(s))
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl From<Element> for String {
    fn from(element: Element) -> Self {
        element.code().to_string()
    }
}

impl From<String> for Element {
    fn from(code: String) -> Self {
        Element::from_code(&code)
    }
}

/// One daily observation, normalized from either upstream format.
///
/// `value` is the raw archive value: finite and never [`MISSING_VALUE`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservationRecord {
    pub date: NaiveDate,
    pub element: Element,
    pub value: f64,
}

impl ObservationRecord {
    /// Builds a record, or `None` when `value` is the missing marker or not finite.
    pub fn new(date: NaiveDate, element: Element, value: f64) -> Option<Self> {
        (value.is_finite() && value != MISSING_VALUE).then_some(Self {
            date,
            element,
            value,
        })
    }

    pub fn scaled_value(&self) -> f64 {
        self.element.scale(self.value)
    }
}

/// Earliest and latest record date, or `None` for an empty slice.
pub fn date_span(records: &[ObservationRecord]) -> Option<(NaiveDate, NaiveDate)> {
    let first = records.iter().map(|r| r.date).min()?;
    let last = records.iter().map(|r| r.date).max()?;
    Some((first, last))
}
