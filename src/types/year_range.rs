use crate::types::observation::Element;
use serde::{Deserialize, Serialize};

/// An inclusive range of calendar years.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearRange {
    start: i32,
    end: i32,
}

impl YearRange {
    pub fn new(start: i32, end: i32) -> Self {
        Self { start, end }
    }

    /// Parses optional textual bounds, as they arrive from query strings.
    ///
    /// Returns `None` unless both bounds are present and parse as integers.
    ///
    /// ```
    /// use ghcnd::YearRange;
    ///
    /// assert_eq!(YearRange::from_bounds(Some("2020"), Some(" 2021 ")), Some(YearRange::new(2020, 2021)));
    /// assert_eq!(YearRange::from_bounds(Some("2020"), None), None);
    /// assert_eq!(YearRange::from_bounds(Some("20x0"), Some("2021")), None);
    /// ```
    pub fn from_bounds(start: Option<&str>, end: Option<&str>) -> Option<Self> {
        let start = start?.trim().parse().ok()?;
        let end = end?.trim().parse().ok()?;
        Some(Self::new(start, end))
    }

    pub fn start(&self) -> i32 {
        self.start
    }

    pub fn end(&self) -> i32 {
        self.end
    }

    pub fn contains(&self, year: i32) -> bool {
        self.start <= year && year <= self.end
    }
}

/// The two elements a station must both cover to survive inventory filtering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementPair(pub Element, pub Element);

impl Default for ElementPair {
    /// Daily minimum and maximum temperature.
    fn default() -> Self {
        Self(Element::Tmin, Element::Tmax)
    }
}
