use crate::types::observation::ObservationRecord;
use crate::types::year_range::YearRange;
use chrono::Datelike;
use serde::Serialize;

/// Whether a year filter was actually applied to a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum YearFilter {
    Applied(YearRange),
    /// No usable bounds were supplied; records are returned unfiltered.
    Skipped,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilteredRecords {
    pub records: Vec<ObservationRecord>,
    pub filter: YearFilter,
}

/// Keeps records whose year lies in `years` (inclusive), preserving order.
///
/// With `None` every record is kept and the outcome says the filter was skipped.
pub fn filter_by_year(records: Vec<ObservationRecord>, years: Option<YearRange>) -> FilteredRecords {
    match years {
        Some(range) => FilteredRecords {
            records: records
                .into_iter()
                .filter(|r| range.contains(r.date.year()))
                .collect(),
            filter: YearFilter::Applied(range),
        },
        None => FilteredRecords {
            records,
            filter: YearFilter::Skipped,
        },
    }
}
