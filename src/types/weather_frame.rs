//! Contains `WeatherFrame`, a Polars view over normalized observation records.

use crate::types::observation::{Element, ObservationRecord};
use crate::types::year_range::YearRange;
use crate::weather_data::error::WeatherDataError;
use chrono::NaiveDate;
use polars::prelude::*;

/// A wrapper around a Polars `LazyFrame` holding observation records in long
/// format, with the columns `date` (Date), `element` (String) and `value` (Int32).
///
/// Useful for aggregations the plain record list makes awkward, such as yearly
/// means per element.
///
/// # Example
///
/// ```no_run
/// # use ghcnd::{Ghcnd, GhcndError, WeatherFrame, YearRange};
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let client = Ghcnd::new()?;
/// let records = client.weather_data().station("USW00094728").call().await?;
///
/// let frame = WeatherFrame::from_records(&records.records)?
///     .filter_years(YearRange::new(2000, 2009))
///     .filter_element(&ghcnd::Element::Tmax);
/// println!("{}", frame.frame.collect()?);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct WeatherFrame {
    /// The underlying Polars LazyFrame.
    pub frame: LazyFrame,
}

impl WeatherFrame {
    pub fn new(frame: LazyFrame) -> Self {
        Self { frame }
    }

    /// Builds a frame from normalized records, preserving their order.
    pub fn from_records(records: &[ObservationRecord]) -> Result<Self, WeatherDataError> {
        let dates: Vec<NaiveDate> = records.iter().map(|r| r.date).collect();
        let elements: Vec<&str> = records.iter().map(|r| r.element.code()).collect();
        let values: Vec<f64> = records.iter().map(|r| r.value).collect();

        let df = df!(
            "date" => dates,
            "element" => elements,
            "value" => values,
        )?;
        Ok(Self::new(df.lazy()))
    }

    /// Filters the frame with an arbitrary Polars predicate.
    pub fn filter(&self, predicate: Expr) -> WeatherFrame {
        WeatherFrame::new(self.frame.clone().filter(predicate))
    }

    /// Keeps rows whose calendar year lies within `years` (inclusive).
    pub fn filter_years(&self, years: YearRange) -> WeatherFrame {
        let year = col("date").dt().year();
        self.filter(
            year.clone()
                .gt_eq(lit(years.start()))
                .and(year.lt_eq(lit(years.end()))),
        )
    }

    /// Keeps rows for a single element.
    pub fn filter_element(&self, element: &Element) -> WeatherFrame {
        self.filter(col("element").eq(lit(element.code().to_string())))
    }
}
