use polars::error::PolarsError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WeatherDataError {
    // Specific error for when neither upstream format yields any record
    #[error("No weather data found for station '{0}'")]
    NoDataForStation(String),

    #[error("Failed processing DataFrame: {0}")]
    Frame(#[from] PolarsError),

    // Covers errors joining the blocking parse tasks
    #[error("Background task failed to complete")]
    TaskJoin(#[from] tokio::task::JoinError),
}
