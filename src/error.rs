use crate::weather_data::error::WeatherDataError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GhcndError {
    #[error(transparent)]
    WeatherData(#[from] WeatherDataError),

    #[error("Failed to build the HTTP client")]
    ClientBuild(#[source] reqwest::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // Caller-supplied values that fail validation
    #[error("Invalid query: {0}")]
    InvalidQuery(String),
}
