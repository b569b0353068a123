pub mod api;
mod config;
mod download;
mod error;
mod ghcnd;
mod stations;
mod types;
mod utils;
mod weather_data;
#[cfg(feature = "server")]
pub mod web;

#[cfg(test)]
mod test_utils;

pub use config::{GhcndConfig, DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
pub use download::DownloadError;
pub use error::GhcndError;
pub use ghcnd::*;

pub use stations::distance::distance_km;
pub use stations::inventory::Inventory;
pub use stations::locate_station::StationLocator;

pub use types::inventory::InventoryEntry;
pub use types::observation::{date_span, Element, ObservationRecord, MISSING_VALUE};
pub use types::station::{LatLon, Station, StationMatch, UNKNOWN_REGION};
pub use types::weather_frame::WeatherFrame;
pub use types::year_range::{ElementPair, YearRange};

pub use weather_data::error::WeatherDataError;
pub use weather_data::fetcher::FetchedRecords;
pub use weather_data::filter::{filter_by_year, FilteredRecords, YearFilter};
pub use weather_data::source::RecordSource;
