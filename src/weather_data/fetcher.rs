use crate::download::Downloader;
use crate::types::observation::ObservationRecord;
use crate::weather_data::error::WeatherDataError;
use crate::weather_data::source::RecordSource;
use log::{info, warn};
use tokio::task;

/// Records for one station and the format they were read from.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedRecords {
    pub station_id: String,
    pub source: RecordSource,
    pub records: Vec<ObservationRecord>,
}

/// Reads a station's observations, trying each [`RecordSource`] in turn.
#[derive(Debug, Clone)]
pub struct RecordFetcher {
    downloader: Downloader,
    sources: Vec<RecordSource>,
}

impl RecordFetcher {
    pub fn new(downloader: Downloader) -> Self {
        Self::with_sources(downloader, RecordSource::FALLBACK_ORDER.to_vec())
    }

    pub fn with_sources(downloader: Downloader, sources: Vec<RecordSource>) -> Self {
        Self {
            downloader,
            sources,
        }
    }

    /// Returns the records of the first source that could be downloaded.
    ///
    /// Any download failure (network, HTTP status, decoding) moves on to the
    /// next source. `Ok(None)` means every source failed. A source that
    /// downloads but parses to nothing still wins; the result is then empty.
    pub async fn fetch_records(
        &self,
        station_id: &str,
    ) -> Result<Option<FetchedRecords>, WeatherDataError> {
        for &source in &self.sources {
            let url = self.downloader.url(&source.path(station_id));
            let text = match self.downloader.fetch_text(&url).await {
                Ok(text) => text,
                Err(e) => {
                    warn!(
                        "{} data unavailable for station {}: {}. Trying next source.",
                        source, station_id, e
                    );
                    continue;
                }
            };

            let records = task::spawn_blocking(move || source.parse(&text)).await?;
            info!(
                "Read {} records for station {} from {}",
                records.len(),
                station_id,
                source
            );
            return Ok(Some(FetchedRecords {
                station_id: station_id.to_string(),
                source,
                records,
            }));
        }

        warn!("Failed to fetch weather data for station {} from all sources", station_id);
        Ok(None)
    }
}
