//! The main entry point: a [`Ghcnd`] client that finds stations near a point and
//! reads their daily observation history from the GHCN-Daily archive.

use crate::config::GhcndConfig;
use crate::download::Downloader;
use crate::error::GhcndError;
use crate::stations::inventory::Inventory;
use crate::stations::locate_station::{resolve, StationLocator};
use crate::stations::reference_cache::ReferenceCache;
use crate::types::observation::{date_span, ObservationRecord};
use crate::types::station::{LatLon, StationMatch};
use crate::types::year_range::{ElementPair, YearRange};
use crate::weather_data::error::WeatherDataError;
use crate::weather_data::fetcher::RecordFetcher;
use crate::weather_data::filter::{filter_by_year, YearFilter};
use crate::weather_data::source::RecordSource;
use bon::bon;
use log::{debug, info, warn};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::watch;
use tokio::task::JoinHandle;

pub const DEFAULT_MAX_DISTANCE_KM: f64 = 50.0;
pub const DEFAULT_STATION_LIMIT: usize = 10;

/// Restricts [`Ghcnd::find_stations`] to stations whose inventory covers both
/// elements for every year of a range.
///
/// # Examples
///
/// ```
/// use ghcnd::{Element, ElementPair, InventoryRequest, YearRange};
///
/// // Stations reporting daily minimum and maximum temperature for 1990-2020
/// let temperatures = InventoryRequest::new(ElementPair::default(), YearRange::new(1990, 2020));
///
/// // Stations reporting precipitation and snowfall for 2000-2010
/// let winter = InventoryRequest::new(
///     ElementPair(Element::Prcp, Element::Snow),
///     YearRange::new(2000, 2010),
/// );
/// assert_ne!(temperatures, winter);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventoryRequest {
    pub elements: ElementPair,
    pub years: YearRange,
}

impl InventoryRequest {
    pub fn new(elements: ElementPair, years: YearRange) -> Self {
        Self { elements, years }
    }
}

/// Progress of the background reference-table load started by [`Ghcnd::spawn_warmup`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WarmupStatus {
    Loading,
    Done,
}

/// A station's observation history, as returned by [`Ghcnd::weather_data`].
#[derive(Debug, Clone, PartialEq)]
pub struct StationRecords {
    pub station_id: String,
    /// The upstream format the records were read from.
    pub source: RecordSource,
    pub year_filter: YearFilter,
    pub records: Vec<ObservationRecord>,
}

/// The client for the GHCN-Daily archive.
///
/// The station catalog and inventory are downloaded at most once per client and
/// then shared by every query; a failed download is retried by the next query
/// that needs the table. Observation records are never cached.
///
/// Wrap the client in an [`Arc`] to share it between tasks and to use
/// [`Ghcnd::spawn_warmup`].
///
/// # Examples
///
/// ```no_run
/// # use ghcnd::{Ghcnd, GhcndError, LatLon};
/// # #[tokio::main]
/// # async fn main() -> Result<(), GhcndError> {
/// let client = Ghcnd::new()?;
/// let stations = client
///     .find_stations()
///     .location(LatLon(40.7789, -73.9692))
///     .max_distance_km(25.0)
///     .call()
///     .await?;
/// for m in &stations {
///     println!("{} {} ({:.1} km)", m.station.id, m.station.name, m.distance_km);
/// }
/// # Ok(())
/// # }
/// ```
pub struct Ghcnd {
    downloader: Downloader,
    fetcher: RecordFetcher,
    catalog: ReferenceCache<StationLocator>,
    inventory: ReferenceCache<Inventory>,
    warmup: watch::Sender<WarmupStatus>,
    warmup_started: AtomicBool,
}

#[bon]
impl Ghcnd {
    /// Creates a client with the default configuration.
    pub fn new() -> Result<Self, GhcndError> {
        Self::with_config(GhcndConfig::default())
    }

    /// Creates a client configured from `GHCN_BASE_URL` and `GHCN_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self, GhcndError> {
        Self::with_config(GhcndConfig::from_env())
    }

    /// Creates a client with an explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns [`GhcndError::InvalidConfig`] if `base_url` is not an absolute URL,
    /// and [`GhcndError::ClientBuild`] if the HTTP client cannot be constructed.
    pub fn with_config(config: GhcndConfig) -> Result<Self, GhcndError> {
        reqwest::Url::parse(&config.base_url).map_err(|e| {
            GhcndError::InvalidConfig(format!("base_url {:?}: {}", config.base_url, e))
        })?;
        let downloader = Downloader::new(&config).map_err(GhcndError::ClientBuild)?;
        let (warmup, _) = watch::channel(WarmupStatus::Loading);
        Ok(Self {
            fetcher: RecordFetcher::new(downloader.clone()),
            downloader,
            catalog: ReferenceCache::new("station catalog"),
            inventory: ReferenceCache::new("station inventory"),
            warmup,
            warmup_started: AtomicBool::new(false),
        })
    }

    /// Finds stations near `location`, nearest first.
    ///
    /// This method uses a builder pattern.
    ///
    /// # Arguments
    ///
    /// * `.location(LatLon)`: **Required.** The point to search around.
    /// * `.max_distance_km(f64)`: Optional. Search radius, defaults to `50.0`.
    /// * `.station_limit(usize)`: Optional. Maximum number of stations, defaults to `10`.
    /// * `.inventory_request(InventoryRequest)`: Optional. Keeps only stations
    ///   whose inventory covers both elements for the whole year range.
    ///
    /// If the catalog cannot be loaded the result is empty. If the inventory
    /// cannot be loaded the inventory request is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`GhcndError::InvalidQuery`] for out-of-range coordinates or a
    /// negative or non-finite radius.
    #[builder]
    pub async fn find_stations(
        &self,
        location: LatLon,
        max_distance_km: Option<f64>,
        station_limit: Option<usize>,
        inventory_request: Option<InventoryRequest>,
    ) -> Result<Vec<StationMatch>, GhcndError> {
        let max_distance_km = max_distance_km.unwrap_or(DEFAULT_MAX_DISTANCE_KM);
        let station_limit = station_limit.unwrap_or(DEFAULT_STATION_LIMIT);
        validate_location(location)?;
        validate_radius(max_distance_km)?;

        let Some(catalog) = self.catalog().await else {
            warn!("Station catalog unavailable, returning no stations");
            return Ok(vec![]);
        };
        let inventory = match &inventory_request {
            Some(_) => self.inventory().await,
            None => None,
        };
        if inventory_request.is_some() && inventory.is_none() {
            warn!("Station inventory unavailable, filtering by distance only");
        }

        Ok(resolve(
            Some(catalog.as_ref()),
            inventory.as_deref(),
            location,
            max_distance_km,
            inventory_request.as_ref(),
            station_limit,
        ))
    }

    /// Reads the full observation history of `station`, optionally restricted to
    /// a range of years.
    ///
    /// The per-station CSV file is tried first and the `.dly` file second.
    ///
    /// # Errors
    ///
    /// * [`GhcndError::InvalidQuery`] if `station` is empty or not alphanumeric.
    /// * [`WeatherDataError::NoDataForStation`] if neither file could be
    ///   downloaded or the downloaded file holds no usable record. A year range
    ///   that excludes every record is not an error; the result is then empty.
    #[builder]
    pub async fn weather_data(
        &self,
        station: &str,
        years: Option<YearRange>,
    ) -> Result<StationRecords, GhcndError> {
        validate_station_id(station)?;

        let start = Instant::now();
        let fetched = self
            .fetcher
            .fetch_records(station)
            .await?
            .filter(|fetched| !fetched.records.is_empty())
            .ok_or_else(|| WeatherDataError::NoDataForStation(station.to_string()))?;

        if let Some((first, last)) = date_span(&fetched.records) {
            info!(
                "Station {}: {} records from {} to {} via {} in {:?}",
                station,
                fetched.records.len(),
                first,
                last,
                fetched.source,
                start.elapsed()
            );
        }

        let filtered = filter_by_year(fetched.records, years);
        Ok(StationRecords {
            station_id: fetched.station_id,
            source: fetched.source,
            year_filter: filtered.filter,
            records: filtered.records,
        })
    }

    /// Starts loading the catalog and inventory in the background.
    ///
    /// Queries arriving before the load finishes do not wait for it to report
    /// back; they join the in-flight download instead. The status flips to
    /// [`WarmupStatus::Done`] once both loads have been attempted, whether or not
    /// they succeeded.
    pub fn spawn_warmup(self: &Arc<Self>) -> JoinHandle<()> {
        self.warmup_started.store(true, Ordering::SeqCst);
        let client = Arc::clone(self);
        tokio::spawn(async move { client.warm_up().await })
    }

    pub fn warmup_status(&self) -> WarmupStatus {
        *self.warmup.borrow()
    }

    /// Resolves once both reference tables have been loaded or have failed to load.
    ///
    /// Joins a warmup started with [`Ghcnd::spawn_warmup`]. Without one, the
    /// loads run on the calling task instead.
    pub async fn wait_for_warmup(&self) {
        if !self.warmup_started.swap(true, Ordering::SeqCst) {
            debug!("No warmup running, loading reference tables in place");
            self.warm_up().await;
            return;
        }
        let mut status = self.warmup.subscribe();
        if status.wait_for(|s| *s == WarmupStatus::Done).await.is_err() {
            debug!("Warmup signal closed before the load finished");
        }
    }

    async fn warm_up(&self) {
        let start = Instant::now();
        let (catalog, inventory) = tokio::join!(self.catalog(), self.inventory());
        info!(
            "Warmup finished in {:?} (catalog: {}, inventory: {})",
            start.elapsed(),
            if catalog.is_some() { "loaded" } else { "unavailable" },
            if inventory.is_some() { "loaded" } else { "unavailable" },
        );
        self.warmup.send_replace(WarmupStatus::Done);
    }

    async fn catalog(&self) -> Option<Arc<StationLocator>> {
        self.catalog
            .get_or_load(|| StationLocator::fetch(&self.downloader))
            .await
    }

    async fn inventory(&self) -> Option<Arc<Inventory>> {
        self.inventory
            .get_or_load(|| Inventory::fetch(&self.downloader))
            .await
    }
}

fn validate_location(location: LatLon) -> Result<(), GhcndError> {
    if !(-90.0..=90.0).contains(&location.latitude()) {
        return Err(GhcndError::InvalidQuery(format!(
            "latitude {} is outside [-90, 90]",
            location.latitude()
        )));
    }
    if !(-180.0..=180.0).contains(&location.longitude()) {
        return Err(GhcndError::InvalidQuery(format!(
            "longitude {} is outside [-180, 180]",
            location.longitude()
        )));
    }
    Ok(())
}

fn validate_radius(max_distance_km: f64) -> Result<(), GhcndError> {
    if max_distance_km.is_finite() && max_distance_km >= 0.0 {
        Ok(())
    } else {
        Err(GhcndError::InvalidQuery(format!(
            "radius {} must be a non-negative number of kilometers",
            max_distance_km
        )))
    }
}

// Ids end up in resource paths.
fn validate_station_id(station: &str) -> Result<(), GhcndError> {
    if !station.is_empty() && station.chars().all(|c| c.is_ascii_alphanumeric()) {
        Ok(())
    } else {
        Err(GhcndError::InvalidQuery(format!(
            "station id {:?} must be non-empty and alphanumeric",
            station
        )))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::test_utils::FixtureServer;
    use crate::types::observation::Element;
    use crate::weather_data::dly_records::tests::dly_line;
    use axum::http::StatusCode;
    use chrono::Datelike;
    use std::time::Duration;

    pub(crate) const CATALOG: &str = "\
GME00121150  52.4639   13.3017   51.0    BERLIN-DAHLEM
GME00122614  52.5644   13.3089   36.0    BERLIN-TEGEL
GMM00010384  52.4678   13.4039   50.0    BERLIN-TEMPELHOF
FR000007150  48.7167    2.3833   89.0    PARIS-ORLY
";

    pub(crate) const INVENTORY: &str = "\
GME00121150  52.4639   13.3017 TMAX 1876 2024
GME00121150  52.4639   13.3017 TMIN 1876 2024
GME00122614  52.5644   13.3089 TMAX 1963 2024
GME00122614  52.5644   13.3089 TMIN 1991 2024
GMM00010384  52.4678   13.4039 TMAX 1938 2024
";

    const BERLIN: LatLon = LatLon(52.52, 13.405);

    fn ids(matches: &[StationMatch]) -> Vec<&str> {
        matches.iter().map(|m| m.station.id.as_str()).collect()
    }

    async fn reference_server() -> FixtureServer {
        FixtureServer::builder()
            .text("/ghcnd-stations.txt", CATALOG)
            .text("/ghcnd-inventory.txt", INVENTORY)
            .start()
            .await
    }

    #[tokio::test]
    async fn test_find_stations_by_distance() {
        let server = reference_server().await;
        let client = Ghcnd::with_config(server.config()).unwrap();

        let stations = client.find_stations().location(BERLIN).call().await.unwrap();
        assert_eq!(ids(&stations), vec!["GMM00010384", "GME00122614", "GME00121150"]);
        assert!(stations.windows(2).all(|w| w[0].distance_km <= w[1].distance_km));
        // No inventory request, no inventory download.
        assert_eq!(server.hits("/ghcnd-inventory.txt"), 0);
    }

    #[tokio::test]
    async fn test_find_stations_with_inventory_request() {
        let server = reference_server().await;
        let client = Ghcnd::with_config(server.config()).unwrap();

        let nineties = client
            .find_stations()
            .location(BERLIN)
            .inventory_request(InventoryRequest::new(
                ElementPair::default(),
                YearRange::new(1980, 2000),
            ))
            .call()
            .await
            .unwrap();
        assert_eq!(ids(&nineties), vec!["GME00121150"]);

        let two_thousands = client
            .find_stations()
            .location(BERLIN)
            .station_limit(1)
            .inventory_request(InventoryRequest::new(
                ElementPair::default(),
                YearRange::new(2000, 2010),
            ))
            .call()
            .await
            .unwrap();
        assert_eq!(ids(&two_thousands), vec!["GME00122614"]);

        // Both tables are downloaded once and reused.
        assert_eq!(server.hits("/ghcnd-stations.txt"), 1);
        assert_eq!(server.hits("/ghcnd-inventory.txt"), 1);
    }

    #[tokio::test]
    async fn test_missing_catalog_is_retried() {
        let server = FixtureServer::builder()
            .status("/ghcnd-stations.txt", StatusCode::SERVICE_UNAVAILABLE)
            .start()
            .await;
        let client = Ghcnd::with_config(server.config()).unwrap();

        for _ in 0..2 {
            let stations = client.find_stations().location(BERLIN).call().await.unwrap();
            assert!(stations.is_empty());
        }
        assert_eq!(server.hits("/ghcnd-stations.txt"), 2);
    }

    #[tokio::test]
    async fn test_missing_inventory_falls_back_to_distance() {
        let server = FixtureServer::builder()
            .text("/ghcnd-stations.txt", CATALOG)
            .start()
            .await;
        let client = Ghcnd::with_config(server.config()).unwrap();

        let stations = client
            .find_stations()
            .location(BERLIN)
            .max_distance_km(8.5)
            .inventory_request(InventoryRequest::new(
                ElementPair::default(),
                YearRange::new(1980, 2000),
            ))
            .call()
            .await
            .unwrap();
        assert_eq!(ids(&stations), vec!["GMM00010384", "GME00122614"]);
    }

    #[tokio::test]
    async fn test_invalid_queries_are_rejected_before_io() {
        let server = reference_server().await;
        let client = Ghcnd::with_config(server.config()).unwrap();

        let bad_latitude = client.find_stations().location(LatLon(91.0, 0.0)).call().await;
        assert!(matches!(bad_latitude, Err(GhcndError::InvalidQuery(_))));

        let bad_radius = client
            .find_stations()
            .location(BERLIN)
            .max_distance_km(-1.0)
            .call()
            .await;
        assert!(matches!(bad_radius, Err(GhcndError::InvalidQuery(_))));

        let bad_id = client.weather_data().station("../ghcnd-stations").call().await;
        assert!(matches!(bad_id, Err(GhcndError::InvalidQuery(_))));

        assert_eq!(server.hits("/ghcnd-stations.txt"), 0);
    }

    #[test]
    fn test_invalid_base_url() {
        let config = GhcndConfig::builder().base_url("not a url").build();
        assert!(matches!(
            Ghcnd::with_config(config),
            Err(GhcndError::InvalidConfig(_))
        ));
    }

    #[tokio::test]
    async fn test_weather_data_with_year_filter() {
        let csv = "\
GME00121150,20190601,TMAX,250,,,E,
GME00121150,20200601,TMAX,260,,,E,
GME00121150,20210601,TMAX,-9999,,,E,
GME00121150,20210602,TMIN,120,,,E,
";
        let server = FixtureServer::builder()
            .text("/by_station/GME00121150.csv.gz", csv)
            .start()
            .await;
        let client = Ghcnd::with_config(server.config()).unwrap();

        let all = client.weather_data().station("GME00121150").call().await.unwrap();
        assert_eq!(all.records.len(), 3);
        assert_eq!(all.year_filter, YearFilter::Skipped);
        assert_eq!(all.source, RecordSource::ByStationCsv);

        let recent = client
            .weather_data()
            .station("GME00121150")
            .years(YearRange::new(2020, 2021))
            .call()
            .await
            .unwrap();
        let years: Vec<i32> = recent.records.iter().map(|r| r.date.year()).collect();
        assert_eq!(years, vec![2020, 2021]);
        assert_eq!(recent.year_filter, YearFilter::Applied(YearRange::new(2020, 2021)));
    }

    #[tokio::test]
    async fn test_weather_data_falls_back_to_dly() {
        let server = FixtureServer::builder()
            .text(
                "/all/GME00121150.dly",
                dly_line("GME00121150", 2023, 1, "TMAX", &[(1, 10)]),
            )
            .start()
            .await;
        let client = Ghcnd::with_config(server.config()).unwrap();

        let data = client.weather_data().station("GME00121150").call().await.unwrap();
        assert_eq!(data.source, RecordSource::DailyFixedWidth);
        assert_eq!(data.records.len(), 1);
        assert_eq!(data.records[0].element, Element::Tmax);
    }

    #[tokio::test]
    async fn test_weather_data_not_found() {
        let server = FixtureServer::builder().start().await;
        let client = Ghcnd::with_config(server.config()).unwrap();

        let result = client.weather_data().station("XXX00000000").call().await;
        assert!(matches!(
            result,
            Err(GhcndError::WeatherData(WeatherDataError::NoDataForStation(id))) if id == "XXX00000000"
        ));
    }

    #[tokio::test]
    async fn test_warmup_populates_both_tables() {
        let server = reference_server().await;
        let client = Arc::new(Ghcnd::with_config(server.config()).unwrap());
        assert_eq!(client.warmup_status(), WarmupStatus::Loading);

        client.spawn_warmup();
        client.wait_for_warmup().await;
        assert_eq!(client.warmup_status(), WarmupStatus::Done);

        client
            .find_stations()
            .location(BERLIN)
            .inventory_request(InventoryRequest::new(
                ElementPair::default(),
                YearRange::new(2000, 2010),
            ))
            .call()
            .await
            .unwrap();
        assert_eq!(server.hits("/ghcnd-stations.txt"), 1);
        assert_eq!(server.hits("/ghcnd-inventory.txt"), 1);
    }

    #[tokio::test]
    async fn test_warmup_finishes_when_upstream_is_down() {
        let server = FixtureServer::builder().start().await;
        let client = Arc::new(Ghcnd::with_config(server.config()).unwrap());

        client.spawn_warmup().await.unwrap();
        assert_eq!(client.warmup_status(), WarmupStatus::Done);
    }

    #[tokio::test]
    async fn test_wait_for_warmup_without_spawn_loads_in_place() {
        let server = reference_server().await;
        let client = Ghcnd::with_config(server.config()).unwrap();

        let waited = tokio::time::timeout(Duration::from_secs(5), client.wait_for_warmup()).await;
        assert!(waited.is_ok());
        assert_eq!(client.warmup_status(), WarmupStatus::Done);
        assert_eq!(server.hits("/ghcnd-stations.txt"), 1);
        assert_eq!(server.hits("/ghcnd-inventory.txt"), 1);

        // Already done: returns at once without reloading.
        client.wait_for_warmup().await;
        assert_eq!(server.hits("/ghcnd-stations.txt"), 1);
    }

    #[tokio::test]
    async fn test_wait_for_warmup_without_spawn_when_upstream_is_down() {
        let server = FixtureServer::builder().start().await;
        let client = Ghcnd::with_config(server.config()).unwrap();

        let waited = tokio::time::timeout(Duration::from_secs(5), client.wait_for_warmup()).await;
        assert!(waited.is_ok());
        assert_eq!(client.warmup_status(), WarmupStatus::Done);
    }
}
