//! The query surface shared by every front end: raw, untrusted string
//! parameters in, typed responses or an [`ApiError`] out.
//!
//! Nothing here knows about HTTP; the `web` module (feature `server`) maps
//! [`ApiError`] onto status codes.

use crate::error::GhcndError;
use crate::ghcnd::{Ghcnd, InventoryRequest, WarmupStatus, DEFAULT_STATION_LIMIT};
use crate::types::observation::{Element, ObservationRecord};
use crate::types::station::{LatLon, StationMatch};
use crate::types::year_range::{ElementPair, YearRange};
use crate::weather_data::error::WeatherDataError;
use crate::weather_data::filter::YearFilter;
use crate::weather_data::source::RecordSource;
use log::{error, info};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Shown to callers for every unexpected failure; the detail is only logged.
pub const INTERNAL_ERROR_MESSAGE: &str = "An unexpected error occurred.";

#[derive(Debug, Error)]
pub enum ApiError {
    // Missing or malformed caller input
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("An unexpected error occurred.")]
    Internal(#[source] GhcndError),
}

impl From<GhcndError> for ApiError {
    fn from(e: GhcndError) -> Self {
        match e {
            GhcndError::InvalidQuery(message) => ApiError::BadRequest(message),
            GhcndError::WeatherData(WeatherDataError::NoDataForStation(id)) => {
                ApiError::NotFound(format!("No data found for station {}", id))
            }
            other => {
                error!("Unexpected error while answering a query: {}", other);
                ApiError::Internal(other)
            }
        }
    }
}

/// Parameters of a station search, exactly as received.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StationQuery {
    pub latitude: Option<String>,
    pub longitude: Option<String>,
    pub radius_km: Option<String>,
    pub station_count: Option<String>,
    /// Two comma-separated element codes, e.g. `TMIN,TMAX`.
    pub elements: Option<String>,
    pub start_year: Option<String>,
    pub end_year: Option<String>,
}

/// Parameters of a weather data request, exactly as received.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WeatherQuery {
    pub station_id: Option<String>,
    pub start_year: Option<String>,
    pub end_year: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationSummary {
    pub id: String,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub elevation: Option<f64>,
    pub region: String,
    pub distance_km: f64,
}

impl From<StationMatch> for StationSummary {
    fn from(m: StationMatch) -> Self {
        Self {
            id: m.station.id,
            name: m.station.name,
            latitude: m.station.latitude,
            longitude: m.station.longitude,
            elevation: m.station.elevation,
            region: m.station.region,
            distance_km: m.distance_km,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherDataResponse {
    pub station_id: String,
    pub source: RecordSource,
    /// Whether `start_year`/`end_year` were usable and applied.
    pub year_filter: YearFilter,
    pub records: Vec<ObservationRecord>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusResponse {
    pub status: WarmupStatus,
}

/// Stations near a point, nearest first.
///
/// `latitude`, `longitude` and `radius_km` are required; `station_count`
/// defaults to 10. Inventory coverage is only checked when both years parse;
/// the element pair then defaults to `TMIN,TMAX`.
pub async fn find_stations(
    client: &Ghcnd,
    query: &StationQuery,
) -> Result<Vec<StationSummary>, ApiError> {
    let latitude: f64 = required(query.latitude.as_deref(), "latitude")?;
    let longitude: f64 = required(query.longitude.as_deref(), "longitude")?;
    let radius_km: f64 = required(query.radius_km.as_deref(), "radius_km")?;
    let station_count = optional::<usize>(query.station_count.as_deref(), "station_count")?
        .unwrap_or(DEFAULT_STATION_LIMIT);
    let elements = match query.elements.as_deref() {
        Some(raw) if !raw.trim().is_empty() => parse_element_pair(raw)?,
        _ => ElementPair::default(),
    };
    let inventory_request =
        YearRange::from_bounds(query.start_year.as_deref(), query.end_year.as_deref())
            .map(|years| InventoryRequest::new(elements, years));

    let stations = client
        .find_stations()
        .location(LatLon(latitude, longitude))
        .max_distance_km(radius_km)
        .station_limit(station_count)
        .maybe_inventory_request(inventory_request)
        .call()
        .await?;

    info!(
        "Returning {} stations for ({}, {}) within {} km",
        stations.len(),
        latitude,
        longitude,
        radius_km
    );
    Ok(stations.into_iter().map(StationSummary::from).collect())
}

/// The observation history of one station.
///
/// Unusable year bounds do not fail the request; the response reports the
/// filter as skipped instead.
pub async fn get_weather_data(
    client: &Ghcnd,
    query: &WeatherQuery,
) -> Result<WeatherDataResponse, ApiError> {
    let station_id = query
        .station_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| ApiError::BadRequest("No station ID provided".to_string()))?;
    let years = YearRange::from_bounds(query.start_year.as_deref(), query.end_year.as_deref());

    let data = client
        .weather_data()
        .station(station_id)
        .maybe_years(years)
        .call()
        .await?;

    match data.year_filter {
        YearFilter::Applied(range) => info!(
            "Filtered weather data for station {} between {} and {}: {} records",
            station_id,
            range.start(),
            range.end(),
            data.records.len()
        ),
        YearFilter::Skipped => info!(
            "Returning unfiltered weather data for station {}: {} records",
            station_id,
            data.records.len()
        ),
    }
    Ok(WeatherDataResponse {
        station_id: data.station_id,
        source: data.source,
        year_filter: data.year_filter,
        records: data.records,
    })
}

pub fn status(client: &Ghcnd) -> StatusResponse {
    StatusResponse {
        status: client.warmup_status(),
    }
}

fn required<T: FromStr>(value: Option<&str>, name: &str) -> Result<T, ApiError> {
    optional(value, name)?
        .ok_or_else(|| ApiError::BadRequest(format!("Missing parameter '{}'", name)))
}

fn optional<T: FromStr>(value: Option<&str>, name: &str) -> Result<Option<T>, ApiError> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(raw) => raw.parse().map(Some).map_err(|_| {
            ApiError::BadRequest(format!("Invalid parameter '{}': {:?}", name, raw))
        }),
    }
}

fn parse_element_pair(raw: &str) -> Result<ElementPair, ApiError> {
    let codes: Vec<&str> = raw.split(',').map(str::trim).collect();
    match codes.as_slice() {
        [first, second] if is_element_code(first) && is_element_code(second) => Ok(ElementPair(
            Element::from_code(first),
            Element::from_code(second),
        )),
        _ => Err(ApiError::BadRequest(format!(
            "Invalid parameter 'elements': {:?}, expected two element codes such as TMIN,TMAX",
            raw
        ))),
    }
}

fn is_element_code(code: &str) -> bool {
    code.len() == 4 && code.chars().all(|c| c.is_ascii_alphanumeric())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ghcnd::tests::{CATALOG, INVENTORY};
    use crate::test_utils::FixtureServer;
    use axum::http::StatusCode;

    fn station_query(latitude: &str, longitude: &str, radius_km: &str) -> StationQuery {
        StationQuery {
            latitude: Some(latitude.to_string()),
            longitude: Some(longitude.to_string()),
            radius_km: Some(radius_km.to_string()),
            ..Default::default()
        }
    }

    fn client_for(server: &FixtureServer) -> Ghcnd {
        Ghcnd::with_config(server.config()).unwrap()
    }

    async fn reference_server() -> FixtureServer {
        FixtureServer::builder()
            .text("/ghcnd-stations.txt", CATALOG)
            .text("/ghcnd-inventory.txt", INVENTORY)
            .start()
            .await
    }

    #[tokio::test]
    async fn test_find_stations_summaries() {
        let server = reference_server().await;
        let client = client_for(&server);

        let stations = find_stations(&client, &station_query("52.52", "13.405", "50"))
            .await
            .unwrap();
        assert_eq!(stations.len(), 3);
        assert_eq!(stations[0].id, "GMM00010384");
        assert_eq!(stations[0].name, "BERLIN-TEMPELHOF");
        assert!(stations.iter().all(|s| s.distance_km <= 50.0));

        let json = serde_json::to_value(&stations[0]).unwrap();
        assert_eq!(json["id"], "GMM00010384");
        assert!(json["distance_km"].is_number());
    }

    #[tokio::test]
    async fn test_find_stations_station_count_and_coverage() {
        let server = reference_server().await;
        let client = client_for(&server);

        let mut query = station_query("52.52", "13.405", "50");
        query.station_count = Some("2".to_string());
        let nearest_two = find_stations(&client, &query).await.unwrap();
        assert_eq!(nearest_two.len(), 2);

        query.start_year = Some("1980".to_string());
        query.end_year = Some("2000".to_string());
        let covered = find_stations(&client, &query).await.unwrap();
        let ids: Vec<&str> = covered.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["GME00121150"]);

        query.elements = Some("TMAX,PRCP".to_string());
        assert!(find_stations(&client, &query).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_find_stations_unparseable_years_skip_coverage() {
        let server = reference_server().await;
        let client = client_for(&server);

        let mut query = station_query("52.52", "13.405", "50");
        query.start_year = Some("1980".to_string());
        query.end_year = Some("soon".to_string());
        assert_eq!(find_stations(&client, &query).await.unwrap().len(), 3);
        assert_eq!(server.hits("/ghcnd-inventory.txt"), 0);
    }

    #[tokio::test]
    async fn test_find_stations_bad_requests() {
        let server = reference_server().await;
        let client = client_for(&server);

        let cases = vec![
            StationQuery::default(),
            station_query("north", "13.405", "50"),
            station_query("52.52", "13.405", ""),
            station_query("52.52", "200", "50"),
            station_query("52.52", "13.405", "-5"),
            station_query("52.52", "13.405", "NaN"),
            StationQuery {
                station_count: Some("-1".to_string()),
                ..station_query("52.52", "13.405", "50")
            },
            StationQuery {
                elements: Some("TMAX".to_string()),
                ..station_query("52.52", "13.405", "50")
            },
        ];
        for query in cases {
            let result = find_stations(&client, &query).await;
            assert!(
                matches!(result, Err(ApiError::BadRequest(_))),
                "{:?} gave {:?}",
                query,
                result
            );
        }
        assert_eq!(server.hits("/ghcnd-stations.txt"), 0);
    }

    #[tokio::test]
    async fn test_find_stations_without_catalog_is_empty() {
        let server = FixtureServer::builder()
            .status("/ghcnd-stations.txt", StatusCode::NOT_FOUND)
            .start()
            .await;
        let client = client_for(&server);

        let stations = find_stations(&client, &station_query("52.52", "13.405", "50"))
            .await
            .unwrap();
        assert!(stations.is_empty());
    }

    #[tokio::test]
    async fn test_get_weather_data() {
        let csv = "\
GME00121150,20190601,TMAX,250,,,E,
GME00121150,20200601,TMAX,260,,,E,
GME00121150,20210601,TMIN,120,,,E,
";
        let server = FixtureServer::builder()
            .text("/by_station/GME00121150.csv.gz", csv)
            .start()
            .await;
        let client = client_for(&server);

        let query = WeatherQuery {
            station_id: Some("GME00121150".to_string()),
            start_year: Some("2020".to_string()),
            end_year: Some("2021".to_string()),
        };
        let response = get_weather_data(&client, &query).await.unwrap();
        assert_eq!(response.records.len(), 2);
        assert_eq!(response.year_filter, YearFilter::Applied(YearRange::new(2020, 2021)));

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["records"][0]["date"], "2020-06-01");
        assert_eq!(json["records"][0]["element"], "TMAX");
        assert_eq!(json["year_filter"]["status"], "applied");

        let unfiltered = WeatherQuery {
            end_year: None,
            ..query
        };
        let response = get_weather_data(&client, &unfiltered).await.unwrap();
        assert_eq!(response.records.len(), 3);
        assert_eq!(response.year_filter, YearFilter::Skipped);
    }

    #[tokio::test]
    async fn test_get_weather_data_errors() {
        let server = FixtureServer::builder().start().await;
        let client = client_for(&server);

        let missing_id = get_weather_data(&client, &WeatherQuery::default()).await;
        assert!(matches!(missing_id, Err(ApiError::BadRequest(_))));

        let bad_id = WeatherQuery {
            station_id: Some("../etc".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            get_weather_data(&client, &bad_id).await,
            Err(ApiError::BadRequest(_))
        ));

        let unknown = WeatherQuery {
            station_id: Some("XXX00000000".to_string()),
            ..Default::default()
        };
        match get_weather_data(&client, &unknown).await {
            Err(ApiError::NotFound(message)) => assert!(message.contains("XXX00000000")),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_internal_errors_do_not_leak() {
        let internal = ApiError::from(GhcndError::InvalidConfig("secret detail".to_string()));
        assert!(matches!(internal, ApiError::Internal(_)));
        assert_eq!(internal.to_string(), INTERNAL_ERROR_MESSAGE);
    }

    #[tokio::test]
    async fn test_status() {
        let server = FixtureServer::builder().start().await;
        let client = client_for(&server);

        let json = serde_json::to_value(status(&client)).unwrap();
        assert_eq!(json, serde_json::json!({ "status": "loading" }));
    }
}
