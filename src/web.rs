//! HTTP routes over the [`crate::api`] query surface.

use crate::api::{self, ApiError, StationQuery, WeatherQuery};
use crate::ghcnd::Ghcnd;
use crate::weather_data::filter::YearFilter;
use axum::extract::{Query, State};
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use log::warn;
use serde::Serialize;
use std::sync::Arc;

/// Reports whether the year bounds of a weather data request were applied.
pub const YEAR_FILTER_HEADER: &str = "x-year-filter";
/// Names the upstream format the records were read from.
pub const RECORD_SOURCE_HEADER: &str = "x-record-source";

pub fn create_router(client: Arc<Ghcnd>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/status", get(status))
        .route("/get_stations", get(get_stations))
        .route("/get_weather_data", get(get_weather_data))
        .with_state(client)
}

async fn health() -> &'static str {
    "ok"
}

async fn status(State(client): State<Arc<Ghcnd>>) -> Json<api::StatusResponse> {
    Json(api::status(&client))
}

async fn get_stations(
    State(client): State<Arc<Ghcnd>>,
    Query(query): Query<StationQuery>,
) -> Result<Json<Vec<api::StationSummary>>, ApiError> {
    api::find_stations(&client, &query).await.map(Json)
}

async fn get_weather_data(
    State(client): State<Arc<Ghcnd>>,
    Query(query): Query<WeatherQuery>,
) -> Result<Response, ApiError> {
    let data = api::get_weather_data(&client, &query).await?;
    let year_filter = match data.year_filter {
        YearFilter::Applied(_) => HeaderValue::from_static("applied"),
        YearFilter::Skipped => HeaderValue::from_static("skipped"),
    };
    let source = HeaderValue::from_str(&data.source.to_string())
        .unwrap_or_else(|_| HeaderValue::from_static("unknown"));
    Ok((
        [(YEAR_FILTER_HEADER, year_filter), (RECORD_SOURCE_HEADER, source)],
        Json(data.records),
    )
        .into_response())
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        warn!("[{}] {}", status, self);
        (
            status,
            Json(ErrorResponse {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}
