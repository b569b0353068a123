use crate::download::Downloader;
use crate::ghcnd::InventoryRequest;
use crate::stations::catalog::{parse_catalog, CATALOG_PATH};
use crate::stations::distance::distance_km;
use crate::stations::error::LocateStationError;
use crate::stations::inventory::Inventory;
use crate::types::station::{LatLon, Station, StationMatch};
use log::info;
use ordered_float::OrderedFloat;
use rstar::{RTree, AABB};
use std::collections::HashSet;

const EARTH_RADIUS_KM: f64 = 6371.0;
// Widens candidate boxes so float rounding never drops a station on the edge.
const ENVELOPE_PADDING_DEG: f64 = 1e-6;

/// The station catalog, indexed for radius searches.
#[derive(Debug, Clone)]
pub struct StationLocator {
    rtree: RTree<Station>,
}

impl StationLocator {
    pub fn new(stations: Vec<Station>) -> Self {
        Self {
            rtree: RTree::bulk_load(stations),
        }
    }

    /// Downloads and indexes `ghcnd-stations.txt`.
    pub(crate) async fn fetch(downloader: &Downloader) -> Result<Self, LocateStationError> {
        let url = downloader.url(CATALOG_PATH);
        let text = downloader.fetch_text(&url).await?;

        let parse_start = std::time::Instant::now();
        let locator = tokio::task::spawn_blocking(move || Self::new(parse_catalog(&text))).await?;
        if locator.is_empty() {
            return Err(LocateStationError::EmptyReference(url));
        }
        info!(
            "Parsed {} stations from {} in {:?}",
            locator.len(),
            url,
            parse_start.elapsed()
        );
        Ok(locator)
    }

    pub fn len(&self) -> usize {
        self.rtree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.rtree.size() == 0
    }

    /// All stations within `max_distance_km` of `location`, nearest first.
    ///
    /// Equidistant stations are ordered by id.
    pub fn within_radius(&self, location: LatLon, max_distance_km: f64) -> Vec<StationMatch> {
        // Also rejects NaN.
        if !(max_distance_km >= 0.0) {
            return vec![];
        }

        let mut matches: Vec<StationMatch> = search_envelopes(location, max_distance_km)
            .iter()
            .flat_map(|envelope| self.rtree.locate_in_envelope(envelope))
            .filter_map(|station| {
                let dist_km = distance_km(location, station.location());
                (dist_km <= max_distance_km).then(|| StationMatch {
                    station: station.clone(),
                    distance_km: dist_km,
                })
            })
            .collect();

        matches.sort_by(|a, b| {
            OrderedFloat(a.distance_km)
                .cmp(&OrderedFloat(b.distance_km))
                .then_with(|| a.station.id.cmp(&b.station.id))
        });
        matches.dedup_by(|a, b| a.station.id == b.station.id);
        matches
    }
}

/// Latitude/longitude boxes that together contain every point within
/// `radius_km` of `center`.
///
/// Uses the exact longitude half-width of a spherical cap, widens to all
/// longitudes when the cap reaches a pole, and splits boxes that cross the
/// antimeridian.
fn search_envelopes(center: LatLon, radius_km: f64) -> Vec<AABB<[f64; 2]>> {
    let angular = radius_km / EARTH_RADIUS_KM;
    let dlat = angular.to_degrees() + ENVELOPE_PADDING_DEG;
    let min_lat = (center.0 - dlat).max(-90.0);
    let max_lat = (center.0 + dlat).min(90.0);
    let full = |min_lat: f64, max_lat: f64| {
        vec![AABB::from_corners([min_lat, -180.0], [max_lat, 180.0])]
    };

    if min_lat <= -90.0 || max_lat >= 90.0 {
        return full(min_lat, max_lat);
    }

    let ratio = angular.sin() / center.0.to_radians().cos();
    if !(ratio < 1.0) || angular >= std::f64::consts::FRAC_PI_2 {
        return full(min_lat, max_lat);
    }
    let dlon = ratio.asin().to_degrees() + ENVELOPE_PADDING_DEG;
    let min_lon = center.1 - dlon;
    let max_lon = center.1 + dlon;

    if min_lon < -180.0 {
        vec![
            AABB::from_corners([min_lat, min_lon + 360.0], [max_lat, 180.0]),
            AABB::from_corners([min_lat, -180.0], [max_lat, max_lon]),
        ]
    } else if max_lon > 180.0 {
        vec![
            AABB::from_corners([min_lat, min_lon], [max_lat, 180.0]),
            AABB::from_corners([min_lat, -180.0], [max_lat, max_lon - 360.0]),
        ]
    } else {
        vec![AABB::from_corners([min_lat, min_lon], [max_lat, max_lon])]
    }
}

/// Resolves the stations near `location` that satisfy an optional inventory request.
///
/// 1. Without a catalog there is nothing to return.
/// 2. Stations farther than `max_distance_km` are dropped.
/// 3. With a request but no inventory, the distance filter alone applies.
/// 4. Otherwise only stations whose windows for *both* requested elements
///    contain the requested years survive.
///
/// The result is sorted by distance (ties by id) and truncated to `limit`.
pub fn resolve(
    catalog: Option<&StationLocator>,
    inventory: Option<&Inventory>,
    location: LatLon,
    max_distance_km: f64,
    request: Option<&InventoryRequest>,
    limit: usize,
) -> Vec<StationMatch> {
    let Some(catalog) = catalog else {
        return vec![];
    };
    if limit == 0 {
        return vec![];
    }

    let mut matches = catalog.within_radius(location, max_distance_km);

    if let (Some(request), Some(inventory)) = (request, inventory) {
        let covering: HashSet<&str> =
            inventory.stations_covering_pair(&request.elements, request.years);
        matches.retain(|m| covering.contains(m.station.id.as_str()));
    }

    matches.truncate(limit);
    matches
}
