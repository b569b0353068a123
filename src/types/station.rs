//! Defines the data structures representing GHCN-Daily weather stations, plus the
//! implementations needed to index them spatially with the `rstar` crate.

use rstar::{PointDistance, RTreeObject, AABB};
use serde::{Deserialize, Serialize};

/// Region code used when the catalog leaves the state/province column blank.
pub const UNKNOWN_REGION: &str = "unknown";

/// Represents a geographical coordinate using latitude and longitude in degrees.
///
/// Latitude is the first element (index 0), and longitude is the second (index 1).
///
/// # Examples
///
/// ```
/// use ghcnd::LatLon;
///
/// let berlin_center = LatLon(52.5200, 13.4050);
/// assert_eq!(berlin_center.0, 52.5200); // Latitude
/// assert_eq!(berlin_center.1, 13.4050); // Longitude
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLon(pub f64, pub f64);

impl LatLon {
    pub fn latitude(&self) -> f64 {
        self.0
    }

    pub fn longitude(&self) -> f64 {
        self.1
    }
}

/// A single station from the GHCN-Daily station catalog (`ghcnd-stations.txt`).
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Station {
    /// The 11 character GHCN identifier (e.g., "USW00094728").
    pub id: String,
    /// Latitude in decimal degrees (positive for North, negative for South).
    pub latitude: f64,
    /// Longitude in decimal degrees (positive for East, negative for West).
    pub longitude: f64,
    /// Elevation above sea level in meters, if the catalog reports one.
    pub elevation: Option<f64>,
    /// The state or province code; [`UNKNOWN_REGION`] when the catalog has none.
    pub region: String,
    /// Display name of the station.
    pub name: String,
}

impl Station {
    pub fn location(&self) -> LatLon {
        LatLon(self.latitude, self.longitude)
    }
}

/// A station returned by a proximity search, with its distance from the query point.
#[derive(Debug, Clone, PartialEq)]
pub struct StationMatch {
    pub station: Station,
    /// Great-circle distance from the query point in kilometers.
    pub distance_km: f64,
}

// --- R-Tree Implementations ---

/// Stations are points in (latitude, longitude) space.
impl RTreeObject for Station {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point([self.latitude, self.longitude])
    }
}

/// Squared Euclidean distance in degree space.
///
/// Only used by the R-tree for its own bookkeeping; real distances are always
/// computed with the haversine formula.
impl PointDistance for Station {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dx = self.latitude - point[0];
        let dy = self.longitude - point[1];
        dx * dx + dy * dy
    }
}
