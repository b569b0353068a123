use crate::types::station::LatLon;
use haversine::{distance, Location as HaversineLocation, Units};

/// Great-circle distance in kilometers (haversine, Earth radius 6371 km).
///
/// ```
/// use ghcnd::{distance_km, LatLon};
///
/// let berlin = LatLon(52.5200, 13.4050);
/// let paris = LatLon(48.8566, 2.3522);
/// assert!((distance_km(berlin, paris) - 877.46).abs() < 0.1);
/// assert_eq!(distance_km(berlin, berlin), 0.0);
/// ```
pub fn distance_km(from: LatLon, to: LatLon) -> f64 {
    distance(
        HaversineLocation {
            latitude: from.0,
            longitude: from.1,
        },
        HaversineLocation {
            latitude: to.0,
            longitude: to.1,
        },
        Units::Kilometers,
    )
}
