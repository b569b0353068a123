//! Parser for `ghcnd-stations.txt`.

use crate::types::station::{Station, UNKNOWN_REGION};
use crate::utils::{FixedWidthField, FixedWidthLine};

pub(crate) const CATALOG_PATH: &str = "ghcnd-stations.txt";

const ID: FixedWidthField = FixedWidthField::new("id", 0, 11);
const LATITUDE: FixedWidthField = FixedWidthField::new("latitude", 12, 20);
const LONGITUDE: FixedWidthField = FixedWidthField::new("longitude", 21, 30);
const ELEVATION: FixedWidthField = FixedWidthField::new("elevation", 31, 37);
const REGION: FixedWidthField = FixedWidthField::new("region", 38, 40);
const NAME: FixedWidthField = FixedWidthField::new("name", 41, 71);

/// The catalog marks unknown elevations with this value.
const MISSING_ELEVATION: f64 = -999.9;

/// Parses the whole catalog, keeping file order.
///
/// Lines without an id or without a parsable latitude and longitude are skipped.
pub(crate) fn parse_catalog(text: &str) -> Vec<Station> {
    text.lines().filter_map(parse_station_line).collect()
}

fn parse_station_line(line: &str) -> Option<Station> {
    let line = FixedWidthLine::new(line);
    let id = line.text(&ID)?;
    let latitude: f64 = line.parse(&LATITUDE)?;
    let longitude: f64 = line.parse(&LONGITUDE)?;
    if !latitude.is_finite() || !longitude.is_finite() {
        return None;
    }
    let elevation = line
        .parse::<f64>(&ELEVATION)
        .filter(|e| (e - MISSING_ELEVATION).abs() > f64::EPSILON);

    Some(Station {
        id: id.to_string(),
        latitude,
        longitude,
        elevation,
        region: line.text(&REGION).unwrap_or(UNKNOWN_REGION).to_string(),
        name: line.text(&NAME).unwrap_or_default().to_string(),
    })
}
