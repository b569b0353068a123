//! Parser and coverage index for `ghcnd-inventory.txt`.

use crate::download::Downloader;
use crate::stations::error::LocateStationError;
use crate::types::inventory::InventoryEntry;
use crate::types::observation::Element;
use crate::types::year_range::{ElementPair, YearRange};
use crate::utils::{FixedWidthField, FixedWidthLine};
use log::info;
use std::collections::HashSet;

pub(crate) const INVENTORY_PATH: &str = "ghcnd-inventory.txt";

const ID: FixedWidthField = FixedWidthField::new("id", 0, 11);
// Columns 12..30 repeat the station coordinates and are not needed here.
const ELEMENT: FixedWidthField = FixedWidthField::new("element", 31, 35);
const FIRST_YEAR: FixedWidthField = FixedWidthField::new("first_year", 36, 40);
const LAST_YEAR: FixedWidthField = FixedWidthField::new("last_year", 41, 45);

/// Per-station, per-element coverage windows.
#[derive(Debug, Clone, Default)]
pub struct Inventory {
    entries: Vec<InventoryEntry>,
}

impl Inventory {
    pub fn new(entries: Vec<InventoryEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[InventoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Ids of stations whose `element` window contains all of `years`.
    pub fn stations_covering(&self, element: &Element, years: YearRange) -> HashSet<&str> {
        self.entries
            .iter()
            .filter(|entry| &entry.element == element && entry.covers(years))
            .map(|entry| entry.station_id.as_str())
            .collect()
    }

    /// Ids of stations covering `years` for both elements of the pair.
    pub fn stations_covering_pair(&self, elements: &ElementPair, years: YearRange) -> HashSet<&str> {
        let first = self.stations_covering(&elements.0, years);
        let second = self.stations_covering(&elements.1, years);
        first.intersection(&second).copied().collect()
    }
}

impl Inventory {
    /// Downloads and parses `ghcnd-inventory.txt`.
    pub(crate) async fn fetch(downloader: &Downloader) -> Result<Self, LocateStationError> {
        let url = downloader.url(INVENTORY_PATH);
        let text = downloader.fetch_text(&url).await?;

        let parse_start = std::time::Instant::now();
        let inventory = tokio::task::spawn_blocking(move || parse_inventory(&text)).await?;
        if inventory.is_empty() {
            return Err(LocateStationError::EmptyReference(url));
        }
        info!(
            "Parsed {} inventory entries from {} in {:?}",
            inventory.len(),
            url,
            parse_start.elapsed()
        );
        Ok(inventory)
    }
}

/// Parses the inventory file.
///
/// Lines without an id, element or both years are skipped, as are windows whose
/// first year comes after their last.
pub(crate) fn parse_inventory(text: &str) -> Inventory {
    Inventory::new(text.lines().filter_map(parse_inventory_line).collect())
}

fn parse_inventory_line(line: &str) -> Option<InventoryEntry> {
    let line = FixedWidthLine::new(line);
    let station_id = line.text(&ID)?;
    let element = line.text(&ELEMENT)?;
    let first_year: i32 = line.parse(&FIRST_YEAR)?;
    let last_year: i32 = line.parse(&LAST_YEAR)?;
    if first_year > last_year {
        return None;
    }
    Some(InventoryEntry {
        station_id: station_id.to_string(),
        element: Element::from_code(element),
        first_year,
        last_year,
    })
}
