use crate::types::observation::Element;
use crate::types::year_range::YearRange;
use serde::{Deserialize, Serialize};

/// One row of `ghcnd-inventory.txt`: the years for which a station reported an element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryEntry {
    pub station_id: String,
    pub element: Element,
    pub first_year: i32,
    pub last_year: i32,
}

impl InventoryEntry {
    /// True when this entry's window fully contains `years`.
    pub fn covers(&self, years: YearRange) -> bool {
        self.first_year <= years.start() && self.last_year >= years.end()
    }
}
