pub(crate) mod catalog;
pub(crate) mod distance;
pub(crate) mod error;
pub(crate) mod inventory;
pub(crate) mod locate_station;
pub(crate) mod reference_cache;
