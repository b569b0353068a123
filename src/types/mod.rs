pub(crate) mod inventory;
pub(crate) mod observation;
pub(crate) mod station;
pub(crate) mod weather_frame;
pub(crate) mod year_range;
