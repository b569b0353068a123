pub(crate) mod csv_records;
pub(crate) mod dly_records;
pub(crate) mod error;
pub(crate) mod fetcher;
pub(crate) mod filter;
pub(crate) mod source;
