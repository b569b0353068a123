//! Client configuration: where the archive lives and how long to wait for it.

use bon::Builder;
use log::warn;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://www.ncei.noaa.gov/pub/data/ghcn/daily/";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

const BASE_URL_ENV: &str = "GHCN_BASE_URL";
const TIMEOUT_ENV: &str = "GHCN_TIMEOUT_SECS";

/// Settings for a [`crate::Ghcnd`] client.
///
/// # Examples
///
/// ```
/// use ghcnd::GhcndConfig;
/// use std::time::Duration;
///
/// let config = GhcndConfig::builder()
///     .base_url("https://mirror.example.org/ghcn/daily/")
///     .timeout(Duration::from_secs(30))
///     .build();
/// assert_eq!(config.timeout, Duration::from_secs(30));
/// assert!(config.user_agent.starts_with("ghcnd/"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Builder)]
pub struct GhcndConfig {
    /// Root of the GHCN-Daily directory tree.
    #[builder(into, default = DEFAULT_BASE_URL.to_string())]
    pub base_url: String,
    /// Upper bound for every single HTTP request.
    #[builder(default = DEFAULT_TIMEOUT)]
    pub timeout: Duration,
    #[builder(into, default = default_user_agent())]
    pub user_agent: String,
}

impl Default for GhcndConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl GhcndConfig {
    /// Defaults overridden by `GHCN_BASE_URL` and `GHCN_TIMEOUT_SECS` when set.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(base_url) = lookup(BASE_URL_ENV).filter(|v| !v.trim().is_empty()) {
            config.base_url = base_url.trim().to_string();
        }
        if let Some(raw) = lookup(TIMEOUT_ENV) {
            match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => config.timeout = Duration::from_secs(secs),
                _ => warn!(
                    "Ignoring invalid {}={:?}, using {:?}",
                    TIMEOUT_ENV, raw, DEFAULT_TIMEOUT
                ),
            }
        }
        config
    }

    /// `base_url` with exactly one trailing slash.
    pub(crate) fn normalized_base_url(&self) -> String {
        format!("{}/", self.base_url.trim_end_matches('/'))
    }
}

fn default_user_agent() -> String {
    format!("ghcnd/{}", env!("CARGO_PKG_VERSION"))
}
