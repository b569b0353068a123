//! Process-lifetime storage for the two reference tables (catalog and inventory).

use crate::stations::error::LocateStationError;
use log::{debug, warn};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::OnceCell;

/// A value that is loaded at most once and then shared read-only.
///
/// Concurrent [`ReferenceCache::get_or_load`] calls are single-flight: one caller
/// runs the loader while the others wait for its outcome. A failed load leaves
/// the cache empty, so a later call tries again. Readers only ever observe
/// "empty" or the complete value.
#[derive(Debug)]
pub struct ReferenceCache<T> {
    name: &'static str,
    cell: OnceCell<Arc<T>>,
}

impl<T> ReferenceCache<T> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            cell: OnceCell::new(),
        }
    }

    /// The cached value, without triggering a load.
    #[cfg(test)]
    pub fn get(&self) -> Option<Arc<T>> {
        self.cell.get().cloned()
    }

    #[cfg(test)]
    pub fn is_populated(&self) -> bool {
        self.cell.initialized()
    }

    /// Returns the cached value, running `load` first if nothing is cached yet.
    ///
    /// Load failures are logged and reported as `None`; they are never cached.
    pub async fn get_or_load<F, Fut>(&self, load: F) -> Option<Arc<T>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, LocateStationError>>,
    {
        if let Some(value) = self.cell.get() {
            debug!("Cache hit for {}", self.name);
            return Some(value.clone());
        }
        match self
            .cell
            .get_or_try_init(|| async move { load().await.map(Arc::new) })
            .await
        {
            Ok(value) => Some(value.clone()),
            Err(e) => {
                warn!("Failed to load {}: {}", self.name, e);
                None
            }
        }
    }
}
