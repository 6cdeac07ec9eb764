use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::debug;

use crate::errors::ServerError;

/// Short-lived cache for the city dropdown. Entries expire after `ttl`;
/// a zero TTL disables caching.
pub struct CityCache {
    ttl: Duration,
    slot: Mutex<Option<(Instant, Vec<String>)>>,
}

impl CityCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            slot: Mutex::new(None),
        }
    }

    /// Returns the cached list, or runs `load` and caches its result.
    /// Load failures are returned and nothing is cached.
    pub fn get_or_load<F>(&self, load: F) -> Result<Vec<String>, ServerError>
    where
        F: FnOnce() -> Result<Vec<String>, ServerError>,
    {
        let mut slot = self.slot.lock().map_err(|_| ServerError::InternalError)?;

        if let Some((loaded_at, cities)) = slot.as_ref() {
            if loaded_at.elapsed() < self.ttl {
                return Ok(cities.clone());
            }
        }

        let cities = load()?;
        debug!(count = cities.len(), "city list refreshed");
        *slot = Some((Instant::now(), cities.clone()));
        Ok(cities)
    }

    pub fn invalidate(&self) {
        if let Ok(mut slot) = self.slot.lock() {
            *slot = None;
        }
    }
}
