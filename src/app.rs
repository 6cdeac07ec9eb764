use crate::db::{get_city_list, CityCache, Database};
use crate::errors::ServerError;
use crate::insight::TextGenerator;
use crate::query::{FilterPolicy, QueryBuilder};
use std::time::Duration;

/// Shared by every worker thread for the life of the server.
pub struct AppState {
    pub db: Database,
    pub builder: QueryBuilder,
    pub generator: Box<dyn TextGenerator>,
    pub model: String,
    cities: CityCache,
}

impl AppState {
    pub fn new(
        db: Database,
        policy: FilterPolicy,
        city_cache_ttl: Duration,
        generator: Box<dyn TextGenerator>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            db,
            builder: QueryBuilder::new(policy),
            generator,
            model: model.into(),
            cities: CityCache::new(city_cache_ttl),
        }
    }

    /// Selectable cities, served from the cache while it is fresh.
    pub fn cities(&self) -> Result<Vec<String>, ServerError> {
        self.cities
            .get_or_load(|| get_city_list(&self.db, self.builder.policy()))
    }

    pub fn refresh_cities(&self) {
        self.cities.invalidate();
    }
}
