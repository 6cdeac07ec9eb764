pub mod city_cache;
pub mod connection;
pub mod metrics;

pub use city_cache::CityCache;
pub use connection::{init_db, Database};
pub use metrics::{get_city_list, run_metrics};
