pub mod booking;
pub mod channel;
pub mod metrics;

pub use booking::DateRange;
pub use metrics::{MetricScope, MetricsRecord, MetricsReport};
