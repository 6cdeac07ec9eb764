use std::sync::Once;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

static INIT_LOGGING: Once = Once::new();

/// Installs the global subscriber once. `RUST_LOG` wins, then
/// `KPI_LOG_LEVEL`, then `info`.
pub fn init() {
    INIT_LOGGING.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| {
                EnvFilter::try_new(std::env::var("KPI_LOG_LEVEL").unwrap_or_else(|_| "info".into()))
            })
            .unwrap_or_else(|_| EnvFilter::new("info"));

        let stdout_layer = fmt::layer().with_target(true);

        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(stdout_layer)
            .try_init();
    });
}
