use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "SCM_INVENTORY_LOG";
const DEFAULT_FILTER: &str = "warn";

/// Routes tracing output to stderr; stdout carries only the inventory JSON.
pub fn init() {
    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .try_init();
}
