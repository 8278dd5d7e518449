use tracing_subscriber::{
    fmt,
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

pub const DEFAULT_LOG_FILTER: &str = "novadash=info,novadash_core=info,novadash_semaphore=info,novadash_web=info,tower_http=info";

pub const DEV_LOG_FILTER: &str = "novadash=debug,novadash_core=debug,novadash_semaphore=debug,novadash_web=debug,tower_http=debug";

pub fn init() {
    init_with_default(DEFAULT_LOG_FILTER);
}

/// Installs the global subscriber; `RUST_LOG` wins over `default_filter`
///
/// A second call is a no-op, so tests and embedding binaries may both call it.
pub fn init_with_default(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true).with_thread_ids(false))
        .try_init();
}

pub fn init_dev() {
    init_with_default(DEV_LOG_FILTER);
}
