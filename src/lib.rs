pub mod config;
pub mod db;
pub mod gamification;
pub mod messaging;
pub mod models;
pub mod notifications;
pub mod seed;
pub mod service;
pub mod store;
pub mod workflow;

use tracing_subscriber::EnvFilter;

/// Initialize tracing for binaries and tools embedding the crate.
/// Safe to call more than once; later calls are no-ops.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .try_init();
}
