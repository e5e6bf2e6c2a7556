pub mod cli;
pub mod config;
pub mod models;
pub mod pipeline;
pub mod provider;
pub mod report;
pub mod store;
pub mod workflow;

use tracing_subscriber::EnvFilter;

/// Initialize tracing for the binary. Library consumers install their own
/// subscriber instead.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("Archopinion starting v{}", config::APP_VERSION);
}
