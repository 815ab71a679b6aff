use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;

/// Initializes structured logging for the embedding shell.
/// `RUST_LOG` wins when set; otherwise the crate logs at the configured
/// level. Safe to call more than once — later calls are no-ops.
pub fn init(config: &Config) {
    let _ = tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}
