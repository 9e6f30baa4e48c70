//! Logging setup for cardkit binaries.
//!
//! Logs go to stderr so command output on stdout stays machine readable. `LOG_FORMAT`
//! selects JSON (default) or plain text, `RUST_LOG` the filter.

use anyhow::Result;

mod config;
mod tracing_init;

pub use config::TelemetryConfig;
pub use tracing_init::{init_tracing, initialised};

/// Installs the subscriber configured from the environment. Safe to call repeatedly.
pub fn install(service_name: &str) -> Result<()> {
    let cfg = TelemetryConfig::from_env(service_name, env!("CARGO_PKG_VERSION"));
    init_tracing(&cfg)
}
