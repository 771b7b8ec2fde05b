//! Logging and counter helpers shared by the bot binary.
//!
//! Log output is JSON by default (`LOG_FORMAT=text` for human-readable lines)
//! and filtered by `RUST_LOG`, falling back to `info` or `debug` when `DEBUG`
//! is set.

mod config;
mod context;
mod counters;
mod tracing_init;

pub use config::TelemetryConfig;
pub use context::TelemetryLabels;
pub use counters::{record_counter, start_message_span};
pub use tracing_init::init_telemetry;

/// Reads configuration from the environment and installs the subscriber.
pub fn install(service_name: &str, service_version: &str) -> anyhow::Result<TelemetryConfig> {
    let cfg = TelemetryConfig::from_env(service_name, service_version);
    init_telemetry(&cfg)?;
    Ok(cfg)
}
