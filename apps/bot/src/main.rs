use anyhow::{Context, Result};
use tbx_bot::config::BotConfig;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let telemetry = tbx_telemetry::install("tbx-bot", env!("CARGO_PKG_VERSION"))?;
    tracing::info!(environment = %telemetry.environment, "tbx-bot booting");

    let config = BotConfig::from_env().context("invalid bot configuration")?;
    tracing::debug!(?config, "configuration loaded");
    tbx_bot::run(config).await
}
