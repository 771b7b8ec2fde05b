//! Telegram bot that links a user's TeraBox account and converts shared links
//! into links the user owns.

pub mod config;
pub mod conversion;
pub mod handlers;
pub mod polling;
pub mod router;
pub mod telegram_api;
pub mod transport;
pub mod webhook;

#[cfg(test)]
mod testkit;

use std::sync::Arc;

use anyhow::{Context, Result};
use tbx_terabox::HttpShareApi;

use crate::config::{BotConfig, TransportMode};
use crate::router::{BotContext, default_router};
use crate::telegram_api::{HttpTelegramApi, TelegramApi};
use crate::transport::TelegramTransport;

/// Wires the store, TeraBox client and Telegram transport together and runs
/// the configured update source until a shutdown signal arrives.
pub async fn run(config: BotConfig) -> Result<()> {
    let store = tbx_store::store_from_url(&config.store_url)
        .with_context(|| format!("failed to open credential store {}", config.store_url))?;
    let shares = HttpShareApi::new(config.share_client_config())
        .context("failed to build terabox client")?;

    let client = reqwest::Client::builder()
        .build()
        .context("failed to build telegram client")?;
    let telegram: Arc<dyn TelegramApi> = Arc::new(HttpTelegramApi::new(
        client,
        &config.telegram_api_base,
        &config.bot_token,
        config.http_timeout,
    ));

    let ctx = BotContext {
        store,
        shares: Arc::new(shares),
        chat: Arc::new(TelegramTransport::new(telegram.clone())),
    };
    let router = Arc::new(default_router(ctx));

    match config.mode {
        TransportMode::Polling => {
            polling::run_polling(telegram, router, config.poll_timeout_secs, shutdown_signal())
                .await
        }
        TransportMode::Webhook(webhook) => {
            webhook::run_webhook(telegram, router, webhook, shutdown_signal()).await
        }
    }
}

/// Resolves on Ctrl-C, or SIGTERM on unix.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("shutdown signal received");
}
