//! Webhook update source served by axum.

use std::{
    future::Future,
    sync::{Arc, Mutex, PoisonError},
};

use anyhow::{Context, Result};
use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde_json::Value;
use tbx_telemetry::{TelemetryLabels, record_counter};
use tokio::task::JoinSet;

use crate::config::WebhookConfig;
use crate::router::CommandRouter;
use crate::telegram_api::{TelegramApi, TelegramUpdate, incoming_from_update};

const SECRET_HEADER: &str = "X-Telegram-Bot-Api-Secret-Token";

/// Handler tasks started by acknowledged updates.
#[derive(Clone, Default)]
pub struct InFlight {
    tasks: Arc<Mutex<JoinSet<()>>>,
}

impl InFlight {
    fn spawn<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let mut tasks = self.tasks.lock().unwrap_or_else(PoisonError::into_inner);
        while tasks.try_join_next().is_some() {}
        tasks.spawn(task);
    }

    /// Waits for every task spawned so far.
    pub async fn drain(&self) {
        let mut tasks = std::mem::take(
            &mut *self.tasks.lock().unwrap_or_else(PoisonError::into_inner),
        );
        tracing::info!(pending = tasks.len(), "waiting for in-flight updates");
        while tasks.join_next().await.is_some() {}
    }
}

#[derive(Clone)]
struct AppState {
    router: Arc<CommandRouter>,
    secret_token: Option<String>,
    in_flight: InFlight,
}

pub fn app(
    router: Arc<CommandRouter>,
    secret_token: Option<String>,
    in_flight: InFlight,
) -> Router {
    Router::new()
        .route("/telegram/webhook", post(handle_update))
        .route("/healthz", get(healthz))
        .with_state(AppState {
            router,
            secret_token,
            in_flight,
        })
}

/// Registers the webhook with Telegram and serves updates until `shutdown`.
/// Updates already acknowledged are handled to completion before returning.
pub async fn run_webhook<F>(
    api: Arc<dyn TelegramApi>,
    router: Arc<CommandRouter>,
    config: WebhookConfig,
    shutdown: F,
) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.bind))?;
    api.set_webhook(&config.public_url, config.secret_token.as_deref())
        .await
        .context("failed to register telegram webhook")?;
    tracing::info!(bind = %config.bind, url = %config.public_url, "webhook listening");

    let in_flight = InFlight::default();
    let served = axum::serve(listener, app(router, config.secret_token, in_flight.clone()))
        .with_graceful_shutdown(shutdown)
        .await;
    in_flight.drain().await;
    served.context("webhook server failed")?;
    tracing::info!("webhook server stopped");
    Ok(())
}

fn secret_token_valid(expected: &Option<String>, provided: Option<&str>) -> bool {
    match expected {
        Some(exp) => provided == Some(exp.as_str()),
        None => true,
    }
}

async fn healthz() -> &'static str {
    "ok"
}

async fn handle_update(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<Value>,
) -> Response {
    let provided = headers.get(SECRET_HEADER).and_then(|v| v.to_str().ok());
    if !secret_token_valid(&state.secret_token, provided) {
        tracing::warn!("telegram secret token mismatch");
        return StatusCode::UNAUTHORIZED.into_response();
    }

    let update: TelegramUpdate = match serde_json::from_value(payload) {
        Ok(update) => update,
        Err(err) => {
            tracing::warn!(error = %err, "bad update");
            return StatusCode::BAD_REQUEST.into_response();
        }
    };
    record_counter("updates_received_total", 1, &TelemetryLabels::default());

    if let Some(msg) = incoming_from_update(&update) {
        let router = state.router.clone();
        state
            .in_flight
            .spawn(async move { router.dispatch(msg).await });
    }
    StatusCode::OK.into_response()
}
