//! Long-polling update source.

use std::{future::Future, sync::Arc, time::Duration};

use anyhow::{Context, Result};
use tbx_telemetry::{TelemetryLabels, record_counter};
use tokio::task::JoinSet;

use crate::router::CommandRouter;
use crate::telegram_api::{TelegramApi, TelegramUpdate, incoming_from_update};

const RETRY_PAUSE: Duration = Duration::from_secs(1);

/// Polls `getUpdates` until `shutdown` resolves, handling each message in its
/// own task. In-flight handlers are awaited before returning.
pub async fn run_polling<F>(
    api: Arc<dyn TelegramApi>,
    router: Arc<CommandRouter>,
    poll_timeout_secs: u64,
    shutdown: F,
) -> Result<()>
where
    F: Future<Output = ()> + Send,
{
    api.delete_webhook(false)
        .await
        .context("failed to clear telegram webhook before polling")?;
    tracing::info!(poll_timeout_secs, "polling telegram for updates");

    tokio::pin!(shutdown);
    let mut tasks = JoinSet::new();
    let mut offset = 0_i64;

    loop {
        while tasks.try_join_next().is_some() {}

        let polled = tokio::select! {
            biased;
            _ = &mut shutdown => break,
            polled = api.get_updates(offset, poll_timeout_secs) => polled,
        };

        match polled {
            Ok(updates) => {
                for update in updates {
                    offset = offset.max(update.update_id + 1);
                    spawn_update(&mut tasks, &router, update);
                }
            }
            Err(err) => {
                tracing::warn!(error = ?err, "getUpdates failed; retrying");
                tokio::select! {
                    biased;
                    _ = &mut shutdown => break,
                    _ = tokio::time::sleep(RETRY_PAUSE) => {}
                }
            }
        }
    }

    tracing::info!(pending = tasks.len(), "polling stopped");
    while tasks.join_next().await.is_some() {}
    Ok(())
}

fn spawn_update(tasks: &mut JoinSet<()>, router: &Arc<CommandRouter>, update: TelegramUpdate) {
    record_counter("updates_received_total", 1, &TelemetryLabels::default());
    let Some(msg) = incoming_from_update(&update) else {
        tracing::debug!(update_id = update.update_id, "skipping update without text");
        return;
    };
    let router = Arc::clone(router);
    tasks.spawn(async move { router.dispatch(msg).await });
}
