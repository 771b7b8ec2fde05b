use metrics::Label;
use tracing::Span;

use crate::context::TelemetryLabels;

const MESSAGE_SPAN_NAME: &str = "bot.handle";

/// Increments a counter through the globally installed `metrics` recorder.
pub fn record_counter(name: &'static str, value: u64, labels: &TelemetryLabels) {
    let labels: Vec<Label> = labels
        .tags()
        .into_iter()
        .map(|(key, value)| Label::new(key, value))
        .collect();
    metrics::counter!(name, labels).increment(value);
}

/// Span wrapping the handling of one chat message.
pub fn start_message_span(labels: &TelemetryLabels) -> Span {
    tracing::info_span!(
        MESSAGE_SPAN_NAME,
        chat_id = %labels.chat_id.clone().unwrap_or_default(),
        user_id = %labels.user_id.clone().unwrap_or_default(),
        msg_id = %labels.msg_id.clone().unwrap_or_default()
    )
}
