//! Free-text handler: cookie submission and the two-call link conversion.

use anyhow::Result;
use async_trait::async_trait;
use tbx_core::{IncomingMessage, Reply, SentMessage, credentials, links, replies};
use tbx_telemetry::{TelemetryLabels, record_counter};
use time::OffsetDateTime;

use crate::router::{BotContext, CommandHandler};

const CONVERSIONS_COUNTER: &str = "conversions_total";

/// Terminal step reached by one free-text message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Connected,
    InvalidCookie,
    NotALink,
    LoginRequired,
    InvalidLink,
    SaveFailed,
    SavedWithoutShare,
    ShareFailed,
    LinkNotFound,
    Converted,
    StoreFailed,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Connected => "connected",
            Outcome::InvalidCookie => "invalid_cookie",
            Outcome::NotALink => "not_a_link",
            Outcome::LoginRequired => "login_required",
            Outcome::InvalidLink => "invalid_link",
            Outcome::SaveFailed => "save_failed",
            Outcome::SavedWithoutShare => "saved_without_share",
            Outcome::ShareFailed => "share_failed",
            Outcome::LinkNotFound => "link_not_found",
            Outcome::Converted => "converted",
            Outcome::StoreFailed => "store_failed",
        }
    }
}

pub struct ConversionHandler;

#[async_trait]
impl CommandHandler for ConversionHandler {
    async fn handle(&self, ctx: &BotContext, msg: &IncomingMessage) -> Result<()> {
        let outcome = run(ctx, msg).await?;
        tracing::info!(outcome = outcome.as_str(), "text message handled");
        record_counter(
            CONVERSIONS_COUNTER,
            1,
            &TelemetryLabels::default().with("outcome", outcome.as_str()),
        );
        Ok(())
    }
}

/// Runs the workflow for one message and reports where it stopped.
///
/// Every path ends with exactly one user-visible reply: either a fresh
/// message or an edit of the progress message.
pub async fn run(ctx: &BotContext, msg: &IncomingMessage) -> Result<Outcome> {
    let text = msg.trimmed_text();

    if credentials::has_auth_marker(text) {
        return submit_cookie(ctx, msg, text).await;
    }

    if !links::mentions_domain(text) {
        return reply(ctx, msg, replies::send_valid_link(), Outcome::NotALink).await;
    }

    let record = match ctx.store.find(msg.user_id).await {
        Ok(record) => record,
        Err(err) => {
            tracing::error!(error = ?err, "credential lookup failed");
            return reply(ctx, msg, replies::store_error(), Outcome::StoreFailed).await;
        }
    };
    let Some(record) = record else {
        return reply(ctx, msg, replies::login_first(), Outcome::LoginRequired).await;
    };
    let age = OffsetDateTime::now_utc() - record.updated_at;
    tracing::debug!(credential_age_secs = age.whole_seconds(), "using stored credential");

    let Some(reference) = links::extract(text) else {
        return reply(ctx, msg, replies::invalid_link(), Outcome::InvalidLink).await;
    };

    let status = ctx.chat.send(msg.chat_id, &replies::copying()).await?;

    let saved = match ctx
        .shares
        .save_share(
            &record.secret,
            reference.share_id(),
            reference.owner_id().unwrap_or_default(),
        )
        .await
    {
        Ok(saved) => saved,
        Err(err) => {
            tracing::warn!(error = ?err, "save share failed");
            return edit(ctx, &status, replies::save_failed(), Outcome::SaveFailed).await;
        }
    };

    let file_ids = saved.file_ids();
    if file_ids.is_empty() {
        tracing::info!(errno = ?saved.errno(), "save response carried no file ids");
        return edit(
            ctx,
            &status,
            replies::saved_no_share(),
            Outcome::SavedWithoutShare,
        )
        .await;
    }

    let shared = match ctx.shares.create_share(&record.secret, &file_ids).await {
        Ok(shared) => shared,
        Err(err) => {
            tracing::warn!(error = ?err, "create share failed");
            return edit(ctx, &status, replies::share_failed(), Outcome::ShareFailed).await;
        }
    };

    match shared.share_link() {
        Some(link) => {
            let converted = replies::converted(link);
            if let Err(err) = ctx.chat.edit(&status, &converted).await {
                // Telegram refuses buttons whose url it cannot open
                tracing::warn!(error = ?err, "link button rejected; sending text only");
                let text_only = Reply::text(converted.text);
                return edit(ctx, &status, text_only, Outcome::Converted).await;
            }
            Ok(Outcome::Converted)
        }
        None => {
            tracing::info!(errno = ?shared.errno(), "share response carried no link");
            edit(ctx, &status, replies::link_not_found(), Outcome::LinkNotFound).await
        }
    }
}

async fn submit_cookie(ctx: &BotContext, msg: &IncomingMessage, text: &str) -> Result<Outcome> {
    let secret = credentials::normalize(text);
    if !credentials::has_session_marker(&secret) {
        return reply(ctx, msg, replies::invalid_cookie(), Outcome::InvalidCookie).await;
    }
    match ctx.store.save(msg.user_id, &secret).await {
        Ok(_) => {
            tracing::info!(user_id = msg.user_id, "credential stored");
            reply(ctx, msg, replies::connected(), Outcome::Connected).await
        }
        Err(err) => {
            tracing::error!(error = ?err, "credential save failed");
            reply(ctx, msg, replies::store_error(), Outcome::StoreFailed).await
        }
    }
}

async fn reply(
    ctx: &BotContext,
    msg: &IncomingMessage,
    reply: Reply,
    outcome: Outcome,
) -> Result<Outcome> {
    ctx.chat.send(msg.chat_id, &reply).await?;
    Ok(outcome)
}

async fn edit(
    ctx: &BotContext,
    status: &SentMessage,
    reply: Reply,
    outcome: Outcome,
) -> Result<Outcome> {
    ctx.chat.edit(status, &reply).await?;
    Ok(outcome)
}
