//! Minimal Telegram Bot API client: long polling, replies, edits and webhook
//! registration.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::{Value, json};
use tbx_core::{IncomingMessage, Reply};
use thiserror::Error;

const PARSE_MODE: &str = "HTML";
/// Slack added on top of the long-poll timeout before the HTTP call gives up.
const POLL_GRACE: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum TelegramError {
    #[error("telegram {method} request failed")]
    Http {
        method: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("telegram {method} failed: {description}")]
    Api {
        method: &'static str,
        description: String,
    },
    #[error("telegram {method} returned no result")]
    MissingResult { method: &'static str },
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct TelegramUpdate {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<TelegramMessage>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct TelegramMessage {
    pub message_id: i64,
    #[serde(default)]
    pub date: i64,
    #[serde(default)]
    pub text: Option<String>,
    pub chat: TelegramChat,
    #[serde(default)]
    pub from: Option<TelegramUser>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct TelegramChat {
    pub id: i64,
    #[serde(default)]
    pub r#type: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct TelegramUser {
    pub id: i64,
    #[serde(default)]
    pub username: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct TelegramResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

/// Maps an update to the router's message type. Updates without text or
/// without a sender are skipped.
pub fn incoming_from_update(update: &TelegramUpdate) -> Option<IncomingMessage> {
    let msg = update.message.as_ref()?;
    let text = msg.text.clone()?;
    let from = msg.from.as_ref()?;
    Some(IncomingMessage {
        chat_id: msg.chat.id,
        user_id: from.id,
        message_id: msg.message_id,
        text,
    })
}

/// Inline keyboard holding the reply's link button, if any.
pub fn reply_markup(reply: &Reply) -> Option<Value> {
    reply.link.as_ref().map(|link| {
        json!({
            "inline_keyboard": [[{ "text": link.label, "url": link.url }]]
        })
    })
}

#[async_trait]
pub trait TelegramApi: Send + Sync {
    async fn get_updates(
        &self,
        offset: i64,
        timeout_secs: u64,
    ) -> Result<Vec<TelegramUpdate>, TelegramError>;
    async fn send_message(
        &self,
        chat_id: i64,
        reply: &Reply,
    ) -> Result<TelegramMessage, TelegramError>;
    async fn edit_message_text(
        &self,
        chat_id: i64,
        message_id: i64,
        reply: &Reply,
    ) -> Result<(), TelegramError>;
    async fn set_webhook(&self, url: &str, secret: Option<&str>) -> Result<(), TelegramError>;
    async fn delete_webhook(&self, drop_pending: bool) -> Result<(), TelegramError>;
}

#[derive(Clone)]
pub struct HttpTelegramApi {
    client: Client,
    api_base: String,
    bot_token: String,
    timeout: Duration,
}

impl HttpTelegramApi {
    pub fn new(
        client: Client,
        api_base: impl Into<String>,
        bot_token: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            client,
            api_base: api_base.into(),
            bot_token: bot_token.into(),
            timeout,
        }
    }

    fn url(&self, method: &str) -> String {
        build_api_url(&self.api_base, &self.bot_token, method)
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &'static str,
        payload: &Value,
        timeout: Duration,
    ) -> Result<T, TelegramError> {
        let http = |source: reqwest::Error| TelegramError::Http { method, source };
        let res = self
            .client
            .post(self.url(method))
            .timeout(timeout)
            .json(payload)
            .send()
            .await
            .map_err(http)?;
        let status = res.status();
        let body: TelegramResponse<T> = res.json().await.map_err(http)?;
        if !body.ok {
            return Err(TelegramError::Api {
                method,
                description: body
                    .description
                    .unwrap_or_else(|| format!("status {status}")),
            });
        }
        body.result.ok_or(TelegramError::MissingResult { method })
    }
}

#[async_trait]
impl TelegramApi for HttpTelegramApi {
    async fn get_updates(
        &self,
        offset: i64,
        timeout_secs: u64,
    ) -> Result<Vec<TelegramUpdate>, TelegramError> {
        let payload = json!({
            "offset": offset,
            "timeout": timeout_secs,
            "allowed_updates": ["message"],
        });
        self.call(
            "getUpdates",
            &payload,
            Duration::from_secs(timeout_secs) + POLL_GRACE,
        )
        .await
    }

    async fn send_message(
        &self,
        chat_id: i64,
        reply: &Reply,
    ) -> Result<TelegramMessage, TelegramError> {
        let mut payload = json!({
            "chat_id": chat_id,
            "text": reply.text,
            "parse_mode": PARSE_MODE,
            "disable_web_page_preview": true,
        });
        attach_markup(&mut payload, reply);
        self.call("sendMessage", &payload, self.timeout).await
    }

    async fn edit_message_text(
        &self,
        chat_id: i64,
        message_id: i64,
        reply: &Reply,
    ) -> Result<(), TelegramError> {
        let mut payload = json!({
            "chat_id": chat_id,
            "message_id": message_id,
            "text": reply.text,
            "parse_mode": PARSE_MODE,
            "disable_web_page_preview": true,
        });
        attach_markup(&mut payload, reply);
        // result is the edited message, or `true` for inline messages
        let _: Value = self.call("editMessageText", &payload, self.timeout).await?;
        Ok(())
    }

    async fn set_webhook(&self, url: &str, secret: Option<&str>) -> Result<(), TelegramError> {
        let mut payload = json!({
            "url": url,
            "allowed_updates": ["message"],
        });
        if let Some(secret) = secret {
            payload["secret_token"] = Value::String(secret.to_string());
        }
        let _: Value = self.call("setWebhook", &payload, self.timeout).await?;
        Ok(())
    }

    async fn delete_webhook(&self, drop_pending: bool) -> Result<(), TelegramError> {
        let payload = json!({ "drop_pending_updates": drop_pending });
        let _: Value = self.call("deleteWebhook", &payload, self.timeout).await?;
        Ok(())
    }
}

fn attach_markup(payload: &mut Value, reply: &Reply) {
    if let (Some(obj), Some(markup)) = (payload.as_object_mut(), reply_markup(reply)) {
        obj.insert("reply_markup".into(), markup);
    }
}

fn build_api_url(api_base: &str, bot_token: &str, method: &str) -> String {
    format!(
        "{}/bot{}/{}",
        api_base.trim_end_matches('/'),
        bot_token,
        method
    )
}
