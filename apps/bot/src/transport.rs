use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use tbx_core::{Reply, SentMessage};

use crate::telegram_api::TelegramApi;

pub type SharedChatTransport = Arc<dyn ChatTransport>;

/// Outbound side of the chat platform as seen by the handlers.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn send(&self, chat_id: i64, reply: &Reply) -> Result<SentMessage>;
    async fn edit(&self, message: &SentMessage, reply: &Reply) -> Result<()>;
}

pub struct TelegramTransport {
    api: Arc<dyn TelegramApi>,
}

impl TelegramTransport {
    pub fn new(api: Arc<dyn TelegramApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl ChatTransport for TelegramTransport {
    async fn send(&self, chat_id: i64, reply: &Reply) -> Result<SentMessage> {
        let sent = self.api.send_message(chat_id, reply).await?;
        Ok(SentMessage {
            chat_id: sent.chat.id,
            message_id: sent.message_id,
        })
    }

    async fn edit(&self, message: &SentMessage, reply: &Reply) -> Result<()> {
        self.api
            .edit_message_text(message.chat_id, message.message_id, reply)
            .await?;
        Ok(())
    }
}
