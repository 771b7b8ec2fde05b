use anyhow::Result;
use async_trait::async_trait;
use tbx_core::{IncomingMessage, replies};

use crate::router::{BotContext, CommandHandler};

pub struct StartHandler;

#[async_trait]
impl CommandHandler for StartHandler {
    async fn handle(&self, ctx: &BotContext, msg: &IncomingMessage) -> Result<()> {
        ctx.chat.send(msg.chat_id, &replies::welcome()).await?;
        Ok(())
    }
}

pub struct HelpHandler;

#[async_trait]
impl CommandHandler for HelpHandler {
    async fn handle(&self, ctx: &BotContext, msg: &IncomingMessage) -> Result<()> {
        ctx.chat.send(msg.chat_id, &replies::help()).await?;
        Ok(())
    }
}

pub struct LoginHandler;

#[async_trait]
impl CommandHandler for LoginHandler {
    async fn handle(&self, ctx: &BotContext, msg: &IncomingMessage) -> Result<()> {
        ctx.chat.send(msg.chat_id, &replies::login_prompt()).await?;
        Ok(())
    }
}

pub struct LogoutHandler;

#[async_trait]
impl CommandHandler for LogoutHandler {
    async fn handle(&self, ctx: &BotContext, msg: &IncomingMessage) -> Result<()> {
        let reply = match ctx.store.delete(msg.user_id).await {
            Ok(()) => {
                tracing::info!(user_id = msg.user_id, "credential removed");
                replies::logged_out()
            }
            Err(err) => {
                tracing::error!(error = ?err, user_id = msg.user_id, "credential delete failed");
                replies::store_error()
            }
        };
        ctx.chat.send(msg.chat_id, &reply).await?;
        Ok(())
    }
}
