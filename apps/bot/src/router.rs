//! Command dispatch: a map from command name to handler plus a fallback for
//! everything else.

use std::{collections::HashMap, sync::Arc};

use anyhow::Result;
use async_trait::async_trait;
use tbx_core::IncomingMessage;
use tbx_store::SharedCredentialStore;
use tbx_telemetry::{TelemetryLabels, start_message_span};
use tbx_terabox::SharedShareApi;
use tracing::Instrument;

use crate::conversion::ConversionHandler;
use crate::handlers::{HelpHandler, LoginHandler, LogoutHandler, StartHandler};
use crate::transport::SharedChatTransport;

/// Handles shared by every handler invocation.
#[derive(Clone)]
pub struct BotContext {
    pub store: SharedCredentialStore,
    pub shares: SharedShareApi,
    pub chat: SharedChatTransport,
}

#[async_trait]
pub trait CommandHandler: Send + Sync {
    async fn handle(&self, ctx: &BotContext, msg: &IncomingMessage) -> Result<()>;
}

pub struct CommandRouter {
    ctx: BotContext,
    commands: HashMap<String, Arc<dyn CommandHandler>>,
    fallback: Arc<dyn CommandHandler>,
}

impl CommandRouter {
    pub fn new(ctx: BotContext, fallback: Arc<dyn CommandHandler>) -> Self {
        Self {
            ctx,
            commands: HashMap::new(),
            fallback,
        }
    }

    pub fn command(mut self, name: &str, handler: Arc<dyn CommandHandler>) -> Self {
        self.commands.insert(name.to_ascii_lowercase(), handler);
        self
    }

    /// Picks the handler for a message. Unknown commands go to the fallback.
    pub fn resolve(&self, msg: &IncomingMessage) -> &Arc<dyn CommandHandler> {
        msg.command()
            .and_then(|name| self.commands.get(&name))
            .unwrap_or(&self.fallback)
    }

    /// Runs the matching handler. Failures are logged, never propagated.
    pub async fn dispatch(&self, msg: IncomingMessage) {
        let labels = TelemetryLabels::for_message(msg.chat_id, msg.user_id, msg.message_id);
        let span = start_message_span(&labels);
        async {
            let handler = self.resolve(&msg);
            if let Err(err) = handler.handle(&self.ctx, &msg).await {
                tracing::error!(error = ?err, "message handler failed");
            }
        }
        .instrument(span)
        .await
    }
}

/// Router with the bot's commands: `start`, `help`, `login`, `logout`, and
/// the conversion workflow for all other text.
pub fn default_router(ctx: BotContext) -> CommandRouter {
    CommandRouter::new(ctx, Arc::new(ConversionHandler))
        .command("start", Arc::new(StartHandler))
        .command("help", Arc::new(HelpHandler))
        .command("login", Arc::new(LoginHandler))
        .command("logout", Arc::new(LogoutHandler))
}
