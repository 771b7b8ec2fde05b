//! In-memory fakes for the chat transport, share API and store.

use std::{
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, AtomicI64, Ordering},
    },
    time::Duration,
};

use anyhow::{Result, anyhow, bail};
use async_trait::async_trait;
use serde_json::Value;
use tbx_core::{IncomingMessage, Reply, SentMessage};
use tbx_store::{
    CredentialStore, SharedCredentialStore, StoreError, UserCredential, shared_memory_store,
};
use tbx_terabox::{FileId, ShareApi, ShareError, ShareResponse};

use crate::router::{BotContext, CommandRouter, default_router};

pub fn message(user_id: i64, text: &str) -> IncomingMessage {
    IncomingMessage {
        chat_id: user_id,
        user_id,
        message_id: 1,
        text: text.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChatEvent {
    Sent { message: SentMessage, reply: Reply },
    Edited { message: SentMessage, reply: Reply },
}

#[derive(Default)]
pub struct RecordingChat {
    events: Mutex<Vec<ChatEvent>>,
    next_id: AtomicI64,
    fail: AtomicBool,
    reject_link_edits: AtomicBool,
    delay: Mutex<Option<Duration>>,
}

impl RecordingChat {
    pub fn fail_sends(&self) {
        self.fail.store(true, Ordering::SeqCst);
    }

    /// Edits carrying a link button fail, like Telegram's BUTTON_URL_INVALID.
    pub fn reject_link_edits(&self) {
        self.reject_link_edits.store(true, Ordering::SeqCst);
    }

    /// Every send waits this long before it is recorded.
    pub fn slow_sends(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }

    pub fn events(&self) -> Vec<ChatEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn sent_texts(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                ChatEvent::Sent { reply, .. } => Some(reply.text),
                ChatEvent::Edited { .. } => None,
            })
            .collect()
    }

    pub fn edited_texts(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                ChatEvent::Edited { reply, .. } => Some(reply.text),
                ChatEvent::Sent { .. } => None,
            })
            .collect()
    }

    pub fn first_sent(&self) -> Option<SentMessage> {
        self.events().into_iter().find_map(|event| match event {
            ChatEvent::Sent { message, .. } => Some(message),
            ChatEvent::Edited { .. } => None,
        })
    }
}

#[async_trait]
impl crate::transport::ChatTransport for RecordingChat {
    async fn send(&self, chat_id: i64, reply: &Reply) -> Result<SentMessage> {
        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail.load(Ordering::SeqCst) {
            bail!("chat transport offline");
        }
        let message = SentMessage {
            chat_id,
            message_id: self.next_id.fetch_add(1, Ordering::SeqCst) + 100,
        };
        self.events.lock().unwrap().push(ChatEvent::Sent {
            message,
            reply: reply.clone(),
        });
        Ok(message)
    }

    async fn edit(&self, message: &SentMessage, reply: &Reply) -> Result<()> {
        if self.fail.load(Ordering::SeqCst) {
            bail!("chat transport offline");
        }
        if reply.link.is_some() && self.reject_link_edits.load(Ordering::SeqCst) {
            bail!("Bad Request: BUTTON_URL_INVALID");
        }
        self.events.lock().unwrap().push(ChatEvent::Edited {
            message: *message,
            reply: reply.clone(),
        });
        Ok(())
    }
}

#[derive(Default)]
pub struct ScriptedShares {
    save: Mutex<Option<ShareResponse>>,
    create: Mutex<Option<ShareResponse>>,
    fail_save: AtomicBool,
    fail_create: AtomicBool,
    calls: Mutex<Vec<String>>,
    create_ids: Mutex<Option<Vec<FileId>>>,
}

fn structured(value: Value) -> ShareResponse {
    match value {
        Value::Object(map) => ShareResponse::Structured(map),
        other => ShareResponse::Raw(other.to_string()),
    }
}

fn transport_error(operation: &'static str) -> ShareError {
    let source = reqwest::Client::new()
        .get("not a url")
        .build()
        .expect_err("invalid url must not build");
    ShareError::Transport { operation, source }
}

impl ScriptedShares {
    pub fn respond_save(&self, body: Value) {
        *self.save.lock().unwrap() = Some(structured(body));
    }

    pub fn respond_save_raw(&self, body: &str) {
        *self.save.lock().unwrap() = Some(ShareResponse::Raw(body.to_string()));
    }

    pub fn respond_create(&self, body: Value) {
        *self.create.lock().unwrap() = Some(structured(body));
    }

    pub fn fail_save(&self) {
        self.fail_save.store(true, Ordering::SeqCst);
    }

    pub fn fail_create(&self) {
        self.fail_create.store(true, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn create_ids(&self) -> Option<Vec<FileId>> {
        self.create_ids.lock().unwrap().clone()
    }
}

#[async_trait]
impl ShareApi for ScriptedShares {
    async fn save_share(
        &self,
        secret: &str,
        share_id: &str,
        owner_id: &str,
    ) -> Result<ShareResponse, ShareError> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("save:{secret}:{share_id}:{owner_id}"));
        if self.fail_save.load(Ordering::SeqCst) {
            return Err(transport_error("save_share"));
        }
        Ok(self
            .save
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_else(|| structured(Value::Object(Default::default()))))
    }

    async fn create_share(
        &self,
        secret: &str,
        file_ids: &[FileId],
    ) -> Result<ShareResponse, ShareError> {
        let ids = serde_json::to_string(file_ids).unwrap();
        self.calls
            .lock()
            .unwrap()
            .push(format!("create:{secret}:{ids}"));
        *self.create_ids.lock().unwrap() = Some(file_ids.to_vec());
        if self.fail_create.load(Ordering::SeqCst) {
            return Err(transport_error("create_share"));
        }
        Ok(self
            .create
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_else(|| structured(Value::Object(Default::default()))))
    }
}

pub struct FailingStore;

#[async_trait]
impl CredentialStore for FailingStore {
    async fn save(&self, _user_id: i64, _secret: &str) -> tbx_store::Result<UserCredential> {
        Err(StoreError::Internal(anyhow!("store offline")))
    }

    async fn find(&self, _user_id: i64) -> tbx_store::Result<Option<UserCredential>> {
        Err(StoreError::Internal(anyhow!("store offline")))
    }

    async fn delete(&self, _user_id: i64) -> tbx_store::Result<()> {
        Err(StoreError::Internal(anyhow!("store offline")))
    }
}

pub struct Harness {
    pub store: SharedCredentialStore,
    pub shares: Arc<ScriptedShares>,
    pub chat: Arc<RecordingChat>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_store(shared_memory_store())
    }

    pub fn with_failing_store() -> Self {
        Self::with_store(Arc::new(FailingStore))
    }

    fn with_store(store: SharedCredentialStore) -> Self {
        Self {
            store,
            shares: Arc::new(ScriptedShares::default()),
            chat: Arc::new(RecordingChat::default()),
        }
    }

    pub fn ctx(&self) -> BotContext {
        BotContext {
            store: self.store.clone(),
            shares: self.shares.clone(),
            chat: self.chat.clone(),
        }
    }

    pub fn router(&self) -> CommandRouter {
        default_router(self.ctx())
    }
}
