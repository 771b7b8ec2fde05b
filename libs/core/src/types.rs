use serde::{Deserialize, Serialize};

/// Normalized inbound chat message.
///
/// ```
/// use tbx_core::IncomingMessage;
///
/// let msg = IncomingMessage {
///     chat_id: 10,
///     user_id: 99,
///     message_id: 7,
///     text: "  /start  ".into(),
/// };
/// assert_eq!(msg.trimmed_text(), "/start");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomingMessage {
    pub chat_id: i64,
    pub user_id: i64,
    pub message_id: i64,
    pub text: String,
}

impl IncomingMessage {
    pub fn trimmed_text(&self) -> &str {
        self.text.trim()
    }

    /// Returns the command name when the text starts with `/`.
    ///
    /// The `@botname` suffix Telegram appends in groups is dropped and the
    /// name is lowercased.
    pub fn command(&self) -> Option<String> {
        let rest = self.trimmed_text().strip_prefix('/')?;
        let token = rest.split_whitespace().next()?;
        let name = token.split('@').next().unwrap_or(token);
        if name.is_empty() {
            return None;
        }
        Some(name.to_ascii_lowercase())
    }
}

/// Clickable button rendered under a reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkButton {
    pub label: String,
    pub url: String,
}

/// Outbound reply: HTML text plus an optional link button.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reply {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<LinkButton>,
}

impl Reply {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            link: None,
        }
    }

    pub fn with_link(mut self, label: impl Into<String>, url: impl Into<String>) -> Self {
        self.link = Some(LinkButton {
            label: label.into(),
            url: url.into(),
        });
        self
    }
}

/// Handle to a message the bot already sent, used for later edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentMessage {
    pub chat_id: i64,
    pub message_id: i64,
}
