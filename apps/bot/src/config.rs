//! Process configuration read from the environment (optionally via `.env`).

use std::{fmt, net::SocketAddr, time::Duration};

use thiserror::Error;

pub const DEFAULT_TELEGRAM_API_BASE: &str = "https://api.telegram.org";
const DEFAULT_BIND: &str = "0.0.0.0:8080";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;
const DEFAULT_POLL_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required setting {0}")]
    Missing(&'static str),
    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookConfig {
    pub public_url: String,
    pub secret_token: Option<String>,
    pub bind: SocketAddr,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportMode {
    Polling,
    Webhook(WebhookConfig),
}

#[derive(Clone)]
pub struct BotConfig {
    pub bot_token: String,
    pub store_url: String,
    pub default_save_path: String,
    pub user_agent: String,
    pub telegram_api_base: String,
    pub terabox_api_base: String,
    pub http_timeout: Duration,
    pub poll_timeout_secs: u64,
    pub mode: TransportMode,
}

impl fmt::Debug for BotConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BotConfig")
            .field("bot_token", &"<redacted>")
            .field("store_url", &self.store_url)
            .field("default_save_path", &self.default_save_path)
            .field("user_agent", &self.user_agent)
            .field("telegram_api_base", &self.telegram_api_base)
            .field("terabox_api_base", &self.terabox_api_base)
            .field("http_timeout", &self.http_timeout)
            .field("poll_timeout_secs", &self.poll_timeout_secs)
            .field("mode", &self.mode)
            .finish()
    }
}

impl BotConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let optional = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let required = |key: &'static str| optional(key).ok_or(ConfigError::Missing(key));

        let bot_token = required("TELEGRAM_BOT_TOKEN")?;
        let store_url = required("STORE_URL")?;
        let default_save_path = required("DEFAULT_SAVE_PATH")?;
        let user_agent = required("USER_AGENT")?;

        let telegram_api_base = optional("TELEGRAM_API_BASE")
            .unwrap_or_else(|| DEFAULT_TELEGRAM_API_BASE.into());
        let terabox_api_base = optional("TERABOX_API_BASE")
            .unwrap_or_else(|| tbx_terabox::DEFAULT_API_BASE.into());
        let http_timeout = Duration::from_secs(parse_secs(
            "HTTP_TIMEOUT_SECS",
            optional("HTTP_TIMEOUT_SECS"),
            DEFAULT_HTTP_TIMEOUT_SECS,
        )?);
        let poll_timeout_secs = parse_secs(
            "POLL_TIMEOUT_SECS",
            optional("POLL_TIMEOUT_SECS"),
            DEFAULT_POLL_TIMEOUT_SECS,
        )?;

        let mode = match optional("TELEGRAM_MODE")
            .map(|v| v.trim().to_lowercase())
            .as_deref()
        {
            None | Some("polling") => TransportMode::Polling,
            Some("webhook") => {
                let public_url = required("TELEGRAM_WEBHOOK_URL")?;
                let bind_raw = optional("BIND").unwrap_or_else(|| DEFAULT_BIND.into());
                let bind = bind_raw.parse().map_err(|_| ConfigError::Invalid {
                    key: "BIND",
                    value: bind_raw.clone(),
                })?;
                TransportMode::Webhook(WebhookConfig {
                    public_url,
                    secret_token: optional("TELEGRAM_SECRET_TOKEN"),
                    bind,
                })
            }
            Some(other) => {
                return Err(ConfigError::Invalid {
                    key: "TELEGRAM_MODE",
                    value: other.to_string(),
                });
            }
        };

        Ok(Self {
            bot_token,
            store_url,
            default_save_path,
            user_agent,
            telegram_api_base,
            terabox_api_base,
            http_timeout,
            poll_timeout_secs,
            mode,
        })
    }

    pub fn share_client_config(&self) -> tbx_terabox::ShareClientConfig {
        let mut cfg =
            tbx_terabox::ShareClientConfig::new(&self.user_agent, &self.default_save_path);
        cfg.api_base = self.terabox_api_base.clone();
        cfg.timeout = self.http_timeout;
        cfg
    }
}

fn parse_secs(key: &'static str, raw: Option<String>, default: u64) -> Result<u64, ConfigError> {
    let Some(raw) = raw else {
        return Ok(default);
    };
    match raw.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(secs),
        _ => Err(ConfigError::Invalid { key, value: raw }),
    }
}
