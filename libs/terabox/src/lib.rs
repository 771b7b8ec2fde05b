//! Client for the TeraBox endpoints that copy a share into the caller's
//! account and publish a new share link.
//!
//! Both calls authenticate with the user's cookie and are made exactly once;
//! transport faults come back as [`ShareError`] and are never retried here.

mod response;

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use reqwest::{
    Client, RequestBuilder,
    header::{COOKIE, USER_AGENT},
};
use thiserror::Error;

pub use response::{FileId, ShareResponse};

pub const DEFAULT_API_BASE: &str = "https://www.terabox.com";
const SAVE_SHARE_PATH: &str = "/api/transfer/share/save";
const CREATE_SHARE_PATH: &str = "/api/share/set";

/// Failure sentinel of the share client: no usable response was received.
#[derive(Debug, Error)]
pub enum ShareError {
    #[error("failed to build http client")]
    Client(#[source] reqwest::Error),
    #[error("terabox {operation} request failed")]
    Transport {
        operation: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("failed to encode file id list")]
    Encode(#[source] serde_json::Error),
}

pub type SharedShareApi = Arc<dyn ShareApi>;

#[async_trait]
pub trait ShareApi: Send + Sync {
    /// Copies a shared item into the account owning `secret`.
    async fn save_share(
        &self,
        secret: &str,
        share_id: &str,
        owner_id: &str,
    ) -> Result<ShareResponse, ShareError>;

    /// Publishes a password-less share link for files the account owns.
    async fn create_share(
        &self,
        secret: &str,
        file_ids: &[FileId],
    ) -> Result<ShareResponse, ShareError>;
}

#[derive(Debug, Clone)]
pub struct ShareClientConfig {
    pub api_base: String,
    pub user_agent: String,
    pub default_save_path: String,
    pub timeout: Duration,
}

impl ShareClientConfig {
    pub fn new(user_agent: impl Into<String>, default_save_path: impl Into<String>) -> Self {
        Self {
            api_base: DEFAULT_API_BASE.into(),
            user_agent: user_agent.into(),
            default_save_path: default_save_path.into(),
            timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Clone)]
pub struct HttpShareApi {
    client: Client,
    config: ShareClientConfig,
}

impl HttpShareApi {
    pub fn new(config: ShareClientConfig) -> Result<Self, ShareError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(ShareError::Client)?;
        Ok(Self { client, config })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.api_base.trim_end_matches('/'), path)
    }

    fn authed(&self, builder: RequestBuilder, secret: &str) -> RequestBuilder {
        builder
            .header(COOKIE, secret)
            .header(USER_AGENT, self.config.user_agent.as_str())
    }

    async fn exchange(
        &self,
        operation: &'static str,
        request: RequestBuilder,
    ) -> Result<ShareResponse, ShareError> {
        let transport = |source: reqwest::Error| {
            tracing::error!(operation, error = %source, "terabox request failed");
            ShareError::Transport { operation, source }
        };

        let res = request.send().await.map_err(transport)?;
        let status = res.status();
        if !status.is_success() {
            tracing::warn!(operation, %status, "terabox returned non-success status");
        }
        let body = res.text().await.map_err(transport)?;
        let response = ShareResponse::from_body(body);
        if let ShareResponse::Raw(raw) = &response {
            tracing::warn!(operation, len = raw.len(), "terabox body is not a json object");
        }
        Ok(response)
    }
}

#[async_trait]
impl ShareApi for HttpShareApi {
    async fn save_share(
        &self,
        secret: &str,
        share_id: &str,
        owner_id: &str,
    ) -> Result<ShareResponse, ShareError> {
        tracing::debug!(share_id, owner_id, "saving share into user account");
        let request = self
            .authed(self.client.get(self.url(SAVE_SHARE_PATH)), secret)
            .query(&[
                ("shareid", share_id),
                ("from_uk", owner_id),
                ("path", self.config.default_save_path.as_str()),
            ]);
        self.exchange("save_share", request).await
    }

    async fn create_share(
        &self,
        secret: &str,
        file_ids: &[FileId],
    ) -> Result<ShareResponse, ShareError> {
        let fid_list = serde_json::to_string(file_ids).map_err(ShareError::Encode)?;
        tracing::debug!(files = file_ids.len(), "creating share link");
        let request = self
            .authed(self.client.post(self.url(CREATE_SHARE_PATH)), secret)
            .form(&[("fid_list", fid_list.as_str()), ("path", "/"), ("pwd", "")]);
        self.exchange("create_share", request).await
    }
}
