//! Credential storage keyed by chat user id.
//!
//! One record per user holds the normalized cookie secret. Saving upserts the
//! whole record; there is no in-process cache, so every read goes to the
//! backend.
mod memory;
mod sqlite;

use std::{fmt, sync::Arc};

use async_trait::async_trait;
use thiserror::Error;
use time::OffsetDateTime;

pub use memory::MemoryCredentialStore;
pub use sqlite::SqliteCredentialStore;

/// Shared store handle passed to every handler.
pub type SharedCredentialStore = Arc<dyn CredentialStore>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("unsupported store url: {0}")]
    UnsupportedUrl(String),
    #[error("credential store error")]
    Internal(#[source] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// Stored credential for one user.
#[derive(Clone, PartialEq, Eq)]
pub struct UserCredential {
    pub user_id: i64,
    pub secret: String,
    pub updated_at: OffsetDateTime,
}

impl UserCredential {
    pub fn new(user_id: i64, secret: impl Into<String>) -> Self {
        Self {
            user_id,
            secret: secret.into(),
            updated_at: OffsetDateTime::now_utc(),
        }
    }
}

impl fmt::Debug for UserCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserCredential")
            .field("user_id", &self.user_id)
            .field("secret", &"<redacted>")
            .field("updated_at", &self.updated_at)
            .finish()
    }
}

#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Normalizes `secret` and replaces any existing record for the user.
    async fn save(&self, user_id: i64, secret: &str) -> Result<UserCredential>;

    async fn find(&self, user_id: i64) -> Result<Option<UserCredential>>;

    async fn get(&self, user_id: i64) -> Result<Option<String>> {
        Ok(self.find(user_id).await?.map(|record| record.secret))
    }

    /// Removes the user's record. Missing records are not an error.
    async fn delete(&self, user_id: i64) -> Result<()>;
}

/// Returns an in-memory store wrapped in an [`Arc`].
pub fn shared_memory_store() -> SharedCredentialStore {
    Arc::new(MemoryCredentialStore::new())
}

/// Builds a store from a connection string.
///
/// Accepted forms: `memory://`, `sqlite::memory:`, `sqlite://<path>` and a bare
/// path ending in `.db` or `.sqlite`.
pub fn store_from_url(url: &str) -> Result<SharedCredentialStore> {
    let url = url.trim();
    if url == "memory://" || url == "memory" {
        return Ok(shared_memory_store());
    }
    if url == "sqlite::memory:" {
        return Ok(Arc::new(SqliteCredentialStore::open_in_memory()?));
    }
    if let Some(path) = url.strip_prefix("sqlite://") {
        if path.is_empty() {
            return Err(StoreError::UnsupportedUrl(url.to_string()));
        }
        return Ok(Arc::new(SqliteCredentialStore::open(path)?));
    }
    if url.ends_with(".db") || url.ends_with(".sqlite") {
        return Ok(Arc::new(SqliteCredentialStore::open(url)?));
    }
    Err(StoreError::UnsupportedUrl(url.to_string()))
}
