use std::{
    path::Path,
    sync::{Arc, Mutex},
};

use anyhow::anyhow;
use rusqlite::{Connection, OptionalExtension, params};
use time::{OffsetDateTime, format_description::well_known::Rfc3339};
use tokio::task::spawn_blocking;

use crate::{CredentialStore, Result, StoreError, UserCredential};

const CREATE_TABLE_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS credentials (
    user_id INTEGER PRIMARY KEY,
    secret TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
"#;

#[derive(Clone)]
pub struct SqliteCredentialStore {
    conn: Arc<Mutex<Connection>>,
}

fn internal(err: impl Into<anyhow::Error>) -> StoreError {
    StoreError::Internal(err.into())
}

impl SqliteCredentialStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path.as_ref()).map_err(internal)?;
        tracing::debug!(path = %path.as_ref().display(), "opened sqlite credential store");
        Self::init(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory().map_err(internal)?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch(CREATE_TABLE_SQL).map_err(internal)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    async fn with_conn<F, T>(&self, func: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        spawn_blocking(move || {
            let guard = conn
                .lock()
                .map_err(|_| internal(anyhow!("sqlite connection lock poisoned")))?;
            func(&guard)
        })
        .await
        .map_err(internal)?
    }
}

#[async_trait::async_trait]
impl CredentialStore for SqliteCredentialStore {
    async fn save(&self, user_id: i64, secret: &str) -> Result<UserCredential> {
        let record = UserCredential::new(user_id, tbx_core::normalize(secret));
        let secret = record.secret.clone();
        let updated_at = record.updated_at.format(&Rfc3339).map_err(internal)?;

        self.with_conn(move |conn| {
            conn.execute(
                "INSERT INTO credentials (user_id, secret, updated_at)
                 VALUES (?1, ?2, ?3)
                 ON CONFLICT(user_id) DO UPDATE SET secret=excluded.secret,
                 updated_at=excluded.updated_at",
                params![user_id, secret, updated_at],
            )
            .map_err(internal)?;
            Ok(())
        })
        .await?;
        Ok(record)
    }

    async fn find(&self, user_id: i64) -> Result<Option<UserCredential>> {
        let row = self
            .with_conn(move |conn| {
                conn.query_row(
                    "SELECT secret, updated_at FROM credentials WHERE user_id = ?1",
                    params![user_id],
                    |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)),
                )
                .optional()
                .map_err(internal)
            })
            .await?;

        let Some((secret, updated_at)) = row else {
            return Ok(None);
        };
        let updated_at = OffsetDateTime::parse(&updated_at, &Rfc3339).map_err(internal)?;
        Ok(Some(UserCredential {
            user_id,
            secret,
            updated_at,
        }))
    }

    async fn delete(&self, user_id: i64) -> Result<()> {
        self.with_conn(move |conn| {
            conn.execute(
                "DELETE FROM credentials WHERE user_id = ?1",
                params![user_id],
            )
            .map_err(internal)?;
            Ok(())
        })
        .await
    }
}
