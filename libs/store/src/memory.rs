use async_trait::async_trait;
use dashmap::DashMap;

use crate::{CredentialStore, Result, UserCredential};

#[derive(Default)]
pub struct MemoryCredentialStore {
    by_user: DashMap<i64, UserCredential>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self {
            by_user: DashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.by_user.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_user.is_empty()
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn save(&self, user_id: i64, secret: &str) -> Result<UserCredential> {
        let record = UserCredential::new(user_id, tbx_core::normalize(secret));
        self.by_user.insert(user_id, record.clone());
        Ok(record)
    }

    async fn find(&self, user_id: i64) -> Result<Option<UserCredential>> {
        Ok(self
            .by_user
            .get(&user_id)
            .map(|entry| entry.value().clone()))
    }

    async fn delete(&self, user_id: i64) -> Result<()> {
        self.by_user.remove(&user_id);
        Ok(())
    }
}
