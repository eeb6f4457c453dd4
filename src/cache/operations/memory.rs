use async_trait::async_trait;
use dashmap::DashMap;
use std::time::Duration;

use super::TokenStore;
use crate::cache::{CacheError, models::CachedCredential};

/// 进程内令牌存储
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    entries: DashMap<String, CachedCredential>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn load(&self, key: &str) -> Result<Option<CachedCredential>, CacheError> {
        Ok(self.entries.get(key).map(|entry| entry.value().clone()))
    }

    async fn store(
        &self,
        key: &str,
        credential: &CachedCredential,
        _ttl: Duration,
    ) -> Result<(), CacheError> {
        self.entries.insert(key.to_string(), credential.clone());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), CacheError> {
        self.entries.remove(key);
        Ok(())
    }
}
