use dashmap::DashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

use crate::cache::{
    keys::panel_token_key,
    models::CachedCredential,
    operations::{MemoryTokenStore, TokenStore},
};

/// 面板凭据缓存
///
/// 所有 `PanelClient` 共享同一个实例。以 (面板地址, 用户名) 为键，
/// 同一个键的 "检查 → 登录 → 写入" 在一把异步锁内完成，
/// 并发请求只会触发一次登录；不同的键互不阻塞。
pub struct CredentialCache {
    store: Arc<dyn TokenStore>,
    ttl: Duration,
    refresh_locks: DashMap<String, Arc<Mutex<()>>>,
}

impl CredentialCache {
    pub fn new(store: Arc<dyn TokenStore>, ttl: Duration) -> Self {
        Self {
            store,
            ttl,
            refresh_locks: DashMap::new(),
        }
    }

    pub fn in_memory(ttl: Duration) -> Self {
        Self::new(Arc::new(MemoryTokenStore::new()), ttl)
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// 返回仍在有效期内的令牌，不会触发登录
    pub async fn lookup(&self, panel_url: &str, username: &str) -> Option<String> {
        let key = panel_token_key(panel_url, username);
        self.fresh_entry(&key, panel_url, username)
            .await
            .map(|credential| credential.token)
    }

    /// 有可用缓存时直接返回，否则调用 `authenticate` 登录并写入缓存
    pub async fn get_or_authenticate<F, Fut, E>(
        &self,
        panel_url: &str,
        username: &str,
        authenticate: F,
    ) -> Result<String, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<String, E>>,
    {
        let key = panel_token_key(panel_url, username);
        let lock = self.refresh_lock(&key);
        let _guard = lock.lock().await;

        if let Some(credential) = self.fresh_entry(&key, panel_url, username).await {
            return Ok(credential.token);
        }

        let requested_at = chrono::Utc::now().timestamp_millis();
        let token = authenticate().await?;

        let credential = CachedCredential::new(panel_url, username, &token, requested_at);
        if let Err(e) = self.store.store(&key, &credential, self.ttl).await {
            tracing::warn!(panel = panel_url, username, error = %e, "Failed to cache panel credential");
        } else {
            tracing::debug!(panel = panel_url, username, "Cached panel credential");
        }

        Ok(token)
    }

    /// 仅当缓存中仍是 `token` 时删除，避免误删其他请求刚刷新的令牌
    pub async fn invalidate(&self, panel_url: &str, username: &str, token: &str) {
        let key = panel_token_key(panel_url, username);
        let lock = self.refresh_lock(&key);
        let _guard = lock.lock().await;

        match self.store.load(&key).await {
            Ok(Some(credential)) if credential.token == token => {
                if let Err(e) = self.store.remove(&key).await {
                    tracing::warn!(panel = panel_url, username, error = %e, "Failed to drop panel credential");
                } else {
                    tracing::info!(panel = panel_url, username, "Dropped rejected panel credential");
                }
            }
            Ok(_) => {}
            Err(e) => {
                tracing::warn!(panel = panel_url, username, error = %e, "Failed to read cached panel credential");
            }
        }
    }

    fn refresh_lock(&self, key: &str) -> Arc<Mutex<()>> {
        self.refresh_locks
            .entry(key.to_string())
            .or_default()
            .clone()
    }

    async fn fresh_entry(
        &self,
        key: &str,
        panel_url: &str,
        username: &str,
    ) -> Option<CachedCredential> {
        match self.store.load(key).await {
            Ok(Some(credential))
                if credential.matches(panel_url, username)
                    && credential.is_fresh(self.ttl, chrono::Utc::now().timestamp_millis()) =>
            {
                Some(credential)
            }
            Ok(_) => None,
            Err(e) => {
                tracing::warn!(panel = panel_url, username, error = %e, "Failed to read cached panel credential");
                None
            }
        }
    }
}
