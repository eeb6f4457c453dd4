use async_trait::async_trait;
use redis::{AsyncCommands, Client as RedisClient};
use std::sync::Arc;
use std::time::Duration;

use super::TokenStore;
use crate::cache::{CacheError, models::CachedCredential};

/// Redis 令牌存储，多个进程共享同一份面板令牌
#[derive(Clone)]
pub struct RedisTokenStore {
    redis: Arc<RedisClient>,
}

impl RedisTokenStore {
    pub fn new(redis: Arc<RedisClient>) -> Self {
        Self { redis }
    }
}

#[async_trait]
impl TokenStore for RedisTokenStore {
    /// 获取令牌缓存
    async fn load(&self, key: &str) -> Result<Option<CachedCredential>, CacheError> {
        let mut conn = self.redis.get_multiplexed_async_connection().await?;

        let result: Option<String> = conn.get(key).await?;

        match result {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    /// 缓存令牌，Redis 过期时间与令牌有效期一致
    async fn store(
        &self,
        key: &str,
        credential: &CachedCredential,
        ttl: Duration,
    ) -> Result<(), CacheError> {
        let mut conn = self.redis.get_multiplexed_async_connection().await?;

        let json = serde_json::to_string(credential)?;
        let mut seconds = ttl.as_secs();
        if ttl.subsec_nanos() > 0 || seconds == 0 {
            seconds += 1;
        }

        let _: () = conn.set_ex(key, json, seconds).await?;

        Ok(())
    }

    /// 删除令牌缓存
    async fn remove(&self, key: &str) -> Result<(), CacheError> {
        let mut conn = self.redis.get_multiplexed_async_connection().await?;

        let _: () = conn.del(key).await?;

        Ok(())
    }
}
