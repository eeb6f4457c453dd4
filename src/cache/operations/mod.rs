/// 缓存操作
/// 令牌存储后端：进程内存储与 Redis 存储

pub mod memory;
pub mod token;

use async_trait::async_trait;
use std::time::Duration;

use crate::cache::{CacheError, models::CachedCredential};

pub use memory::MemoryTokenStore;
pub use token::RedisTokenStore;

/// 令牌存储后端
///
/// 只负责按键读写，新鲜度由 [`crate::cache::CredentialCache`] 判断。
#[async_trait]
pub trait TokenStore: Send + Sync {
    async fn load(&self, key: &str) -> Result<Option<CachedCredential>, CacheError>;

    async fn store(
        &self,
        key: &str,
        credential: &CachedCredential,
        ttl: Duration,
    ) -> Result<(), CacheError>;

    async fn remove(&self, key: &str) -> Result<(), CacheError>;
}
