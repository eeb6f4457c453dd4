// 缓存模块
// 面板访问令牌的缓存模型、键与存储后端

pub mod credential;
pub mod keys;
pub mod models;
pub mod operations;

/// 缓存后端错误
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

// 重新导出常用类型，方便其他模块使用
pub use credential::CredentialCache;
pub use models::CachedCredential;
pub use operations::{MemoryTokenStore, RedisTokenStore, TokenStore};
