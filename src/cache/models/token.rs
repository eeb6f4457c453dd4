use serde::{Deserialize, Serialize};
use std::time::Duration;

/// 面板令牌缓存数据模型
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct CachedCredential {
    pub token: String,
    pub panel_url: String,
    pub username: String,
    pub issued_at: i64, // Unix 毫秒时间戳
}

impl CachedCredential {
    pub fn new(panel_url: &str, username: &str, token: &str, issued_at: i64) -> Self {
        Self {
            token: token.to_string(),
            panel_url: panel_url.to_string(),
            username: username.to_string(),
            issued_at,
        }
    }

    /// 面板地址与用户名必须完全一致
    pub fn matches(&self, panel_url: &str, username: &str) -> bool {
        self.panel_url == panel_url && self.username == username
    }

    pub fn is_fresh(&self, ttl: Duration, now_ms: i64) -> bool {
        i128::from(now_ms - self.issued_at) < ttl.as_millis() as i128
    }
}
