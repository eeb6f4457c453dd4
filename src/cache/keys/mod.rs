/// 缓存键模块
use sha2::{Digest, Sha256};

/// 面板令牌缓存键前缀
const PANEL_TOKEN_PREFIX: &str = "panel:token:";

/// 生成面板令牌缓存键，由面板地址和登录用户名共同决定
pub fn panel_token_key(panel_url: &str, username: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(panel_url.as_bytes());
    hasher.update([0u8]);
    hasher.update(username.as_bytes());
    format!("{}{:x}", PANEL_TOKEN_PREFIX, hasher.finalize())
}
