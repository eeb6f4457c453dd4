use std::env;
use std::time::Duration;

/// 面板令牌默认有效期（秒）
pub const DEFAULT_PANEL_TOKEN_TTL_SECS: u64 = 300;

#[derive(Debug, Clone, serde::Deserialize)]
pub struct Config {
    pub database_url: String,
    pub redis_url: Option<String>,
    pub jwt_secret: String,
    pub server_host: String,
    pub server_port: u16,
    /// 路由前缀，例如 `/dashboard`；为空时挂载在根路径
    pub api_base_uri: String,
    pub panel_token_ttl_secs: u64,
    pub panel_request_timeout_secs: Option<u64>,
}

impl Config {
    pub fn from_env() -> Result<Self, env::VarError> {
        dotenv::dotenv().ok();

        let panel_token_ttl = optional_var("PANEL_TOKEN_TTL")
            .map(|v| v.trim_end_matches('s').parse::<u64>())
            .transpose()
            .unwrap_or_else(|_| {
                tracing::warn!("Invalid PANEL_TOKEN_TTL, falling back to default");
                None
            })
            .unwrap_or(DEFAULT_PANEL_TOKEN_TTL_SECS);

        let panel_request_timeout = optional_var("PANEL_REQUEST_TIMEOUT")
            .and_then(|v| v.trim_end_matches('s').parse::<u64>().ok());

        Ok(Config {
            database_url: env::var("DATABASE_URL")?,
            redis_url: optional_var("REDIS_URL"),
            jwt_secret: env::var("JWT_SECRET")?,
            server_host: env::var("SERVER_HOST")?,
            server_port: env::var("SERVER_PORT")?.parse().unwrap_or(3000),
            api_base_uri: normalize_base_uri(&optional_var("URL_PATH").unwrap_or_default()),
            panel_token_ttl_secs: panel_token_ttl,
            panel_request_timeout_secs: panel_request_timeout,
        })
    }

    pub fn panel_token_ttl(&self) -> Duration {
        Duration::from_secs(self.panel_token_ttl_secs)
    }

    pub fn panel_request_timeout(&self) -> Option<Duration> {
        self.panel_request_timeout_secs.map(Duration::from_secs)
    }
}

fn optional_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// 统一为 `/xxx` 形式，根路径返回空字符串
pub fn normalize_base_uri(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{}", trimmed)
    }
}
