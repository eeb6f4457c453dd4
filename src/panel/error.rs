use reqwest::StatusCode;

/// 面板调用错误
#[derive(Debug, thiserror::Error)]
pub enum PanelError {
    /// 网络不可达、超时或响应体无法解析
    #[error("panel request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("panel rejected credentials for {username} with status {status}")]
    Authentication { username: String, status: StatusCode },

    #[error("panel returned no access token for {0}")]
    MissingToken(String),

    #[error("panel responded with unexpected status {0}")]
    UnexpectedStatus(StatusCode),
}
