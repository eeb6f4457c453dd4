use serde::{Deserialize, Serialize};

/// 面板连接测试，提交尚未保存的面板信息
#[derive(Debug, Deserialize)]
pub struct TestPanelRequest {
    pub url: String,
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TestPanelResponse {
    pub connected: bool,
}
