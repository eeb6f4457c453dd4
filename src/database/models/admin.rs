use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::panel::InboundSelection;

/// 管理员数据库实体
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AdminEntity {
    pub username: String,
    /// 所属面板名称
    pub panel: String,
    pub marzban_password: Option<String>,
    /// JSON 字符串，协议 → 入站标签列表
    pub marzban_inbounds: Option<String>,
    pub traffic: Option<i64>,
}

/// 管理员
#[derive(Debug, Clone, PartialEq)]
pub struct Admin {
    pub username: String,
    pub panel: String,
    pub panel_password: String,
    pub inbounds: InboundSelection,
    /// 流量配额（字节）
    pub traffic: Option<i64>,
}

impl From<AdminEntity> for Admin {
    fn from(entity: AdminEntity) -> Self {
        let inbounds = InboundSelection::from(entity.marzban_inbounds.as_deref());
        if inbounds.is_empty() && entity.marzban_inbounds.is_some() {
            tracing::debug!(admin = %entity.username, "Admin has no usable inbound selection");
        }

        Self {
            username: entity.username,
            panel: entity.panel,
            panel_password: entity.marzban_password.unwrap_or_default(),
            inbounds,
            traffic: entity.traffic,
        }
    }
}
