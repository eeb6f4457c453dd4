use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// 面板数据库实体
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PanelEntity {
    pub name: String,
    pub url: String,
    pub username: String,
    pub password: String,
}

/// 外部面板，`username`/`password` 是面板级的特权账号
pub type Panel = PanelEntity;
