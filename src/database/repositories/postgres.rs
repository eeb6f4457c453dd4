use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;

use super::{Directory, DirectoryError};
use crate::database::models::{Admin, AdminEntity, Panel, PanelEntity};

/// 基于 Postgres 的管理员/面板查询
#[derive(Clone)]
pub struct PgDirectory {
    db: Arc<PgPool>,
}

impl PgDirectory {
    pub fn new(db: Arc<PgPool>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl Directory for PgDirectory {
    /// 按用户名查询管理员
    async fn admin_by_username(&self, username: &str) -> Result<Option<Admin>, DirectoryError> {
        let admin = sqlx::query_as::<_, AdminEntity>(
            r#"
            SELECT username, panel, marzban_password, marzban_inbounds, traffic
            FROM admins
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&*self.db)
        .await?;

        Ok(admin.map(Admin::from))
    }

    /// 按名称查询面板
    async fn panel_by_name(&self, name: &str) -> Result<Option<Panel>, DirectoryError> {
        let panel = sqlx::query_as::<_, PanelEntity>(
            r#"
            SELECT name, url, username, password
            FROM panels
            WHERE name = $1
            "#,
        )
        .bind(name)
        .fetch_optional(&*self.db)
        .await?;

        Ok(panel)
    }
}
