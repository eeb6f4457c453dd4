// 管理员与面板查询

pub mod postgres;

use async_trait::async_trait;

use crate::database::models::{Admin, Panel};

pub use postgres::PgDirectory;

#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// 同步层需要的持久化接口
#[async_trait]
pub trait Directory: Send + Sync {
    async fn admin_by_username(&self, username: &str) -> Result<Option<Admin>, DirectoryError>;

    async fn panel_by_name(&self, name: &str) -> Result<Option<Panel>, DirectoryError>;
}
