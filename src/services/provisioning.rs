use reqwest::StatusCode;
use std::sync::Arc;

use super::ProvisioningContext;
use super::audit::{AuditAction, AuditOutcome, AuditRecord, AuditSink};
use crate::database::{Admin, Directory, DirectoryError, Panel};
use crate::panel::{ClientSpec, ClientUpdateSpec, PanelClient, PanelError, RemoteUser};

#[derive(Debug, thiserror::Error)]
pub enum ProvisioningError {
    #[error("admin {0} not found")]
    AdminNotFound(String),

    #[error("panel {panel} of admin {admin} not found")]
    PanelNotFound { admin: String, panel: String },

    #[error(transparent)]
    Directory(#[from] DirectoryError),
}

/// 单次请求内的管理员操作编排
///
/// `scoped` 使用管理员自己的面板账号和入站配置，负责增删改与重置；
/// `privileged` 使用面板特权账号，只做跨管理员的只读查询。
pub struct ProvisioningService {
    admin: Admin,
    panel_name: String,
    scoped: PanelClient,
    privileged: PanelClient,
    audit: Arc<dyn AuditSink>,
}

impl ProvisioningService {
    pub async fn for_admin(
        ctx: &ProvisioningContext,
        directory: &dyn Directory,
        admin_username: &str,
    ) -> Result<Self, ProvisioningError> {
        let admin = directory
            .admin_by_username(admin_username)
            .await?
            .ok_or_else(|| ProvisioningError::AdminNotFound(admin_username.to_string()))?;

        let panel = directory
            .panel_by_name(&admin.panel)
            .await?
            .ok_or_else(|| ProvisioningError::PanelNotFound {
                admin: admin.username.clone(),
                panel: admin.panel.clone(),
            })?;

        Ok(Self::new(ctx, admin, &panel))
    }

    pub fn new(ctx: &ProvisioningContext, admin: Admin, panel: &Panel) -> Self {
        let scoped = ctx.panel_client(
            &panel.url,
            &admin.username,
            &admin.panel_password,
            admin.inbounds.clone(),
        );
        let privileged = ctx.privileged_client(panel);

        Self {
            admin,
            panel_name: panel.name.clone(),
            scoped,
            privileged,
            audit: ctx.audit.clone(),
        }
    }

    pub fn admin(&self) -> &Admin {
        &self.admin
    }

    pub fn panel_name(&self) -> &str {
        &self.panel_name
    }

    pub fn scoped_client(&self) -> &PanelClient {
        &self.scoped
    }

    pub fn privileged_client(&self) -> &PanelClient {
        &self.privileged
    }

    /// 管理员名下的全部用户，失败时记录日志后向上传递
    pub async fn list_all_users(&self) -> Result<Vec<RemoteUser>, PanelError> {
        match self.scoped.list_users().await {
            Ok(users) => {
                self.record(AuditAction::ListUsers, None, AuditOutcome::Succeeded);
                Ok(users)
            }
            Err(e) => {
                tracing::error!(
                    "Error retrieving users for admin {}: {}",
                    self.admin.username,
                    e
                );
                self.record(
                    AuditAction::ListUsers,
                    None,
                    AuditOutcome::Failed(e.to_string()),
                );
                Err(e)
            }
        }
    }

    /// 以管理员自己的账号读取单个用户，归属由面板校验
    pub async fn get_user(&self, username: &str) -> Result<Option<RemoteUser>, PanelError> {
        match self.scoped.get_user(username).await {
            Ok(Some(user)) => {
                self.record(AuditAction::ReadUser, Some(username), AuditOutcome::Succeeded);
                Ok(Some(user))
            }
            Ok(None) => {
                self.record(AuditAction::ReadUser, Some(username), AuditOutcome::NotFound);
                Ok(None)
            }
            Err(e) => {
                tracing::error!(
                    "Error reading user {} for admin {}: {}",
                    username,
                    self.admin.username,
                    e
                );
                self.record(
                    AuditAction::ReadUser,
                    Some(username),
                    AuditOutcome::Failed(e.to_string()),
                );
                Err(e)
            }
        }
    }

    /// 用特权账号在整个面板范围内查找用户，只用于重名检查；任何错误都按"未找到"处理
    pub async fn find_user_by_username(&self, username: &str) -> Option<RemoteUser> {
        match self.privileged.get_user(username).await {
            Ok(Some(user)) => {
                self.record(
                    AuditAction::LookupUser,
                    Some(username),
                    AuditOutcome::Succeeded,
                );
                Some(user)
            }
            Ok(None) => {
                tracing::debug!("User {} not found on panel {}", username, self.panel_name);
                self.record(AuditAction::LookupUser, Some(username), AuditOutcome::NotFound);
                None
            }
            Err(e) => {
                tracing::error!("Error retrieving user by username {}: {}", username, e);
                self.record(
                    AuditAction::LookupUser,
                    Some(username),
                    AuditOutcome::Failed(e.to_string()),
                );
                None
            }
        }
    }

    pub async fn add_user(&self, spec: &ClientSpec) -> bool {
        let result = self.scoped.create_user(spec).await;
        self.settle(AuditAction::AddUser, &spec.email, result)
    }

    pub async fn update_user(&self, username: &str, spec: &ClientUpdateSpec) -> bool {
        let result = self.scoped.update_user(username, spec).await;
        self.settle(AuditAction::UpdateUser, username, result)
    }

    pub async fn delete_user(&self, username: &str) -> bool {
        let result = self.scoped.delete_user(username).await;
        self.settle(AuditAction::DeleteUser, username, result)
    }

    pub async fn reset_usage(&self, username: &str) -> bool {
        let result = self.scoped.reset_user_usage(username).await;
        self.settle(AuditAction::ResetUsage, username, result)
    }

    // 只有 200 算成功，不重试也不回滚
    fn settle(
        &self,
        action: AuditAction,
        client: &str,
        result: Result<StatusCode, PanelError>,
    ) -> bool {
        let outcome = match result {
            Ok(StatusCode::OK) => {
                tracing::info!(
                    "Panel {} succeeded for client {} by admin {}",
                    action,
                    client,
                    self.admin.username
                );
                AuditOutcome::Succeeded
            }
            Ok(status) => {
                tracing::error!(
                    "Panel {} rejected for client {} by admin {}: {}",
                    action,
                    client,
                    self.admin.username,
                    status
                );
                AuditOutcome::Rejected(status)
            }
            Err(e) => {
                tracing::error!(
                    "Error during {} for client {} by admin {}: {}",
                    action,
                    client,
                    self.admin.username,
                    e
                );
                AuditOutcome::Failed(e.to_string())
            }
        };

        let succeeded = outcome.is_success();
        self.record(action, Some(client), outcome);
        succeeded
    }

    fn record(&self, action: AuditAction, client: Option<&str>, outcome: AuditOutcome) {
        self.audit
            .record(&AuditRecord::new(&self.admin.username, client, action, outcome));
    }
}
