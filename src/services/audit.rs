use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditAction {
    ListUsers,
    ReadUser,
    LookupUser,
    AddUser,
    UpdateUser,
    DeleteUser,
    ResetUsage,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::ListUsers => "list_users",
            AuditAction::ReadUser => "read_user",
            AuditAction::LookupUser => "lookup_user",
            AuditAction::AddUser => "add_user",
            AuditAction::UpdateUser => "update_user",
            AuditAction::DeleteUser => "delete_user",
            AuditAction::ResetUsage => "reset_usage",
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AuditOutcome {
    Succeeded,
    /// 查询的用户在面板上不存在
    NotFound,
    /// 面板返回了非 200 状态码
    Rejected(StatusCode),
    /// 网络、登录或解析失败
    Failed(String),
}

impl AuditOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, AuditOutcome::Succeeded)
    }

    fn label(&self) -> &'static str {
        match self {
            AuditOutcome::Succeeded => "succeeded",
            AuditOutcome::NotFound => "not_found",
            AuditOutcome::Rejected(_) => "rejected",
            AuditOutcome::Failed(_) => "failed",
        }
    }
}

/// 审计记录，按管理员和目标客户端归档
#[derive(Debug, Clone)]
pub struct AuditRecord {
    pub id: Uuid,
    pub recorded_at: DateTime<Utc>,
    pub admin: String,
    pub target: Option<String>,
    pub action: AuditAction,
    pub outcome: AuditOutcome,
}

impl AuditRecord {
    pub fn new(
        admin: &str,
        target: Option<&str>,
        action: AuditAction,
        outcome: AuditOutcome,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            recorded_at: Utc::now(),
            admin: admin.to_string(),
            target: target.map(str::to_string),
            action,
            outcome,
        }
    }
}

pub trait AuditSink: Send + Sync {
    fn record(&self, record: &AuditRecord);
}

/// 写入 `audit` 日志目标
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn record(&self, record: &AuditRecord) {
        let detail = match &record.outcome {
            AuditOutcome::Rejected(status) => status.as_u16().to_string(),
            AuditOutcome::Failed(error) => error.clone(),
            AuditOutcome::Succeeded | AuditOutcome::NotFound => String::new(),
        };

        tracing::info!(
            target: "audit",
            id = %record.id,
            admin = %record.admin,
            client = record.target.as_deref().unwrap_or("-"),
            action = %record.action,
            outcome = record.outcome.label(),
            detail = %detail,
            "panel operation"
        );
    }
}
