//! 面板同步服务

pub mod audit;
pub mod provisioning;

use reqwest::Client;
use std::sync::Arc;

use crate::cache::CredentialCache;
use crate::database::Panel;
use crate::panel::{InboundSelection, PanelClient};

pub use audit::{AuditAction, AuditOutcome, AuditRecord, AuditSink, TracingAuditSink};
pub use provisioning::{ProvisioningError, ProvisioningService};

/// 进程级共享的同步依赖：HTTP 连接池、凭据缓存、审计输出
#[derive(Clone)]
pub struct ProvisioningContext {
    pub http: Client,
    pub credentials: Arc<CredentialCache>,
    pub audit: Arc<dyn AuditSink>,
}

impl ProvisioningContext {
    pub fn new(http: Client, credentials: Arc<CredentialCache>, audit: Arc<dyn AuditSink>) -> Self {
        Self {
            http,
            credentials,
            audit,
        }
    }

    pub fn panel_client(
        &self,
        url: &str,
        username: &str,
        password: &str,
        inbounds: impl Into<InboundSelection>,
    ) -> PanelClient {
        PanelClient::new(
            self.http.clone(),
            self.credentials.clone(),
            url,
            username,
            password,
            inbounds,
        )
    }

    /// 使用面板特权账号的客户端，不携带入站配置
    pub fn privileged_client(&self, panel: &Panel) -> PanelClient {
        self.panel_client(
            &panel.url,
            &panel.username,
            &panel.password,
            InboundSelection::Empty,
        )
    }
}
