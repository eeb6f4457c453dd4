#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use walpanel_backend::{
    cache::CredentialCache,
    database::{Admin, Directory, DirectoryError, Panel},
    panel::InboundSelection,
    services::{AuditRecord, AuditSink, ProvisioningContext},
};
use wiremock::{
    Mock, MockServer, Request, ResponseTemplate,
    matchers::{body_string_contains, method, path},
};

pub const PANEL_ROOT: &str = "root";
pub const PANEL_ROOT_PASSWORD: &str = "root-pass";

#[derive(Default)]
pub struct RecordingAuditSink {
    records: Mutex<Vec<AuditRecord>>,
}

impl RecordingAuditSink {
    pub fn records(&self) -> Vec<AuditRecord> {
        self.records.lock().unwrap().clone()
    }

    pub fn last(&self) -> AuditRecord {
        self.records().last().cloned().expect("no audit record")
    }
}

impl AuditSink for RecordingAuditSink {
    fn record(&self, record: &AuditRecord) {
        self.records.lock().unwrap().push(record.clone());
    }
}

#[derive(Default)]
pub struct StaticDirectory {
    admins: HashMap<String, Admin>,
    panels: HashMap<String, Panel>,
}

impl StaticDirectory {
    pub fn with_admin(mut self, admin: Admin) -> Self {
        self.admins.insert(admin.username.clone(), admin);
        self
    }

    pub fn with_panel(mut self, panel: Panel) -> Self {
        self.panels.insert(panel.name.clone(), panel);
        self
    }
}

#[async_trait]
impl Directory for StaticDirectory {
    async fn admin_by_username(&self, username: &str) -> Result<Option<Admin>, DirectoryError> {
        Ok(self.admins.get(username).cloned())
    }

    async fn panel_by_name(&self, name: &str) -> Result<Option<Panel>, DirectoryError> {
        Ok(self.panels.get(name).cloned())
    }
}

pub fn admin(username: &str, inbounds: &str) -> Admin {
    Admin {
        username: username.to_string(),
        panel: "main".to_string(),
        panel_password: format!("{username}-pass"),
        inbounds: InboundSelection::from(inbounds),
        traffic: None,
    }
}

pub fn panel(url: &str) -> Panel {
    Panel {
        name: "main".to_string(),
        url: url.to_string(),
        username: PANEL_ROOT.to_string(),
        password: PANEL_ROOT_PASSWORD.to_string(),
    }
}

pub fn credentials(ttl: Duration) -> Arc<CredentialCache> {
    Arc::new(CredentialCache::in_memory(ttl))
}

pub fn context(audit: Arc<RecordingAuditSink>) -> ProvisioningContext {
    ProvisioningContext::new(
        reqwest::Client::new(),
        credentials(Duration::from_secs(300)),
        audit,
    )
}

/// 登录接口：按用户名返回固定令牌
pub async fn mount_token(server: &MockServer, username: &str, token: &str) {
    Mock::given(method("POST"))
        .and(path("/api/admin/token"))
        .and(body_string_contains(format!("username={username}&")))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"access_token": token, "token_type": "bearer"})),
        )
        .mount(server)
        .await;
}

pub async fn mount_status(server: &MockServer, http_method: &str, route: &str, status: u16) {
    Mock::given(method(http_method))
        .and(path(route))
        .respond_with(ResponseTemplate::new(status).set_body_json(json!({})))
        .mount(server)
        .await;
}

pub async fn mount_json(server: &MockServer, http_method: &str, route: &str, body: Value) {
    Mock::given(method(http_method))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

pub async fn requests_to(server: &MockServer, http_method: &str, route: &str) -> Vec<Request> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .into_iter()
        .filter(|r| r.method.as_str() == http_method && r.url.path() == route)
        .collect()
}

pub async fn token_requests(server: &MockServer, username: &str) -> usize {
    let needle = format!("username={username}&");
    requests_to(server, "POST", "/api/admin/token")
        .await
        .iter()
        .filter(|r| String::from_utf8_lossy(&r.body).contains(&needle))
        .count()
}

pub fn json_body(request: &Request) -> Value {
    serde_json::from_slice(&request.body).expect("request body is not JSON")
}

pub fn bearer(request: &Request) -> Option<String> {
    request
        .headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

/// 一个没有任何服务监听的地址，连接会被拒绝
pub fn refused_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}
