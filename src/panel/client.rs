use reqwest::{Client, RequestBuilder, Response, StatusCode};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::cache::CredentialCache;

use super::error::PanelError;
use super::inbounds::{InboundSelection, InboundTags};
use super::models::{
    ClientSpec, ClientUpdateSpec, CreateUserPayload, InboundEntry, RemoteUser, TokenResponse,
    UpdateUserPayload, UsersResponse, project_inbound_tags,
};

/// 单个面板、单个登录身份的 HTTP 客户端
///
/// 变更类接口只返回状态码，是否成功由调用方判断。
pub struct PanelClient {
    base_url: String,
    username: String,
    password: String,
    inbounds: InboundSelection,
    http: Client,
    credentials: Arc<CredentialCache>,
}

impl PanelClient {
    pub fn new(
        http: Client,
        credentials: Arc<CredentialCache>,
        base_url: &str,
        username: &str,
        password: &str,
        inbounds: impl Into<InboundSelection>,
    ) -> Self {
        let base_url = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{}/", base_url)
        };

        Self {
            base_url,
            username: username.to_string(),
            password: password.to_string(),
            inbounds: inbounds.into(),
            http,
            credentials,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn inbounds(&self) -> &InboundSelection {
        &self.inbounds
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn user_endpoint(&self, username: &str) -> String {
        self.endpoint(&format!("api/user/{}", username))
    }

    /// 直接向面板申请令牌，不读写缓存
    async fn request_token(&self) -> Result<String, PanelError> {
        let resp = self
            .http
            .post(self.endpoint("api/admin/token"))
            .form(&[
                ("username", self.username.as_str()),
                ("password", self.password.as_str()),
            ])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(PanelError::Authentication {
                username: self.username.clone(),
                status,
            });
        }

        let body: TokenResponse = resp.json().await?;
        match body.access_token {
            Some(token) if !token.is_empty() => Ok(token),
            _ => Err(PanelError::MissingToken(self.username.clone())),
        }
    }

    /// 确保持有有效令牌，缓存未命中或已过期时才会登录
    pub async fn ensure_authenticated(&self) -> Result<String, PanelError> {
        self.credentials
            .get_or_authenticate(&self.base_url, &self.username, || self.request_token())
            .await
    }

    /// 登录探测，绕过缓存，任何错误都返回 false
    pub async fn test_connection(&self) -> bool {
        match self.request_token().await {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!(panel = %self.base_url, username = %self.username, error = %e, "Panel connection test failed");
                false
            }
        }
    }

    pub async fn list_users(&self) -> Result<Vec<RemoteUser>, PanelError> {
        let token = self.ensure_authenticated().await?;
        let resp = self
            .http
            .get(self.endpoint("api/users"))
            .bearer_auth(&token)
            .send()
            .await?;
        let resp = self.expect_success(resp, &token).await?;

        let users = resp.json::<UsersResponse>().await?.into_users();
        tracing::debug!(panel = %self.base_url, count = users.len(), "Fetched panel users");
        Ok(users)
    }

    /// 查询单个用户，每次都重新登录；用户不存在时返回 `None`
    pub async fn get_user(&self, username: &str) -> Result<Option<RemoteUser>, PanelError> {
        let token = self.request_token().await?;
        let resp = self
            .http
            .get(self.user_endpoint(username))
            .bearer_auth(token)
            .send()
            .await?;

        match resp.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => Ok(Some(resp.json().await?)),
            status => Err(PanelError::UnexpectedStatus(status)),
        }
    }

    /// 面板的入站目录，每次都重新登录
    pub async fn list_inbound_tags(&self) -> Result<InboundTags, PanelError> {
        let token = self.request_token().await?;
        let resp = self
            .http
            .get(self.endpoint("api/inbounds"))
            .bearer_auth(token)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(PanelError::UnexpectedStatus(status));
        }

        let raw: BTreeMap<String, Vec<InboundEntry>> = resp.json().await?;
        Ok(project_inbound_tags(raw))
    }

    pub fn creation_payload(&self, spec: &ClientSpec) -> CreateUserPayload {
        CreateUserPayload::new(spec, &self.inbounds)
    }

    pub async fn create_user(&self, spec: &ClientSpec) -> Result<StatusCode, PanelError> {
        let token = self.ensure_authenticated().await?;
        let request = self
            .http
            .post(self.endpoint("api/user"))
            .json(&self.creation_payload(spec));

        self.send_mutation(request, &token).await
    }

    pub async fn update_user(
        &self,
        username: &str,
        spec: &ClientUpdateSpec,
    ) -> Result<StatusCode, PanelError> {
        let token = self.ensure_authenticated().await?;
        let request = self
            .http
            .put(self.user_endpoint(username))
            .json(&UpdateUserPayload::new(spec));

        self.send_mutation(request, &token).await
    }

    pub async fn reset_user_usage(&self, username: &str) -> Result<StatusCode, PanelError> {
        let token = self.ensure_authenticated().await?;
        let request = self
            .http
            .post(self.endpoint(&format!("api/user/{}/reset", username)));

        self.send_mutation(request, &token).await
    }

    pub async fn delete_user(&self, username: &str) -> Result<StatusCode, PanelError> {
        let token = self.ensure_authenticated().await?;
        let request = self.http.delete(self.user_endpoint(username));

        self.send_mutation(request, &token).await
    }

    async fn send_mutation(
        &self,
        request: RequestBuilder,
        token: &str,
    ) -> Result<StatusCode, PanelError> {
        let status = request.bearer_auth(token).send().await?.status();
        if status == StatusCode::UNAUTHORIZED {
            self.drop_rejected_token(token).await;
        }
        Ok(status)
    }

    async fn expect_success(&self, resp: Response, token: &str) -> Result<Response, PanelError> {
        let status = resp.status();
        if status == StatusCode::UNAUTHORIZED {
            self.drop_rejected_token(token).await;
        }
        if !status.is_success() {
            return Err(PanelError::UnexpectedStatus(status));
        }
        Ok(resp)
    }

    // 面板拒绝了缓存的令牌，下次调用重新登录；本次调用不重试
    async fn drop_rejected_token(&self, token: &str) {
        tracing::warn!(panel = %self.base_url, username = %self.username, "Panel rejected cached token");
        self.credentials
            .invalidate(&self.base_url, &self.username, token)
            .await;
    }
}
