use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use super::inbounds::{InboundSelection, InboundTags};

/// 新建客户端请求
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientSpec {
    /// 面板上的用户名
    pub email: String,
    /// 总流量（字节），为空表示不限
    #[serde(default)]
    pub total: Option<f64>,
    /// 到期时间（Unix 毫秒），为空或 0 表示不限
    #[serde(default)]
    pub expiry_time: Option<i64>,
}

/// 更新客户端请求
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientUpdateSpec {
    #[serde(default)]
    pub total: Option<f64>,
    #[serde(default)]
    pub expiry_time: Option<i64>,
    #[serde(default = "default_enable")]
    pub enable: bool,
}

fn default_enable() -> bool {
    true
}

impl ClientSpec {
    pub fn data_limit(&self) -> i64 {
        data_limit_from(self.total)
    }

    pub fn expire(&self) -> i64 {
        expire_from(self.expiry_time)
    }
}

impl ClientUpdateSpec {
    pub fn data_limit(&self) -> i64 {
        data_limit_from(self.total)
    }

    pub fn expire(&self) -> i64 {
        expire_from(self.expiry_time)
    }
}

// 0 表示不限流量
fn data_limit_from(total: Option<f64>) -> i64 {
    total.map(|t| t.trunc() as i64).unwrap_or(0)
}

// 毫秒转秒，0 表示永不过期
fn expire_from(expiry_ms: Option<i64>) -> i64 {
    match expiry_ms {
        Some(ms) if ms != 0 => ms.div_euclid(1000),
        _ => 0,
    }
}

/// 用户状态，面板新增的状态值原样保留在 `Other`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum UserStatus {
    Active,
    Disabled,
    Limited,
    Expired,
    OnHold,
    Other(String),
}

impl UserStatus {
    pub fn as_str(&self) -> &str {
        match self {
            UserStatus::Active => "active",
            UserStatus::Disabled => "disabled",
            UserStatus::Limited => "limited",
            UserStatus::Expired => "expired",
            UserStatus::OnHold => "on_hold",
            UserStatus::Other(raw) => raw,
        }
    }
}

impl From<String> for UserStatus {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "active" => UserStatus::Active,
            "disabled" => UserStatus::Disabled,
            "limited" => UserStatus::Limited,
            "expired" => UserStatus::Expired,
            "on_hold" => UserStatus::OnHold,
            _ => UserStatus::Other(raw),
        }
    }
}

impl From<UserStatus> for String {
    fn from(status: UserStatus) -> Self {
        match status {
            UserStatus::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

/// 流量重置周期，未识别的值同样原样保留
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ResetStrategy {
    #[default]
    NoReset,
    Day,
    Week,
    Month,
    Year,
    Other(String),
}

impl ResetStrategy {
    pub fn as_str(&self) -> &str {
        match self {
            ResetStrategy::NoReset => "no_reset",
            ResetStrategy::Day => "day",
            ResetStrategy::Week => "week",
            ResetStrategy::Month => "month",
            ResetStrategy::Year => "year",
            ResetStrategy::Other(raw) => raw,
        }
    }
}

impl From<String> for ResetStrategy {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "no_reset" => ResetStrategy::NoReset,
            "day" => ResetStrategy::Day,
            "week" => ResetStrategy::Week,
            "month" => ResetStrategy::Month,
            "year" => ResetStrategy::Year,
            _ => ResetStrategy::Other(raw),
        }
    }
}

impl From<ResetStrategy> for String {
    fn from(strategy: ResetStrategy) -> Self {
        match strategy {
            ResetStrategy::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NextPlan {
    #[serde(default)]
    pub data_limit: Option<i64>,
    #[serde(default)]
    pub expire: Option<i64>,
    #[serde(default)]
    pub add_remaining_traffic: bool,
    #[serde(default)]
    pub fire_on_either: bool,
}

impl NextPlan {
    /// 不启用下一阶段套餐
    pub fn disabled() -> Self {
        Self {
            data_limit: Some(0),
            expire: Some(0),
            add_remaining_traffic: false,
            fire_on_either: true,
        }
    }
}

/// 面板上的用户记录
///
/// 响应中没有的字段序列化时同样省略，未识别的字段原样保留在 `extra`。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteUser {
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<UserStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub used_traffic: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lifetime_used_traffic: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_limit: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expire: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inbounds: Option<InboundTags>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxies: Option<BTreeMap<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_limit_reset_strategy: Option<ResetStrategy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_hold_timeout: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_hold_expire_duration: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_plan: Option<NextPlan>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscription_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// `GET api/users` 可能返回 `{"users": [...]}`，也可能直接返回数组
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum UsersResponse {
    Wrapped { users: Vec<RemoteUser> },
    Bare(Vec<RemoteUser>),
}

impl UsersResponse {
    pub fn into_users(self) -> Vec<RemoteUser> {
        match self {
            UsersResponse::Wrapped { users } => users,
            UsersResponse::Bare(users) => users,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    #[serde(default)]
    pub access_token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct InboundEntry {
    pub tag: String,
}

/// 只保留每个入站的 tag
pub(crate) fn project_inbound_tags(raw: BTreeMap<String, Vec<InboundEntry>>) -> InboundTags {
    raw.into_iter()
        .map(|(protocol, entries)| {
            let tags = entries.into_iter().map(|entry| entry.tag).collect();
            (protocol, tags)
        })
        .collect()
}

/// `POST api/user` 请求体
#[derive(Debug, Clone, Serialize)]
pub struct CreateUserPayload {
    pub username: String,
    pub status: UserStatus,
    pub expire: i64,
    pub data_limit: i64,
    pub data_limit_reset_strategy: ResetStrategy,
    pub inbounds: InboundTags,
    pub proxies: BTreeMap<String, Map<String, Value>>,
    pub note: String,
    pub on_hold_expire_duration: i64,
    pub on_hold_timeout: Option<String>,
    pub next_plan: NextPlan,
}

impl CreateUserPayload {
    pub fn new(spec: &ClientSpec, inbounds: &InboundSelection) -> Self {
        // 每个已选协议对应一个空的代理配置，由面板生成凭据
        let proxies = inbounds
            .protocols()
            .map(|protocol| (protocol.to_string(), Map::new()))
            .collect();

        Self {
            username: spec.email.clone(),
            status: UserStatus::Active,
            expire: spec.expire(),
            data_limit: spec.data_limit(),
            data_limit_reset_strategy: ResetStrategy::NoReset,
            inbounds: inbounds.to_tags(),
            proxies,
            note: String::new(),
            on_hold_expire_duration: 0,
            on_hold_timeout: None,
            next_plan: NextPlan::disabled(),
        }
    }
}

/// `PUT api/user/{username}` 请求体
///
/// 更新不会改动入站分配，`inbounds` 和 `proxies` 始终为空。
#[derive(Debug, Clone, Serialize)]
pub struct UpdateUserPayload {
    pub status: UserStatus,
    pub data_limit: i64,
    pub expire: i64,
    pub data_limit_reset_strategy: ResetStrategy,
    pub proxies: BTreeMap<String, Map<String, Value>>,
    pub inbounds: InboundTags,
    pub note: String,
}

impl UpdateUserPayload {
    pub fn new(spec: &ClientUpdateSpec) -> Self {
        Self {
            status: if spec.enable {
                UserStatus::Active
            } else {
                UserStatus::Disabled
            },
            data_limit: spec.data_limit(),
            expire: spec.expire(),
            data_limit_reset_strategy: ResetStrategy::NoReset,
            proxies: BTreeMap::new(),
            inbounds: InboundTags::new(),
            note: String::new(),
        }
    }
}
