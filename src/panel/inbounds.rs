use serde_json::Value;
use std::collections::BTreeMap;

/// 协议 → 入站标签列表
pub type InboundTags = BTreeMap<String, Vec<String>>;

/// 管理员可用的入站集合
///
/// 构造时解析一次。数据库里存的是 JSON 字符串，解析失败时降级为 `Empty`，
/// 单个管理员的错误配置不会影响客户端的创建。
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum InboundSelection {
    Structured(InboundTags),
    #[default]
    Empty,
}

impl InboundSelection {
    pub fn from_map(map: InboundTags) -> Self {
        if map.is_empty() {
            InboundSelection::Empty
        } else {
            InboundSelection::Structured(map)
        }
    }

    pub fn from_serialized(raw: &str) -> Self {
        if raw.trim().is_empty() {
            return InboundSelection::Empty;
        }

        match serde_json::from_str::<Value>(raw) {
            Ok(value) => Self::from_value(value),
            Err(e) => {
                tracing::warn!(error = %e, "Malformed inbound configuration, using empty selection");
                InboundSelection::Empty
            }
        }
    }

    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Null => InboundSelection::Empty,
            Value::String(raw) => Self::from_serialized(&raw),
            other => match serde_json::from_value::<InboundTags>(other) {
                Ok(map) => Self::from_map(map),
                Err(e) => {
                    tracing::warn!(error = %e, "Unexpected inbound configuration shape, using empty selection");
                    InboundSelection::Empty
                }
            },
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, InboundSelection::Empty)
    }

    /// 已选择的协议
    pub fn protocols(&self) -> impl Iterator<Item = &str> {
        self.as_map()
            .into_iter()
            .flat_map(|map| map.keys().map(String::as_str))
    }

    pub fn as_map(&self) -> Option<&InboundTags> {
        match self {
            InboundSelection::Structured(map) => Some(map),
            InboundSelection::Empty => None,
        }
    }

    /// 发往面板的 `inbounds` 字段
    pub fn to_tags(&self) -> InboundTags {
        self.as_map().cloned().unwrap_or_default()
    }
}

impl From<InboundTags> for InboundSelection {
    fn from(map: InboundTags) -> Self {
        Self::from_map(map)
    }
}

impl From<&str> for InboundSelection {
    fn from(raw: &str) -> Self {
        Self::from_serialized(raw)
    }
}

impl From<Option<&str>> for InboundSelection {
    fn from(raw: Option<&str>) -> Self {
        raw.map(Self::from_serialized).unwrap_or_default()
    }
}

impl From<Value> for InboundSelection {
    fn from(value: Value) -> Self {
        Self::from_value(value)
    }
}
