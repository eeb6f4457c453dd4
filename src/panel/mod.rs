//! 外部代理管理面板（Marzban 兼容接口）的客户端

pub mod client;
pub mod error;
pub mod inbounds;
pub mod models;

pub use client::PanelClient;
pub use error::PanelError;
pub use inbounds::{InboundSelection, InboundTags};
pub use models::{
    ClientSpec, ClientUpdateSpec, CreateUserPayload, NextPlan, RemoteUser, ResetStrategy,
    UpdateUserPayload, UserStatus, UsersResponse,
};
