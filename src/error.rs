use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::services::ProvisioningError;
use crate::utils::{error_codes, error_to_api_response};

#[derive(Debug)]
pub enum AppError {
    Unauthorized,
    Forbidden,
    Validation(String),
    NotFound(String),
    UserExists,
    /// 读取面板失败，调用方应稍后重试
    PanelUnavailable,
    /// 面板拒绝或未能完成变更
    PanelOperationFailed,
    InternalServerError,
}

impl From<ProvisioningError> for AppError {
    fn from(err: ProvisioningError) -> Self {
        match &err {
            ProvisioningError::AdminNotFound(_) | ProvisioningError::PanelNotFound { .. } => {
                tracing::warn!("{}", err);
                AppError::NotFound("管理员或面板配置不存在".to_string())
            }
            ProvisioningError::Directory(e) => {
                tracing::error!("Directory lookup failed: {}", e);
                AppError::InternalServerError
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, error_message) = match self {
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                error_codes::AUTH_FAILED,
                "未授权访问".to_string(),
            ),
            AppError::Forbidden => (
                StatusCode::FORBIDDEN,
                error_codes::PERMISSION_DENIED,
                "无权访问该资源".to_string(),
            ),
            AppError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, error_codes::VALIDATION_ERROR, msg)
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, error_codes::NOT_FOUND, msg),
            AppError::UserExists => (
                StatusCode::CONFLICT,
                error_codes::USER_EXISTS,
                "用户已存在".to_string(),
            ),
            AppError::PanelUnavailable => (
                StatusCode::SERVICE_UNAVAILABLE,
                error_codes::PANEL_UNAVAILABLE,
                "面板暂时不可用".to_string(),
            ),
            AppError::PanelOperationFailed => (
                StatusCode::BAD_GATEWAY,
                error_codes::PANEL_OPERATION_FAILED,
                "面板操作失败".to_string(),
            ),
            AppError::InternalServerError => (
                StatusCode::INTERNAL_SERVER_ERROR,
                error_codes::INTERNAL_ERROR,
                "内部服务器错误".to_string(),
            ),
        };

        (status, error_to_api_response::<()>(code, error_message)).into_response()
    }
}
