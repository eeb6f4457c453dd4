use axum::{
    extract::{Extension, Json, Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::{
    AppState,
    error::AppError,
    middleware::require_role,
    panel::{ClientSpec, ClientUpdateSpec, PanelError},
    services::ProvisioningService,
    utils::{Claims, Role, success_to_api_response},
};

use super::model::{ClientMutationResponse, UserListResponse, is_valid_username};

async fn provisioning_for(
    state: &AppState,
    claims: &Claims,
) -> Result<ProvisioningService, AppError> {
    require_role(claims, Role::Admin)?;
    let service =
        ProvisioningService::for_admin(&state.provisioning, state.directory.as_ref(), &claims.sub)
            .await?;
    Ok(service)
}

fn check_username(username: &str) -> Result<(), AppError> {
    if is_valid_username(username) {
        Ok(())
    } else {
        Err(AppError::Validation(
            "用户名格式无效，只允许使用字母、数字和 _ - . @".to_string(),
        ))
    }
}

fn mutation_response(
    succeeded: bool,
    username: String,
) -> Result<impl IntoResponse, AppError> {
    if succeeded {
        Ok((
            StatusCode::OK,
            success_to_api_response(ClientMutationResponse { username }),
        ))
    } else {
        Err(AppError::PanelOperationFailed)
    }
}

#[axum::debug_handler]
pub async fn list_users(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let service = provisioning_for(&state, &claims).await?;
    let users = service
        .list_all_users()
        .await
        .map_err(|_| AppError::PanelUnavailable)?;

    Ok((
        StatusCode::OK,
        success_to_api_response(UserListResponse::from(users)),
    ))
}

#[axum::debug_handler]
pub async fn get_user(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(username): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    check_username(&username)?;
    let service = provisioning_for(&state, &claims).await?;

    // 面板对不属于该管理员的用户返回 403，与不存在同样处理
    match service.get_user(&username).await {
        Ok(Some(user)) => Ok((StatusCode::OK, success_to_api_response(user))),
        Ok(None) => Err(AppError::NotFound("用户不存在".to_string())),
        Err(PanelError::UnexpectedStatus(status)) if status == StatusCode::FORBIDDEN => {
            Err(AppError::NotFound("用户不存在".to_string()))
        }
        Err(_) => Err(AppError::PanelUnavailable),
    }
}

#[axum::debug_handler]
pub async fn add_user(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(spec): Json<ClientSpec>,
) -> Result<impl IntoResponse, AppError> {
    check_username(&spec.email)?;
    let service = provisioning_for(&state, &claims).await?;

    // 用户名在整个面板内唯一，不区分所属管理员
    if service.find_user_by_username(&spec.email).await.is_some() {
        return Err(AppError::UserExists);
    }

    let added = service.add_user(&spec).await;
    mutation_response(added, spec.email)
}

#[axum::debug_handler]
pub async fn update_user(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(username): Path<String>,
    Json(spec): Json<ClientUpdateSpec>,
) -> Result<impl IntoResponse, AppError> {
    check_username(&username)?;
    let service = provisioning_for(&state, &claims).await?;

    let updated = service.update_user(&username, &spec).await;
    mutation_response(updated, username)
}

#[axum::debug_handler]
pub async fn reset_usage(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(username): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    check_username(&username)?;
    let service = provisioning_for(&state, &claims).await?;

    let reset = service.reset_usage(&username).await;
    mutation_response(reset, username)
}

#[axum::debug_handler]
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(username): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    check_username(&username)?;
    let service = provisioning_for(&state, &claims).await?;

    let deleted = service.delete_user(&username).await;
    mutation_response(deleted, username)
}

/// 当前管理员可分配的入站，不访问面板
#[axum::debug_handler]
pub async fn list_inbounds(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let service = provisioning_for(&state, &claims).await?;
    let tags = service.admin().inbounds.to_tags();

    Ok((StatusCode::OK, success_to_api_response(tags)))
}
