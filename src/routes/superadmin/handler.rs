use axum::{
    extract::{Extension, Json, Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::{
    AppState,
    error::AppError,
    middleware::require_role,
    panel::InboundSelection,
    utils::{Claims, Role, success_to_api_response},
};

use super::model::{TestPanelRequest, TestPanelResponse};

#[axum::debug_handler]
pub async fn test_panel(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<TestPanelRequest>,
) -> Result<impl IntoResponse, AppError> {
    require_role(&claims, Role::Superadmin)?;

    if req.url.trim().is_empty() {
        return Err(AppError::Validation("面板地址不能为空".to_string()));
    }

    let client = state.provisioning.panel_client(
        req.url.trim(),
        &req.username,
        &req.password,
        InboundSelection::Empty,
    );
    let connected = client.test_connection().await;
    tracing::info!(
        "Panel connection test for {} by {}: {}",
        client.base_url(),
        claims.sub,
        connected
    );

    Ok((
        StatusCode::OK,
        success_to_api_response(TestPanelResponse { connected }),
    ))
}

#[axum::debug_handler]
pub async fn panel_inbounds(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    require_role(&claims, Role::Superadmin)?;

    let panel = state
        .directory
        .panel_by_name(&name)
        .await
        .map_err(|e| {
            tracing::error!("Failed to load panel {}: {}", name, e);
            AppError::InternalServerError
        })?
        .ok_or_else(|| AppError::NotFound("面板不存在".to_string()))?;

    let tags = state
        .provisioning
        .privileged_client(&panel)
        .list_inbound_tags()
        .await
        .map_err(|e| {
            tracing::error!("Failed to fetch inbounds of panel {}: {}", name, e);
            AppError::PanelUnavailable
        })?;

    Ok((StatusCode::OK, success_to_api_response(tags)))
}
