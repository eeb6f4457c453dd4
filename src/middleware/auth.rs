use axum::{
    body::Body,
    extract::State,
    http::{Request, header},
    middleware::Next,
    response::Response,
};

use crate::{
    AppState,
    error::AppError,
    utils::{Claims, Role, verify_token},
};

/// 校验控制台令牌，并把 `Claims` 放入请求扩展
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or(AppError::Unauthorized)?;

    let claims = verify_token(token, &state.config).map_err(|e| {
        tracing::debug!("Rejected control panel token: {}", e);
        AppError::Unauthorized
    })?;

    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}

pub fn require_role(claims: &Claims, role: Role) -> Result<(), AppError> {
    if claims.role == role {
        Ok(())
    } else {
        tracing::warn!(
            "User {} with role {:?} tried to access {:?} resource",
            claims.sub,
            claims.role,
            role
        );
        Err(AppError::Forbidden)
    }
}
