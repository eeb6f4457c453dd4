pub mod admin;
pub mod superadmin;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::{
    AppState,
    middleware::{auth_middleware, log_errors},
};

/// 构建全部路由，挂载在 `api_base_uri` 之下
pub fn build_router(state: AppState) -> Router {
    let admin_routes = Router::new()
        .route("/admin/user", get(admin::list_users).post(admin::add_user))
        .route(
            "/admin/user/{username}",
            get(admin::get_user)
                .put(admin::update_user)
                .delete(admin::delete_user),
        )
        .route("/admin/user/{username}/reset", put(admin::reset_usage))
        .route("/admin/inbounds", get(admin::list_inbounds));

    let superadmin_routes = Router::new()
        .route("/superadmin/panel/test", post(superadmin::test_panel))
        .route(
            "/superadmin/panel/{name}/inbounds",
            get(superadmin::panel_inbounds),
        );

    // 所有路由都需要控制台令牌
    let protected_routes = Router::new()
        .merge(admin_routes)
        .merge(superadmin_routes)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let router = if state.config.api_base_uri.is_empty() {
        protected_routes
    } else {
        Router::new().nest(&state.config.api_base_uri, protected_routes)
    };

    router
        .layer(axum::middleware::from_fn(log_errors))
        .with_state(state)
}
