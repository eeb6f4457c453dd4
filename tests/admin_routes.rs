mod common;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use common::*;
use jsonwebtoken::{EncodingKey, Header, encode};
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;
use walpanel_backend::{
    AppState,
    config::Config,
    routes::build_router,
    utils::{Claims, Role},
};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{header as header_is, method, path},
};

const SECRET: &str = "test-secret";

fn config(api_base_uri: &str) -> Config {
    Config {
        database_url: "postgres://unused".to_string(),
        redis_url: None,
        jwt_secret: SECRET.to_string(),
        server_host: "127.0.0.1".to_string(),
        server_port: 0,
        api_base_uri: api_base_uri.to_string(),
        panel_token_ttl_secs: 300,
        panel_request_timeout_secs: None,
    }
}

fn app(panel_url: &str, api_base_uri: &str) -> (Router, Arc<RecordingAuditSink>) {
    let audit = Arc::new(RecordingAuditSink::default());
    let directory = StaticDirectory::default()
        .with_admin(admin("alice", r#"{"vmess":["VMESS_TCP"]}"#))
        .with_panel(panel(panel_url));

    let state = AppState {
        config: config(api_base_uri),
        directory: Arc::new(directory),
        provisioning: context(audit.clone()),
    };
    (build_router(state), audit)
}

fn token(sub: &str, role: Role) -> String {
    let claims = Claims {
        sub: sub.to_string(),
        role,
        panel: Some("main".to_string()),
        exp: chrono::Utc::now().timestamp() + 3600,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .unwrap()
}

fn request(method: &str, uri: &str, bearer: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = bearer {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

#[tokio::test]
async fn missing_token_is_unauthorized() {
    let (app, _) = app("http://127.0.0.1:1", "");

    let (status, body) = send(app, request("GET", "/admin/user", None, None)).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], 1002);
}

#[tokio::test]
async fn forged_token_is_unauthorized() {
    let (app, _) = app("http://127.0.0.1:1", "");
    let forged = encode(
        &Header::default(),
        &Claims {
            sub: "alice".to_string(),
            role: Role::Admin,
            panel: None,
            exp: chrono::Utc::now().timestamp() + 3600,
        },
        &EncodingKey::from_secret(b"another-secret"),
    )
    .unwrap();

    let (status, _) = send(app, request("GET", "/admin/user", Some(&forged), None)).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn roles_are_enforced() {
    let (app, _) = app("http://127.0.0.1:1", "");
    let superadmin = token("root", Role::Superadmin);
    let admin = token("alice", Role::Admin);

    let (status, _) = send(
        app.clone(),
        request("GET", "/admin/user", Some(&superadmin), None),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(
        app,
        request(
            "POST",
            "/superadmin/panel/test",
            Some(&admin),
            Some(json!({"url": "http://x", "username": "a", "password": "b"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], 1003);
}

#[tokio::test]
async fn unknown_admin_is_not_found() {
    let (app, _) = app("http://127.0.0.1:1", "");

    let (status, _) = send(
        app,
        request("GET", "/admin/user", Some(&token("mallory", Role::Admin)), None),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn lists_users_of_admin() {
    let server = MockServer::start().await;
    mount_token(&server, "alice", "tok-a").await;
    mount_json(
        &server,
        "GET",
        "/api/users",
        json!([{"username": "u1", "status": "active"}]),
    )
    .await;
    let (app, _) = app(&server.uri(), "");

    let (status, body) = send(
        app,
        request("GET", "/admin/user", Some(&token("alice", Role::Admin)), None),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["code"], 0);
    assert_eq!(body["resp_data"]["total"], 1);
    assert_eq!(body["resp_data"]["users"][0]["username"], "u1");
}

#[tokio::test]
async fn unreachable_panel_is_service_unavailable() {
    let (app, _) = app(&refused_url(), "");

    let (status, body) = send(
        app,
        request("GET", "/admin/user", Some(&token("alice", Role::Admin)), None),
    )
    .await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["code"], 2000);
}

#[tokio::test]
async fn admin_reads_own_user() {
    let server = MockServer::start().await;
    mount_token(&server, "alice", "tok-a").await;
    mount_json(
        &server,
        "GET",
        "/api/user/u1",
        json!({"username": "u1", "status": "active", "subscription_url": "/sub/u1"}),
    )
    .await;
    let (app, _) = app(&server.uri(), "");

    let (status, body) = send(
        app,
        request("GET", "/admin/user/u1", Some(&token("alice", Role::Admin)), None),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["resp_data"]["subscription_url"], "/sub/u1");
    assert!(body["resp_data"].get("data_limit").is_none());
}

#[tokio::test]
async fn admin_cannot_read_other_tenants_user() {
    let server = MockServer::start().await;
    mount_token(&server, "alice", "tok-a").await;
    mount_token(&server, PANEL_ROOT, "tok-root").await;
    Mock::given(method("GET"))
        .and(path("/api/user/bobs_user"))
        .and(header_is("authorization", "Bearer tok-a"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({"detail": "forbidden"})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/user/bobs_user"))
        .and(header_is("authorization", "Bearer tok-root"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "username": "bobs_user",
            "subscription_url": "https://secret/sub/BOB",
            "admin": {"username": "bob"}
        })))
        .mount(&server)
        .await;
    let (app, _) = app(&server.uri(), "");

    let (status, body) = send(
        app,
        request(
            "GET",
            "/admin/user/bobs_user",
            Some(&token("alice", Role::Admin)),
            None,
        ),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.get("resp_data").is_none());
    assert!(!body.to_string().contains("secret"));
    assert_eq!(token_requests(&server, PANEL_ROOT).await, 0);
}

#[tokio::test]
async fn admin_inbounds_are_own_selection() {
    let server = MockServer::start().await;
    let (app, _) = app(&server.uri(), "");

    let (status, body) = send(
        app,
        request("GET", "/admin/inbounds", Some(&token("alice", Role::Admin)), None),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["resp_data"], json!({"vmess": ["VMESS_TCP"]}));
    assert!(server.received_requests().await.unwrap_or_default().is_empty());
}

#[tokio::test]
async fn add_user_creates_client() {
    let server = MockServer::start().await;
    mount_token(&server, "alice", "tok-a").await;
    mount_token(&server, PANEL_ROOT, "tok-root").await;
    mount_status(&server, "GET", "/api/user/u1", 404).await;
    mount_status(&server, "POST", "/api/user", 200).await;
    let (app, audit) = app(&server.uri(), "");

    let (status, body) = send(
        app,
        request(
            "POST",
            "/admin/user",
            Some(&token("alice", Role::Admin)),
            Some(json!({"email": "u1", "total": 1000, "expiry_time": 1_700_000_000_000i64})),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["resp_data"]["username"], "u1");

    let sent = requests_to(&server, "POST", "/api/user").await;
    assert_eq!(json_body(&sent[0])["expire"], 1_700_000_000);
    assert!(audit.last().outcome.is_success());
}

#[tokio::test]
async fn add_existing_user_conflicts() {
    let server = MockServer::start().await;
    mount_token(&server, PANEL_ROOT, "tok-root").await;
    mount_json(&server, "GET", "/api/user/u1", json!({"username": "u1"})).await;
    let (app, _) = app(&server.uri(), "");

    let (status, body) = send(
        app,
        request(
            "POST",
            "/admin/user",
            Some(&token("alice", Role::Admin)),
            Some(json!({"email": "u1"})),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], 1001);
    assert!(requests_to(&server, "POST", "/api/user").await.is_empty());
}

#[tokio::test]
async fn invalid_username_is_rejected_before_panel_call() {
    let server = MockServer::start().await;
    let (app, _) = app(&server.uri(), "");

    let (status, _) = send(
        app,
        request(
            "POST",
            "/admin/user",
            Some(&token("alice", Role::Admin)),
            Some(json!({"email": "bad name"})),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(server.received_requests().await.unwrap_or_default().is_empty());
}

#[tokio::test]
async fn rejected_update_is_bad_gateway() {
    let server = MockServer::start().await;
    mount_token(&server, "alice", "tok-a").await;
    mount_status(&server, "PUT", "/api/user/u1", 403).await;
    let (app, _) = app(&server.uri(), "");

    let (status, body) = send(
        app,
        request(
            "PUT",
            "/admin/user/u1",
            Some(&token("alice", Role::Admin)),
            Some(json!({"total": 10, "enable": false})),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["code"], 2001);
}

#[tokio::test]
async fn reset_and_delete_use_admin_session() {
    let server = MockServer::start().await;
    mount_token(&server, "alice", "tok-a").await;
    mount_status(&server, "POST", "/api/user/u1/reset", 200).await;
    mount_status(&server, "DELETE", "/api/user/u1", 200).await;
    let (app, _) = app(&server.uri(), "");
    let bearer = token("alice", Role::Admin);

    let (status, _) = send(
        app.clone(),
        request("PUT", "/admin/user/u1/reset", Some(&bearer), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(app, request("DELETE", "/admin/user/u1", Some(&bearer), None)).await;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(token_requests(&server, "alice").await, 1);
}

#[tokio::test]
async fn superadmin_tests_unsaved_panel() {
    let server = MockServer::start().await;
    mount_token(&server, "candidate", "tok-c").await;
    let (app, _) = app("http://127.0.0.1:1", "");
    let bearer = token("root", Role::Superadmin);

    let (status, body) = send(
        app.clone(),
        request(
            "POST",
            "/superadmin/panel/test",
            Some(&bearer),
            Some(json!({"url": server.uri(), "username": "candidate", "password": "pw"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["resp_data"]["connected"], true);

    let (status, body) = send(
        app,
        request(
            "POST",
            "/superadmin/panel/test",
            Some(&bearer),
            Some(json!({"url": refused_url(), "username": "candidate", "password": "pw"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["resp_data"]["connected"], false);
}

#[tokio::test]
async fn superadmin_reads_panel_inbounds() {
    let server = MockServer::start().await;
    mount_token(&server, PANEL_ROOT, "tok-root").await;
    mount_json(
        &server,
        "GET",
        "/api/inbounds",
        json!({"vmess": [{"tag": "VMESS_TCP", "other": 1}]}),
    )
    .await;
    let (app, _) = app(&server.uri(), "");
    let bearer = token("root", Role::Superadmin);

    let (status, body) = send(
        app.clone(),
        request("GET", "/superadmin/panel/main/inbounds", Some(&bearer), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["resp_data"], json!({"vmess": ["VMESS_TCP"]}));

    let (status, _) = send(
        app,
        request("GET", "/superadmin/panel/other/inbounds", Some(&bearer), None),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn routes_are_nested_under_base_uri() {
    let server = MockServer::start().await;
    mount_token(&server, "alice", "tok-a").await;
    mount_json(&server, "GET", "/api/users", json!({"users": []})).await;
    let (app, _) = app(&server.uri(), "/dashboard");
    let bearer = token("alice", Role::Admin);

    let (status, body) = send(
        app.clone(),
        request("GET", "/dashboard/admin/user", Some(&bearer), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["resp_data"]["total"], 0);

    let (status, _) = send(app, request("GET", "/admin/user", Some(&bearer), None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
