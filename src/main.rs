use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use sqlx::Executor;
use sqlx::postgres::PgPoolOptions;
#[cfg(debug_assertions)]
use tower_http::cors::CorsLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use walpanel_backend::{
    AppState,
    cache::{CredentialCache, MemoryTokenStore, RedisTokenStore, TokenStore},
    config::Config,
    database::PgDirectory,
    routes,
    services::{ProvisioningContext, TracingAuditSink},
};

#[tokio::main]
async fn main() {
    // 初始化日志
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // 加载配置
    let config = Config::from_env().expect("Failed to load configuration");

    // 设置数据库连接池
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .after_connect(|conn, _meta| {
            Box::pin(async move {
                conn.execute("SET application_name = 'walpanel_backend';")
                    .await?;
                Ok(())
            })
        })
        .connect(&config.database_url)
        .await
        .expect("Failed to connect to Postgres");

    // 面板令牌存储：配置了 Redis 时多进程共享，否则使用进程内存储
    let token_store: Arc<dyn TokenStore> = match &config.redis_url {
        Some(url) => {
            let redis_client = redis::Client::open(url.clone()).expect("Failed to create Redis client");
            tracing::info!("Panel credentials cached in Redis");
            Arc::new(RedisTokenStore::new(Arc::new(redis_client)))
        }
        None => {
            tracing::info!("Panel credentials cached in process memory");
            Arc::new(MemoryTokenStore::new())
        }
    };
    let credentials = Arc::new(CredentialCache::new(token_store, config.panel_token_ttl()));

    // 访问面板的 HTTP 客户端，所有请求共享连接池
    let mut http = reqwest::Client::builder();
    if let Some(timeout) = config.panel_request_timeout() {
        http = http.timeout(timeout);
    }
    let http = http.build().expect("Failed to build panel HTTP client");

    // 设置应用状态
    let state = AppState {
        config: config.clone(),
        directory: Arc::new(PgDirectory::new(Arc::new(pool))),
        provisioning: ProvisioningContext::new(http, credentials, Arc::new(TracingAuditSink)),
    };

    let router = routes::build_router(state.clone());

    // 根据编译模式决定是否添加CORS
    #[cfg(debug_assertions)]
    let router = {
        tracing::debug!("Adding CORS layer for development mode");
        router.layer(CorsLayer::permissive())
    };

    // 启动服务器
    let addr = SocketAddr::new(
        state.config.server_host.parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid server_host, falling back to dual-stack default");
            IpAddr::V6(std::net::Ipv6Addr::UNSPECIFIED)
        }),
        state.config.server_port,
    );
    tracing::info!("Server listening on {}{}", addr, state.config.api_base_uri);
    axum::serve(
        tokio::net::TcpListener::bind(&addr)
            .await
            .expect("Failed to bind"),
        router,
    )
    .await
    .expect("Failed to start server");
}
