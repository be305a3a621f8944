use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use recipes_api::{
    AppState,
    cache::RedisCache,
    config::Config,
    database::{self, PgRecipeStore, PgUserStore},
    routes,
};
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

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
    tracing::info!("Starting with auth mode: {}", config.auth_mode);

    // 设置数据库连接池
    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .acquire_timeout(Duration::from_secs(5))
        .connect(&config.database_url)
        .await
        .expect("Failed to connect to Postgres");
    database::apply_schema(&pool)
        .await
        .expect("Failed to apply database schema");

    // 设置 Redis 缓存
    let cache = RedisCache::open(&config.redis_url).expect("Failed to create Redis client");

    let state = AppState::new(
        config,
        Arc::new(PgUserStore::new(pool.clone())),
        Arc::new(PgRecipeStore::new(pool)),
        Arc::new(cache),
    )
    .expect("Invalid authentication configuration");

    let addr = SocketAddr::new(
        state.config.server_host.parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid server_host, falling back to dual-stack default");
            IpAddr::V6(std::net::Ipv6Addr::UNSPECIFIED)
        }),
        state.config.server_port,
    );
    let app = routes::router(state);

    tracing::info!("Server listening on {}", addr);
    axum::serve(
        tokio::net::TcpListener::bind(&addr)
            .await
            .expect("Failed to bind"),
        app,
    )
    .await
    .expect("Failed to start server");
}
