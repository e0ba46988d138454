use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;

use insighthub_backend::api::{
    create_tokens_router, handle_not_found, health_check, TokensApiState,
};
use insighthub_backend::config::AppConfig;
use insighthub_backend::database::{self, MigrationRunner, TokenRepository};
use insighthub_backend::token_sync::{
    ExplorerClient, TokenPageSource, TokenRefreshScheduler, TokenSyncService,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let config = AppConfig::from_env()?;
    info!(
        "Initializing InsightHub backend (network {}, environment {})",
        config.network, config.environment
    );

    let pool = database::create_pool(&config.database_url).await?;
    MigrationRunner::new(pool.clone()).run_migrations().await?;
    info!("✅ Database ready");

    let repository = Arc::new(TokenRepository::new(pool));
    let explorer: Arc<dyn TokenPageSource> =
        Arc::new(ExplorerClient::new(&config.explorer_base_url));
    let sync_service = Arc::new(TokenSyncService::new(
        explorer,
        Arc::clone(&repository),
        &config.network,
        config.sync.clone(),
    ));

    let scheduler =
        TokenRefreshScheduler::new(Arc::clone(&sync_service), config.sync.refresh_interval);
    scheduler.start().await;
    info!("✅ Token refresh scheduler started");

    let state = TokensApiState {
        repository,
        sync_service,
        network: config.network.clone(),
        cache_miss_timeout: config.sync.cache_miss_timeout,
        expose_errors: config.is_development(),
    };

    let app = Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", create_tokens_router())
        .with_state(state)
        .fallback(handle_not_found)
        .layer(CorsLayer::permissive());

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("🚀 Starting server on {}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}
