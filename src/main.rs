use axum::{Router, http::header, routing::get};
use ledgerkeep::api::handlers::{AppState, api_routes};
use ledgerkeep::api::openapi::ApiDoc;
use ledgerkeep::config::CONFIG;
use ledgerkeep::core::balance::BalanceService;
use ledgerkeep::core::services::AdjustmentService;
use ledgerkeep::infrastructure::{
    cache::in_memory::InMemoryCache, logging::in_memory::InMemoryLogging, storage::in_memory::InMemoryStorage,
};
use ledgerkeep::scheduler::MonthlyBalanceScheduler;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::info;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt().with_env_filter(CONFIG.log_level.as_str()).init();
    info!("Starting with {:?}", *CONFIG);

    // Initialize storage, logging and cache
    let storage = InMemoryStorage::new();
    let logging = InMemoryLogging::new();
    let cache = InMemoryCache::new();

    let balances = Arc::new(
        BalanceService::new(storage.clone(), logging.clone()).with_batch_concurrency(CONFIG.balance_batch_concurrency),
    );
    let adjustments = Arc::new(
        AdjustmentService::new(storage, logging, cache)
            .with_cache_ttl(Duration::from_secs(CONFIG.adjustment_cache_ttl_secs)),
    );

    if CONFIG.balance_scheduler_enabled {
        MonthlyBalanceScheduler::new(balances.clone(), CONFIG.balance_schedule_hour).spawn();
    }

    let state = AppState { balances, adjustments };

    // Define API routes
    let app = Router::new()
        .route("/", get(|| async { "OK" }))
        .nest("/api", api_routes(state))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CompressionLayer::new()) // Gzip compression
        .layer(TimeoutLayer::new(Duration::from_secs(30))) // 30-second timeout
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([
                    http::Method::GET,
                    http::Method::POST,
                    http::Method::PUT,
                    http::Method::DELETE,
                ])
                .allow_headers([header::CONTENT_TYPE]),
        )
        .layer(TraceLayer::new_for_http()); // Request tracing

    // Start server
    let addr = SocketAddr::from(([127, 0, 0, 1], CONFIG.port));
    info!("Server running at http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
