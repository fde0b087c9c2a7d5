use axum::{Router, routing::get};
use fintrack::api::{ApiDoc, api_routes};
use fintrack::auth::jwt::JwtService;
use fintrack::config::CONFIG;
use fintrack::core::services::LedgerService;
use fintrack::infrastructure::{
    analytics::in_memory::InMemoryAnalytics, notify::in_memory::InMemoryNotifier,
    storage::in_memory::InMemoryStorage,
};
use http::header;
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
    tracing_subscriber::fmt()
        .with_env_filter(CONFIG.log_level.as_str())
        .init();

    // Initialize storage and side channels
    let storage = InMemoryStorage::new();
    let notifier = InMemoryNotifier::new();
    let analytics = InMemoryAnalytics::new();
    let jwt = JwtService::new(CONFIG.jwt_secret.clone(), CONFIG.jwt_expiry_hours);
    let service = Arc::new(LedgerService::new(storage, notifier, analytics, jwt));

    // Define API routes
    let app = Router::new()
        // add / route with a simple health check
        .route("/", get(|| async { "OK" }))
        .nest("/api", api_routes(service))
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CompressionLayer::new()) // Gzip compression
        .layer(TimeoutLayer::new(Duration::from_secs(30))) // 30-second timeout
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([
                    http::Method::GET,
                    http::Method::POST,
                    http::Method::PUT,
                    http::Method::PATCH,
                    http::Method::DELETE,
                ])
                .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]),
        )
        .layer(TraceLayer::new_for_http()); // Request tracing

    // Start server
    let addr = SocketAddr::from(([127, 0, 0, 1], CONFIG.port));
    info!("Server running at http://{}", addr);
    info!("API docs available at http://{}/docs", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
