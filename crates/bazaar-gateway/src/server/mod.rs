//! Gateway server setup
//!
//! Provides the WebSocket server configuration and routes.

mod handler;
mod state;

pub use handler::gateway_handler;
pub use state::GatewayState;

use crate::broadcast::EventDispatcher;
use crate::connection::SessionRegistry;
use axum::{extract::State, routing::get, Json, Router};
use bazaar_cache::{RedisPool, SubscriberConfig};
use bazaar_common::{AppConfig, AppError, JwtService};
use bazaar_service::ServiceContextBuilder;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

/// Create the gateway router
pub fn create_router() -> Router<GatewayState> {
    Router::new()
        .route("/gateway", get(gateway_handler))
        .route("/health", get(health_check))
}

/// Liveness plus live session counts
async fn health_check(State(state): State<GatewayState>) -> Json<Value> {
    let registry = state.registry();
    Json(json!({
        "status": "healthy",
        "connections": registry.connection_count(),
        "identities": registry.identity_count(),
        "rooms": registry.room_count(),
        "dispatcher_running": state.event_dispatcher().is_running(),
    }))
}

/// Build the complete application
pub fn create_app(state: GatewayState) -> Router {
    create_router()
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Initialize all dependencies and create `GatewayState`
///
/// Migrations and system room reconciliation belong to the API process.
pub async fn create_gateway_state(config: AppConfig) -> Result<GatewayState, AppError> {
    tracing::info!("Connecting to PostgreSQL...");
    let pool = bazaar_db::create_pool(&bazaar_db::DatabaseConfig::from(&config.database))
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;
    tracing::info!("PostgreSQL connection established");

    tracing::info!("Connecting to Redis...");
    let redis_pool = RedisPool::from_config(&config.redis).map_err(|e| AppError::Cache(e.to_string()))?;

    let jwt_service = Arc::new(JwtService::new(
        &config.jwt.secret,
        config.jwt.access_token_expiry,
    ));

    let service_context = ServiceContextBuilder::new()
        .postgres(pool)
        .redis_pool(redis_pool)
        .jwt_service(jwt_service)
        .code_reuse_days(config.catalog.code_reuse_days)
        .build()
        .map_err(|e| AppError::Config(e.to_string()))?;

    let registry = SessionRegistry::new_shared();

    let event_dispatcher = EventDispatcher::new(SubscriberConfig::from(&config.redis), registry.clone())
        .await
        .map_err(|e| AppError::Cache(format!("Failed to create event dispatcher: {e}")))?;
    let event_dispatcher = Arc::new(event_dispatcher);
    event_dispatcher.clone().start();

    Ok(GatewayState::new(
        service_context,
        registry,
        event_dispatcher,
        config,
    ))
}

/// Run the gateway server
pub async fn run_server(app: Router, addr: &str) -> Result<(), AppError> {
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::Config(format!("Failed to bind to {addr}: {e}")))?;

    tracing::info!("Gateway listening on ws://{}/gateway", addr);

    axum::serve(listener, app)
        .await
        .map_err(|e| AppError::Config(format!("Server error: {e}")))?;

    Ok(())
}

/// Run the complete gateway server with configuration
pub async fn run(config: AppConfig) -> Result<(), AppError> {
    let addr = config.gateway.server.address();
    let state = create_gateway_state(config).await?;
    let app = create_app(state);
    run_server(app, &addr).await
}
