//! sql-gateway server entry point.
//!
//! Sequences the bootstrap chain (readiness probe, provisioning, pool
//! construction) and then starts the Axum HTTP server. Any failure in the
//! chain logs the error and exits with a non-zero status; the service is
//! either fully ready or not running.

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use sql_gateway::api;
use sql_gateway::app_state::AppState;
use sql_gateway::config::GatewayConfig;
use sql_gateway::db;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if let Err(e) = run().await {
        tracing::error!(error = %e, "startup failed");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = GatewayConfig::from_env()?;
    tracing::info!(addr = %config.listen_addr, database = %config.db_name, "starting sql-gateway");

    // Bootstrap chain, strictly sequential: the pool must not be built
    // before the target database exists with its schema applied.
    db::probe::wait_for_postgres(&config).await?;
    db::provision::provision(&config).await?;
    let pool = db::connect_pool(&config).await?;

    // Build application state
    let app_state = AppState { pool };

    // Build router
    let app = Router::new()
        .merge(api::build_router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    tracing::info!(addr = %config.listen_addr, "ready; POST /api/sql");

    axum::serve(listener, app).await?;

    Ok(())
}
