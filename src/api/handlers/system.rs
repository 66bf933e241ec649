//! System endpoints: usage hint and health check.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse};
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::Serialize;
use utoipa::ToSchema;

use crate::app_state::AppState;

/// Static usage hint served at the root.
const USAGE_HINT: &str =
    "<h2>sql-gateway</h2><p>POST /api/sql { \"sql\": \"SELECT * FROM patient;\" }</p>";

/// Health check response.
#[derive(Debug, Serialize, ToSchema)]
struct HealthResponse {
    status: String,
    database: String,
    pool_size: u32,
    timestamp: String,
    version: String,
}

/// `GET /` — Static HTML usage hint.
#[utoipa::path(
    get,
    path = "/",
    tag = "System",
    summary = "Usage hint",
    description = "Returns a short HTML snippet showing how to call the SQL proxy endpoint.",
    responses(
        (status = 200, description = "Usage hint", content_type = "text/html", body = String),
    )
)]
pub async fn root_handler() -> impl IntoResponse {
    (StatusCode::OK, Html(USAGE_HINT))
}

/// `GET /health` — Service health status.
///
/// Reports the target database the pool is bound to and the number of
/// connections it currently holds, alongside version and timestamp.
#[utoipa::path(
    get,
    path = "/health",
    tag = "System",
    summary = "Health check",
    description = "Returns service health status, the target database, current pool size, version, and timestamp.",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
    )
)]
pub async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let database = state
        .pool
        .connect_options()
        .get_database()
        .unwrap_or_default()
        .to_string();

    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy".to_string(),
            database,
            pool_size: state.pool.size(),
            timestamp: Utc::now().to_rfc3339(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }),
    )
}

/// System routes mounted at the root level (not under /api).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
}
