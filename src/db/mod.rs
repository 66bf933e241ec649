//! Database layer: startup readiness probe, one-shot provisioning, and
//! connection pool construction.
//!
//! Bootstrap ordering is strict: [`probe::wait_for_postgres`] must succeed
//! before [`provision::provision`] runs, and the pool is built last, once
//! the target database is known to exist with its schema applied.

pub mod probe;
pub mod provision;

use std::time::Duration;

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use crate::config::GatewayConfig;
use crate::error::GatewayError;

/// Builds the shared connection pool against the target database.
///
/// Must only be called after provisioning has completed; the pool connects
/// to the application database, which does not exist on a fresh server.
///
/// # Errors
///
/// Returns [`GatewayError::Provision`] if the pool cannot establish its
/// initial connection.
pub async fn connect_pool(config: &GatewayConfig) -> Result<PgPool, GatewayError> {
    PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .acquire_timeout(Duration::from_secs(config.database_connect_timeout_secs))
        .connect_with(config.app_connect_options())
        .await
        .map_err(|e| GatewayError::Provision(e.to_string()))
}
