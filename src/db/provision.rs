//! One-shot database and schema provisioning.
//!
//! Two phases, strictly sequential: ensure the target database exists
//! (administrative connection), then ensure the schema script has been
//! applied to it exactly once (application connection, guarded by the
//! `_td1_schema_applied` marker table).
//!
//! Not safe to run concurrently from multiple processes against the same
//! fresh server; there is no distributed lock. Single-instance bootstrap
//! is assumed.

use sqlx::{Connection, PgConnection};

use crate::config::GatewayConfig;
use crate::error::GatewayError;

/// Marker table recording that the schema script has been applied.
///
/// A single row keyed on a boolean primary key; presence of any row means
/// "already applied". A timestamp records when.
const MARKER_TABLE_DDL: &str = "CREATE TABLE IF NOT EXISTS _td1_schema_applied (\
     id boolean PRIMARY KEY DEFAULT TRUE,\
     applied_at timestamptz NOT NULL DEFAULT now()\
     )";

/// Runs both provisioning phases in order.
///
/// The ensure-database connection is fully closed before ensure-schema
/// opens its own; the target database must exist before anything connects
/// to it.
///
/// # Errors
///
/// Returns [`GatewayError::Provision`] on any database failure and
/// [`GatewayError::SchemaFileMissing`] if the schema script is unreadable.
pub async fn provision(config: &GatewayConfig) -> Result<(), GatewayError> {
    ensure_database(config).await?;
    ensure_schema(config).await
}

/// Creates the target database if it does not exist.
///
/// # Errors
///
/// Returns [`GatewayError::Provision`] if the existence check or the
/// `CREATE DATABASE` statement fails (e.g. insufficient privilege);
/// creation failures are propagated, not retried.
pub async fn ensure_database(config: &GatewayConfig) -> Result<(), GatewayError> {
    let mut admin = PgConnection::connect_with(&config.admin_connect_options())
        .await
        .map_err(|e| GatewayError::Provision(e.to_string()))?;

    let exists = sqlx::query_scalar::<_, i32>("SELECT 1 FROM pg_database WHERE datname = $1")
        .bind(&config.db_name)
        .fetch_optional(&mut admin)
        .await
        .map_err(|e| GatewayError::Provision(e.to_string()))?;

    if exists.is_none() {
        tracing::info!(database = %config.db_name, "creating database");
        // CREATE DATABASE takes no bind parameters; the identifier is
        // double-quote escaped instead.
        let stmt = format!("CREATE DATABASE {}", quote_identifier(&config.db_name));
        sqlx::raw_sql(&stmt)
            .execute(&mut admin)
            .await
            .map_err(|e| GatewayError::Provision(e.to_string()))?;
    }

    admin
        .close()
        .await
        .map_err(|e| GatewayError::Provision(e.to_string()))?;
    Ok(())
}

/// Applies the schema script to the target database exactly once.
///
/// Creates the marker table if absent, then checks for a marker row. When
/// none exists the schema file is read and executed as a single batch and
/// the marker row is inserted; when one exists the whole step is a no-op
/// beyond the check. A marker row, once present, never triggers
/// re-application.
///
/// # Errors
///
/// Returns [`GatewayError::SchemaFileMissing`] if the configured script
/// path cannot be read, and [`GatewayError::Provision`] on any database
/// failure.
pub async fn ensure_schema(config: &GatewayConfig) -> Result<(), GatewayError> {
    let mut app = PgConnection::connect_with(&config.app_connect_options())
        .await
        .map_err(|e| GatewayError::Provision(e.to_string()))?;

    sqlx::query(MARKER_TABLE_DDL)
        .execute(&mut app)
        .await
        .map_err(|e| GatewayError::Provision(e.to_string()))?;

    let applied = sqlx::query_scalar::<_, i32>("SELECT 1 FROM _td1_schema_applied LIMIT 1")
        .fetch_optional(&mut app)
        .await
        .map_err(|e| GatewayError::Provision(e.to_string()))?;

    if applied.is_none() {
        let script = std::fs::read_to_string(&config.schema_file)
            .map_err(|_| GatewayError::SchemaFileMissing(config.schema_file.clone()))?;

        tracing::info!(path = %config.schema_file.display(), "applying schema script");
        // Schema files routinely hold many statements; raw_sql runs them
        // through the simple query protocol as one batch.
        sqlx::raw_sql(&script)
            .execute(&mut app)
            .await
            .map_err(|e| GatewayError::Provision(e.to_string()))?;

        sqlx::query("INSERT INTO _td1_schema_applied (id) VALUES (TRUE)")
            .execute(&mut app)
            .await
            .map_err(|e| GatewayError::Provision(e.to_string()))?;
        tracing::info!("schema applied");
    } else {
        tracing::info!("schema already applied, skipping");
    }

    app.close()
        .await
        .map_err(|e| GatewayError::Provision(e.to_string()))?;
    Ok(())
}

/// Quotes a PostgreSQL identifier, doubling any embedded quotes.
fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
