//! Startup readiness probe for the PostgreSQL server.
//!
//! Each attempt opens its own short-lived connection to the administrative
//! database and runs `SELECT 1`; nothing is pooled during probing so no
//! stale socket survives across retries.

use std::time::Instant;

use sqlx::postgres::PgConnectOptions;
use sqlx::{Connection, PgConnection};

use crate::config::GatewayConfig;
use crate::error::GatewayError;

/// Blocks until the PostgreSQL server accepts a trivial query, or the
/// configured probe timeout elapses.
///
/// Returns on the first successful attempt. Progress is logged; no state
/// persists across calls.
///
/// # Errors
///
/// Returns [`GatewayError::Unreachable`] if no attempt succeeds within
/// `config.probe_timeout` (to within one `config.probe_interval`).
pub async fn wait_for_postgres(config: &GatewayConfig) -> Result<(), GatewayError> {
    let options = config.admin_connect_options();
    let started = Instant::now();
    let mut attempt: u32 = 0;

    tracing::info!(
        host = %config.db_host,
        port = config.db_port,
        timeout_ms = config.probe_timeout.as_millis() as u64,
        "waiting for postgres"
    );

    while started.elapsed() < config.probe_timeout {
        attempt += 1;
        match probe_once(&options).await {
            Ok(()) => {
                tracing::info!(
                    attempt,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "postgres is ready"
                );
                return Ok(());
            }
            Err(e) => {
                tracing::debug!(attempt, error = %e, "postgres not ready yet");
                tokio::time::sleep(config.probe_interval).await;
            }
        }
    }

    Err(GatewayError::Unreachable {
        timeout_ms: u64::try_from(config.probe_timeout.as_millis()).unwrap_or(u64::MAX),
    })
}

/// One probe attempt: connect, `SELECT 1`, close.
async fn probe_once(options: &PgConnectOptions) -> Result<(), sqlx::Error> {
    let mut conn = PgConnection::connect_with(options).await?;
    sqlx::query("SELECT 1").execute(&mut conn).await?;
    conn.close().await?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::path::PathBuf;
    use std::time::Duration;

    use super::*;

    /// Points at a port nothing listens on, with a short budget.
    fn unreachable_config() -> GatewayConfig {
        let Ok(listen_addr) = "127.0.0.1:0".parse() else {
            panic!("valid socket addr");
        };
        GatewayConfig {
            listen_addr,
            db_host: "127.0.0.1".to_string(),
            db_port: 1,
            db_user: "postgres".to_string(),
            db_pass: "postgres".to_string(),
            db_name: "db".to_string(),
            schema_file: PathBuf::from("db.sql"),
            probe_timeout: Duration::from_millis(300),
            probe_interval: Duration::from_millis(100),
            database_max_connections: 1,
            database_connect_timeout_secs: 1,
        }
    }

    #[tokio::test]
    async fn unreachable_server_times_out() {
        let config = unreachable_config();
        let started = Instant::now();
        let result = wait_for_postgres(&config).await;

        assert!(matches!(
            result,
            Err(GatewayError::Unreachable { timeout_ms: 300 })
        ));
        // Must give up within roughly timeout + one interval.
        assert!(started.elapsed() < Duration::from_secs(2));
    }
}
