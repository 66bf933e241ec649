//! Gateway configuration loaded from environment variables.
//!
//! Follows 12-factor style: all settings come from environment variables
//! (or a `.env` file via `dotenvy`). The configuration is built once at
//! startup and passed explicitly to every component.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use sqlx::postgres::PgConnectOptions;

/// Name of the administrative database used to create the target database.
pub const ADMIN_DATABASE: &str = "postgres";

/// Top-level gateway configuration.
///
/// Loaded once at startup via [`GatewayConfig::from_env`].
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Socket address to bind the HTTP server to (e.g. `0.0.0.0:5000`).
    pub listen_addr: SocketAddr,

    /// PostgreSQL server host.
    pub db_host: String,

    /// PostgreSQL server port.
    pub db_port: u16,

    /// PostgreSQL role name.
    pub db_user: String,

    /// PostgreSQL password.
    pub db_pass: String,

    /// Name of the target (application) database to provision and query.
    pub db_name: String,

    /// Path to the SQL schema script applied once to a fresh database.
    pub schema_file: PathBuf,

    /// Total time budget for the startup readiness probe.
    pub probe_timeout: Duration,

    /// Delay between readiness probe attempts.
    pub probe_interval: Duration,

    /// Maximum number of database connections in the pool.
    pub database_max_connections: u32,

    /// Timeout in seconds for acquiring a database connection.
    pub database_connect_timeout_secs: u64,
}

impl GatewayConfig {
    /// Loads configuration from environment variables.
    ///
    /// Falls back to sensible defaults when a variable is not set or fails
    /// to parse. Calls `dotenvy::dotenv().ok()` to optionally load a `.env`
    /// file.
    ///
    /// # Errors
    ///
    /// Returns an error if `LISTEN_ADDR` is set but cannot be parsed as
    /// a [`SocketAddr`].
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        dotenvy::dotenv().ok();

        let listen_addr: SocketAddr = std::env::var("LISTEN_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:5000".to_string())
            .parse()?;

        let db_host = std::env::var("DB_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let db_port = parse_env("DB_PORT", 5432);
        let db_user = std::env::var("DB_USER").unwrap_or_else(|_| "postgres".to_string());
        let db_pass = std::env::var("DB_PASS").unwrap_or_else(|_| "postgres".to_string());
        let db_name = std::env::var("DB_NAME").unwrap_or_else(|_| "db".to_string());

        let schema_file =
            PathBuf::from(std::env::var("DB_SCHEMA_FILE").unwrap_or_else(|_| "db.sql".to_string()));

        let probe_timeout = Duration::from_millis(parse_env("DB_PROBE_TIMEOUT_MS", 20_000));
        let probe_interval = Duration::from_millis(parse_env("DB_PROBE_INTERVAL_MS", 500));

        let database_max_connections = parse_env("DATABASE_MAX_CONNECTIONS", 10);
        let database_connect_timeout_secs = parse_env("DATABASE_CONNECT_TIMEOUT_SECS", 5);

        Ok(Self {
            listen_addr,
            db_host,
            db_port,
            db_user,
            db_pass,
            db_name,
            schema_file,
            probe_timeout,
            probe_interval,
            database_max_connections,
            database_connect_timeout_secs,
        })
    }

    /// Connection options for the administrative database (`postgres`).
    ///
    /// Used by the readiness probe and the ensure-database phase, both of
    /// which must run before the target database is known to exist.
    #[must_use]
    pub fn admin_connect_options(&self) -> PgConnectOptions {
        self.connect_options(ADMIN_DATABASE)
    }

    /// Connection options for the target (application) database.
    #[must_use]
    pub fn app_connect_options(&self) -> PgConnectOptions {
        self.connect_options(&self.db_name)
    }

    fn connect_options(&self, database: &str) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.db_host)
            .port(self.db_port)
            .username(&self.db_user)
            .password(&self.db_pass)
            .database(database)
    }
}

/// Parses an environment variable as `T`, returning `default` on missing
/// or invalid values.
fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
