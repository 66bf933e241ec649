//! # sql-gateway
//!
//! Bootstrap-and-proxy HTTP gateway exposing read-only SQL over PostgreSQL.
//!
//! On startup the service waits for the database server to become
//! reachable, provisions the target database and applies a schema script
//! exactly once, then serves a single endpoint that forwards
//! caller-supplied SELECT queries and returns the rows as JSON. This is a
//! trusted-developer debugging tool: validation is a SELECT prefix check,
//! and driver error text is surfaced to the caller.
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP)
//!     │
//!     ├── REST Handlers (api/)
//!     │
//!     ├── AppState: PgPool (app_state.rs)
//!     │
//!     └── Bootstrap: probe → provision → pool (db/)
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod db;
pub mod error;
