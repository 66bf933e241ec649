//! Shared application state injected into all Axum handlers.

use sqlx::PgPool;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
///
/// The pool is constructed by the bootstrap sequence only after the target
/// database exists and its schema has been applied.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Connection pool against the target database.
    pub pool: PgPool,
}
