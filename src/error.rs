//! Gateway error types with HTTP status code mapping.
//!
//! [`GatewayError`] is the central error type for the gateway. Startup
//! variants ([`GatewayError::Unreachable`], [`GatewayError::Provision`],
//! [`GatewayError::SchemaFileMissing`]) are fatal and terminate the process;
//! request variants map to a JSON error response.

use std::path::PathBuf;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

/// JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// { "error": "only SELECT statements are allowed" }
/// ```
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    /// Human-readable error message.
    pub error: String,
}

/// Central error enum for startup and request handling.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// The database never became reachable within the probe timeout.
    #[error("postgres unreachable after {timeout_ms} ms; check service, port, and credentials")]
    Unreachable {
        /// Total probe budget that elapsed without a successful connection.
        timeout_ms: u64,
    },

    /// Database or schema provisioning failed after connectivity was
    /// established (e.g. insufficient privilege to create the database).
    #[error("provisioning failed: {0}")]
    Provision(String),

    /// The configured schema script could not be read.
    #[error("schema file not found or unreadable: {}", .0.display())]
    SchemaFileMissing(PathBuf),

    /// Caller submitted a statement that is not a SELECT.
    #[error("only SELECT statements are allowed")]
    ValidationRejected,

    /// The database rejected or errored on a submitted query. The driver
    /// message is surfaced verbatim to the caller; acceptable for a
    /// trusted-developer debugging tool, not for public exposure.
    #[error("{0}")]
    QueryExecutionFailed(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl GatewayError {
    /// Returns the HTTP status code for this variant.
    ///
    /// Startup variants never reach a response in practice (they abort the
    /// process) but map to 500 for completeness.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::ValidationRejected | Self::QueryExecutionFailed(_) => StatusCode::BAD_REQUEST,
            Self::Unreachable { .. }
            | Self::Provision(_)
            | Self::SchemaFileMissing(_)
            | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            error: self.to_string(),
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}
