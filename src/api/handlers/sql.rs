//! SELECT-only SQL proxy handler.
//!
//! Validation is a prefix check, not a parser: the trimmed text must start
//! with the `SELECT` keyword (any case). This is a documented weak boundary
//! for a trusted-developer debugging tool; it does not stop side-effecting
//! constructs reachable from inside a SELECT (e.g. `SELECT pg_sleep(100)`).

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{Column, Row, TypeInfo, ValueRef};

use crate::api::dto::{RowsResponse, SqlRequest};
use crate::app_state::AppState;
use crate::error::{ErrorResponse, GatewayError};

/// `POST /api/sql` — Run a read-only query against the target database.
///
/// The query is forwarded verbatim once it passes the SELECT prefix check;
/// each request acquires a pooled connection for the duration of the query.
/// Driver errors are surfaced to the caller in the 400 body.
///
/// # Errors
///
/// Returns [`GatewayError::ValidationRejected`] for non-SELECT input
/// (before touching the database) and [`GatewayError::QueryExecutionFailed`]
/// when the database rejects or errors on the query.
#[utoipa::path(
    post,
    path = "/api/sql",
    tag = "Sql",
    summary = "Run a read-only query",
    description = "Forwards the given SQL verbatim to the target database. Only statements starting with the SELECT keyword are accepted.",
    request_body = SqlRequest,
    responses(
        (status = 200, description = "Result rows", body = RowsResponse),
        (status = 400, description = "Statement rejected or execution failed", body = ErrorResponse),
    )
)]
pub async fn run_sql(
    State(state): State<AppState>,
    Json(req): Json<SqlRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    if !is_select(&req.sql) {
        return Err(GatewayError::ValidationRejected);
    }

    let rows = sqlx::query(&req.sql)
        .fetch_all(&state.pool)
        .await
        .map_err(|e| GatewayError::QueryExecutionFailed(e.to_string()))?;

    let rows = rows
        .iter()
        .map(row_to_json)
        .collect::<Result<Vec<_>, _>>()?;

    Ok((StatusCode::OK, Json(RowsResponse { rows })))
}

/// Returns `true` when the trimmed text starts with the `SELECT` keyword,
/// case-insensitively and respecting the keyword boundary (`SELECTx` does
/// not pass).
fn is_select(sql: &str) -> bool {
    let trimmed = sql.trim_start();
    let Some(head) = trimmed.get(..6) else {
        return false;
    };
    if !head.eq_ignore_ascii_case("select") {
        return false;
    }
    match trimmed.get(6..).and_then(|rest| rest.chars().next()) {
        None => true,
        Some(c) => !c.is_ascii_alphanumeric() && c != '_',
    }
}

/// Converts a driver row into a JSON object keyed by column name.
fn row_to_json(row: &PgRow) -> Result<serde_json::Value, GatewayError> {
    let mut object = serde_json::Map::with_capacity(row.columns().len());
    for (idx, column) in row.columns().iter().enumerate() {
        let decoder = decoder_for(column.type_info().name());
        object.insert(column.name().to_string(), decode_column(row, idx, decoder)?);
    }
    Ok(serde_json::Value::Object(object))
}

/// How to decode a column, chosen from the PostgreSQL type name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnDecoder {
    Bool,
    Int2,
    Int4,
    Int8,
    Float4,
    Float8,
    Text,
    TimestampTz,
    Timestamp,
    Date,
    Json,
    Numeric,
    Uuid,
    Bytea,
}

/// Maps a PostgreSQL type name to its decoder.
///
/// Unknown type names fall back to string decoding rather than rejecting
/// the row; the query already succeeded, so the caller gets whatever
/// textual form the driver can produce (or a decode error in the 400
/// body for the rare type it cannot).
fn decoder_for(type_name: &str) -> ColumnDecoder {
    match type_name {
        "BOOL" => ColumnDecoder::Bool,
        "INT2" => ColumnDecoder::Int2,
        "INT4" => ColumnDecoder::Int4,
        "INT8" => ColumnDecoder::Int8,
        "FLOAT4" => ColumnDecoder::Float4,
        "FLOAT8" => ColumnDecoder::Float8,
        "TIMESTAMPTZ" => ColumnDecoder::TimestampTz,
        "TIMESTAMP" => ColumnDecoder::Timestamp,
        "DATE" => ColumnDecoder::Date,
        "JSON" | "JSONB" => ColumnDecoder::Json,
        "NUMERIC" => ColumnDecoder::Numeric,
        "UUID" => ColumnDecoder::Uuid,
        "BYTEA" => ColumnDecoder::Bytea,
        _ => ColumnDecoder::Text,
    }
}

/// Decodes one column into JSON. SQL NULL maps to JSON null regardless
/// of type.
fn decode_column(
    row: &PgRow,
    idx: usize,
    decoder: ColumnDecoder,
) -> Result<serde_json::Value, GatewayError> {
    let raw = row
        .try_get_raw(idx)
        .map_err(|e| GatewayError::QueryExecutionFailed(e.to_string()))?;
    if raw.is_null() {
        return Ok(serde_json::Value::Null);
    }

    let decoded = match decoder {
        ColumnDecoder::Bool => row.try_get::<bool, _>(idx).map(|v| serde_json::json!(v)),
        ColumnDecoder::Int2 => row.try_get::<i16, _>(idx).map(|v| serde_json::json!(v)),
        ColumnDecoder::Int4 => row.try_get::<i32, _>(idx).map(|v| serde_json::json!(v)),
        ColumnDecoder::Int8 => row.try_get::<i64, _>(idx).map(|v| serde_json::json!(v)),
        ColumnDecoder::Float4 => row.try_get::<f32, _>(idx).map(|v| serde_json::json!(v)),
        ColumnDecoder::Float8 => row.try_get::<f64, _>(idx).map(|v| serde_json::json!(v)),
        ColumnDecoder::Text => row.try_get::<String, _>(idx).map(serde_json::Value::String),
        ColumnDecoder::TimestampTz => row
            .try_get::<DateTime<Utc>, _>(idx)
            .map(|v| serde_json::json!(v.to_rfc3339())),
        ColumnDecoder::Timestamp => row
            .try_get::<NaiveDateTime, _>(idx)
            .map(|v| serde_json::json!(v.to_string())),
        ColumnDecoder::Date => row
            .try_get::<NaiveDate, _>(idx)
            .map(|v| serde_json::json!(v.to_string())),
        ColumnDecoder::Json => row.try_get::<serde_json::Value, _>(idx),
        // Decimals keep their textual form so precision survives JSON.
        ColumnDecoder::Numeric => row
            .try_get::<rust_decimal::Decimal, _>(idx)
            .map(|v| serde_json::Value::String(v.to_string())),
        ColumnDecoder::Uuid => row
            .try_get::<uuid::Uuid, _>(idx)
            .map(|v| serde_json::Value::String(v.to_string())),
        // Postgres hex text representation.
        ColumnDecoder::Bytea => row.try_get::<Vec<u8>, _>(idx).map(|v| {
            let hex: String = v.iter().map(|b| format!("{b:02x}")).collect();
            serde_json::Value::String(format!("\\x{hex}"))
        }),
    };

    decoded.map_err(|e| GatewayError::QueryExecutionFailed(e.to_string()))
}

/// SQL proxy routes mounted under `/api`.
pub fn routes() -> Router<AppState> {
    Router::new().route("/sql", post(run_sql))
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn select_is_accepted_case_insensitively() {
        assert!(is_select("SELECT * FROM patient"));
        assert!(is_select("select 1"));
        assert!(is_select("SeLeCt now()"));
    }

    #[test]
    fn leading_whitespace_is_tolerated() {
        assert!(is_select("   SELECT 1"));
        assert!(is_select("\n\tselect * from patient"));
    }

    #[test]
    fn bare_select_keyword_passes_the_prefix_check() {
        assert!(is_select("select"));
        assert!(is_select("SELECT*FROM patient"));
    }

    #[test]
    fn non_select_statements_are_rejected() {
        assert!(!is_select("DROP TABLE x"));
        assert!(!is_select("insert into x values (1)"));
        assert!(!is_select("DELETE FROM patient"));
        assert!(!is_select("update patient set name = 'x'"));
    }

    #[test]
    fn empty_and_whitespace_inputs_are_rejected() {
        assert!(!is_select(""));
        assert!(!is_select("  "));
    }

    #[test]
    fn keyword_boundary_is_respected() {
        assert!(!is_select("SELECTx FROM patient"));
        assert!(!is_select("selection"));
        assert!(!is_select("select_all"));
    }

    #[test]
    fn aggregate_and_identifier_types_have_decoders() {
        // avg()/sum() return NUMERIC; these must decode, not error.
        assert_eq!(decoder_for("NUMERIC"), ColumnDecoder::Numeric);
        assert_eq!(decoder_for("UUID"), ColumnDecoder::Uuid);
        assert_eq!(decoder_for("BYTEA"), ColumnDecoder::Bytea);
    }

    #[test]
    fn unknown_type_names_fall_back_to_text() {
        assert_eq!(decoder_for("INTERVAL"), ColumnDecoder::Text);
        assert_eq!(decoder_for("CIDR"), ColumnDecoder::Text);
        assert_eq!(decoder_for("POINT"), ColumnDecoder::Text);
    }
}
