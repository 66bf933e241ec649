//! DTOs for the SQL proxy endpoint.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Body of `POST /api/sql`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SqlRequest {
    /// Raw SQL text. Treated as the empty string when the field is absent,
    /// which fails SELECT validation like any other non-SELECT input.
    #[serde(default)]
    pub sql: String,
}

/// Successful query response.
#[derive(Debug, Serialize, ToSchema)]
pub struct RowsResponse {
    /// Result rows in database order, each an object keyed by column name.
    pub rows: Vec<serde_json::Value>,
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn missing_sql_field_defaults_to_empty() {
        let Ok(req) = serde_json::from_str::<SqlRequest>("{}") else {
            panic!("empty object deserializes");
        };
        assert_eq!(req.sql, "");
    }

    #[test]
    fn rows_serialize_under_rows_key() {
        let response = RowsResponse {
            rows: vec![serde_json::json!({ "id": 1, "name": "Alice" })],
        };
        let Ok(json) = serde_json::to_value(&response) else {
            panic!("serializable");
        };
        assert_eq!(
            json,
            serde_json::json!({ "rows": [{ "id": 1, "name": "Alice" }] })
        );
    }
}
