use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::Serialize;
use serde_json::Value;

use super::result::{CellValue, Row};

/// Outcome of one natural-language question.
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct QueryResponse {
    pub question: String,
    pub sql: String,

    #[schemars(with = "Vec<BTreeMap<String, CellValue>>")]
    pub results: Vec<Row>,

    /// Hexagon identifiers for map highlighting, one per row; `null` where
    /// the row's `h3_index` is NULL.
    pub hex_ids: Vec<Option<String>>,
    pub count: usize,
    pub summary: String,
}

#[must_use]
pub fn response_json_schema() -> Value {
    let schema = schemars::schema_for!(QueryResponse);
    match serde_json::to_value(schema) {
        Ok(value) => value,
        Err(error) => {
            panic!("failed to serialize generated query response schema: {error}");
        }
    }
}
