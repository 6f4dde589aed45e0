use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ColumnInfo {
    pub name: String,
    pub data_type: String,
}

/// Summary statistics for the domain table. Aggregates are `None` when the
/// table is empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SchemaStats {
    pub total_hexes: i64,
    pub min_yield: Option<f64>,
    pub max_yield: Option<f64>,
    pub avg_p: Option<f64>,
    pub avg_k: Option<f64>,
    pub avg_n: Option<f64>,
}

/// Live description of the domain table used to build the system prompt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SchemaInfo {
    pub table_name: String,
    pub columns: Vec<ColumnInfo>,
    pub stats: SchemaStats,
}
