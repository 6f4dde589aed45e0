use std::fmt::Write as _;

use crate::models::SchemaInfo;
use crate::utils::format::{group_thousands, optional_stat};

const ROLE_PREAMBLE: &str = "You are a SQL query generator for an agricultural database. \
Your job is to convert user questions into valid DuckDB SQL queries.";

// Policy text; keep byte-for-byte.
const FIELD_DESCRIPTIONS: &str = "\
Field Descriptions:
- h3_index: Unique H3 hexagon identifier
- yield_target: Target crop yield for the hex
- P_in_soil, K_in_soil, N_in_soil: Current nutrient levels (Phosphorus, Potassium, Nitrogen)
- N_to_apply, P_to_apply, K_to_apply: Recommended nutrient application amounts
- geometry: Spatial polygon for the hexagon";

const GUIDELINES: &str = "\
Guidelines:
1. ALWAYS include h3_index in the SELECT clause (needed for map highlighting)
2. Use ROUND() for decimal values in aggregations
3. For \"low\" nutrients, use thresholds: P < 60, K < 180, N < 10
4. For \"high\" nutrients, use thresholds: P > 90, K > 250, N > 0
5. Return ONLY the SQL query, no explanations or markdown
6. Use proper DuckDB SQL syntax
7. For counting, use COUNT(*) or COUNT(h3_index)
8. When user asks \"show me\" or \"find\", always include h3_index
9. For spatial queries, the geometry column contains POLYGON data";

const EXAMPLE_QUERIES: &str = "\
Example Queries:
- \"Show hexes with low phosphorus\" → SELECT h3_index, P_in_soil FROM agricultural_hexes WHERE P_in_soil < 60
- \"What's the average yield?\" → SELECT ROUND(AVG(yield_target), 2) as avg_yield FROM agricultural_hexes
- \"High yield hexes needing nitrogen\" → SELECT h3_index, yield_target, N_to_apply FROM agricultural_hexes WHERE yield_target >= 240 AND N_to_apply > 280";

const CLOSING_INSTRUCTION: &str =
    "Return only valid SQL. Do not include markdown code blocks or explanations.";

/// Renders the system instruction for the language model from the live schema.
#[must_use]
pub fn build_system_prompt(schema: &SchemaInfo) -> String {
    let columns = schema
        .columns
        .iter()
        .map(|column| format!("  - {}: {}", column.name, column.data_type))
        .collect::<Vec<_>>()
        .join("\n");
    let stats = &schema.stats;

    let mut prompt = String::new();
    prompt.push_str(ROLE_PREAMBLE);
    prompt.push_str("\n\nDatabase Schema:\n");
    let _ = writeln!(prompt, "Table: {}", schema.table_name);
    prompt.push_str("Columns:\n");
    prompt.push_str(&columns);
    prompt.push_str("\n\nDatabase Statistics:\n");
    let _ = writeln!(
        prompt,
        "- Total hexes: {}",
        group_thousands(&stats.total_hexes.to_string())
    );
    let _ = writeln!(
        prompt,
        "- Yield range: {} - {}",
        optional_stat(stats.min_yield),
        optional_stat(stats.max_yield)
    );
    let _ = writeln!(prompt, "- Average P in soil: {}", optional_stat(stats.avg_p));
    let _ = writeln!(prompt, "- Average K in soil: {}", optional_stat(stats.avg_k));
    let _ = write!(prompt, "- Average N in soil: {}", optional_stat(stats.avg_n));
    for section in [FIELD_DESCRIPTIONS, GUIDELINES, EXAMPLE_QUERIES, CLOSING_INSTRUCTION] {
        prompt.push_str("\n\n");
        prompt.push_str(section);
    }
    prompt
}
