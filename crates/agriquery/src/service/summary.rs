use crate::models::Row;
use crate::store::HEX_ID_COLUMN;
use crate::utils::format::{group_thousands, grouped_fixed2, grouped_scalar};

pub const NO_RESULTS_MESSAGE: &str = "No results found for your query.";

/// One-line description of a result set, chosen by its shape.
///
/// Checked in order: empty, single scalar, hex rows, single aggregate row,
/// anything else. A one-row, one-column result is a scalar even when the
/// column is `h3_index`.
#[must_use]
pub fn summarize(_question: &str, rows: &[Row], _sql: &str) -> String {
    let Some(first) = rows.first() else {
        return NO_RESULTS_MESSAGE.to_string();
    };
    let count = group_thousands(&rows.len().to_string());

    if rows.len() == 1 && first.len() == 1 {
        if let Some((_, value)) = first.first() {
            return format!("Result: {}", grouped_scalar(value));
        }
    }

    if first.contains(HEX_ID_COLUMN) {
        return format!("Found {count} hexes matching your query.");
    }

    if rows.len() == 1 {
        return first
            .iter()
            .map(|(column, value)| format!("{column}: {}", grouped_fixed2(value)))
            .collect::<Vec<_>>()
            .join(" | ");
    }

    format!("Query returned {count} results.")
}

/// Hexagon identifiers for map highlighting, one per row. Empty unless the
/// first row carries `h3_index`; NULL identifiers stay in place as `None`.
#[must_use]
pub fn extract_hex_ids(rows: &[Row]) -> Vec<Option<String>> {
    let carries_hex_ids = rows.first().is_some_and(|row| row.contains(HEX_ID_COLUMN));
    if !carries_hex_ids {
        return Vec::new();
    }

    rows.iter()
        .map(|row| {
            row.get(HEX_ID_COLUMN)
                .filter(|value| !value.is_null())
                .map(ToString::to_string)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{NO_RESULTS_MESSAGE, extract_hex_ids, summarize};
    use crate::models::{CellValue, Row};

    fn hex_row(index: &str, phosphorus: f64) -> Row {
        Row::new().with("h3_index", index).with("P_in_soil", phosphorus)
    }

    #[test]
    fn empty_results_use_fixed_message() {
        assert_eq!(summarize("anything", &[], "SELECT 1"), NO_RESULTS_MESSAGE);
        assert_eq!(
            summarize("other question", &[], "SELECT h3_index FROM agricultural_hexes"),
            "No results found for your query."
        );
    }

    #[test]
    fn single_scalar_is_reported_directly() {
        let rows = [Row::new().with("avg_yield", 245.3)];
        assert_eq!(summarize("avg?", &rows, "SELECT ..."), "Result: 245.3");

        let rows = [Row::new().with("total", 12_345_i64)];
        assert_eq!(summarize("count?", &rows, "SELECT ..."), "Result: 12,345");

        let rows = [Row::new().with("label", "north field")];
        assert_eq!(summarize("name?", &rows, "SELECT ..."), "Result: north field");
    }

    #[test]
    fn single_hex_column_row_is_still_a_scalar() {
        let rows = [Row::new().with("h3_index", "8a2a1072b59ffff")];
        assert_eq!(summarize("q", &rows, "s"), "Result: 8a2a1072b59ffff");
    }

    #[test]
    fn hex_rows_report_match_count() {
        let rows = [hex_row("a", 10.0), hex_row("b", 20.0)];
        assert_eq!(summarize("q", &rows, "s"), "Found 2 hexes matching your query.");

        let many = (0..1_500)
            .map(|index| hex_row(&format!("hex-{index}"), 1.0))
            .collect::<Vec<_>>();
        assert_eq!(
            summarize("q", &many, "s"),
            "Found 1,500 hexes matching your query."
        );
    }

    #[test]
    fn single_aggregate_row_joins_pairs() {
        let rows = [Row::new()
            .with("avg_yield", 1234.567)
            .with("hex_count", 42_i64)
            .with("region", "north")
            .with("missing", CellValue::Null)];

        assert_eq!(
            summarize("q", &rows, "s"),
            "avg_yield: 1,234.57 | hex_count: 42.00 | region: north | missing: null"
        );
    }

    #[test]
    fn other_shapes_report_generic_count() {
        let rows = [
            Row::new().with("yield_bucket", 1_i64).with("hexes", 10_i64),
            Row::new().with("yield_bucket", 2_i64).with("hexes", 12_i64),
            Row::new().with("yield_bucket", 3_i64).with("hexes", 7_i64),
        ];
        assert_eq!(summarize("q", &rows, "s"), "Query returned 3 results.");
    }

    #[test]
    fn hex_ids_stay_aligned_with_rows() {
        let rows = [
            hex_row("8a2a1072b59ffff", 55.0),
            Row::new()
                .with("h3_index", CellValue::Null)
                .with("P_in_soil", 40.0),
            hex_row("8a2a1072b5affff", 12.0),
        ];
        assert_eq!(
            extract_hex_ids(&rows),
            vec![
                Some("8a2a1072b59ffff".to_string()),
                None,
                Some("8a2a1072b5affff".to_string()),
            ]
        );

        let aggregate = [Row::new().with("avg_yield", 1.0)];
        assert!(extract_hex_ids(&aggregate).is_empty());
        assert!(extract_hex_ids(&[]).is_empty());
    }
}
