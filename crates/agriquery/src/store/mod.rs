//! Owner of the single DuckDB connection.
//!
//! The connection is opened lazily on first use and configured with the
//! `spatial` extension. Callers construct one [`Store`] per process and lend it
//! out by `&mut`, which keeps every statement on a single caller.

use duckdb::Connection;
use duckdb::types::{TimeUnit, Value as StoreValue};
use tracing::{debug, info, warn};

use crate::config::{DatabaseLocation, SpatialExtension, StoreSettings};
use crate::error::{QueryError, Result};
use crate::models::{CellValue, ColumnInfo, QueryResult, Row, SchemaInfo, SchemaStats};
use crate::utils::format::float_repr;
use crate::utils::time::{
    format_epoch_days, format_interval, format_time_micros, format_unix_micros,
};

pub const DOMAIN_TABLE: &str = "agricultural_hexes";
pub const HEX_ID_COLUMN: &str = "h3_index";

const LOAD_SPATIAL_SQL: &str = "INSTALL spatial; LOAD spatial;";

const SCHEMA_COLUMNS_SQL: &str = r#"
SELECT
    column_name,
    data_type
FROM information_schema.columns
WHERE table_name = 'agricultural_hexes'
ORDER BY ordinal_position
"#;

const SCHEMA_STATS_SQL: &str = r#"
SELECT
    COUNT(*) AS total_hexes,
    ROUND(MIN(yield_target), 2) AS min_yield,
    ROUND(MAX(yield_target), 2) AS max_yield,
    ROUND(AVG(P_in_soil), 2) AS avg_P,
    ROUND(AVG(K_in_soil), 2) AS avg_K,
    ROUND(AVG(N_in_soil), 2) AS avg_N
FROM agricultural_hexes
"#;

#[derive(Debug)]
pub struct Store {
    settings: StoreSettings,
    connection: Option<Connection>,
}

impl Store {
    #[must_use]
    pub fn new(settings: StoreSettings) -> Self {
        Self {
            settings,
            connection: None,
        }
    }

    #[must_use]
    pub fn settings(&self) -> &StoreSettings {
        &self.settings
    }

    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    /// Returns the live connection, opening and configuring it on first call.
    pub fn connect(&mut self) -> Result<&Connection> {
        let connection = match self.connection.take() {
            Some(connection) => connection,
            None => open_connection(&self.settings)?,
        };
        Ok(self.connection.insert(connection))
    }

    /// Releases the connection. The next [`Store::connect`] opens a new one.
    pub fn close(&mut self) -> Result<()> {
        let Some(connection) = self.connection.take() else {
            return Ok(());
        };
        debug!(database = %self.settings.location.describe(), "closing store connection");
        connection.close().map_err(|(connection, error)| {
            warn!(%error, "store connection did not close cleanly");
            drop(connection);
            QueryError::execution(error)
        })
    }

    /// Runs `sql` as-is. Policy checks are the caller's responsibility.
    pub fn execute_query(&mut self, sql: &str) -> Result<QueryResult> {
        let connection = self.connect()?;
        info!(%sql, "executing query");
        let result = run_query(connection, sql).map_err(QueryError::execution)?;
        info!(rows = result.len(), "query complete");
        Ok(result)
    }

    /// Live column listing and summary statistics for the domain table.
    pub fn schema_info(&mut self) -> Result<SchemaInfo> {
        let connection = self.connect()?;
        let columns = load_columns(connection).map_err(QueryError::execution)?;
        let stats = load_stats(connection).map_err(QueryError::execution)?;

        Ok(SchemaInfo {
            table_name: DOMAIN_TABLE.to_string(),
            columns,
            stats,
        })
    }
}

fn open_connection(settings: &StoreSettings) -> Result<Connection> {
    debug!(database = %settings.location.describe(), "opening store connection");
    let connection = match &settings.location {
        DatabaseLocation::File(path) => Connection::open(path),
        DatabaseLocation::InMemory => Connection::open_in_memory(),
    }
    .map_err(QueryError::execution)?;

    if settings.spatial == SpatialExtension::Load {
        connection
            .execute_batch(LOAD_SPATIAL_SQL)
            .map_err(QueryError::execution)?;
        debug!("spatial extension loaded");
    }

    Ok(connection)
}

fn run_query(connection: &Connection, sql: &str) -> duckdb::Result<QueryResult> {
    let mut statement = connection.prepare(sql)?;
    let mut rows = statement.query([])?;
    let columns = rows
        .as_ref()
        .map(|statement| statement.column_names())
        .unwrap_or_default();

    let mut result_rows = Vec::new();
    while let Some(row) = rows.next()? {
        let mut record = Row::new();
        for (index, column) in columns.iter().enumerate() {
            let value = row.get::<usize, StoreValue>(index)?;
            record.push(column.clone(), cell_value_from_store(value));
        }
        result_rows.push(record);
    }

    Ok(QueryResult {
        columns,
        rows: result_rows,
    })
}

fn load_columns(connection: &Connection) -> duckdb::Result<Vec<ColumnInfo>> {
    let mut statement = connection.prepare(SCHEMA_COLUMNS_SQL)?;
    let column_rows = statement.query_map([], |row| {
        Ok(ColumnInfo {
            name: row.get::<usize, String>(0)?,
            data_type: row.get::<usize, String>(1)?,
        })
    })?;
    column_rows.collect()
}

fn load_stats(connection: &Connection) -> duckdb::Result<SchemaStats> {
    connection.query_row(SCHEMA_STATS_SQL, [], |row| {
        let stat = |index: usize| -> duckdb::Result<Option<f64>> {
            Ok(cell_value_from_store(row.get::<usize, StoreValue>(index)?).as_f64())
        };
        Ok(SchemaStats {
            total_hexes: row.get::<usize, i64>(0)?,
            min_yield: stat(1)?,
            max_yield: stat(2)?,
            avg_p: stat(3)?,
            avg_k: stat(4)?,
            avg_n: stat(5)?,
        })
    })
}

/// Maps a store value onto the scalar model. Values without a scalar
/// equivalent are rendered as text: blobs and geometries as lowercase hex,
/// nested values as `[1, 2]`, `{'a': 1}` and `{'k'=1}`.
#[must_use]
pub fn cell_value_from_store(value: StoreValue) -> CellValue {
    match value {
        StoreValue::Null => CellValue::Null,
        StoreValue::Boolean(flag) => CellValue::Bool(flag),
        StoreValue::TinyInt(value) => CellValue::Integer(i64::from(value)),
        StoreValue::SmallInt(value) => CellValue::Integer(i64::from(value)),
        StoreValue::Int(value) => CellValue::Integer(i64::from(value)),
        StoreValue::BigInt(value) => CellValue::Integer(value),
        StoreValue::UTinyInt(value) => CellValue::Integer(i64::from(value)),
        StoreValue::USmallInt(value) => CellValue::Integer(i64::from(value)),
        StoreValue::UInt(value) => CellValue::Integer(i64::from(value)),
        StoreValue::UBigInt(value) => {
            i64::try_from(value).map_or(CellValue::Float(value as f64), CellValue::Integer)
        }
        StoreValue::HugeInt(value) => {
            i64::try_from(value).map_or(CellValue::Float(value as f64), CellValue::Integer)
        }
        StoreValue::UHugeInt(value) => {
            i64::try_from(value).map_or(CellValue::Float(value as f64), CellValue::Integer)
        }
        StoreValue::Float(value) => CellValue::Float(f64::from(value)),
        StoreValue::Double(value) => CellValue::Float(value),
        StoreValue::Decimal(value) => {
            let rendered = value.to_string();
            rendered
                .parse::<f64>()
                .map_or(CellValue::Text(rendered), CellValue::Float)
        }
        StoreValue::Text(text) | StoreValue::Enum(text) => CellValue::Text(text),
        StoreValue::Blob(bytes) | StoreValue::Geometry(bytes) => {
            CellValue::Text(encode_blob_hex(&bytes))
        }
        StoreValue::Timestamp(unit, value) => format_unix_micros(timestamp_micros(unit, value))
            .map_or(CellValue::Integer(value), CellValue::Text),
        StoreValue::Date32(days) => {
            format_epoch_days(days).map_or(CellValue::Integer(i64::from(days)), CellValue::Text)
        }
        StoreValue::Time64(unit, value) => format_time_micros(timestamp_micros(unit, value))
            .map_or(CellValue::Integer(value), CellValue::Text),
        StoreValue::Interval {
            months,
            days,
            nanos,
        } => CellValue::Text(format_interval(months, days, nanos)),
        StoreValue::Union(inner) => cell_value_from_store(*inner),
        nested @ (StoreValue::List(_)
        | StoreValue::Array(_)
        | StoreValue::Struct(_)
        | StoreValue::Map(_)) => CellValue::Text(nested_text(&nested)),
        other => {
            warn!(value = ?other, "store value type has no text form");
            CellValue::Null
        }
    }
}

/// Text form of a value inside a nested value. Strings are single-quoted and
/// NULL is spelled out.
fn nested_text(value: &StoreValue) -> String {
    match value {
        StoreValue::List(items) | StoreValue::Array(items) => {
            let items = items.iter().map(nested_text).collect::<Vec<_>>();
            format!("[{}]", items.join(", "))
        }
        StoreValue::Struct(fields) => {
            let fields = fields
                .iter()
                .map(|(name, value)| format!("'{name}': {}", nested_text(value)))
                .collect::<Vec<_>>();
            format!("{{{}}}", fields.join(", "))
        }
        StoreValue::Map(entries) => {
            let entries = entries
                .iter()
                .map(|(key, value)| format!("{}={}", nested_text(key), nested_text(value)))
                .collect::<Vec<_>>();
            format!("{{{}}}", entries.join(", "))
        }
        StoreValue::Union(inner) => nested_text(inner),
        scalar => match cell_value_from_store(scalar.clone()) {
            CellValue::Null => "NULL".to_string(),
            CellValue::Text(text) => format!("'{text}'"),
            CellValue::Float(number) => float_repr(number),
            other => other.to_string(),
        },
    }
}

fn timestamp_micros(unit: TimeUnit, value: i64) -> i64 {
    match unit {
        TimeUnit::Second => value.saturating_mul(1_000_000),
        TimeUnit::Millisecond => value.saturating_mul(1_000),
        TimeUnit::Microsecond => value,
        TimeUnit::Nanosecond => value / 1_000,
    }
}

fn encode_blob_hex(bytes: &[u8]) -> String {
    const HEX: &[u8; 16] = b"0123456789abcdef";
    let mut output = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        output.push(HEX[(byte >> 4) as usize] as char);
        output.push(HEX[(byte & 0x0f) as usize] as char);
    }
    output
}

#[cfg(test)]
mod tests {
    use duckdb::types::{TimeUnit, Value as StoreValue};

    use super::{Store, cell_value_from_store};
    use crate::config::StoreSettings;
    use crate::models::CellValue;

    #[test]
    fn connect_is_lazy_and_close_resets_state() {
        let mut store = Store::new(StoreSettings::in_memory());
        assert!(!store.is_connected());

        store.connect().expect("in-memory store should open");
        store.connect().expect("second connect should reuse the handle");
        assert!(store.is_connected());

        store.close().expect("close should succeed");
        assert!(!store.is_connected());
        store.close().expect("closing twice is a no-op");

        store.connect().expect("reconnect after close");
        assert!(store.is_connected());
    }

    #[test]
    fn execute_query_preserves_column_order() {
        let mut store = Store::new(StoreSettings::in_memory());
        let result = store
            .execute_query("SELECT 2 AS zeta, 'x' AS alpha, NULL AS middle")
            .expect("literal query should run");

        assert_eq!(result.columns, vec!["zeta", "alpha", "middle"]);
        let names = result.rows[0].iter().map(|(name, _)| name).collect::<Vec<_>>();
        assert_eq!(names, vec!["zeta", "alpha", "middle"]);
        assert_eq!(result.rows[0].get("zeta"), Some(&CellValue::Integer(2)));
        assert_eq!(result.rows[0].get("middle"), Some(&CellValue::Null));
    }

    #[test]
    fn execution_errors_keep_store_message_and_connection() {
        let mut store = Store::new(StoreSettings::in_memory());
        let error = store
            .execute_query("SELECT * FROM missing_table")
            .expect_err("unknown table must fail");

        assert_eq!(error.stage(), "execution");
        assert!(
            error.to_string().contains("missing_table"),
            "unexpected error: {error}"
        );
        assert!(store.is_connected());
    }

    #[test]
    fn nested_values_render_as_readable_text() {
        let mut store = Store::new(StoreSettings::in_memory());
        let result = store
            .execute_query(
                "SELECT [1, 2] AS l, {'a': 1, 'b': 'x'} AS s, ['p', NULL] AS t, \
                 MAP {'k': 1.5} AS m, [{'a': [3]}] AS deep",
            )
            .expect("nested literals should run");
        let row = &result.rows[0];

        assert_eq!(row.get("l"), Some(&CellValue::Text("[1, 2]".to_string())));
        assert_eq!(
            row.get("s"),
            Some(&CellValue::Text("{'a': 1, 'b': 'x'}".to_string()))
        );
        assert_eq!(row.get("t"), Some(&CellValue::Text("['p', NULL]".to_string())));
        assert_eq!(row.get("m"), Some(&CellValue::Text("{'k'=1.5}".to_string())));
        assert_eq!(
            row.get("deep"),
            Some(&CellValue::Text("[{'a': [3]}]".to_string()))
        );
    }

    #[test]
    fn temporal_values_render_as_text() {
        let mut store = Store::new(StoreSettings::in_memory());
        let result = store
            .execute_query(
                "SELECT TIME '01:02:03' AS t, INTERVAL 3 DAY + INTERVAL 90 MINUTE AS i, \
                 DATE '2024-03-01' AS d",
            )
            .expect("temporal literals should run");
        let row = &result.rows[0];

        assert_eq!(row.get("t"), Some(&CellValue::Text("01:02:03".to_string())));
        assert_eq!(
            row.get("i"),
            Some(&CellValue::Text("3 days 01:30:00".to_string()))
        );
        assert_eq!(row.get("d"), Some(&CellValue::Text("2024-03-01".to_string())));
    }

    #[test]
    fn store_values_map_onto_scalars() {
        assert_eq!(
            cell_value_from_store(StoreValue::HugeInt(42)),
            CellValue::Integer(42)
        );
        assert_eq!(
            cell_value_from_store(StoreValue::Blob(vec![0x01, 0xab])),
            CellValue::Text("01ab".to_string())
        );
        assert_eq!(
            cell_value_from_store(StoreValue::Geometry(vec![0x01, 0x03])),
            CellValue::Text("0103".to_string())
        );
        assert_eq!(
            cell_value_from_store(StoreValue::Union(Box::new(StoreValue::Int(7)))),
            CellValue::Integer(7)
        );
        assert_eq!(
            cell_value_from_store(StoreValue::Timestamp(TimeUnit::Second, 1)),
            CellValue::Text("1970-01-01 00:00:01.000000".to_string())
        );
        assert_eq!(
            cell_value_from_store(StoreValue::Date32(0)),
            CellValue::Text("1970-01-01".to_string())
        );
    }
}
