use anyhow::Result;
use clap::Args;
use serde_json::json;

use super::{command_failure, print_envelope, to_json};
use crate::error::QueryError;
use crate::guard::validate_sql;
use crate::models::Envelope;
use crate::service::{extract_hex_ids, summarize};
use crate::store::Store;

#[derive(Debug, Clone, Args)]
pub struct SqlArgs {
    #[arg(value_name = "SQL")]
    pub sql: String,
}

/// Runs a hand-written statement through the same policy and summary as
/// generated SQL, without a model call.
pub fn run(args: &SqlArgs, store: &mut Store) -> Result<()> {
    validate_sql(&args.sql)
        .map_err(|violation| command_failure("sql", &QueryError::from(violation)))?;

    let started = std::time::Instant::now();
    let result = store
        .execute_query(&args.sql)
        .map_err(|error| command_failure("sql", &error))?;
    let duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

    let hex_ids = extract_hex_ids(&result.rows);
    let summary = summarize("", &result.rows, &args.sql);
    let envelope = Envelope::ok(
        "sql",
        json!({
            "sql": args.sql,
            "columns": result.columns,
            "results": to_json(&result.rows)?,
            "hex_ids": hex_ids,
            "count": result.len(),
            "summary": summary,
        }),
    )
    .with_meta("duration_ms", json!(duration_ms));
    print_envelope(&envelope)
}
