use anyhow::{Error, Result};
use serde_json::json;

use super::print_envelope;
use crate::models::{CellValue, Envelope, EnvelopeCommandFailure};
use crate::store::{DOMAIN_TABLE, Store};

const HEALTH_SQL: &str = "SELECT COUNT(*) AS total_hexes FROM agricultural_hexes";

pub fn run(store: &mut Store) -> Result<()> {
    let database = store.settings().location.describe();
    match store.execute_query(HEALTH_SQL) {
        Ok(result) => {
            let total_hexes = result
                .rows
                .first()
                .and_then(|row| row.get("total_hexes"))
                .cloned()
                .unwrap_or(CellValue::Null);
            print_envelope(&Envelope::ok(
                "health",
                json!({
                    "status": "ok",
                    "database": database,
                    "table": DOMAIN_TABLE,
                    "total_hexes": total_hexes,
                }),
            ))
        }
        Err(error) => {
            let envelope = Envelope::from_query_error("health", &error).with_error_details(json!({
                "status": "unavailable",
                "database": database,
                "table": DOMAIN_TABLE,
            }));
            Err(Error::new(EnvelopeCommandFailure::new(envelope)))
        }
    }
}
