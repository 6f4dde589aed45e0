use anyhow::Result;
use serde_json::json;

use super::{command_failure, print_envelope, to_json};
use crate::models::{Envelope, response_json_schema};
use crate::prompt::build_system_prompt;
use crate::store::Store;

pub fn run_schema(store: &mut Store) -> Result<()> {
    let schema = store
        .schema_info()
        .map_err(|error| command_failure("schema", &error))?;
    let envelope = Envelope::ok("schema", to_json(&schema)?)
        .with_meta("column_count", json!(schema.columns.len()));
    print_envelope(&envelope)
}

pub fn run_prompt(store: &mut Store) -> Result<()> {
    let schema = store
        .schema_info()
        .map_err(|error| command_failure("prompt", &error))?;
    let prompt = build_system_prompt(&schema);
    print_envelope(&Envelope::ok("prompt", json!({ "system_prompt": prompt })))
}

pub fn run_response_schema() -> Result<()> {
    print_envelope(&Envelope::ok("response-schema", response_json_schema()))
}
