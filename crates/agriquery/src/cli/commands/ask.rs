use anyhow::Result;
use clap::Args;
use serde_json::json;

use super::{command_failure, print_envelope, to_json};
use crate::config::process_env;
use crate::models::Envelope;
use crate::service::QueryService;
use crate::store::Store;

#[derive(Debug, Clone, Args)]
pub struct AskArgs {
    #[arg(value_name = "QUESTION")]
    pub question: String,
}

pub fn run(args: &AskArgs, store: &mut Store) -> Result<()> {
    let mut service =
        QueryService::anthropic(store, process_env).map_err(|error| command_failure("ask", &error))?;
    let response = service
        .execute_natural_language_query(&args.question)
        .map_err(|error| command_failure("ask", &error))?;

    let envelope = Envelope::ok("ask", to_json(&response)?)
        .with_meta("count", json!(response.count))
        .with_meta("hex_id_count", json!(response.hex_ids.len()));
    print_envelope(&envelope)
}
