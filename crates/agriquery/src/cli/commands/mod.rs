pub mod ask;
pub mod chat;
pub mod health;
pub mod schema;
pub mod sql;

use std::io::Write;

use anyhow::{Context, Error, Result};
use serde::Serialize;
use serde_json::Value;

use crate::error::QueryError;
use crate::models::{Envelope, EnvelopeCommandFailure};

pub(crate) fn to_json<T: Serialize>(value: &T) -> Result<Value> {
    serde_json::to_value(value).context("failed to encode command payload")
}

pub(crate) fn write_envelope(output: &mut impl Write, envelope: &Envelope) -> Result<()> {
    let encoded = serde_json::to_string(envelope).context("failed to encode envelope")?;
    writeln!(output, "{encoded}").context("failed to write envelope")
}

pub(crate) fn print_envelope(envelope: &Envelope) -> Result<()> {
    write_envelope(&mut std::io::stdout().lock(), envelope)
}

pub(crate) fn command_failure(command: &str, error: &QueryError) -> Error {
    Error::new(EnvelopeCommandFailure::from_query_error(command, error))
}
