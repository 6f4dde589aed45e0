#![forbid(unsafe_code)]

use agriquery::cli::app::{Cli, Command, RuntimeArgs};
use agriquery::cli::commands;
use agriquery::config::{SpatialExtension, StoreSettings, process_env, resolve_store_settings};
use agriquery::models::EnvelopeCommandFailure;
use agriquery::store::Store;
use anyhow::{Context, Result};
use clap::Parser;
use clap::error::ErrorKind;
use tracing::warn;

const EXIT_SUCCESS: i32 = 0;
const EXIT_RUNTIME_FAILURE: i32 = 1;
const EXIT_POLICY_REJECTION: i32 = 2;
const EXIT_USAGE_ERROR: i32 = 64;

fn main() {
    std::process::exit(run());
}

fn run() -> i32 {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(error) => return exit_code_for_parse_error(error),
    };
    agriquery::logging::init(cli.runtime.verbose);
    let command_name = command_name(&cli.command);

    match execute(cli) {
        Ok(()) => EXIT_SUCCESS,
        Err(error) => {
            let exit_code = classify_runtime_error(&error);
            eprintln!("agriquery: failed `{command_name}` (exit_code={exit_code})");
            eprintln!("{error:#}");
            exit_code
        }
    }
}

fn execute(cli: Cli) -> Result<()> {
    if let Command::ResponseSchema = cli.command {
        return commands::schema::run_response_schema();
    }

    let mut store = Store::new(resolve_settings(&cli.runtime)?);
    let outcome = match &cli.command {
        Command::Ask(args) => commands::ask::run(args, &mut store),
        Command::Chat(args) => commands::chat::run(args, &mut store),
        Command::Sql(args) => commands::sql::run(args, &mut store),
        Command::Schema => commands::schema::run_schema(&mut store),
        Command::Prompt => commands::schema::run_prompt(&mut store),
        Command::Health => commands::health::run(&mut store),
        Command::ResponseSchema => commands::schema::run_response_schema(),
    };
    if let Err(error) = store.close() {
        warn!(%error, "store did not close cleanly");
    }
    outcome
}

fn resolve_settings(args: &RuntimeArgs) -> Result<StoreSettings> {
    let cwd = std::env::current_dir().context("failed to read working directory")?;
    let spatial = if args.skip_spatial {
        SpatialExtension::Skip
    } else {
        SpatialExtension::Load
    };
    Ok(resolve_store_settings(
        process_env,
        &cwd,
        args.database.as_deref(),
        spatial,
    )?)
}

fn classify_runtime_error(error: &anyhow::Error) -> i32 {
    match error.downcast_ref::<EnvelopeCommandFailure>() {
        Some(failure) if failure.is_policy_rejection() => EXIT_POLICY_REJECTION,
        _ => EXIT_RUNTIME_FAILURE,
    }
}

fn exit_code_for_parse_error(error: clap::Error) -> i32 {
    match error.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
            let _ = error.print();
            EXIT_SUCCESS
        }
        _ => {
            let _ = error.print();
            EXIT_USAGE_ERROR
        }
    }
}

fn command_name(command: &Command) -> &'static str {
    match command {
        Command::Ask(_) => "ask",
        Command::Chat(_) => "chat",
        Command::Sql(_) => "sql",
        Command::Schema => "schema",
        Command::Prompt => "prompt",
        Command::Health => "health",
        Command::ResponseSchema => "response-schema",
    }
}
