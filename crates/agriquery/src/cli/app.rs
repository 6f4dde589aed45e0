use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use super::commands::{ask::AskArgs, chat::ChatArgs, sql::SqlArgs};

#[derive(Debug, Parser)]
#[command(
    name = "agriquery",
    version,
    about = "Natural-language questions over agricultural hex data"
)]
pub struct Cli {
    #[command(flatten)]
    pub runtime: RuntimeArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Args)]
pub struct RuntimeArgs {
    /// DuckDB database file; overrides DATABASE_PATH. `:memory:` opens an empty store.
    #[arg(long, global = true, value_name = "PATH")]
    pub database: Option<PathBuf>,

    /// Do not install or load the spatial extension.
    #[arg(long, global = true, default_value_t = false)]
    pub skip_spatial: bool,

    #[arg(long, short, global = true, default_value_t = false)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Answer one question.
    Ask(AskArgs),
    /// Answer questions read line by line from stdin.
    Chat(ChatArgs),
    /// Validate and run a SQL statement directly.
    Sql(SqlArgs),
    /// Print the live table schema and statistics.
    Schema,
    /// Print the system prompt built from the live schema.
    Prompt,
    /// Check that the store opens and the domain table is readable.
    Health,
    /// Print the JSON Schema of an answer.
    ResponseSchema,
}
