#![forbid(unsafe_code)]

pub mod cli;
pub mod config;
pub mod error;
pub mod guard;
pub mod llm;
pub mod logging;
pub mod models;
pub mod prompt;
pub mod service;
pub mod store;
pub mod translate;
pub mod utils;

pub use cli::app::{Cli, Command};
pub use error::{PolicyViolation, QueryError};
pub use service::QueryService;
pub use store::Store;
