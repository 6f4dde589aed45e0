use std::io::{BufRead, Write};

use anyhow::{Context, Result};
use clap::Args;
use serde_json::json;

use super::{command_failure, to_json, write_envelope};
use crate::config::process_env;
use crate::llm::LanguageModel;
use crate::models::Envelope;
use crate::service::QueryService;
use crate::store::Store;

pub const CLEAR_COMMAND: &str = ":clear";
pub const QUIT_COMMAND: &str = ":quit";

#[derive(Debug, Clone, Args)]
pub struct ChatArgs {
    /// Send the last three exchanges along with each question.
    #[arg(long, default_value_t = false)]
    pub context: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ChatSummary {
    pub answered: usize,
    pub failed: usize,
}

pub fn run(args: &ChatArgs, store: &mut Store) -> Result<()> {
    let mut service = QueryService::anthropic(store, process_env)
        .map_err(|error| command_failure("chat", &error))?;
    eprintln!("chat: type a question, `{CLEAR_COMMAND}` to reset context, `{QUIT_COMMAND}` to exit");

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    let summary = run_session(
        &mut service,
        stdin.lock(),
        &mut stdout.lock(),
        args.context,
    )?;
    eprintln!(
        "chat: complete answered={} failed={}",
        summary.answered, summary.failed
    );
    Ok(())
}

/// Answers one question per input line. Failed questions are reported as
/// error envelopes and the session continues.
pub fn run_session<M: LanguageModel>(
    service: &mut QueryService<'_, M>,
    input: impl BufRead,
    output: &mut impl Write,
    use_context: bool,
) -> Result<ChatSummary> {
    let mut summary = ChatSummary::default();

    for line in input.lines() {
        let line = line.context("failed to read question")?;
        let question = line.trim();
        match question {
            "" => continue,
            QUIT_COMMAND => break,
            CLEAR_COMMAND => {
                service.clear_history();
                let envelope = Envelope::ok("chat.clear", json!({ "history_len": 0 }));
                write_envelope(output, &envelope)?;
                continue;
            }
            _ => {}
        }

        let envelope = match service.execute_with_context(question, use_context) {
            Ok(response) => {
                summary.answered += 1;
                Envelope::ok("chat", to_json(&response)?)
                    .with_meta("history_len", json!(service.history().len()))
            }
            Err(error) => {
                summary.failed += 1;
                Envelope::from_query_error("chat", &error)
            }
        };
        write_envelope(output, &envelope)?;
    }

    Ok(summary)
}
