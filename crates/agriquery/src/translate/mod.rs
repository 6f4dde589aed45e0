//! Natural-language to SQL translation through a language model.

use std::sync::OnceLock;

use regex::Regex;
use tracing::{debug, info};

use crate::config::ModelSettings;
use crate::error::{QueryError, Result};
use crate::llm::{CompletionRequest, LanguageModel};
use crate::models::{CONTEXT_WINDOW_TURNS, ConversationHistory, ConversationTurn};

#[derive(Debug)]
pub struct Translator<M> {
    model: M,
    model_id: String,
    max_tokens: u32,
    history: ConversationHistory,
}

impl<M: LanguageModel> Translator<M> {
    #[must_use]
    pub fn new(model: M, model_id: impl Into<String>, max_tokens: u32) -> Self {
        Self {
            model,
            model_id: model_id.into(),
            max_tokens,
            history: ConversationHistory::new(),
        }
    }

    #[must_use]
    pub fn from_settings(model: M, settings: &ModelSettings) -> Self {
        Self::new(model, settings.model.clone(), settings.max_tokens)
    }

    /// Message list for one request: the recent history tail when
    /// `use_context` is set, then the new question.
    #[must_use]
    pub fn build_request(
        &self,
        system_prompt: &str,
        question: &str,
        use_context: bool,
    ) -> CompletionRequest {
        let mut messages = Vec::new();
        if use_context {
            messages.extend_from_slice(self.history.recent(CONTEXT_WINDOW_TURNS));
        }
        messages.push(ConversationTurn::user(question));

        CompletionRequest {
            model: self.model_id.clone(),
            max_tokens: self.max_tokens,
            system: system_prompt.to_string(),
            messages,
        }
    }

    /// Asks the model for SQL answering `question`. On success the exchange is
    /// appended to the history whether or not context was requested.
    pub fn natural_language_to_sql(
        &mut self,
        system_prompt: &str,
        question: &str,
        use_context: bool,
    ) -> Result<String> {
        let request = self.build_request(system_prompt, question, use_context);
        debug!(
            context_turns = request.messages.len() - 1,
            "requesting SQL translation"
        );
        let response = self
            .model
            .complete(&request)
            .map_err(|error| QueryError::Translation(format!("{error:#}")))?;

        let sql = extract_sql(&response);
        info!(%sql, "model produced SQL");
        self.history.record_exchange(question, sql.clone());
        Ok(sql)
    }

    #[must_use]
    pub fn history(&self) -> &ConversationHistory {
        &self.history
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }
}

/// Pulls the SQL statement out of free-form model output.
///
/// Attempts, in order: the first ```` ```sql ```` fenced block, the first
/// fenced block of any kind, the whole trimmed response. An unterminated
/// fence falls through to the whole response.
#[must_use]
pub fn extract_sql(response: &str) -> String {
    let trimmed = response.trim();

    let fenced = if trimmed.contains("```sql") {
        sql_fence_regex().captures(trimmed)
    } else if trimmed.contains("```") {
        any_fence_regex().captures(trimmed)
    } else {
        None
    };

    fenced
        .and_then(|captures| captures.get(1))
        .map_or(trimmed, |body| body.as_str())
        .trim()
        .to_string()
}

fn sql_fence_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| {
        Regex::new(r"(?s)```sql\s*(.*?)\s*```").expect("sql fence regex should compile")
    })
}

fn any_fence_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| {
        Regex::new(r"(?s)```\s*(.*?)\s*```").expect("fence regex should compile")
    })
}
