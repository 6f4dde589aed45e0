//! End-to-end question answering: translate, validate, execute, summarize.

pub mod summary;

use tracing::info;

use crate::config::{ModelSettings, resolve_model_settings};
use crate::error::{QueryError, Result};
use crate::guard::validate_sql;
use crate::llm::{AnthropicClient, LanguageModel};
use crate::models::{ConversationHistory, QueryResponse};
use crate::prompt::build_system_prompt;
use crate::store::Store;
use crate::translate::Translator;

pub use summary::{NO_RESULTS_MESSAGE, extract_hex_ids, summarize};

/// Query pipeline bound to a borrowed [`Store`].
pub struct QueryService<'s, M> {
    store: &'s mut Store,
    translator: Translator<M>,
}

impl<'s> QueryService<'s, AnthropicClient> {
    /// Builds a service backed by the Anthropic API. Fails before any I/O when
    /// the credential is missing.
    pub fn anthropic(store: &'s mut Store, env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let settings = resolve_model_settings(env)?;
        Self::with_settings(store, &settings)
    }

    pub fn with_settings(store: &'s mut Store, settings: &ModelSettings) -> Result<Self> {
        let client = AnthropicClient::new(settings)
            .map_err(|error| QueryError::Configuration(format!("{error:#}")))?;
        Ok(Self::new(store, Translator::from_settings(client, settings)))
    }
}

impl<'s, M: LanguageModel> QueryService<'s, M> {
    #[must_use]
    pub fn new(store: &'s mut Store, translator: Translator<M>) -> Self {
        Self { store, translator }
    }

    /// System instruction built from the current table state.
    pub fn system_prompt(&mut self) -> Result<String> {
        let schema = self.store.schema_info()?;
        Ok(build_system_prompt(&schema))
    }

    pub fn natural_language_to_sql(&mut self, question: &str, use_context: bool) -> Result<String> {
        let system_prompt = self.system_prompt()?;
        self.translator
            .natural_language_to_sql(&system_prompt, question, use_context)
    }

    /// Runs the full pipeline without conversational context.
    pub fn execute_natural_language_query(&mut self, question: &str) -> Result<QueryResponse> {
        self.execute_with_context(question, false)
    }

    pub fn execute_with_context(
        &mut self,
        question: &str,
        use_context: bool,
    ) -> Result<QueryResponse> {
        let sql = self.natural_language_to_sql(question, use_context)?;
        validate_sql(&sql)?;
        let result = self.store.execute_query(&sql)?;

        let hex_ids = extract_hex_ids(&result.rows);
        let summary = summarize(question, &result.rows, &sql);
        info!(
            rows = result.len(),
            hex_ids = hex_ids.len(),
            "answered question"
        );

        Ok(QueryResponse {
            question: question.to_string(),
            sql,
            count: result.len(),
            results: result.rows,
            hex_ids,
            summary,
        })
    }

    #[must_use]
    pub fn history(&self) -> &ConversationHistory {
        self.translator.history()
    }

    pub fn clear_history(&mut self) {
        self.translator.clear_history();
    }

    pub fn store(&mut self) -> &mut Store {
        &mut *self.store
    }
}
