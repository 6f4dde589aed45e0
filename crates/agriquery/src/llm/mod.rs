//! Language-model seam and the Anthropic Messages client behind it.

use std::time::Duration;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::ModelSettings;
use crate::models::ConversationTurn;

pub const ANTHROPIC_VERSION: &str = "2023-06-01";

/// One message-completion call: a system instruction plus ordered turns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompletionRequest {
    pub model: String,
    pub max_tokens: u32,
    pub system: String,
    pub messages: Vec<ConversationTurn>,
}

pub trait LanguageModel {
    /// Sends one request and returns the response text. Implementations do not
    /// retry or stream.
    fn complete(&self, request: &CompletionRequest) -> Result<String>;
}

impl<M: LanguageModel + ?Sized> LanguageModel for &M {
    fn complete(&self, request: &CompletionRequest) -> Result<String> {
        (**self).complete(request)
    }
}

impl<M: LanguageModel + ?Sized> LanguageModel for Box<M> {
    fn complete(&self, request: &CompletionRequest) -> Result<String> {
        (**self).complete(request)
    }
}

pub struct AnthropicClient {
    http: reqwest::blocking::Client,
    api_key: String,
    endpoint: String,
}

impl std::fmt::Debug for AnthropicClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnthropicClient")
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

impl AnthropicClient {
    pub fn new(settings: &ModelSettings) -> Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .timeout(None::<Duration>)
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            http,
            api_key: settings.api_key.clone(),
            endpoint: format!("{}/v1/messages", settings.base_url),
        })
    }
}

impl LanguageModel for AnthropicClient {
    fn complete(&self, request: &CompletionRequest) -> Result<String> {
        debug!(
            model = %request.model,
            messages = request.messages.len(),
            "sending completion request"
        );
        let response = self
            .http
            .post(&self.endpoint)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(request)
            .send()
            .context("model request failed")?;

        let status = response.status();
        let body = response
            .text()
            .context("failed to read model response body")?;
        if !status.is_success() {
            bail!("model API returned {status}: {}", api_error_detail(&body));
        }

        response_text(&body)
    }
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,

    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    #[serde(rename = "type")]
    kind: String,
    message: String,
}

/// Concatenates the text blocks of a Messages API response body.
pub(crate) fn response_text(body: &str) -> Result<String> {
    let parsed = serde_json::from_str::<MessagesResponse>(body)
        .context("failed to decode model response")?;
    let text = parsed
        .content
        .into_iter()
        .filter(|block| block.kind == "text")
        .filter_map(|block| block.text)
        .collect::<String>();
    if text.is_empty() {
        bail!("model response contained no text content");
    }
    Ok(text)
}

fn api_error_detail(body: &str) -> String {
    match serde_json::from_str::<ApiErrorBody>(body) {
        Ok(parsed) => format!("{}: {}", parsed.error.kind, parsed.error.message),
        Err(_) => body.trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::{CompletionRequest, api_error_detail, response_text};
    use crate::models::ConversationTurn;
    use serde_json::json;

    #[test]
    fn request_serializes_to_messages_api_shape() {
        let request = CompletionRequest {
            model: "claude-haiku-4-5".to_string(),
            max_tokens: 1024,
            system: "system prompt".to_string(),
            messages: vec![
                ConversationTurn::user("average yield?"),
                ConversationTurn::assistant("SELECT 1"),
            ],
        };

        assert_eq!(
            serde_json::to_value(&request).expect("request should serialize"),
            json!({
                "model": "claude-haiku-4-5",
                "max_tokens": 1024,
                "system": "system prompt",
                "messages": [
                    {"role": "user", "content": "average yield?"},
                    {"role": "assistant", "content": "SELECT 1"}
                ]
            })
        );
    }

    #[test]
    fn response_text_joins_text_blocks() {
        let body = r#"{
            "id": "msg_01",
            "type": "message",
            "role": "assistant",
            "content": [
                {"type": "text", "text": "SELECT COUNT(*) "},
                {"type": "tool_use", "id": "t1", "name": "noop", "input": {}},
                {"type": "text", "text": "FROM agricultural_hexes"}
            ],
            "stop_reason": "end_turn"
        }"#;

        assert_eq!(
            response_text(body).expect("text should decode"),
            "SELECT COUNT(*) FROM agricultural_hexes"
        );
    }

    #[test]
    fn response_without_text_is_an_error() {
        let err = response_text(r#"{"content": []}"#).expect_err("empty content must fail");
        assert!(err.to_string().contains("no text content"));

        let err = response_text("not json").expect_err("garbage must fail");
        assert!(err.to_string().contains("failed to decode"));
    }

    #[test]
    fn api_errors_surface_type_and_message() {
        assert_eq!(
            api_error_detail(
                r#"{"type":"error","error":{"type":"overloaded_error","message":"Overloaded"}}"#
            ),
            "overloaded_error: Overloaded"
        );
        assert_eq!(api_error_detail(" upstream timeout \n"), "upstream timeout");
    }
}
