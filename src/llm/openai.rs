//! Client for OpenAI-compatible chat completion APIs.
//!
//! Behaviour:
//! - `POST {base_url}/chat/completions` with `{ model, messages }` and bearer auth.
//! - The first choice's message is the reply.
//! - Non-success statuses surface the provider's `error.message` when present.
//! - No retries; the client timeout bounds every call.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::conversation::{Message, Role};

use super::errors::{LlmError, LlmResult};
use super::provider::CompletionProvider;

/// Public `OpenAI` API root.
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Connection establishment timeout.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    role: Role,
    content: Option<String>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

/// Async client for an OpenAI-compatible completion endpoint.
#[derive(Clone, Debug)]
pub struct OpenAiClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl OpenAiClient {
    /// Create a client for `base_url` authenticating with `api_key`.
    ///
    /// # Errors
    /// Returns an error if the API key is empty or the HTTP client cannot be built.
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> LlmResult<Self> {
        if api_key.trim().is_empty() {
            return Err(LlmError::MissingApiKey);
        }

        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

#[async_trait]
impl CompletionProvider for OpenAiClient {
    async fn complete(&self, model: &str, messages: &[Message]) -> LlmResult<Message> {
        debug!("Requesting completion from {model} with {} messages", messages.len());

        let response = self
            .client
            .post(self.completions_url())
            .bearer_auth(&self.api_key)
            .json(&ChatCompletionRequest { model, messages })
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(LlmError::Api {
                status: status.as_u16(),
                message: extract_error_message(&body),
            });
        }

        parse_completion(&body)
    }
}

/// Pull `error.message` out of a provider error body, falling back to the body.
fn extract_error_message(body: &str) -> String {
    serde_json::from_str::<ErrorEnvelope>(body).map_or_else(
        |_| body.trim().to_string(),
        |envelope| envelope.error.message,
    )
}

fn parse_completion(body: &str) -> LlmResult<Message> {
    let response: ChatCompletionResponse =
        serde_json::from_str(body).map_err(|e| LlmError::Malformed(e.to_string()))?;

    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or(LlmError::EmptyChoices)?;

    let content = choice
        .message
        .content
        .ok_or_else(|| LlmError::Malformed("completion message has no content".to_string()))?;

    Ok(Message::new(choice.message.role, content))
}
