//! OpenAI-compatible chat completions client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{CompletionParams, Oracle};
use crate::error::OracleError;
use crate::message::Message;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Oracle backed by `POST {base_url}/chat/completions`.
#[derive(Clone)]
pub struct OpenAiOracle {
    client: Client,
    api_key: String,
    endpoint: String,
}

impl std::fmt::Debug for OpenAiOracle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiOracle")
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

impl OpenAiOracle {
    /// Build a client for `base_url` (e.g. `https://api.openai.com/v1`).
    ///
    /// The overall request deadline is enforced by the gateway; the client
    /// itself only bounds connection setup.
    pub fn new(api_key: impl Into<String>, base_url: &str) -> Result<Self, OracleError> {
        let client = Client::builder()
            .user_agent(concat!("parley/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(CONNECT_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            endpoint: format!("{}/chat/completions", base_url.trim_end_matches('/')),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl Oracle for OpenAiOracle {
    async fn complete(
        &self,
        transcript: &[Message],
        params: &CompletionParams,
    ) -> Result<String, OracleError> {
        let body = ChatCompletionRequest {
            model: &params.model,
            messages: transcript,
            response_format: ResponseFormat {
                kind: "json_object",
            },
            temperature: params.temperature,
            max_tokens: params.max_tokens,
        };

        debug!(
            endpoint = %self.endpoint,
            model = %params.model,
            messages = transcript.len(),
            "sending completion request"
        );

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_owned());
            return Err(OracleError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatCompletionResponse = response.json().await?;
        extract_content(parsed)
    }
}

fn extract_content(response: ChatCompletionResponse) -> Result<String, OracleError> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or(OracleError::EmptyResponse)
}

// ── wire types ───────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    response_format: ResponseFormat,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}
