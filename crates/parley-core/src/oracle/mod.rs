//! The language-model completion service, seen as a black box that turns a
//! transcript into text.
//!
//! [`openai::OpenAiOracle`] talks to any OpenAI-compatible chat completions
//! endpoint. `scripted::ScriptedOracle` replays canned answers for tests and
//! is only built with the `test-util` feature.

pub mod openai;
#[cfg(any(test, feature = "test-util"))]
pub mod scripted;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::OracleError;
use crate::message::Message;

pub use openai::OpenAiOracle;
#[cfg(any(test, feature = "test-util"))]
pub use scripted::ScriptedOracle;

pub const DEFAULT_MODEL: &str = "gpt-4-turbo-preview";
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_MAX_TOKENS: u32 = 1000;

/// Sampling parameters sent with every completion request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionParams {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for CompletionParams {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_owned(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }
}

/// A stateless text-completion service.
///
/// Implementations must ask for a reply constrained to a single JSON object
/// and return the raw text of the first choice.
#[async_trait]
pub trait Oracle: Send + Sync + 'static {
    async fn complete(
        &self,
        transcript: &[Message],
        params: &CompletionParams,
    ) -> Result<String, OracleError>;
}
