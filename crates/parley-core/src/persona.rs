//! Static persona document.
//!
//! The persona drives the system prompt and the opening line of every
//! session. It is loaded once at startup and shared read-only afterwards.

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::PersonaError;

/// Character and scenario configuration for the role-play.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Persona {
    pub name: String,
    pub role: String,
    /// Personality traits, in the order they are listed in the prompt.
    #[serde(default)]
    pub traits: Vec<String>,
    pub scenario: String,
    pub goal: String,
    /// First assistant turn. Usually an object carrying
    /// `alex_spoken_response` and `alex_inner_thought`; passed to clients as-is.
    pub opening_message: Value,
}

impl Persona {
    /// Read and parse the persona document at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, PersonaError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| PersonaError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    pub fn from_json_str(text: &str) -> Result<Self, PersonaError> {
        Ok(serde_json::from_str(text)?)
    }

    /// The opening message as it is stored in the transcript: compact JSON text.
    pub fn opening_line(&self) -> String {
        self.opening_message.to_string()
    }
}
