//! Decoding of the oracle's JSON answer into the seven-field reply record.
//!
//! The oracle is only trusted to produce well-formed JSON. Every field is read
//! into an optional intermediate ([`RawReply`]) and then filled with a
//! type-appropriate default, so a parseable but incomplete answer still yields
//! a complete [`DecodedReply`].

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::DecodeError;

/// Key names of the output contract, in prompt order.
pub const REPLY_FIELDS: [&str; 7] = [
    "alex_perception",
    "alex_inner_thought",
    "alex_spoken_response",
    "coaching_tip",
    "is_off_topic",
    "goal_alignment_score",
    "director_warning",
];

/// The decoded reply returned to clients.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodedReply {
    pub alex_perception: String,
    pub alex_inner_thought: String,
    pub alex_spoken_response: String,
    pub coaching_tip: String,
    pub is_off_topic: bool,
    /// Nominally 0-100; not range checked.
    pub goal_alignment_score: i64,
    pub director_warning: String,
}

/// Field values as found in the oracle's answer. `None` means absent, `null`
/// or of a type that cannot be read as the expected one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawReply {
    pub alex_perception: Option<String>,
    pub alex_inner_thought: Option<String>,
    pub alex_spoken_response: Option<String>,
    pub coaching_tip: Option<String>,
    pub is_off_topic: Option<bool>,
    pub goal_alignment_score: Option<i64>,
    pub director_warning: Option<String>,
}

impl RawReply {
    /// Parse oracle text. Fails only if the text is not a JSON object.
    pub fn parse(text: &str) -> Result<Self, DecodeError> {
        let value: Value = serde_json::from_str(text.trim())?;
        Self::from_value(&value)
    }

    pub fn from_value(value: &Value) -> Result<Self, DecodeError> {
        let object = value
            .as_object()
            .ok_or_else(|| DecodeError::NotAnObject(kind_of(value)))?;

        Ok(Self {
            alex_perception: read_text(object, "alex_perception"),
            alex_inner_thought: read_text(object, "alex_inner_thought"),
            alex_spoken_response: read_text(object, "alex_spoken_response"),
            coaching_tip: read_text(object, "coaching_tip"),
            is_off_topic: read_flag(object, "is_off_topic"),
            goal_alignment_score: read_score(object, "goal_alignment_score"),
            director_warning: read_text(object, "director_warning"),
        })
    }

    /// Fill absent fields with `""`, `false` or `0`.
    pub fn into_decoded(self) -> DecodedReply {
        DecodedReply {
            alex_perception: self.alex_perception.unwrap_or_default(),
            alex_inner_thought: self.alex_inner_thought.unwrap_or_default(),
            alex_spoken_response: self.alex_spoken_response.unwrap_or_default(),
            coaching_tip: self.coaching_tip.unwrap_or_default(),
            is_off_topic: self.is_off_topic.unwrap_or(false),
            goal_alignment_score: self.goal_alignment_score.unwrap_or(0),
            director_warning: self.director_warning.unwrap_or_default(),
        }
    }
}

/// Parse and default-fill in one step.
pub fn decode_reply(text: &str) -> Result<DecodedReply, DecodeError> {
    RawReply::parse(text).map(RawReply::into_decoded)
}

// ── private helpers ──────────────────────────────────────────────────────────

fn read_text(object: &Map<String, Value>, key: &str) -> Option<String> {
    match object.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn read_flag(object: &Map<String, Value>, key: &str) -> Option<bool> {
    match object.get(key)? {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

fn read_score(object: &Map<String, Value>, key: &str) -> Option<i64> {
    match object.get(key)? {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_u64().map(|u| i64::try_from(u).unwrap_or(i64::MAX)))
            .or_else(|| n.as_f64().map(|f| f.round() as i64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().map(|f| f.round() as i64))
        }
        _ => None,
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
