use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Errors raised while loading the persona document.
#[derive(Debug, Error)]
pub enum PersonaError {
    /// The persona file could not be read.
    #[error("failed to read persona file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The persona document is not valid JSON or misses a required key.
    #[error("invalid persona document: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors returned by an [`crate::oracle::Oracle`] implementation.
#[derive(Debug, Error)]
pub enum OracleError {
    /// The HTTP request failed (connection, TLS, body decoding, ...).
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The completion service answered with a non-2xx status.
    #[error("completion service returned {status}: {body}")]
    Status { status: u16, body: String },

    /// The completion service answered without any message content.
    #[error("completion service returned no content")]
    EmptyResponse,

    /// The call did not finish within the configured deadline.
    #[error("completion service did not answer within {0:?}")]
    Timeout(Duration),

    /// A scripted oracle ran out of canned replies.
    #[error("no scripted reply left")]
    Exhausted,
}

/// Errors raised while decoding the oracle's text into a reply record.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The text is not syntactically valid JSON.
    #[error("reply is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The text parsed, but the top-level value is not an object.
    #[error("reply is not a JSON object (found {0})")]
    NotAnObject(&'static str),
}

/// Any failure between handing a transcript to the gateway and getting a
/// decoded reply back.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error(transparent)]
    Oracle(#[from] OracleError),

    #[error(transparent)]
    Decode(#[from] DecodeError),
}

/// Errors surfaced by [`crate::conversation::ConversationService`].
#[derive(Debug, Error)]
pub enum ConversationError {
    /// The session id is unknown. The caller must start a new session.
    #[error("invalid session")]
    InvalidSession,

    #[error(transparent)]
    Gateway(#[from] GatewayError),
}
