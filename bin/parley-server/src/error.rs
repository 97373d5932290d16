//! Unified server error type.
//!
//! Every handler returns `Result<T, ServerError>`, which implements
//! [`axum::response::IntoResponse`] so errors are converted to a
//! `{"error": "..."}` JSON body with an appropriate status code.
//!
//! Gateway failures embed the underlying message so the frontend can show
//! what went wrong with the completion service.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use parley_core::{ConversationError, GatewayError};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

pub const MISSING_CREDENTIAL_MESSAGE: &str =
    "OpenAI API key not configured. Please set OPENAI_API_KEY environment variable.";

pub const INVALID_SESSION_MESSAGE: &str = "Invalid session. Please refresh the page.";

/// All errors that can occur in the parley-server request lifecycle.
#[derive(Debug, Error)]
pub enum ServerError {
    /// No oracle credential was configured at startup.
    #[error("completion service credential not configured")]
    MissingCredential,

    /// The session id is missing or unknown.
    #[error("invalid session")]
    InvalidSession,

    /// The oracle call or the decoding of its answer failed.
    #[error("gateway error: {0}")]
    Gateway(#[from] GatewayError),

    /// The caller sent an invalid or malformed request.
    #[error("bad request: {0}")]
    BadRequest(String),
}

impl From<ConversationError> for ServerError {
    fn from(e: ConversationError) -> Self {
        match e {
            ConversationError::InvalidSession => ServerError::InvalidSession,
            ConversationError::Gateway(g) => ServerError::Gateway(g),
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, client_message) = match &self {
            ServerError::MissingCredential => {
                warn!("chat requested but no completion credential is configured");
                (StatusCode::INTERNAL_SERVER_ERROR, MISSING_CREDENTIAL_MESSAGE.to_owned())
            }
            ServerError::InvalidSession => {
                (StatusCode::BAD_REQUEST, INVALID_SESSION_MESSAGE.to_owned())
            }
            ServerError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
            ServerError::Gateway(e) => {
                error!(error = %e, "completion gateway error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Error processing request: {e}"),
                )
            }
        };
        (status, Json(json!({ "error": client_message }))).into_response()
    }
}
