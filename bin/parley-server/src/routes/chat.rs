//! Chat endpoint.

use std::sync::Arc;

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::routing::post;
use axum::{Json, Router};
use tracing::debug;
use utoipa::OpenApi;

use crate::error::ServerError;
use crate::schemas::chat::{ChatRequest, ChatResponse};
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(paths(chat), components(schemas(ChatRequest, ChatResponse)))]
pub struct ChatApi;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/chat", post(chat))
}

/// Post the next user message of a session.
///
/// Checks run in this order, and none of them reaches the completion
/// service when it fails: credential configured, body well-formed, session
/// known.
#[utoipa::path(
    post,
    path = "/chat",
    tag = "session",
    request_body = ChatRequest,
    responses(
        (status = 200, description = "Decoded reply", body = ChatResponse),
        (status = 400, description = "Missing or unknown session, or malformed body"),
        (status = 500, description = "Credential missing or completion service error"),
    )
)]
pub async fn chat(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ServerError> {
    let gateway = state.gateway.as_deref().ok_or(ServerError::MissingCredential)?;

    let Json(req) = payload.map_err(|e| ServerError::BadRequest(e.body_text()))?;

    let session_id = req
        .session_id
        .filter(|id| !id.is_empty())
        .ok_or(ServerError::InvalidSession)?;

    debug!(session_id = %session_id, message_len = req.message.len(), "chat message received");

    let reply = state
        .conversations
        .post_message(gateway, &session_id, &req.message)
        .await?;

    Ok(Json(ChatResponse::new(session_id, reply)))
}
