//! Session start endpoint.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use utoipa::OpenApi;

use crate::schemas::persona::PersonaResponse;
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(paths(get_persona), components(schemas(PersonaResponse)))]
pub struct PersonaApi;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/persona", get(get_persona))
}

/// Describe the persona and open a new session.
///
/// Every call creates a session; the returned `session_id` is immediately
/// valid for `POST /chat`.
#[utoipa::path(
    get,
    path = "/persona",
    tag = "session",
    responses(
        (
            status = 200,
            description = "Persona summary with a fresh session id",
            body = PersonaResponse
        ),
    )
)]
pub async fn get_persona(State(state): State<Arc<AppState>>) -> Json<PersonaResponse> {
    Json(state.conversations.start_session().into())
}
