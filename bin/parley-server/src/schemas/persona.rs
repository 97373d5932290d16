use parley_core::SessionStart;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

/// Response body for `GET /persona`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PersonaResponse {
    pub name: String,
    pub role: String,
    pub scenario: String,
    pub goal: String,
    /// The persona's first turn, passed through from the persona document.
    #[schema(value_type = Object)]
    pub opening_message: Value,
    /// Fresh session id, valid for subsequent `POST /chat` calls.
    pub session_id: String,
}

impl From<SessionStart> for PersonaResponse {
    fn from(start: SessionStart) -> Self {
        Self {
            name: start.name,
            role: start.role,
            scenario: start.scenario,
            goal: start.goal,
            opening_message: start.opening_message,
            session_id: start.session_id,
        }
    }
}
