use parley_core::DecodedReply;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Request body for `POST /chat`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ChatRequest {
    /// The user's next line.
    pub message: String,
    /// Id returned by `GET /persona`.
    #[serde(default)]
    pub session_id: Option<String>,
}

/// Response body for `POST /chat`: the echoed session id plus the seven
/// decoded reply fields.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ChatResponse {
    pub session_id: String,
    pub alex_perception: String,
    pub alex_inner_thought: String,
    pub alex_spoken_response: String,
    pub coaching_tip: String,
    pub is_off_topic: bool,
    pub goal_alignment_score: i64,
    pub director_warning: String,
}

impl ChatResponse {
    pub fn new(session_id: String, reply: DecodedReply) -> Self {
        Self {
            session_id,
            alex_perception: reply.alex_perception,
            alex_inner_thought: reply.alex_inner_thought,
            alex_spoken_response: reply.alex_spoken_response,
            coaching_tip: reply.coaching_tip,
            is_off_topic: reply.is_off_topic,
            goal_alignment_score: reply.goal_alignment_score,
            director_warning: reply.director_warning,
        }
    }
}
