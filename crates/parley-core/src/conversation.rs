//! Session lifecycle: start a session, post a message.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info};

use crate::error::ConversationError;
use crate::gateway::CompletionGateway;
use crate::message::Message;
use crate::persona::Persona;
use crate::prompt::build_system_prompt;
use crate::reply::DecodedReply;
use crate::session::{SessionStore, TranscriptPolicy};

/// What a client receives when it starts a session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionStart {
    pub session_id: String,
    pub name: String,
    pub role: String,
    pub scenario: String,
    pub goal: String,
    pub opening_message: Value,
}

/// Owns the persona and the session store.
#[derive(Debug)]
pub struct ConversationService {
    persona: Arc<Persona>,
    sessions: SessionStore,
}

impl ConversationService {
    pub fn new(persona: Arc<Persona>, policy: TranscriptPolicy) -> Self {
        Self {
            persona,
            sessions: SessionStore::new(policy),
        }
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Create a session seeded with the system prompt and the opening line.
    pub fn start_session(&self) -> SessionStart {
        let seed = vec![
            Message::system(build_system_prompt(&self.persona)),
            Message::assistant(self.persona.opening_line()),
        ];
        let session_id = self.sessions.create(seed);
        info!(session_id = %session_id, active_sessions = self.sessions.len(), "session started");

        SessionStart {
            session_id,
            name: self.persona.name.clone(),
            role: self.persona.role.clone(),
            scenario: self.persona.scenario.clone(),
            goal: self.persona.goal.clone(),
            opening_message: self.persona.opening_message.clone(),
        }
    }

    /// Send `text` as the next user turn and return the decoded reply.
    ///
    /// The user message and the raw reply are committed together once the
    /// reply has decoded; any failure leaves the transcript untouched.
    pub async fn post_message(
        &self,
        gateway: &CompletionGateway,
        session_id: &str,
        text: &str,
    ) -> Result<DecodedReply, ConversationError> {
        let mut transcript = self
            .sessions
            .transcript(session_id)
            .ok_or(ConversationError::InvalidSession)?;

        let user = Message::user(text);
        transcript.push(user.clone());
        debug!(session_id, turns = transcript.len(), "forwarding transcript to oracle");

        let completion = gateway.complete(&transcript).await?;

        let len = self
            .sessions
            .record_exchange(session_id, user, Message::assistant(completion.raw))
            .ok_or(ConversationError::InvalidSession)?;

        info!(
            session_id,
            transcript_len = len,
            off_topic = completion.reply.is_off_topic,
            score = completion.reply.goal_alignment_score,
            "exchange recorded"
        );

        Ok(completion.reply)
    }
}
