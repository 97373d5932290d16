//! In-memory session store.
//!
//! Sessions live until the process exits. The map is guarded by a plain
//! mutex that is never held across an `.await`; callers snapshot a
//! transcript, talk to the oracle unlocked, then commit the whole exchange in
//! one short critical section.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::message::Message;

/// Number of leading entries (system prompt, opening line) that are never
/// evicted.
pub const SEED_LEN: usize = 2;

pub const DEFAULT_MAX_EXCHANGES: usize = 100;

/// How much history a session keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TranscriptPolicy {
    /// Maximum user/assistant exchanges kept after the seed entries.
    /// `None` keeps everything.
    pub max_exchanges: Option<usize>,
}

impl TranscriptPolicy {
    pub fn unbounded() -> Self {
        Self {
            max_exchanges: None,
        }
    }

    pub fn capped(max_exchanges: usize) -> Self {
        Self {
            max_exchanges: Some(max_exchanges),
        }
    }
}

impl Default for TranscriptPolicy {
    fn default() -> Self {
        Self::capped(DEFAULT_MAX_EXCHANGES)
    }
}

/// One conversation.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: String,
    pub transcript: Vec<Message>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Process-wide map from session id to [`Session`].
pub struct SessionStore {
    sessions: Mutex<HashMap<String, Session>>,
    policy: TranscriptPolicy,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SessionStore({} sessions, {:?})", self.len(), self.policy)
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(TranscriptPolicy::default())
    }
}

impl SessionStore {
    pub fn new(policy: TranscriptPolicy) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            policy,
        }
    }

    /// Store a new session seeded with `seed` and return its fresh id.
    pub fn create(&self, seed: Vec<Message>) -> String {
        let now = Utc::now();
        let mut map = self.lock();
        let id = loop {
            let candidate = Uuid::new_v4().to_string();
            if !map.contains_key(&candidate) {
                break candidate;
            }
        };
        map.insert(
            id.clone(),
            Session {
                id: id.clone(),
                transcript: seed,
                created_at: now,
                updated_at: now,
            },
        );
        id
    }

    pub fn get(&self, id: &str) -> Option<Session> {
        self.lock().get(id).cloned()
    }

    /// Copy of the session's transcript, or `None` for an unknown id.
    pub fn transcript(&self, id: &str) -> Option<Vec<Message>> {
        self.lock().get(id).map(|s| s.transcript.clone())
    }

    /// Append a user message and the assistant reply it produced, then apply
    /// the transcript policy. Returns the new transcript length, or `None` if
    /// the session does not exist.
    pub fn record_exchange(&self, id: &str, user: Message, assistant: Message) -> Option<usize> {
        let mut map = self.lock();
        let session = map.get_mut(id)?;
        session.transcript.push(user);
        session.transcript.push(assistant);
        trim(&mut session.transcript, self.policy);
        session.updated_at = Utc::now();
        Some(session.transcript.len())
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Session>> {
        // The map holds no cross-entry invariants, so a poisoned lock is still usable.
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Drop the oldest exchanges after the seed until the policy is met.
fn trim(transcript: &mut Vec<Message>, policy: TranscriptPolicy) {
    let Some(max) = policy.max_exchanges else {
        return;
    };
    let history = transcript.len().saturating_sub(SEED_LEN);
    let limit = max * 2;
    if history > limit {
        let excess = history - limit;
        transcript.drain(SEED_LEN..SEED_LEN + excess);
    }
}
