//! In-process oracle that replays canned replies.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use super::{CompletionParams, Oracle};
use crate::error::OracleError;
use crate::message::Message;

/// Returns queued replies in order, then repeats the fallback (if any).
///
/// Every call is counted and the last transcript is kept so callers can
/// assert on what would have been sent over the wire.
#[derive(Debug, Default)]
pub struct ScriptedOracle {
    replies: Mutex<VecDeque<Result<String, String>>>,
    fallback: Option<String>,
    delay: Option<Duration>,
    calls: AtomicUsize,
    last_transcript: Mutex<Option<Vec<Message>>>,
}

impl ScriptedOracle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Always answer with `reply`.
    pub fn always(reply: impl Into<String>) -> Self {
        Self {
            fallback: Some(reply.into()),
            ..Self::default()
        }
    }

    /// Queue a successful reply.
    pub fn then_reply(self, reply: impl Into<String>) -> Self {
        self.push(Ok(reply.into()));
        self
    }

    /// Queue a failure; it surfaces as a 503 from the completion service.
    pub fn then_fail(self, message: impl Into<String>) -> Self {
        self.push(Err(message.into()));
        self
    }

    /// Sleep before answering, to exercise deadlines.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_transcript(&self) -> Option<Vec<Message>> {
        self.last_transcript
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    fn push(&self, entry: Result<String, String>) {
        self.replies
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push_back(entry);
    }
}

#[async_trait]
impl Oracle for ScriptedOracle {
    async fn complete(
        &self,
        transcript: &[Message],
        _params: &CompletionParams,
    ) -> Result<String, OracleError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self
            .last_transcript
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = Some(transcript.to_vec());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let next = self
            .replies
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .pop_front();

        match next {
            Some(Ok(reply)) => Ok(reply),
            Some(Err(body)) => Err(OracleError::Status { status: 503, body }),
            None => self.fallback.clone().ok_or(OracleError::Exhausted),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[tokio::test]
    async fn replays_queue_then_fallback() {
        let oracle = ScriptedOracle::always("{}")
            .then_reply(r#"{"coaching_tip":"a"}"#)
            .then_fail("overloaded");
        let params = CompletionParams::default();

        assert_eq!(oracle.complete(&[], &params).await.unwrap(), r#"{"coaching_tip":"a"}"#);
        assert!(matches!(
            oracle.complete(&[], &params).await,
            Err(OracleError::Status { status: 503, .. })
        ));
        assert_eq!(oracle.complete(&[], &params).await.unwrap(), "{}");
        assert_eq!(oracle.calls(), 3);
    }

    #[tokio::test]
    async fn empty_script_is_exhausted() {
        let oracle = ScriptedOracle::new();
        let err = oracle
            .complete(&[Message::user("hi")], &CompletionParams::default())
            .await
            .unwrap_err();
        assert!(matches!(err, OracleError::Exhausted));
        assert_eq!(oracle.last_transcript().unwrap(), vec![Message::user("hi")]);
    }
}
