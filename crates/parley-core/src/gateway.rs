//! Completion gateway: transcript in, decoded reply out.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::error::{GatewayError, OracleError};
use crate::message::Message;
use crate::oracle::{CompletionParams, Oracle};
use crate::reply::{DecodedReply, decode_reply};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Result of one successful oracle round-trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    /// The oracle's text exactly as received; this is what gets stored.
    pub raw: String,
    pub reply: DecodedReply,
}

/// Sends whole transcripts to an [`Oracle`] and decodes the answers.
///
/// Each call is bounded by `timeout`. Dropping the returned future cancels
/// the in-flight request.
#[derive(Clone)]
pub struct CompletionGateway {
    oracle: Arc<dyn Oracle>,
    params: CompletionParams,
    timeout: Duration,
}

impl std::fmt::Debug for CompletionGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompletionGateway")
            .field("params", &self.params)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl CompletionGateway {
    pub fn new(oracle: Arc<dyn Oracle>, params: CompletionParams) -> Self {
        Self {
            oracle,
            params,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Send `transcript` and decode the answer. No retries.
    pub async fn complete(&self, transcript: &[Message]) -> Result<Completion, GatewayError> {
        let started = Instant::now();

        let raw = tokio::time::timeout(self.timeout, self.oracle.complete(transcript, &self.params))
            .await
            .map_err(|_| OracleError::Timeout(self.timeout))??;

        debug!(
            latency_ms = started.elapsed().as_millis() as u64,
            reply_len = raw.len(),
            "oracle answered"
        );

        let reply = decode_reply(&raw).inspect_err(|e| {
            warn!(error = %e, reply_len = raw.len(), "oracle reply could not be decoded");
        })?;

        Ok(Completion { raw, reply })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::error::DecodeError;
    use crate::oracle::ScriptedOracle;
    use tracing_test::traced_test;

    fn gateway(oracle: ScriptedOracle) -> (CompletionGateway, Arc<ScriptedOracle>) {
        let oracle = Arc::new(oracle);
        let gw = CompletionGateway::new(oracle.clone(), CompletionParams::default());
        (gw, oracle)
    }

    #[tokio::test]
    async fn decodes_and_keeps_raw_text() {
        let raw = r#"{"alex_spoken_response":"Hi","is_off_topic":true}"#;
        let (gw, oracle) = gateway(ScriptedOracle::always(raw));

        let transcript = vec![Message::system("prompt"), Message::user("hello")];
        let completion = gw.complete(&transcript).await.unwrap();

        assert_eq!(completion.raw, raw);
        assert_eq!(completion.reply.alex_spoken_response, "Hi");
        assert!(completion.reply.is_off_topic);
        assert_eq!(oracle.last_transcript().unwrap(), transcript);
    }

    #[tokio::test]
    async fn oracle_failure_is_not_retried() {
        let (gw, oracle) = gateway(ScriptedOracle::always("{}").then_fail("boom"));
        let err = gw.complete(&[Message::user("x")]).await.unwrap_err();
        assert!(matches!(err, GatewayError::Oracle(OracleError::Status { .. })));
        assert_eq!(oracle.calls(), 1);
    }

    #[tokio::test]
    #[traced_test]
    async fn undecodable_reply_is_a_gateway_error() {
        let (gw, _) = gateway(ScriptedOracle::always("not json at all"));
        let err = gw.complete(&[Message::user("x")]).await.unwrap_err();
        assert!(matches!(err, GatewayError::Decode(DecodeError::Json(_))));
        assert!(logs_contain("oracle reply could not be decoded"));
    }

    #[tokio::test(start_paused = true)]
    async fn slow_oracle_hits_deadline() {
        let (gw, _) = gateway(ScriptedOracle::always("{}").with_delay(Duration::from_secs(120)));
        let gw = gw.with_timeout(Duration::from_secs(5));
        let err = gw.complete(&[Message::user("x")]).await.unwrap_err();
        match err {
            GatewayError::Oracle(OracleError::Timeout(d)) => assert_eq!(d, Duration::from_secs(5)),
            other => panic!("unexpected: {other:?}"),
        }
    }
}
