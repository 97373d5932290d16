//! Server configuration, loaded from environment variables at startup.

use std::time::Duration;

use parley_core::TranscriptPolicy;
use parley_core::oracle::openai::DEFAULT_BASE_URL;
use parley_core::oracle::{CompletionParams, DEFAULT_MAX_TOKENS, DEFAULT_MODEL, DEFAULT_TEMPERATURE};
use parley_core::session::DEFAULT_MAX_EXCHANGES;

/// Runtime configuration for parley-server.
///
/// Every field except the oracle credential has a default, so the server
/// starts without any environment variables set; `/chat` then answers 500
/// until `OPENAI_API_KEY` is provided.
#[derive(Clone)]
pub struct Config {
    /// TCP address to bind (default: `"0.0.0.0:8000"`).
    pub bind_address: String,

    /// Path of the persona JSON document. `None` uses the bundled persona.
    pub persona_path: Option<String>,

    /// Directory served under `/static`. `None` serves the bundled assets.
    pub static_dir: Option<String>,

    /// Credential for the completion service. `None` disables `/chat`.
    pub openai_api_key: Option<String>,

    /// Base URL of the OpenAI-compatible API.
    pub openai_base_url: String,

    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,

    /// Deadline for one oracle call.
    pub oracle_timeout: Duration,

    /// Exchanges kept per session; `None` keeps everything.
    pub max_exchanges: Option<usize>,

    /// `tracing` filter string, e.g. `"info"` or `"debug,tower_http=warn"`.
    pub log_level: String,

    /// When `true`, emit log records as newline-delimited JSON.
    pub log_json: bool,

    /// When set, logs are also written to a daily-rolling file in this directory.
    pub log_dir: Option<String>,

    /// Comma-separated list of allowed CORS origins; `None` allows any.
    pub cors_allowed_origins: Option<String>,

    /// Serve the OpenAPI document at `/api-docs/openapi.json`.
    pub enable_api_docs: bool,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("bind_address", &self.bind_address)
            .field("persona_path", &self.persona_path)
            .field("static_dir", &self.static_dir)
            .field("openai_api_key", &self.openai_api_key.as_ref().map(|_| "<redacted>"))
            .field("openai_base_url", &self.openai_base_url)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("oracle_timeout", &self.oracle_timeout)
            .field("max_exchanges", &self.max_exchanges)
            .field("log_level", &self.log_level)
            .field("log_json", &self.log_json)
            .field("log_dir", &self.log_dir)
            .field("cors_allowed_origins", &self.cors_allowed_origins)
            .field("enable_api_docs", &self.enable_api_docs)
            .finish()
    }
}

impl Config {
    /// Build [`Config`] from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build [`Config`] from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let env_or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_owned());
        let non_empty = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_owned())
                .filter(|v| !v.is_empty())
        };
        let flag = |key: &str, default: bool| {
            lookup(key)
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(default)
        };

        let max_exchanges = match parse_or(&lookup, "PARLEY_MAX_EXCHANGES", DEFAULT_MAX_EXCHANGES) {
            0 => None,
            n => Some(n),
        };

        Self {
            bind_address: env_or("PARLEY_BIND", "0.0.0.0:8000"),
            persona_path: non_empty("PARLEY_PERSONA_PATH"),
            static_dir: non_empty("PARLEY_STATIC_DIR"),
            openai_api_key: non_empty("OPENAI_API_KEY"),
            openai_base_url: env_or("OPENAI_BASE_URL", DEFAULT_BASE_URL),
            model: env_or("PARLEY_MODEL", DEFAULT_MODEL),
            temperature: parse_or(&lookup, "PARLEY_TEMPERATURE", DEFAULT_TEMPERATURE),
            max_tokens: parse_or(&lookup, "PARLEY_MAX_TOKENS", DEFAULT_MAX_TOKENS),
            oracle_timeout: Duration::from_secs(parse_or(
                &lookup,
                "PARLEY_ORACLE_TIMEOUT_SECS",
                60,
            )),
            max_exchanges,
            log_level: env_or("PARLEY_LOG", "info"),
            log_json: flag("PARLEY_LOG_JSON", false),
            log_dir: non_empty("PARLEY_LOG_DIR"),
            cors_allowed_origins: non_empty("PARLEY_CORS_ORIGINS"),
            enable_api_docs: flag("PARLEY_ENABLE_API_DOCS", true),
        }
    }

    pub fn completion_params(&self) -> CompletionParams {
        CompletionParams {
            model: self.model.clone(),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        }
    }

    pub fn transcript_policy(&self) -> TranscriptPolicy {
        TranscriptPolicy {
            max_exchanges: self.max_exchanges,
        }
    }
}

// ── private helpers ──────────────────────────────────────────────────────────

fn parse_or<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> T {
    lookup(key)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod test {
    use super::*;
    use std::collections::HashMap;

    fn config_with(pairs: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_without_environment() {
        let cfg = config_with(&[]);
        assert_eq!(cfg.bind_address, "0.0.0.0:8000");
        assert!(cfg.persona_path.is_none());
        assert!(cfg.static_dir.is_none());
        assert!(cfg.openai_api_key.is_none());
        assert_eq!(cfg.completion_params(), CompletionParams::default());
        assert_eq!(cfg.oracle_timeout, Duration::from_secs(60));
        assert_eq!(cfg.max_exchanges, Some(DEFAULT_MAX_EXCHANGES));
        assert!(cfg.enable_api_docs);
        assert!(!cfg.log_json);
    }

    #[test]
    fn empty_credential_counts_as_unset() {
        let cfg = config_with(&[("OPENAI_API_KEY", "  ")]);
        assert!(cfg.openai_api_key.is_none());
        let cfg = config_with(&[("OPENAI_API_KEY", "sk-abc")]);
        assert_eq!(cfg.openai_api_key.as_deref(), Some("sk-abc"));
    }

    #[test]
    fn overrides_are_parsed() {
        let cfg = config_with(&[
            ("PARLEY_TEMPERATURE", "0.2"),
            ("PARLEY_MAX_TOKENS", "400"),
            ("PARLEY_MODEL", "gpt-4o-mini"),
            ("PARLEY_ORACLE_TIMEOUT_SECS", "15"),
            ("PARLEY_LOG_JSON", "TRUE"),
            ("PARLEY_ENABLE_API_DOCS", "false"),
        ]);
        assert_eq!(cfg.temperature, 0.2);
        assert_eq!(cfg.max_tokens, 400);
        assert_eq!(cfg.model, "gpt-4o-mini");
        assert_eq!(cfg.oracle_timeout, Duration::from_secs(15));
        assert!(cfg.log_json);
        assert!(!cfg.enable_api_docs);
    }

    #[test]
    fn unparsable_numbers_fall_back_to_defaults() {
        let cfg = config_with(&[("PARLEY_MAX_TOKENS", "lots"), ("PARLEY_TEMPERATURE", "")]);
        assert_eq!(cfg.max_tokens, DEFAULT_MAX_TOKENS);
        assert_eq!(cfg.temperature, DEFAULT_TEMPERATURE);
    }

    #[test]
    fn zero_max_exchanges_means_unbounded() {
        let cfg = config_with(&[("PARLEY_MAX_EXCHANGES", "0")]);
        assert_eq!(cfg.transcript_policy(), TranscriptPolicy::unbounded());
        let cfg = config_with(&[("PARLEY_MAX_EXCHANGES", "8")]);
        assert_eq!(cfg.transcript_policy(), TranscriptPolicy::capped(8));
    }

    #[test]
    fn debug_redacts_credential() {
        let cfg = config_with(&[("OPENAI_API_KEY", "sk-very-secret")]);
        let rendered = format!("{cfg:?}");
        assert!(!rendered.contains("sk-very-secret"));
        assert!(rendered.contains("<redacted>"));
    }
}
