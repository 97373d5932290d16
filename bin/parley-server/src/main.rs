//! parley-server – entry point.
//!
//! Startup order:
//! 1. Load `.env`, then parse configuration from environment variables.
//! 2. Initialise structured tracing (JSON or pretty, optional rolling file).
//! 3. Load the persona document.
//! 4. Build the completion gateway if a credential is configured.
//! 5. Build the Axum router and start the HTTP server with graceful shutdown.

mod config;
mod error;
mod middleware;
mod routes;
mod schemas;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use parley_core::oracle::OpenAiOracle;
use parley_core::{CompletionGateway, ConversationService, Persona};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::Config;
use crate::state::AppState;

const BUNDLED_PERSONA: &str = include_str!("../assets/persona.json");

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Configuration ───────────────────────────────────────────────────────
    let dotenv_loaded = dotenv::dotenv().is_ok();
    let cfg = Config::from_env();

    // ── 2. Tracing ─────────────────────────────────────────────────────────────
    // Held until shutdown so buffered file logs are flushed.
    let _log_guard = init_tracing(&cfg);

    info!(version = env!("CARGO_PKG_VERSION"), dotenv_loaded, "parley-server starting");

    // ── 3. Persona ─────────────────────────────────────────────────────────────
    let persona = match &cfg.persona_path {
        Some(path) => {
            let persona = Persona::load(path)?;
            info!(path = %path, name = %persona.name, "persona loaded");
            persona
        }
        None => {
            let persona = Persona::from_json_str(BUNDLED_PERSONA)?;
            info!(name = %persona.name, "using bundled persona");
            persona
        }
    };

    // ── 4. Completion gateway ──────────────────────────────────────────────────
    let gateway = match &cfg.openai_api_key {
        Some(key) => {
            let oracle = OpenAiOracle::new(key.clone(), &cfg.openai_base_url)?;
            info!(
                endpoint = %oracle.endpoint(),
                model = %cfg.model,
                "completion service configured"
            );
            Some(Arc::new(
                CompletionGateway::new(Arc::new(oracle), cfg.completion_params())
                    .with_timeout(cfg.oracle_timeout),
            ))
        }
        None => {
            warn!("OPENAI_API_KEY environment variable not set; chat functionality will not work");
            None
        }
    };

    // ── 5. Shared application state ────────────────────────────────────────────
    let state = Arc::new(AppState {
        conversations: Arc::new(ConversationService::new(
            Arc::new(persona),
            cfg.transcript_policy(),
        )),
        config: Arc::new(cfg.clone()),
        gateway,
    });

    // ── 6. HTTP server with graceful shutdown ──────────────────────────────────
    let app = routes::build(Arc::clone(&state));
    let addr: SocketAddr = cfg.bind_address.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "HTTP server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!(
        sessions = state.conversations.sessions().len(),
        "parley-server stopped; in-memory sessions discarded"
    );
    Ok(())
}

/// Install the global subscriber. Returns the file writer guard, if any.
fn init_tracing(cfg: &Config) -> Option<WorkerGuard> {
    // Build the log-level filter, warning loudly if the configured value is
    // not a valid tracing filter expression.
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(f) => f,
        Err(_) => match cfg.log_level.parse::<EnvFilter>() {
            Ok(f) => f,
            Err(e) => {
                eprintln!(
                    "WARN: PARLEY_LOG='{}' is not a valid tracing filter ({}); \
                     falling back to 'info'",
                    cfg.log_level, e
                );
                EnvFilter::new("info")
            }
        },
    };

    let (file_layer, guard) = match &cfg.log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "parley-server.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(writer)
                .json();
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    let registry = tracing_subscriber::registry().with(env_filter).with(file_layer);

    if cfg.log_json {
        registry
            .with(tracing_subscriber::fmt::layer().with_target(true).with_thread_ids(true).json())
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_target(true).with_thread_ids(true))
            .init();
    }

    guard
}

/// Returns a future that resolves when SIGINT (Ctrl-C) or SIGTERM is received.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to install CTRL+C signal handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut s) => {
                s.recv().await;
            }
            Err(e) => warn!(error = %e, "failed to install SIGTERM handler"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c   => {}
        _ = terminate => {}
    }

    info!("shutdown signal received; starting graceful shutdown");
}
