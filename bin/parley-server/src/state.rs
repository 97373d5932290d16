//! Shared application state injected into every Axum handler.

use std::sync::Arc;

use parley_core::{CompletionGateway, ConversationService};

use crate::config::Config;

/// State shared across all HTTP handlers.
///
/// Built once in `main` and dropped when the server shuts down; there is no
/// ambient global state.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Server configuration (env-derived).
    pub config: Arc<Config>,
    /// Persona plus the in-memory session store.
    pub conversations: Arc<ConversationService>,
    /// `None` when no oracle credential is configured; `/chat` is then disabled.
    pub gateway: Option<Arc<CompletionGateway>>,
}
