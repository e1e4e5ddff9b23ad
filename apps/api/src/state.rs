use std::sync::Arc;

use crate::config::Config;
use crate::llm_client::TextGenerator;
use crate::store::RecordStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Record Store for users, auth tokens, sessions and questions.
    pub store: Arc<dyn RecordStore>,
    /// Process-wide generative client, built once at startup.
    pub llm: Arc<dyn TextGenerator>,
    pub config: Config,
}
