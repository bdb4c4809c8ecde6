use std::sync::Arc;

use crate::config::Config;
use crate::llm_client::TextGenerator;
use crate::session::SessionStore;
use crate::users::UserDirectory;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Live transcripts. Built once at startup and never torn down.
    pub sessions: Arc<SessionStore>,
    pub users: Arc<UserDirectory>,
    /// Pluggable generator. Default: the Gemini `LlmClient`.
    pub generator: Arc<dyn TextGenerator>,
    pub config: Config,
}

impl AppState {
    pub fn new(config: Config, generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            sessions: Arc::new(SessionStore::new()),
            users: Arc::new(UserDirectory::new()),
            generator,
            config,
        }
    }
}
