use std::sync::Arc;

use tracing::{info, warn};

use crate::config::Config;
use crate::llm_client::{GenerationClient, TextGenerator};
use crate::storage::ResultStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub store: ResultStore,
    /// Generation capability, decided once at startup. `None` when the
    /// executable could not be resolved; AI toggles are then ignored.
    pub generator: Option<Arc<dyn TextGenerator>>,
}

impl AppState {
    /// Builds state from config, probing for the generation executable once.
    pub fn from_config(config: Config) -> Self {
        let client = GenerationClient::new(config.generation.clone());
        let generator: Option<Arc<dyn TextGenerator>> = if client.is_available() {
            info!(
                binary = %client.config().binary,
                model = client.model(),
                "Local AI agent ready"
            );
            Some(Arc::new(client))
        } else {
            warn!(
                "{} not found on PATH, AI features will be disabled",
                client.config().binary
            );
            None
        };

        Self {
            store: ResultStore::new(config.results_dir.clone()),
            config,
            generator,
        }
    }

    pub fn ai_available(&self) -> bool {
        self.generator.is_some()
    }
}
