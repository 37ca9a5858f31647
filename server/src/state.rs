//! Shared handler state

use std::sync::Arc;

use commander_ledger_client::{CardSource, ClientError, HostedBackend, RestBackend, ScryfallClient};

use crate::config::ServerConfig;

/// State shared by every handler
#[derive(Clone)]
pub struct AppState {
    /// Hosted backend
    pub backend: Arc<dyn HostedBackend>,

    /// Card data API
    pub cards: Arc<dyn CardSource>,

    /// Service configuration
    pub config: Arc<ServerConfig>,
}

impl AppState {
    /// Create state from already built collaborators
    pub fn new(
        backend: Arc<dyn HostedBackend>,
        cards: Arc<dyn CardSource>,
        config: ServerConfig,
    ) -> Self {
        Self {
            backend,
            cards,
            config: Arc::new(config),
        }
    }

    /// Build the REST backend and card client described by `config`
    pub fn from_config(config: ServerConfig) -> Result<Self, ClientError> {
        let timeout = config.request_timeout();

        let mut backend =
            RestBackend::new(&config.backend_url, &config.backend_anon_key).with_timeout(timeout);
        if let Some(key) = &config.backend_service_key {
            backend = backend.with_service_key(key);
        }

        let cards = ScryfallClient::new(&config.card_api_url)?.with_timeout(timeout);

        Ok(Self::new(Arc::new(backend), Arc::new(cards), config))
    }

    /// Whether privileged backend calls can be made
    pub fn has_service_key(&self) -> bool {
        self.config.backend_service_key.is_some()
    }
}
