//! Configuration for the HTTP service
//!
//! Values are layered: built-in defaults (with the domain settings of the
//! selected profile), then an optional config file, then
//! `LEDGER_*` environment variables (`__` separates nested keys, e.g.
//! `LEDGER_LEDGER__BACKFILL__MAX_LIMIT`). Command-line flags are applied on
//! top by the binary.

use std::net::SocketAddr;
use std::time::Duration;

use commander_ledger_client::cards::DEFAULT_CARD_API_URL;
use commander_ledger_core::LedgerConfig;
use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

/// Service configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Interface to bind
    pub host: String,

    /// Port to bind
    pub port: u16,

    /// Hosted backend project URL
    pub backend_url: String,

    /// Public API key of the hosted backend
    pub backend_anon_key: String,

    /// Service key, required for account deletion, format deletion and the
    /// backfill job
    pub backend_service_key: Option<String>,

    /// Card data API base URL
    pub card_api_url: String,

    /// Shared secret for the backfill endpoint; the endpoint is disabled
    /// without one
    pub backfill_secret: Option<String>,

    /// Storage bucket holding avatars
    pub avatar_bucket: String,

    /// Timeout for outbound requests, in seconds
    pub request_timeout_secs: u64,

    /// Default log filter when `RUST_LOG` is unset
    pub log_level: String,

    /// Domain settings
    pub ledger: LedgerConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            backend_url: "http://localhost:54321".to_string(),
            backend_anon_key: String::new(),
            backend_service_key: None,
            card_api_url: DEFAULT_CARD_API_URL.to_string(),
            backfill_secret: None,
            avatar_bucket: "avatars".to_string(),
            request_timeout_secs: 15,
            log_level: "info".to_string(),
            ledger: LedgerConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Defaults with the domain settings of a named profile
    pub fn for_profile(profile: &str) -> Result<Self, ConfigError> {
        let ledger =
            LedgerConfig::preset(profile).map_err(|e| ConfigError::Message(e.to_string()))?;
        Ok(Self {
            ledger,
            ..Self::default()
        })
    }

    /// Load defaults, then `path` if given, then the environment
    ///
    /// `profile` picks the domain presets the defaults start from.
    pub fn load(path: Option<&str>, profile: Option<&str>) -> Result<Self, ConfigError> {
        let defaults = match profile {
            Some(profile) => Self::for_profile(profile)?,
            None => Self::default(),
        };
        let mut builder = Config::builder().add_source(Config::try_from(&defaults)?);

        if let Some(path) = path {
            builder = builder.add_source(File::with_name(path));
        }

        let config: Self = builder
            .add_source(
                Environment::with_prefix("LEDGER")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    /// Create a configuration for tests
    pub fn for_testing() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 0,
            backend_anon_key: "anon-key".to_string(),
            backend_service_key: Some("service-key".to_string()),
            log_level: "debug".to_string(),
            ledger: LedgerConfig::testing(),
            ..Self::default()
        }
    }

    /// Reject configurations the service cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.backend_url.trim().is_empty() {
            return Err(ConfigError::Message("backend_url is required".to_string()));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Message(
                "request_timeout_secs must be positive".to_string(),
            ));
        }
        if matches!(&self.backfill_secret, Some(secret) if secret.is_empty()) {
            return Err(ConfigError::Message(
                "backfill_secret must not be empty when set".to_string(),
            ));
        }
        self.ledger
            .validate()
            .map_err(|e| ConfigError::Message(e.to_string()))
    }

    /// Socket address to bind
    pub fn listen_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| ConfigError::Message(format!("invalid listen address: {}", e)))
    }

    /// Outbound request timeout
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
