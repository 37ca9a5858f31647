//! Card data API client
//!
//! Looks up commander cards on a Scryfall-compatible API to read their color
//! identity. Only `GET /cards/<id>` and `GET /cards/named?exact=<name>` are
//! used.

use std::time::Duration;

use async_trait::async_trait;
use commander_ledger_core::ColorSet;
use reqwest::{Client, StatusCode, Url};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ClientError, Result};

/// Public Scryfall API
pub const DEFAULT_CARD_API_URL: &str = "https://api.scryfall.com";

const USER_AGENT: &str = concat!("commander-ledger/", env!("CARGO_PKG_VERSION"));

/// Image links of a card
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageUris {
    /// Cropped art
    #[serde(default)]
    pub art_crop: Option<String>,

    /// Normal-sized card image
    #[serde(default)]
    pub normal: Option<String>,
}

/// The card fields the services read
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardData {
    /// Card name
    pub name: String,

    /// Color identity letters
    #[serde(default)]
    pub color_identity: Vec<String>,

    /// Image links
    #[serde(default)]
    pub image_uris: Option<ImageUris>,
}

impl CardData {
    /// Canonical color identity
    pub fn colors(&self) -> ColorSet {
        ColorSet::from_items(&self.color_identity)
    }

    /// Best image for a commander tile
    pub fn image(&self) -> Option<&str> {
        let uris = self.image_uris.as_ref()?;
        uris.art_crop.as_deref().or(uris.normal.as_deref())
    }
}

/// How a card is identified
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CardRef {
    /// Card data API id
    Id(String),

    /// Exact card name
    Name(String),
}

impl std::fmt::Display for CardRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CardRef::Id(id) => write!(f, "card id {}", id),
            CardRef::Name(name) => write!(f, "card named {}", name),
        }
    }
}

/// Source of card data
#[async_trait]
pub trait CardSource: Send + Sync {
    /// Fetch one card
    async fn fetch_card(&self, card: CardRef) -> Result<CardData>;
}

/// Client for a Scryfall-compatible card data API
#[derive(Debug, Clone)]
pub struct ScryfallClient {
    /// API base URL
    base_url: Url,

    /// HTTP client
    client: Client,

    /// Request timeout
    timeout: Duration,
}

impl ScryfallClient {
    /// Create a new client
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| ClientError::Config(format!("invalid card API URL {}: {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::Config(format!(
                "card API URL {} cannot be a base",
                base_url
            )));
        }

        Ok(Self {
            base_url,
            client: Client::new(),
            timeout: Duration::from_secs(15),
        })
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn card_url(&self, card: &CardRef) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push("cards");
            match card {
                CardRef::Id(id) => {
                    segments.push(id);
                }
                CardRef::Name(_) => {
                    segments.push("named");
                }
            }
        }
        if let CardRef::Name(name) = card {
            url.query_pairs_mut().append_pair("exact", name);
        }
        url
    }
}

#[async_trait]
impl CardSource for ScryfallClient {
    async fn fetch_card(&self, card: CardRef) -> Result<CardData> {
        let url = self.card_url(&card);
        debug!(%url, "card lookup");

        let response = self
            .client
            .get(url)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .header(reqwest::header::ACCEPT, "application/json")
            .timeout(self.timeout)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(ClientError::NotFound(card.to_string()));
        }
        if !status.is_success() {
            let message = response.text().await?;
            return Err(ClientError::from_status(status, message));
        }

        Ok(response.json().await?)
    }
}
