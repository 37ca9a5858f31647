//! Decks

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::non_blank;
use crate::archetypes::Archetype;
use crate::colors::ColorSet;
use crate::error::{CoreError, Result};

/// Longest accepted deck name
pub const MAX_DECK_NAME_LEN: usize = 120;

/// A row of the decks table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deck {
    /// Deck id
    pub id: Uuid,

    /// Owner
    pub user_id: Uuid,

    /// Deck name
    pub name: String,

    /// Commander card name
    #[serde(default)]
    pub commander_name: Option<String>,

    /// Commander card id in the card data API
    #[serde(default)]
    pub commander_scryfall_id: Option<String>,

    /// Commander art
    #[serde(default)]
    pub commander_image: Option<String>,

    /// Commander color identity as stored (one letter per entry)
    #[serde(default)]
    pub commander_colors: Option<Vec<String>>,

    /// Derived archetype code, `NULL` until computed
    #[serde(default)]
    pub color_code: Option<String>,

    /// Format the deck is built for
    #[serde(default)]
    pub format_id: Option<Uuid>,

    /// Creation time
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Deck {
    /// Stored color identity, `None` when the column is missing or empty
    pub fn stored_colors(&self) -> Option<ColorSet> {
        self.commander_colors
            .as_ref()
            .filter(|colors| !colors.is_empty())
            .map(ColorSet::from_items)
    }

    /// Archetype of the deck, preferring the stored code
    pub fn archetype(&self) -> Archetype {
        match (non_blank(self.color_code.as_deref()), self.stored_colors()) {
            (Some(code), _) => Archetype::classify(ColorSet::parse(code)),
            (None, Some(colors)) => Archetype::classify(colors),
            (None, None) => Archetype::classify(ColorSet::EMPTY),
        }
    }
}

/// Insert payload for the decks table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewDeck {
    /// Owner
    pub user_id: Uuid,

    /// Deck name
    pub name: String,

    /// Commander card name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commander_name: Option<String>,

    /// Commander card id in the card data API
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commander_scryfall_id: Option<String>,

    /// Commander art
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commander_image: Option<String>,

    /// Commander color identity
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commander_colors: Option<Vec<String>>,

    /// Archetype code derived from `commander_colors`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color_code: Option<String>,

    /// Format the deck is built for
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format_id: Option<Uuid>,
}

impl NewDeck {
    /// Create a payload with only the required columns
    pub fn new(user_id: Uuid, name: &str) -> Self {
        Self {
            user_id,
            name: name.to_string(),
            commander_name: None,
            commander_scryfall_id: None,
            commander_image: None,
            commander_colors: None,
            color_code: None,
            format_id: None,
        }
    }

    /// Canonicalize the text columns and derive `color_code` from the colors
    ///
    /// When no valid colors are given the code stays `None`, leaving the row
    /// for the backfill job.
    pub fn normalized(mut self) -> Self {
        self.name = self.name.trim().to_string();
        self.commander_name = non_blank(self.commander_name.as_deref()).map(str::to_string);
        self.commander_scryfall_id =
            non_blank(self.commander_scryfall_id.as_deref()).map(str::to_string);

        match self.commander_colors.take().map(ColorSet::from_items) {
            Some(set) if !set.is_empty() => {
                self.color_code = Some(set.code());
                self.commander_colors = Some(set.symbols());
            }
            _ => {
                self.commander_colors = None;
                self.color_code = None;
            }
        }

        self
    }

    /// Reject payloads the backend would store in a broken state
    pub fn validate(&self) -> Result<()> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(CoreError::Validation("deck name is required".to_string()));
        }
        if name.chars().count() > MAX_DECK_NAME_LEN {
            return Err(CoreError::Validation(format!(
                "deck name must be at most {} characters",
                MAX_DECK_NAME_LEN
            )));
        }
        Ok(())
    }
}
