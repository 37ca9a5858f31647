//! Matches and their participants

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::non_blank;
use crate::colors::ColorSet;
use crate::error::{CoreError, Result};

/// Largest pod accepted when recording a match
pub const MAX_PARTICIPANTS: usize = 10;

/// A row of the matches table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
    /// Match id
    pub id: Uuid,

    /// Format the match was played under
    #[serde(default)]
    pub format_id: Option<Uuid>,

    /// Event the match belongs to
    #[serde(default)]
    pub event_id: Option<Uuid>,

    /// User who recorded the match
    #[serde(default)]
    pub created_by: Option<Uuid>,

    /// When the match was played
    #[serde(default)]
    pub played_at: Option<DateTime<Utc>>,

    /// When the row was inserted
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,

    /// Free-form notes
    #[serde(default)]
    pub notes: Option<String>,
}

impl Match {
    /// Timestamp used for ordering, `played_at` falling back to `created_at`
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.played_at.or(self.created_at)
    }
}

/// A row of the match participants table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    /// Match the row belongs to
    pub match_id: Uuid,

    /// Player profile; guests have none
    #[serde(default)]
    pub user_id: Option<Uuid>,

    /// Deck played
    #[serde(default)]
    pub deck_id: Option<Uuid>,

    /// Commander card name
    #[serde(default)]
    pub commander_name: Option<String>,

    /// Commander art
    #[serde(default)]
    pub commander_image: Option<String>,

    /// Commander color identity
    #[serde(default)]
    pub commander_colors: Option<Vec<String>>,

    /// Whether this player won the match
    #[serde(default)]
    pub is_winner: bool,

    /// Players eliminated by this player
    #[serde(default)]
    pub kills: i64,

    /// Damage dealt over the match
    #[serde(default)]
    pub damage_dealt: i64,

    /// Finishing position, 1 for the winner
    #[serde(default)]
    pub placement: Option<i32>,
}

impl Participant {
    /// Commander name with surrounding whitespace removed, `None` when blank
    pub fn commander(&self) -> Option<&str> {
        non_blank(self.commander_name.as_deref())
    }

    /// Commander art, `None` when blank
    pub fn image(&self) -> Option<&str> {
        non_blank(self.commander_image.as_deref())
    }

    /// Commander color identity, `None` when the column is missing or empty
    pub fn colors(&self) -> Option<ColorSet> {
        self.commander_colors
            .as_ref()
            .filter(|colors| !colors.is_empty())
            .map(ColorSet::from_items)
    }
}

/// Insert payload for the matches table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewMatch {
    /// Format the match was played under
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format_id: Option<Uuid>,

    /// Event the match belongs to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_id: Option<Uuid>,

    /// User recording the match
    pub created_by: Uuid,

    /// When the match was played; the backend default applies when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub played_at: Option<DateTime<Utc>>,

    /// Free-form notes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Insert payload for the match participants table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewParticipant {
    /// Match the row belongs to; filled in once the match row exists
    pub match_id: Uuid,

    /// Player profile
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<Uuid>,

    /// Deck played
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deck_id: Option<Uuid>,

    /// Commander card name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commander_name: Option<String>,

    /// Commander art
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commander_image: Option<String>,

    /// Commander color identity, canonicalized before insert
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commander_colors: Option<Vec<String>>,

    /// Whether this player won
    pub is_winner: bool,

    /// Players eliminated
    pub kills: i64,

    /// Damage dealt
    pub damage_dealt: i64,

    /// Finishing position
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placement: Option<i32>,
}

impl NewParticipant {
    /// Canonicalize the commander columns
    pub fn normalized(mut self) -> Self {
        self.commander_name = non_blank(self.commander_name.as_deref()).map(str::to_string);
        self.commander_colors = self
            .commander_colors
            .take()
            .map(|colors| ColorSet::from_items(&colors))
            .filter(|set| !set.is_empty())
            .map(|set| set.symbols());
        self
    }
}

/// Check a roster before a match is recorded
///
/// A match needs at least one participant, at most one winner, no player
/// listed twice and no negative tallies.
pub fn validate_roster(participants: &[NewParticipant]) -> Result<()> {
    if participants.is_empty() {
        return Err(CoreError::Validation(
            "a match needs at least one participant".to_string(),
        ));
    }

    if participants.len() > MAX_PARTICIPANTS {
        return Err(CoreError::Validation(format!(
            "a match has at most {} participants",
            MAX_PARTICIPANTS
        )));
    }

    if participants.iter().filter(|p| p.is_winner).count() > 1 {
        return Err(CoreError::Validation(
            "a match has at most one winner".to_string(),
        ));
    }

    let mut seen = std::collections::HashSet::new();
    for participant in participants {
        if participant.kills < 0 || participant.damage_dealt < 0 {
            return Err(CoreError::Validation(
                "kills and damage cannot be negative".to_string(),
            ));
        }
        if let Some(user_id) = participant.user_id {
            if !seen.insert(user_id) {
                return Err(CoreError::Validation(format!(
                    "player {} is listed more than once",
                    user_id
                )));
            }
        }
    }

    Ok(())
}
