//! Data models for Commander Ledger
//!
//! Rows read from the hosted backend and the insert payloads written to it.
//! The backend owns the schema; these types only describe the columns the
//! services read or write.

mod deck;
mod format;
mod game;
mod profile;

pub use deck::{Deck, NewDeck};
pub use format::Format;
pub use game::{validate_roster, Match, NewMatch, NewParticipant, Participant};
pub use profile::{short_id, Profile};

/// Table names in the hosted backend
pub mod tables {
    /// Player profiles
    pub const PROFILES: &str = "profiles";

    /// Decks
    pub const DECKS: &str = "decks";

    /// Matches
    pub const MATCHES: &str = "matches";

    /// One row per player per match
    pub const PARTICIPANTS: &str = "match_participants";

    /// Games / formats
    pub const FORMATS: &str = "games";
}

/// Trim an optional text column, mapping blank values to `None`
pub(crate) fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}
