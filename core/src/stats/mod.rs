//! Statistics over match history
//!
//! Every report is a pure reduction over rows fetched wholesale from the
//! backend. Rows are ordered by the match timestamp (then match id) before
//! anything order-sensitive, such as streaks or first-seen commander art, is
//! computed. Ties in rankings are broken by name and then id, never by
//! iteration order.

mod highlights;
mod leaderboard;
mod streak;
mod summary;
mod usage;

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{short_id, Match, Participant, Profile};

pub use highlights::{monthly_highlights, CommanderHighlight, MonthlyHighlights, PlayerHighlight};
pub use leaderboard::{build_leaderboard, player_report, PlayerReport, PlayerStanding};
pub use streak::longest_win_streak;
pub use summary::{home_summary, HomeSummary, RecentMatch, Totals};
pub use usage::{color_usage, commander_usage, ColorUsage, CommanderUsage};

/// Everything the reports are computed from
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Dataset {
    /// Match rows
    pub matches: Vec<Match>,

    /// Participant rows
    pub participants: Vec<Participant>,

    /// Profile rows
    pub profiles: Vec<Profile>,
}

/// A participant row joined with its match timestamp
pub(crate) struct TimedParticipant<'a> {
    pub(crate) at: Option<DateTime<Utc>>,
    pub(crate) row: &'a Participant,
}

impl Dataset {
    /// Create a dataset from fetched rows
    pub fn new(
        matches: Vec<Match>,
        participants: Vec<Participant>,
        profiles: Vec<Profile>,
    ) -> Self {
        Self {
            matches,
            participants,
            profiles,
        }
    }

    /// Participant rows in chronological order
    ///
    /// Rows whose match is unknown are dropped since they cannot be placed on
    /// the timeline. Matches without a timestamp sort first.
    pub(crate) fn timeline(&self) -> Vec<TimedParticipant<'_>> {
        let matches: HashMap<Uuid, &Match> = self.matches.iter().map(|m| (m.id, m)).collect();

        let mut rows: Vec<(Option<DateTime<Utc>>, Uuid, &Participant)> = self
            .participants
            .iter()
            .filter_map(|row| matches.get(&row.match_id).map(|m| (m.timestamp(), m.id, row)))
            .collect();

        // Stable sort keeps the per-match row order intact
        rows.sort_by(|a, b| (a.0, a.1).cmp(&(b.0, b.1)));

        rows.into_iter()
            .map(|(at, _, row)| TimedParticipant { at, row })
            .collect()
    }

    /// Profile rows by id
    pub(crate) fn profile_index(&self) -> HashMap<Uuid, &Profile> {
        self.profiles.iter().map(|p| (p.id, p)).collect()
    }
}

/// Display name for a player id, falling back to a short id
pub(crate) fn display_name(profiles: &HashMap<Uuid, &Profile>, id: Uuid) -> String {
    profiles
        .get(&id)
        .map(|profile| profile.display_name())
        .unwrap_or_else(|| short_id(id))
}

/// Avatar for a player id
pub(crate) fn avatar_url(profiles: &HashMap<Uuid, &Profile>, id: Uuid) -> Option<String> {
    profiles.get(&id).and_then(|profile| profile.avatar_url.clone())
}
