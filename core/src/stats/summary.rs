//! Home page summary

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::{display_name, monthly_highlights, Dataset, MonthlyHighlights};
use crate::config::StatsConfig;
use crate::models::Participant;

/// Row counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Totals {
    /// Recorded matches
    pub matches: usize,

    /// Registered players
    pub players: usize,

    /// Registered decks
    pub decks: usize,
}

/// One line of the recent matches list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecentMatch {
    /// Match id
    pub match_id: Uuid,

    /// When it was played
    pub played_at: Option<DateTime<Utc>>,

    /// Winner's display name, `None` for a guest winner or no winner
    pub winner: Option<String>,

    /// Winning commander
    pub winning_commander: Option<String>,

    /// Pod size
    pub participants: usize,
}

/// Everything the home page shows
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HomeSummary {
    /// Row counts
    pub totals: Totals,

    /// Player and commander of the month
    pub highlights: MonthlyHighlights,

    /// Most recent matches, newest first
    pub recent_matches: Vec<RecentMatch>,
}

/// Build the home summary
pub fn home_summary(
    dataset: &Dataset,
    deck_count: usize,
    now: DateTime<Utc>,
    config: &StatsConfig,
) -> HomeSummary {
    let profiles = dataset.profile_index();

    let mut seats: HashMap<Uuid, Vec<&Participant>> = HashMap::new();
    for row in &dataset.participants {
        seats.entry(row.match_id).or_default().push(row);
    }

    let mut matches: Vec<_> = dataset.matches.iter().collect();
    matches.sort_by(|a, b| (b.timestamp(), b.id).cmp(&(a.timestamp(), a.id)));

    let recent_matches = matches
        .into_iter()
        .take(config.recent_matches)
        .map(|row| {
            let pod = seats.get(&row.id).map(Vec::as_slice).unwrap_or_default();
            let winner = pod.iter().find(|seat| seat.is_winner);

            RecentMatch {
                match_id: row.id,
                played_at: row.timestamp(),
                winner: winner
                    .and_then(|seat| seat.user_id)
                    .map(|id| display_name(&profiles, id)),
                winning_commander: winner
                    .and_then(|seat| seat.commander())
                    .map(str::to_string),
                participants: pod.len(),
            }
        })
        .collect();

    HomeSummary {
        totals: Totals {
            matches: dataset.matches.len(),
            players: dataset.profiles.len(),
            decks: deck_count,
        },
        highlights: monthly_highlights(dataset, now, config.month_window_days),
        recent_matches,
    }
}
