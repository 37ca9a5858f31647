//! Player and commander of the month

use std::cmp::Ordering;
use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::{avatar_url, display_name, Dataset};
use crate::config::MAX_MONTH_WINDOW_DAYS;

/// The player with the most wins in the window
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayerHighlight {
    /// Player id
    pub player_id: Uuid,

    /// Display name
    pub display_name: String,

    /// Avatar image URL
    pub avatar_url: Option<String>,

    /// Wins in the window
    pub wins: usize,
}

/// The commander with the most wins in the window
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommanderHighlight {
    /// Commander card name
    pub name: String,

    /// First art seen for it in the window
    pub image: Option<String>,

    /// Wins in the window
    pub wins: usize,
}

/// Highlights over the trailing window
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyHighlights {
    /// Start of the window (inclusive)
    pub window_start: DateTime<Utc>,

    /// Player of the month, if anyone won in the window
    pub player_of_month: Option<PlayerHighlight>,

    /// Commander of the month, if a named commander won in the window
    pub commander_of_month: Option<CommanderHighlight>,
}

/// Compute the highlights for the `window_days` days before `now`
///
/// Equal win counts go to the alphabetically first name (case-insensitive),
/// then to the lowest id.
pub fn monthly_highlights(
    dataset: &Dataset,
    now: DateTime<Utc>,
    window_days: i64,
) -> MonthlyHighlights {
    let window_start = now - Duration::days(window_days.clamp(0, MAX_MONTH_WINDOW_DAYS));
    let profiles = dataset.profile_index();

    let mut player_wins: HashMap<Uuid, usize> = HashMap::new();
    let mut commander_wins: HashMap<String, (usize, Option<String>)> = HashMap::new();

    for timed in dataset.timeline() {
        let in_window = timed.at.is_some_and(|at| at >= window_start && at <= now);
        if !in_window {
            continue;
        }

        // Art is remembered for every appearance so the winner gets its first one
        if let Some(name) = timed.row.commander() {
            let entry = commander_wins.entry(name.to_string()).or_insert((0, None));
            if timed.row.is_winner {
                entry.0 += 1;
            }
            if entry.1.is_none() {
                entry.1 = timed.row.image().map(str::to_string);
            }
        }

        if !timed.row.is_winner {
            continue;
        }
        if let Some(user_id) = timed.row.user_id {
            *player_wins.entry(user_id).or_default() += 1;
        }
    }

    let player_of_month = player_wins
        .into_iter()
        .map(|(player_id, wins)| PlayerHighlight {
            player_id,
            display_name: display_name(&profiles, player_id),
            avatar_url: avatar_url(&profiles, player_id),
            wins,
        })
        .min_by(|a, b| {
            b.wins
                .cmp(&a.wins)
                .then_with(|| by_name(&a.display_name, &b.display_name))
                .then_with(|| a.player_id.cmp(&b.player_id))
        });

    let commander_of_month = commander_wins
        .into_iter()
        .filter(|(_, (wins, _))| *wins > 0)
        .map(|(name, (wins, image))| CommanderHighlight { name, image, wins })
        .min_by(|a, b| b.wins.cmp(&a.wins).then_with(|| by_name(&a.name, &b.name)));

    MonthlyHighlights {
        window_start,
        player_of_month,
        commander_of_month,
    }
}

fn by_name(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}
