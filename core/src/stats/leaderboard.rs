//! Per-player standings

use std::cmp::Ordering;
use std::collections::HashMap;

use log::debug;
use serde::Serialize;
use uuid::Uuid;

use super::usage::{tally_colors, tally_commanders, ColorUsage, CommanderUsage};
use super::{avatar_url, display_name, longest_win_streak, Dataset};

/// A player's totals over the whole history
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerStanding {
    /// Player id
    pub player_id: Uuid,

    /// Display name
    pub display_name: String,

    /// Avatar image URL
    pub avatar_url: Option<String>,

    /// Matches played
    pub matches: usize,

    /// Matches won
    pub wins: usize,

    /// `wins / matches`, zero when no matches
    pub win_rate: f64,

    /// Longest run of consecutive wins
    pub best_streak: usize,

    /// Summed eliminations
    pub kills: i64,

    /// Summed damage
    pub damage_dealt: i64,
}

impl PlayerStanding {
    fn empty(player_id: Uuid, display_name: String, avatar_url: Option<String>) -> Self {
        Self {
            player_id,
            display_name,
            avatar_url,
            matches: 0,
            wins: 0,
            win_rate: 0.0,
            best_streak: 0,
            kills: 0,
            damage_dealt: 0,
        }
    }

    fn ranking(a: &Self, b: &Self) -> Ordering {
        b.wins
            .cmp(&a.wins)
            .then_with(|| b.win_rate.partial_cmp(&a.win_rate).unwrap_or(Ordering::Equal))
            .then_with(|| a.display_name.to_lowercase().cmp(&b.display_name.to_lowercase()))
            .then_with(|| a.player_id.cmp(&b.player_id))
    }
}

/// Detailed report for one player
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerReport {
    /// Totals
    pub standing: PlayerStanding,

    /// Most played commanders with the first art seen for each
    pub top_commanders: Vec<CommanderUsage>,

    /// Color identities played
    pub archetypes: Vec<ColorUsage>,
}

#[derive(Default)]
struct Accumulator {
    outcomes: Vec<bool>,
    kills: i64,
    damage_dealt: i64,
}

/// Standings of every player with at least one recorded match
///
/// Sorted by wins, then win rate, then name.
pub fn build_leaderboard(dataset: &Dataset) -> Vec<PlayerStanding> {
    let profiles = dataset.profile_index();
    let mut players: HashMap<Uuid, Accumulator> = HashMap::new();

    for timed in dataset.timeline() {
        let Some(user_id) = timed.row.user_id else {
            continue;
        };
        let entry = players.entry(user_id).or_default();
        entry.outcomes.push(timed.row.is_winner);
        entry.kills += timed.row.kills;
        entry.damage_dealt += timed.row.damage_dealt;
    }

    let mut standings: Vec<PlayerStanding> = players
        .into_iter()
        .map(|(player_id, acc)| {
            let matches = acc.outcomes.len();
            let wins = acc.outcomes.iter().filter(|won| **won).count();
            PlayerStanding {
                player_id,
                display_name: display_name(&profiles, player_id),
                avatar_url: avatar_url(&profiles, player_id),
                matches,
                wins,
                win_rate: if matches == 0 { 0.0 } else { wins as f64 / matches as f64 },
                best_streak: longest_win_streak(acc.outcomes.iter().copied()),
                kills: acc.kills,
                damage_dealt: acc.damage_dealt,
            }
        })
        .collect();

    standings.sort_by(PlayerStanding::ranking);

    debug!(
        "Built leaderboard for {} players from {} matches",
        standings.len(),
        dataset.matches.len()
    );

    standings
}

/// Report for one player; zero-valued when the player has no matches
pub fn player_report(dataset: &Dataset, player_id: Uuid, top_n: usize) -> PlayerReport {
    let profiles = dataset.profile_index();

    let standing = build_leaderboard(dataset)
        .into_iter()
        .find(|standing| standing.player_id == player_id)
        .unwrap_or_else(|| {
            PlayerStanding::empty(
                player_id,
                display_name(&profiles, player_id),
                avatar_url(&profiles, player_id),
            )
        });

    let timeline = dataset.timeline();
    let rows = || {
        timeline
            .iter()
            .filter(|timed| timed.row.user_id == Some(player_id))
            .map(|timed| timed.row)
    };

    let mut top_commanders = tally_commanders(rows());
    top_commanders.truncate(top_n);

    PlayerReport {
        standing,
        top_commanders,
        archetypes: tally_colors(rows()),
    }
}
