//! Commander and color identity usage tallies

use std::collections::HashMap;

use serde::Serialize;

use super::Dataset;
use crate::archetypes::Archetype;
use crate::models::Participant;

/// How often a commander was played
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommanderUsage {
    /// Commander card name
    pub name: String,

    /// Times played
    pub games: usize,

    /// Times it won
    pub wins: usize,

    /// First non-empty art seen for it, in match order
    pub image: Option<String>,
}

/// How often a color identity was played
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColorUsage {
    /// Canonical color code
    pub code: String,

    /// Archetype label
    pub label: String,

    /// Times played
    pub games: usize,

    /// Times it won
    pub wins: usize,
}

/// Tally commanders over rows given in chronological order
pub(crate) fn tally_commanders<'a, I>(rows: I) -> Vec<CommanderUsage>
where
    I: IntoIterator<Item = &'a Participant>,
{
    let mut tallies: HashMap<String, CommanderUsage> = HashMap::new();

    for row in rows {
        let Some(name) = row.commander() else {
            continue;
        };

        let entry = tallies.entry(name.to_string()).or_insert_with(|| CommanderUsage {
            name: name.to_string(),
            games: 0,
            wins: 0,
            image: None,
        });

        entry.games += 1;
        if row.is_winner {
            entry.wins += 1;
        }
        if entry.image.is_none() {
            entry.image = row.image().map(str::to_string);
        }
    }

    let mut usage: Vec<CommanderUsage> = tallies.into_values().collect();
    usage.sort_by(|a, b| {
        b.games
            .cmp(&a.games)
            .then_with(|| b.wins.cmp(&a.wins))
            .then_with(|| a.name.cmp(&b.name))
    });
    usage
}

/// Tally color identities; rows without colors are skipped
pub(crate) fn tally_colors<'a, I>(rows: I) -> Vec<ColorUsage>
where
    I: IntoIterator<Item = &'a Participant>,
{
    let mut tallies: HashMap<String, ColorUsage> = HashMap::new();

    for row in rows {
        let Some(colors) = row.colors() else {
            continue;
        };
        let archetype = Archetype::classify(colors);

        let entry = tallies.entry(archetype.code.clone()).or_insert_with(|| ColorUsage {
            code: archetype.code,
            label: archetype.label,
            games: 0,
            wins: 0,
        });

        entry.games += 1;
        if row.is_winner {
            entry.wins += 1;
        }
    }

    let mut usage: Vec<ColorUsage> = tallies.into_values().collect();
    usage.sort_by(|a, b| b.games.cmp(&a.games).then_with(|| a.code.cmp(&b.code)));
    usage
}

/// Commander usage across every recorded match
pub fn commander_usage(dataset: &Dataset) -> Vec<CommanderUsage> {
    tally_commanders(dataset.timeline().into_iter().map(|timed| timed.row))
}

/// Color identity usage across every recorded match
pub fn color_usage(dataset: &Dataset) -> Vec<ColorUsage> {
    tally_colors(dataset.timeline().into_iter().map(|timed| timed.row))
}
