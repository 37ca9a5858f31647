//! Archetype classification
//!
//! Maps a color identity to the community name for it (guilds, shards,
//! wedges, four-color nephilim) plus the cosmetic emoji and gradient the
//! front end renders next to it.

use serde::Serialize;

use crate::colors::{normalize_colors, ColorSet};

/// Label used for the colorless identity and for combinations without a name
pub const MULTICOLOR_LABEL: &str = "Multicolor";

/// Label used for the five-color identity
pub const FIVE_COLOR_LABEL: &str = "Cinco colores";

const MULTICOLOR_EMOJI: &str = "🌈";
const MULTICOLOR_GRADIENT: [&str; 2] = ["#8E8E93", "#C7C7CC"];

const GUILDS: [(&str, &str); 10] = [
    ("WU", "Azorius"),
    ("UB", "Dimir"),
    ("BR", "Rakdos"),
    ("RG", "Gruul"),
    ("WG", "Selesnya"),
    ("WB", "Orzhov"),
    ("UR", "Izzet"),
    ("BG", "Golgari"),
    ("WR", "Boros"),
    ("UG", "Simic"),
];

const SHARDS_AND_WEDGES: [(&str, &str); 10] = [
    ("WUB", "Esper"),
    ("UBR", "Grixis"),
    ("BRG", "Jund"),
    ("WRG", "Naya"),
    ("WUG", "Bant"),
    ("WBG", "Abzan"),
    ("WUR", "Jeskai"),
    ("UBG", "Sultai"),
    ("WBR", "Mardu"),
    ("URG", "Temur"),
];

const NEPHILIM: [(&str, &str); 5] = [
    ("WUBR", "Yore-Tiller"),
    ("UBRG", "Glint-Eye"),
    ("WBRG", "Dune-Brood"),
    ("WURG", "Ink-Treader"),
    ("WUBG", "Witch-Maw"),
];

/// Display metadata for a color identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Archetype {
    /// Canonical color code, empty when colorless
    pub code: String,

    /// Display label
    pub label: String,

    /// One emoji per color
    pub emoji: String,

    /// Gradient stops as hex colors
    pub gradient: Vec<&'static str>,
}

impl Archetype {
    /// Classify a canonical color set
    pub fn classify(colors: ColorSet) -> Self {
        let code = colors.code();

        let label = match colors.len() {
            0 => None,
            1 => Some(code.clone()),
            2 => lookup(&GUILDS, &code),
            3 => lookup(&SHARDS_AND_WEDGES, &code),
            4 => lookup(&NEPHILIM, &code),
            5 => Some(FIVE_COLOR_LABEL.to_string()),
            _ => None,
        };

        match label {
            Some(label) => Self {
                label,
                emoji: colors.iter().map(|color| color.emoji()).collect(),
                gradient: colors.iter().map(|color| color.hex()).collect(),
                code,
            },
            None => Self {
                code,
                label: MULTICOLOR_LABEL.to_string(),
                emoji: MULTICOLOR_EMOJI.to_string(),
                gradient: MULTICOLOR_GRADIENT.to_vec(),
            },
        }
    }

    /// Whether this is the generic fallback
    pub fn is_multicolor_fallback(&self) -> bool {
        self.label == MULTICOLOR_LABEL
    }
}

fn lookup(table: &[(&str, &str)], code: &str) -> Option<String> {
    table
        .iter()
        .find(|(key, _)| *key == code)
        .map(|(_, label)| label.to_string())
}

/// Normalize loose color items and classify the result
pub fn archetype_for_colors<I, S>(items: I) -> Archetype
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    Archetype::classify(normalize_colors(items))
}

/// Classify a stored color code such as `"WUB"`
pub fn archetype_for_code(code: &str) -> Archetype {
    Archetype::classify(ColorSet::parse(code))
}
