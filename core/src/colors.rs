//! Color identities
//!
//! A color identity is a subset of the five Magic colors. `ColorSet` keeps it
//! as a five-bit set, so duplicates and symbols outside WUBRG cannot be
//! represented, and iteration always follows the W < U < B < R < G order.

use std::fmt;

use serde::de::{Deserializer, SeqAccess, Visitor};
use serde::ser::{SerializeSeq, Serializer};
use serde::{Deserialize, Serialize};

/// One of the five colors of Magic
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Color {
    /// White (W)
    White,
    /// Blue (U)
    Blue,
    /// Black (B)
    Black,
    /// Red (R)
    Red,
    /// Green (G)
    Green,
}

impl Color {
    /// All colors in canonical order
    pub const ALL: [Color; 5] = [
        Color::White,
        Color::Blue,
        Color::Black,
        Color::Red,
        Color::Green,
    ];

    /// The single-letter symbol of the color
    pub fn symbol(self) -> char {
        match self {
            Color::White => 'W',
            Color::Blue => 'U',
            Color::Black => 'B',
            Color::Red => 'R',
            Color::Green => 'G',
        }
    }

    /// Parse a color symbol, ignoring case
    pub fn from_symbol(symbol: char) -> Option<Self> {
        match symbol.to_ascii_uppercase() {
            'W' => Some(Color::White),
            'U' => Some(Color::Blue),
            'B' => Some(Color::Black),
            'R' => Some(Color::Red),
            'G' => Some(Color::Green),
            _ => None,
        }
    }

    /// Parse a color name (English or Spanish), ignoring case
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "white" | "blanco" => Some(Color::White),
            "blue" | "azul" => Some(Color::Blue),
            "black" | "negro" => Some(Color::Black),
            "red" | "rojo" => Some(Color::Red),
            "green" | "verde" => Some(Color::Green),
            _ => None,
        }
    }

    /// Emoji used when rendering the color
    pub fn emoji(self) -> &'static str {
        match self {
            Color::White => "⚪",
            Color::Blue => "🔵",
            Color::Black => "⚫",
            Color::Red => "🔴",
            Color::Green => "🟢",
        }
    }

    /// Hex color used in archetype gradients
    pub fn hex(self) -> &'static str {
        match self {
            Color::White => "#F8F6D8",
            Color::Blue => "#0E68AB",
            Color::Black => "#150B00",
            Color::Red => "#D3202A",
            Color::Green => "#00733E",
        }
    }

    fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// A canonical color identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ColorSet(u8);

impl ColorSet {
    /// The colorless identity
    pub const EMPTY: ColorSet = ColorSet(0);

    /// Create an empty set
    pub fn new() -> Self {
        Self::EMPTY
    }

    /// Add a color to the set
    pub fn insert(&mut self, color: Color) {
        self.0 |= color.bit();
    }

    /// Whether the set contains `color`
    pub fn contains(&self, color: Color) -> bool {
        self.0 & color.bit() != 0
    }

    /// Number of colors in the set
    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    /// Whether the set is colorless
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Union of two sets
    pub fn union(self, other: ColorSet) -> ColorSet {
        ColorSet(self.0 | other.0)
    }

    /// Colors in canonical order
    pub fn iter(&self) -> impl Iterator<Item = Color> + '_ {
        Color::ALL.into_iter().filter(move |color| self.contains(*color))
    }

    /// Canonical code, e.g. `"WUG"`; empty for the colorless set
    pub fn code(&self) -> String {
        self.iter().map(Color::symbol).collect()
    }

    /// The set as a list of one-letter strings, the shape stored in color array columns
    pub fn symbols(&self) -> Vec<String> {
        self.iter().map(|color| color.symbol().to_string()).collect()
    }

    /// Build a set from loosely formatted items
    ///
    /// Every item goes through [`ColorSet::parse`], so `["w", "{U}", "blue"]`
    /// and `["WU"]` both produce `WU`.
    pub fn from_items<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        items
            .into_iter()
            .fold(ColorSet::EMPTY, |set, item| set.union(ColorSet::parse(item.as_ref())))
    }

    /// Parse free text into a color set
    ///
    /// The text is split into alphabetic tokens. A token is either a color
    /// name (`"green"`, `"azul"`) or a run of mana symbols (`"wub"`, `"wux"`),
    /// whose color symbols are kept. Any other token is ignored as a whole, so
    /// `"colorless"` contributes nothing.
    pub fn parse(text: &str) -> Self {
        let mut set = ColorSet::EMPTY;

        for token in text
            .split(|c: char| !c.is_ascii_alphabetic())
            .filter(|token| !token.is_empty())
        {
            if let Some(color) = Color::from_name(token) {
                set.insert(color);
                continue;
            }

            if token.chars().all(is_mana_symbol) {
                set = set.union(token.chars().filter_map(Color::from_symbol).collect());
            }
        }

        set
    }
}

impl FromIterator<Color> for ColorSet {
    fn from_iter<T: IntoIterator<Item = Color>>(iter: T) -> Self {
        let mut set = ColorSet::EMPTY;
        for color in iter {
            set.insert(color);
        }
        set
    }
}

impl fmt::Display for ColorSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.code())
    }
}

impl Serialize for ColorSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.len()))?;
        for color in self.iter() {
            seq.serialize_element(&color.symbol().to_string())?;
        }
        seq.end()
    }
}

impl<'de> Deserialize<'de> for ColorSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ColorSetVisitor;

        impl<'de> Visitor<'de> for ColorSetVisitor {
            type Value = ColorSet;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a color string or a list of color symbols")
            }

            fn visit_str<E: serde::de::Error>(self, value: &str) -> Result<ColorSet, E> {
                Ok(ColorSet::parse(value))
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<ColorSet, A::Error> {
                let mut set = ColorSet::EMPTY;
                while let Some(item) = seq.next_element::<String>()? {
                    set = set.union(ColorSet::parse(&item));
                }
                Ok(set)
            }

            fn visit_unit<E: serde::de::Error>(self) -> Result<ColorSet, E> {
                Ok(ColorSet::EMPTY)
            }
        }

        deserializer.deserialize_any(ColorSetVisitor)
    }
}

/// Colorless, generic and snow symbols may share a token with colors
fn is_mana_symbol(symbol: char) -> bool {
    Color::from_symbol(symbol).is_some()
        || matches!(symbol.to_ascii_uppercase(), 'C' | 'X' | 'S')
}

/// Normalize a loose collection of color items into a canonical set
pub fn normalize_colors<I, S>(items: I) -> ColorSet
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    ColorSet::from_items(items)
}

/// Parse free text such as `"{W}{U}"`, `"w, u"` or `"white blue"`
pub fn parse_colors(text: &str) -> ColorSet {
    ColorSet::parse(text)
}

/// Canonical code of a color set
pub fn code_from_colors(colors: &ColorSet) -> String {
    colors.code()
}
