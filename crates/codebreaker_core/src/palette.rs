//! The fixed color palette shared by secrets and guesses.

use std::str::FromStr;

use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use strum::{EnumCount, EnumIter, IntoEnumIterator};
use tracing::instrument;

/// Number of distinct colors in the palette.
pub const N_COLORS: usize = Color::COUNT;

/// A peg color.
///
/// Variant order is the palette order: `Red` is index 0, `Orange` index 5.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Default,
    Serialize,
    Deserialize,
    EnumIter,
    EnumCount,
    strum::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Color {
    /// Index 0.
    #[default]
    Red,
    /// Index 1.
    Blue,
    /// Index 2.
    Green,
    /// Index 3.
    Yellow,
    /// Index 4.
    Purple,
    /// Index 5.
    Orange,
}

impl Color {
    /// Returns the color at the given palette index.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::iter().nth(index)
    }

    /// Returns this color's palette index.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Lowercase display name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Red => "red",
            Self::Blue => "blue",
            Self::Green => "green",
            Self::Yellow => "yellow",
            Self::Purple => "purple",
            Self::Orange => "orange",
        }
    }

    /// One-letter code accepted by the parser.
    pub fn letter(self) -> char {
        match self {
            Self::Red => 'r',
            Self::Blue => 'b',
            Self::Green => 'g',
            Self::Yellow => 'y',
            Self::Purple => 'p',
            Self::Orange => 'o',
        }
    }

    /// Display hex value.
    pub fn hex(self) -> &'static str {
        match self {
            Self::Red => "#ff5252",
            Self::Blue => "#448aff",
            Self::Green => "#69f0ae",
            Self::Yellow => "#ffd740",
            Self::Purple => "#e040fb",
            Self::Orange => "#ff9100",
        }
    }

    /// Next color in palette order, wrapping from the last back to the first.
    pub fn next(self) -> Self {
        Self::from_index((self.index() + 1) % N_COLORS).unwrap_or(Self::Red)
    }

    /// Parses a single one-letter code.
    pub fn from_letter(letter: char) -> Option<Self> {
        let lower = letter.to_ascii_lowercase();
        Self::iter().find(|c| c.letter() == lower)
    }

    /// All colors in palette order.
    pub fn all() -> impl Iterator<Item = Color> {
        Self::iter()
    }
}

/// Error parsing a color token.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
#[display("Unknown color '{}' (expected a name, one of r/b/g/y/p/o, or 0-{})", token, N_COLORS - 1)]
pub struct ParseColorError {
    /// The rejected token.
    pub token: String,
}

impl FromStr for Color {
    type Err = ParseColorError;

    #[instrument]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = s.trim().to_ascii_lowercase();
        let err = || ParseColorError {
            token: s.to_string(),
        };

        if let Some(color) = Self::iter().find(|c| c.name() == token) {
            return Ok(color);
        }

        let mut chars = token.chars();
        match (chars.next(), chars.next()) {
            (Some(ch), None) => {
                if let Some(digit) = ch.to_digit(10) {
                    Self::from_index(digit as usize).ok_or_else(err)
                } else {
                    Self::from_letter(ch).ok_or_else(err)
                }
            }
            _ => Err(err()),
        }
    }
}
