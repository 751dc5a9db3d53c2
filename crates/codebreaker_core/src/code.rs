//! Color sequences: secrets and guesses.

use std::fmt;

use derive_more::{Display, Error, From};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::palette::{Color, N_COLORS, ParseColorError};

/// An ordered sequence of colors. Duplicates are allowed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Code(Vec<Color>);

/// A hidden sequence the player tries to find.
pub type Secret = Code;

/// A sequence submitted by the player.
pub type Guess = Code;

/// Error building a code from raw input.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error, From)]
pub enum CodeError {
    /// A color index outside the palette.
    #[display("Color index {} is outside the palette (0-{})", _0, N_COLORS - 1)]
    #[from(ignore)]
    IndexOutOfRange(#[error(not(source))] usize),

    /// A token that names no color.
    #[display("{}", _0)]
    Color(ParseColorError),

    /// Input with no colors in it.
    #[display("Empty code")]
    #[from(ignore)]
    Empty,
}

impl Code {
    /// Creates a code from colors.
    pub fn new(colors: Vec<Color>) -> Self {
        Self(colors)
    }

    /// Creates a code of `length` slots, all set to the first palette color.
    pub fn blank(length: usize) -> Self {
        Self(vec![Color::default(); length])
    }

    /// Creates a code from palette indices.
    ///
    /// # Errors
    ///
    /// Returns [`CodeError::IndexOutOfRange`] for any index `>= N_COLORS`.
    pub fn from_indices(indices: &[usize]) -> Result<Self, CodeError> {
        indices
            .iter()
            .map(|&i| Color::from_index(i).ok_or(CodeError::IndexOutOfRange(i)))
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }

    /// Parses player input.
    ///
    /// Accepts tokens separated by whitespace or commas (`red blue 2`), or a
    /// single compact run of one-letter codes (`rbg`).
    ///
    /// # Errors
    ///
    /// Returns [`CodeError`] when a token names no color or the input is empty.
    #[instrument]
    pub fn parse(input: &str) -> Result<Self, CodeError> {
        let tokens: Vec<&str> = input
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|t| !t.is_empty())
            .collect();

        let colors = match tokens.as_slice() {
            [] => return Err(CodeError::Empty),
            [single] if single.chars().count() > 1 && single.parse::<Color>().is_err() => single
                .chars()
                .map(|ch| ch.to_string().parse::<Color>())
                .collect::<Result<Vec<_>, _>>()?,
            _ => tokens
                .iter()
                .map(|t| t.parse::<Color>())
                .collect::<Result<Vec<_>, _>>()?,
        };

        Ok(Self(colors))
    }

    /// Number of slots.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when the code has no slots.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The colors in slot order.
    pub fn colors(&self) -> &[Color] {
        &self.0
    }

    /// The color in `slot`, if present.
    pub fn get(&self, slot: usize) -> Option<Color> {
        self.0.get(slot).copied()
    }

    /// Palette indices in slot order.
    pub fn indices(&self) -> Vec<usize> {
        self.0.iter().map(|c| c.index()).collect()
    }

    /// True when `color` occurs in any slot.
    pub fn contains(&self, color: Color) -> bool {
        self.0.contains(&color)
    }

    /// Advances `slot` to the next palette color. Out-of-range slots are ignored.
    pub fn cycle_slot(&mut self, slot: usize) {
        if let Some(color) = self.0.get_mut(slot) {
            *color = color.next();
        }
    }

    /// Sets `slot` to `color`. Out-of-range slots are ignored.
    pub fn set_slot(&mut self, slot: usize, color: Color) {
        if let Some(current) = self.0.get_mut(slot) {
            *current = color;
        }
    }

    /// Comma-separated color names, as shown when a secret is revealed.
    pub fn names(&self) -> String {
        self.0
            .iter()
            .map(|c| c.name())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl From<Vec<Color>> for Code {
    fn from(colors: Vec<Color>) -> Self {
        Self(colors)
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, color) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}", color.letter())?;
        }
        Ok(())
    }
}
