//! Peg scoring of a guess against a secret.

use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::code::{Guess, Secret};

/// Black and white peg counts for one guess.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display)]
#[display("{} exact, {} color", exact, color)]
pub struct Feedback {
    /// Slots with the right color in the right position.
    pub exact: usize,
    /// Right colors in the wrong position, after exact matches are removed.
    pub color: usize,
}

impl Feedback {
    /// Creates feedback from raw counts.
    pub fn new(exact: usize, color: usize) -> Self {
        Self { exact, color }
    }

    /// Exact plus color-only matches.
    pub fn total(&self) -> usize {
        self.exact + self.color
    }

    /// True when nothing in the guess matched.
    pub fn is_zero(&self) -> bool {
        self.total() == 0
    }

    /// True when every slot of a code of `length` matched exactly.
    pub fn is_solved(&self, length: usize) -> bool {
        self.exact == length
    }
}

/// Error scoring a guess.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Error)]
pub enum ScoreError {
    /// Guess and secret have different lengths.
    #[display("Guess has {} slots but the secret has {}", guess, secret)]
    LengthMismatch {
        /// Guess length.
        guess: usize,
        /// Secret length.
        secret: usize,
    },
}

/// Scores `guess` against `secret`.
///
/// Two passes: exact matches consume both slots first, then each remaining
/// guess slot consumes at most one remaining secret slot of the same color.
///
/// # Errors
///
/// Returns [`ScoreError::LengthMismatch`] when the lengths differ.
#[instrument(skip_all, fields(len = guess.len()))]
pub fn score(guess: &Guess, secret: &Secret) -> Result<Feedback, ScoreError> {
    if guess.len() != secret.len() {
        return Err(ScoreError::LengthMismatch {
            guess: guess.len(),
            secret: secret.len(),
        });
    }

    let mut secret_left: Vec<Option<_>> = secret.colors().iter().copied().map(Some).collect();
    let mut guess_left: Vec<Option<_>> = guess.colors().iter().copied().map(Some).collect();
    let mut exact = 0;

    for (g, s) in guess_left.iter_mut().zip(secret_left.iter_mut()) {
        if g.is_some() && g == s {
            exact += 1;
            *g = None;
            *s = None;
        }
    }

    let mut color = 0;
    for g in guess_left.into_iter().flatten() {
        if let Some(slot) = secret_left.iter_mut().find(|s| **s == Some(g)) {
            color += 1;
            *slot = None;
        }
    }

    Ok(Feedback { exact, color })
}
