//! Heuristic hints derived from guess history.
//!
//! This is an aid, not a solver. Colors are sorted into three buckets from
//! each guess's zero/non-zero signal, and one example guess is offered. The
//! report is recomputed from the full history on every call.

use std::collections::BTreeSet;

use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::code::{Code, Guess};
use crate::palette::{Color, N_COLORS};
use crate::scoring::score;
use crate::session::GuessHistoryEntry;

/// Longest code for which [`Advisory::remaining_candidates`] is enumerated.
pub const MAX_ENUMERATED_LENGTH: usize = 6;

/// Hint report for a history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct Advisory {
    /// Colors seen in a guess that matched nothing.
    excluded: BTreeSet<Color>,
    /// Colors only ever seen in guesses that matched something.
    confirmed: BTreeSet<Color>,
    /// Colors seen in both kinds of guess and not excluded. Worth re-testing.
    plausible: BTreeSet<Color>,
    /// Palette minus excluded colors, in palette order.
    available: Vec<Color>,
    /// An example next guess, if one can be built.
    suggestion: Option<Guess>,
    /// Codes consistent with every entry, when the length is small enough to count.
    remaining_candidates: Option<u64>,
}

#[derive(Debug, Default, Clone, Copy)]
struct ColorStats {
    positive_rounds: usize,
    zero_rounds: usize,
}

/// Builds the advisory report for `history` on codes of `secret_length` slots.
#[instrument(skip(history), fields(entries = history.len()))]
pub fn analyze(history: &[GuessHistoryEntry], secret_length: usize) -> Advisory {
    let excluded = excluded_colors(history);
    let available: Vec<Color> = Color::all().filter(|c| !excluded.contains(c)).collect();

    let mut stats = [ColorStats::default(); N_COLORS];
    for entry in history {
        for color in Color::all().filter(|c| entry.guess().contains(*c)) {
            let s = &mut stats[color.index()];
            if entry.is_zero() {
                s.zero_rounds += 1;
            } else {
                s.positive_rounds += 1;
            }
        }
    }

    let confirmed = Color::all()
        .filter(|c| {
            let s = stats[c.index()];
            s.positive_rounds > 0 && s.zero_rounds == 0
        })
        .collect();

    let plausible = Color::all()
        .filter(|c| {
            let s = stats[c.index()];
            s.positive_rounds > 0 && s.zero_rounds > 0 && !excluded.contains(c)
        })
        .collect();

    let suggestion = suggest(history, secret_length, &available);
    let remaining_candidates = count_consistent(history, secret_length);

    debug!(
        excluded = excluded.len(),
        available = available.len(),
        has_suggestion = suggestion.is_some(),
        ?remaining_candidates,
        "Advisory computed"
    );

    Advisory {
        excluded,
        confirmed,
        plausible,
        available,
        suggestion,
        remaining_candidates,
    }
}

/// Every color that appears in a guess scoring zero pegs.
///
/// Grows monotonically with the history: once excluded, always excluded.
pub fn excluded_colors(history: &[GuessHistoryEntry]) -> BTreeSet<Color> {
    history
        .iter()
        .filter(|e| e.is_zero())
        .flat_map(|e| e.guess().colors().iter().copied())
        .collect()
}

fn suggest(history: &[GuessHistoryEntry], length: usize, available: &[Color]) -> Option<Guess> {
    if length == 0 {
        return None;
    }

    let Some(last) = history.last() else {
        // Opening guess: walk the palette in order.
        let colors = (0..length)
            .filter_map(|i| Color::from_index(i % N_COLORS))
            .collect();
        return Some(Code::new(colors));
    };

    if last.is_zero() {
        if available.is_empty() {
            return None;
        }
        let colors = (0..length).map(|i| available[i % available.len()]).collect();
        return Some(Code::new(colors));
    }

    let colors = (0..length)
        .map(|i| {
            last.guess()
                .get(i)
                .or_else(|| (!available.is_empty()).then(|| available[i % available.len()]))
                .unwrap_or_default()
        })
        .collect();
    Some(Code::new(colors))
}

fn count_consistent(history: &[GuessHistoryEntry], length: usize) -> Option<u64> {
    if length > MAX_ENUMERATED_LENGTH {
        return None;
    }

    let total = N_COLORS.pow(length as u32);
    let mut digits = vec![0usize; length];
    let mut count = 0u64;

    for n in 0..total {
        let mut rest = n;
        for d in digits.iter_mut().rev() {
            *d = rest % N_COLORS;
            rest /= N_COLORS;
        }
        let candidate = Code::new(digits.iter().filter_map(|&i| Color::from_index(i)).collect());

        let consistent = history.iter().all(|entry| match score(entry.guess(), &candidate) {
            Ok(feedback) => feedback == *entry.feedback(),
            Err(_) => true,
        });
        if consistent {
            count += 1;
        }
    }

    Some(count)
}
