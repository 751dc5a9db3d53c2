//! Status invariant: the status follows from the history.

use super::Invariant;
use crate::session::{SessionState, SessionStatus};

/// Invariant: the status is exactly what the history implies.
///
/// - `Won` iff the last entry is a full match and no earlier one is.
/// - `Lost` iff attempts are exhausted with no full match.
/// - `Playing` otherwise.
pub struct StatusConsistentInvariant;

impl Invariant<SessionState> for StatusConsistentInvariant {
    fn holds(state: &SessionState) -> bool {
        let length = state.secret_length();
        let history = state.history();
        let solved_at = history.iter().position(|e| e.feedback().is_solved(length));

        let expected = match solved_at {
            Some(i) if i + 1 == history.len() => SessionStatus::Won,
            Some(_) => return false,
            None if *state.remaining_attempts() == 0 => SessionStatus::Lost,
            None => SessionStatus::Playing,
        };

        *state.status() == expected
    }

    fn description() -> &'static str {
        "Status matches the history: won on a final full match, lost when attempts run out"
    }
}
