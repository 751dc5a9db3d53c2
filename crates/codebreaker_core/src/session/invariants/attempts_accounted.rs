//! Attempts invariant: every spent attempt is in the history.

use super::Invariant;
use crate::session::SessionState;

/// Invariant: recorded guesses plus remaining attempts equal the level budget.
pub struct AttemptsAccountedInvariant;

impl Invariant<SessionState> for AttemptsAccountedInvariant {
    fn holds(state: &SessionState) -> bool {
        let used = state.history().len() as u64;
        used + u64::from(*state.remaining_attempts()) == u64::from(*state.level().max_attempts())
    }

    fn description() -> &'static str {
        "Recorded guesses plus remaining attempts equal the level's attempt budget"
    }
}
