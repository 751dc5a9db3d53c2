//! Feedback invariant: peg counts never exceed the code length.

use super::Invariant;
use crate::session::SessionState;

/// Invariant: every entry has a full-length guess and `exact + color <= length`.
pub struct FeedbackBoundedInvariant;

impl Invariant<SessionState> for FeedbackBoundedInvariant {
    fn holds(state: &SessionState) -> bool {
        let length = state.secret_length();
        length == *state.level().secret_length()
            && state
                .history()
                .iter()
                .all(|e| e.guess().len() == length && e.feedback().total() <= length)
    }

    fn description() -> &'static str {
        "Every guess fits the secret and its peg total is at most the secret length"
    }
}
