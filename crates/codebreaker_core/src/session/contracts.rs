//! Contract-based validation for guess submission.
//!
//! Contracts define correctness through preconditions and postconditions:
//! {P} submit {Q}. A failed precondition turns the submission into a no-op;
//! a failed postcondition is a bug and trips a debug assertion.

use tracing::{instrument, warn};

use super::invariants::{InvariantSet, InvariantViolation, SessionInvariants};
use super::state::{IgnoreReason, SessionState, SessionStatus};
use crate::code::Guess;

// ─────────────────────────────────────────────────────────────
//  Contract Trait
// ─────────────────────────────────────────────────────────────

/// Preconditions and postconditions for a state transition.
pub trait Contract<S, A> {
    /// Checks preconditions before applying the action.
    fn pre(state: &S, action: &A) -> Result<(), IgnoreReason>;

    /// Checks postconditions after applying the action.
    fn post(before: &S, after: &S) -> Result<(), InvariantViolation>;
}

// ─────────────────────────────────────────────────────────────
//  Guess Preconditions
// ─────────────────────────────────────────────────────────────

/// Precondition: the session must still be playing.
pub struct SessionIsPlaying;

impl SessionIsPlaying {
    /// Checks the session status.
    #[instrument(skip_all)]
    pub fn check(state: &SessionState) -> Result<(), IgnoreReason> {
        match state.status() {
            SessionStatus::Playing => Ok(()),
            other => Err(IgnoreReason::NotPlaying(*other)),
        }
    }
}

/// Precondition: the guess must have exactly as many slots as the secret.
pub struct GuessLengthMatches;

impl GuessLengthMatches {
    /// Checks the guess length.
    #[instrument(skip_all)]
    pub fn check(guess: &Guess, state: &SessionState) -> Result<(), IgnoreReason> {
        let expected = state.secret_length();
        if guess.len() == expected {
            Ok(())
        } else {
            Err(IgnoreReason::LengthMismatch {
                expected,
                actual: guess.len(),
            })
        }
    }
}

// ─────────────────────────────────────────────────────────────
//  Guess Contract (Pre + Post)
// ─────────────────────────────────────────────────────────────

/// Contract for guess submission.
///
/// Preconditions:
/// - Session is playing
/// - Guess length matches the secret
///
/// Postconditions:
/// - Exactly one entry was appended and earlier entries are untouched
/// - The secret did not change
/// - All session invariants hold
pub struct GuessContract;

impl Contract<SessionState, Guess> for GuessContract {
    fn pre(state: &SessionState, guess: &Guess) -> Result<(), IgnoreReason> {
        SessionIsPlaying::check(state)?;
        GuessLengthMatches::check(guess, state)?;
        Ok(())
    }

    fn post(before: &SessionState, after: &SessionState) -> Result<(), InvariantViolation> {
        let appended_one = after.history().len() == before.history().len() + 1
            && after.history().starts_with(before.history());
        if !appended_one {
            warn!("History was not extended by exactly one entry");
            return Err(InvariantViolation::new(
                "History grows by exactly one entry per accepted guess",
            ));
        }

        if after.secret() != before.secret() {
            warn!("Secret changed during submission");
            return Err(InvariantViolation::new("Secret never changes"));
        }

        SessionInvariants::check_all(after).map_err(|violations| {
            let descriptions = violations
                .iter()
                .map(|v| v.description.as_str())
                .collect::<Vec<_>>()
                .join("; ");
            InvariantViolation::new(format!("Postcondition failed: {}", descriptions))
        })
    }
}
