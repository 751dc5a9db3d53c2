//! First-class invariants for game sessions.
//!
//! Invariants are logical properties that must hold for every reachable
//! session state. They are testable independently and back the guess
//! contract's postcondition.

/// A logical property that must hold for a given state.
pub trait Invariant<S> {
    /// Checks if the invariant holds for the given state.
    fn holds(state: &S) -> bool;

    /// Human-readable description of the invariant.
    fn description() -> &'static str;
}

/// Violation of an invariant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantViolation {
    /// Description of the violated invariant.
    pub description: String,
}

impl InvariantViolation {
    /// Creates a new invariant violation.
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
        }
    }
}

/// A set of invariants that can be checked together.
///
/// Implemented for tuples so invariants compose without boxing.
pub trait InvariantSet<S> {
    /// Checks all invariants in the set, collecting every violation.
    fn check_all(state: &S) -> Result<(), Vec<InvariantViolation>>;
}

fn collect(violations: Vec<InvariantViolation>) -> Result<(), Vec<InvariantViolation>> {
    if violations.is_empty() {
        Ok(())
    } else {
        Err(violations)
    }
}

impl<S, I1, I2, I3> InvariantSet<S> for (I1, I2, I3)
where
    I1: Invariant<S>,
    I2: Invariant<S>,
    I3: Invariant<S>,
{
    fn check_all(state: &S) -> Result<(), Vec<InvariantViolation>> {
        let mut violations = Vec::new();
        if !I1::holds(state) {
            violations.push(InvariantViolation::new(I1::description()));
        }
        if !I2::holds(state) {
            violations.push(InvariantViolation::new(I2::description()));
        }
        if !I3::holds(state) {
            violations.push(InvariantViolation::new(I3::description()));
        }
        collect(violations)
    }
}

impl<S, I1, I2> InvariantSet<S> for (I1, I2)
where
    I1: Invariant<S>,
    I2: Invariant<S>,
{
    fn check_all(state: &S) -> Result<(), Vec<InvariantViolation>> {
        let mut violations = Vec::new();
        if !I1::holds(state) {
            violations.push(InvariantViolation::new(I1::description()));
        }
        if !I2::holds(state) {
            violations.push(InvariantViolation::new(I2::description()));
        }
        collect(violations)
    }
}

pub mod attempts_accounted;
pub mod feedback_bounded;
pub mod status_consistent;

pub use attempts_accounted::AttemptsAccountedInvariant;
pub use feedback_bounded::FeedbackBoundedInvariant;
pub use status_consistent::StatusConsistentInvariant;

/// All session invariants as a composable set.
pub type SessionInvariants = (
    AttemptsAccountedInvariant,
    FeedbackBoundedInvariant,
    StatusConsistentInvariant,
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::LevelDefinition;
    use crate::code::Code;
    use crate::session::SessionState;

    fn code(indices: &[usize]) -> Code {
        Code::from_indices(indices).expect("valid indices")
    }

    #[test]
    fn test_invariant_set_holds_for_fresh_session() {
        let state = SessionState::start(&LevelDefinition::for_id(50));
        assert!(SessionInvariants::check_all(&state).is_ok());
    }

    #[test]
    fn test_invariant_set_holds_through_a_lost_game() {
        let level = LevelDefinition::for_id(3);
        let guesses = vec![code(&[5, 5, 5]); 10];
        let state = SessionState::replay(&level, code(&[0, 1, 2]), &guesses).expect("valid");
        assert!(SessionInvariants::check_all(&state).is_ok());
    }

    #[test]
    fn test_invariant_set_detects_violations() {
        let level = LevelDefinition::for_id(3);
        let mut state = SessionState::with_secret(&level, code(&[0, 1, 2])).expect("valid");
        state.set_remaining_attempts(3);

        let violations = SessionInvariants::check_all(&state).unwrap_err();
        assert!(!violations.is_empty());
    }

    #[test]
    fn test_two_invariants_as_set() {
        type TwoInvariants = (AttemptsAccountedInvariant, StatusConsistentInvariant);
        let state = SessionState::start(&LevelDefinition::for_id(12));
        assert!(TwoInvariants::check_all(&state).is_ok());
    }
}
