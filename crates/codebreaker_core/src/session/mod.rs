//! Game session state machine.

mod contracts;
mod game;
pub mod invariants;
mod state;

pub use contracts::{Contract, GuessContract, GuessLengthMatches, SessionIsPlaying};
pub use game::GameSession;
pub use invariants::{
    AttemptsAccountedInvariant, FeedbackBoundedInvariant, Invariant, InvariantSet,
    InvariantViolation, SessionInvariants, StatusConsistentInvariant,
};
pub use state::{
    GuessHistoryEntry, IgnoreReason, SecretLengthError, SessionEvent, SessionState,
    SessionStatus, Transition,
};
