//! Codebreaker core - the puzzle engine behind a Mastermind-style game.
//!
//! A hidden sequence of colors must be found within a fixed number of
//! attempts. Each guess is answered with exact-position and color-only match
//! counts.
//!
//! # Architecture
//!
//! - **Catalog**: 100 fixed levels with deterministic difficulty tiers
//! - **Secret**: uniform random secrets over a six-color palette
//! - **Scoring**: two-pass peg scoring
//! - **Session**: explicit state plus a pure transition function, guarded by
//!   contracts and first-class invariants
//! - **Advisory**: heuristic hints recomputed from history
//!
//! Everything here is synchronous and free of I/O.
//!
//! # Example
//!
//! ```
//! use codebreaker_core::{Catalog, Code, GameSession, SessionEvent};
//!
//! let catalog = Catalog::generate();
//! let level = catalog.level(1).expect("level 1 exists");
//! let secret = Code::from_indices(&[0, 1, 2]).expect("valid code");
//! let mut game = GameSession::with_secret(level, secret).expect("fits level");
//!
//! let event = game.submit(&Code::parse("rbg").expect("valid guess"));
//! assert!(matches!(event, SessionEvent::Won(_)));
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod advisory;
mod catalog;
mod code;
mod commentary;
mod palette;
mod scoring;
mod secret;
mod session;

pub use advisory::{Advisory, MAX_ENUMERATED_LENGTH, analyze, excluded_colors};
pub use catalog::{
    Catalog, LEVEL_COUNT, LevelDefinition, generate_catalog, highest_unlocked, is_locked,
    progress_percent,
};
pub use code::{Code, CodeError, Guess, Secret};
pub use commentary::{Commentary, Mood};
pub use palette::{Color, N_COLORS, ParseColorError};
pub use scoring::{Feedback, ScoreError, score};
pub use secret::{generate_secret, generate_secret_with};
pub use session::{
    AttemptsAccountedInvariant, Contract, FeedbackBoundedInvariant, GameSession,
    GuessContract, GuessHistoryEntry, GuessLengthMatches, IgnoreReason, Invariant,
    InvariantSet, InvariantViolation, SecretLengthError, SessionEvent, SessionInvariants,
    SessionIsPlaying, SessionState, SessionStatus, StatusConsistentInvariant, Transition,
};
