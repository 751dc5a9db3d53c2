//! Session state and its transition function.
//!
//! A session moves `Playing -> Playing` on a non-terminal guess and
//! `Playing -> Won` or `Playing -> Lost` on a terminal one. Terminal states
//! accept nothing; starting over means building a fresh state.

use derive_getters::Getters;
use derive_more::{Display, Error};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use super::contracts::{Contract, GuessContract};
use crate::catalog::LevelDefinition;
use crate::code::{Guess, Secret};
use crate::scoring::{Feedback, score};
use crate::secret::generate_secret_with;

/// Where a session stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    /// Accepting guesses.
    #[display("playing")]
    Playing,
    /// A guess matched every slot.
    #[display("won")]
    Won,
    /// Attempts ran out without a full match.
    #[display("lost")]
    Lost,
}

impl SessionStatus {
    /// True for `Won` and `Lost`.
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Playing)
    }
}

/// A scored guess. Never edited once recorded.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Getters)]
pub struct GuessHistoryEntry {
    guess: Guess,
    feedback: Feedback,
}

impl GuessHistoryEntry {
    /// Records a guess with its feedback.
    pub fn new(guess: Guess, feedback: Feedback) -> Self {
        Self { guess, feedback }
    }

    /// Black pegs.
    pub fn exact_matches(&self) -> usize {
        self.feedback.exact
    }

    /// White pegs.
    pub fn color_matches(&self) -> usize {
        self.feedback.color
    }

    /// True when the guess matched nothing at all.
    pub fn is_zero(&self) -> bool {
        self.feedback.is_zero()
    }
}

/// Why a submission was ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum IgnoreReason {
    /// The session already ended.
    #[display("Session is already {}", _0)]
    NotPlaying(SessionStatus),
    /// The guess has the wrong number of slots.
    #[display("Guess has {} slots, expected {}", actual, expected)]
    LengthMismatch {
        /// Slots required by the level.
        expected: usize,
        /// Slots in the submitted guess.
        actual: usize,
    },
}

/// Error building a session from a supplied secret.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Error)]
#[display("Secret has {} slots but the level requires {}", actual, expected)]
pub struct SecretLengthError {
    /// Slots required by the level.
    pub expected: usize,
    /// Slots in the supplied secret.
    pub actual: usize,
}

/// What a submission did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// Nothing changed.
    Ignored(IgnoreReason),
    /// Guess recorded; the session keeps going.
    Continued(GuessHistoryEntry),
    /// Guess recorded and it solved the code.
    Won(GuessHistoryEntry),
    /// Guess recorded and it used the last attempt.
    Lost(GuessHistoryEntry),
}

impl SessionEvent {
    /// The recorded entry, unless the submission was ignored.
    pub fn entry(&self) -> Option<&GuessHistoryEntry> {
        match self {
            Self::Ignored(_) => None,
            Self::Continued(e) | Self::Won(e) | Self::Lost(e) => Some(e),
        }
    }
}

/// Result of applying a guess: the next state and what happened.
#[derive(Debug, Clone)]
pub struct Transition {
    /// State after the submission.
    pub state: SessionState,
    /// What the submission did.
    pub event: SessionEvent,
}

/// One play-through of a level.
///
/// Not serializable: the secret must not leave the engine while playing.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct SessionState {
    level: LevelDefinition,
    #[getter(skip)]
    secret: Secret,
    history: Vec<GuessHistoryEntry>,
    remaining_attempts: u32,
    status: SessionStatus,
}

impl SessionState {
    /// Starts a session with a fresh random secret.
    #[instrument(skip(level), fields(level_id = *level.id()))]
    pub fn start(level: &LevelDefinition) -> Self {
        Self::start_with_rng(level, &mut rand::rng())
    }

    /// Starts a session drawing the secret from `rng`.
    #[instrument(skip(level, rng), fields(level_id = *level.id()))]
    pub fn start_with_rng<R: Rng + ?Sized>(level: &LevelDefinition, rng: &mut R) -> Self {
        let secret = generate_secret_with(rng, *level.secret_length());
        info!(
            length = *level.secret_length(),
            attempts = *level.max_attempts(),
            "Session started"
        );
        Self::fresh(level, secret)
    }

    /// Starts a session with a known secret.
    ///
    /// # Errors
    ///
    /// Returns [`SecretLengthError`] if the secret does not fit the level.
    #[instrument(skip(level, secret), fields(level_id = *level.id()))]
    pub fn with_secret(level: &LevelDefinition, secret: Secret) -> Result<Self, SecretLengthError> {
        if secret.len() != *level.secret_length() {
            return Err(SecretLengthError {
                expected: *level.secret_length(),
                actual: secret.len(),
            });
        }
        Ok(Self::fresh(level, secret))
    }

    fn fresh(level: &LevelDefinition, secret: Secret) -> Self {
        Self {
            level: level.clone(),
            secret,
            history: Vec::new(),
            remaining_attempts: *level.max_attempts(),
            status: SessionStatus::Playing,
        }
    }

    /// Number of slots in the secret.
    pub fn secret_length(&self) -> usize {
        self.secret.len()
    }

    /// The secret, for contracts and end-of-game commentary.
    pub(crate) fn secret(&self) -> &Secret {
        &self.secret
    }

    /// The secret once the session is over, `None` while playing.
    pub fn revealed_secret(&self) -> Option<&Secret> {
        self.status.is_terminal().then_some(&self.secret)
    }

    /// Applies a guess.
    ///
    /// Ignored submissions (wrong length, or a session that already ended)
    /// return the state unchanged with [`SessionEvent::Ignored`]. Otherwise
    /// the guess is scored and recorded, one attempt is spent, and a full
    /// match wins even if it spends the last attempt.
    #[instrument(skip(self, guess), fields(level_id = *self.level.id(), guess = %guess))]
    pub fn submit(self, guess: &Guess) -> Transition {
        if let Err(reason) = GuessContract::pre(&self, guess) {
            warn!(%reason, "Guess ignored");
            return Transition {
                state: self,
                event: SessionEvent::Ignored(reason),
            };
        }

        let feedback = match score(guess, &self.secret) {
            Ok(feedback) => feedback,
            Err(_) => {
                let reason = IgnoreReason::LengthMismatch {
                    expected: self.secret.len(),
                    actual: guess.len(),
                };
                warn!(%reason, "Guess ignored");
                return Transition {
                    state: self,
                    event: SessionEvent::Ignored(reason),
                };
            }
        };

        #[cfg(debug_assertions)]
        let before = self.clone();

        let mut state = self;
        let entry = GuessHistoryEntry::new(guess.clone(), feedback);
        state.history.push(entry.clone());
        state.remaining_attempts = state.remaining_attempts.saturating_sub(1);

        let event = if feedback.is_solved(state.secret.len()) {
            state.status = SessionStatus::Won;
            info!(attempts_used = state.history.len(), "Code solved");
            SessionEvent::Won(entry)
        } else if state.remaining_attempts == 0 {
            state.status = SessionStatus::Lost;
            info!(secret = %state.secret, "Attempts exhausted");
            SessionEvent::Lost(entry)
        } else {
            debug!(
                exact = feedback.exact,
                color = feedback.color,
                remaining = state.remaining_attempts,
                "Guess recorded"
            );
            SessionEvent::Continued(entry)
        };

        #[cfg(debug_assertions)]
        {
            let post = GuessContract::post(&before, &state);
            debug_assert!(post.is_ok(), "Postcondition failed: {:?}", post);
        }

        Transition { state, event }
    }

    /// Replays guesses from a fresh state with the given secret.
    ///
    /// # Errors
    ///
    /// Returns [`SecretLengthError`] if the secret does not fit the level.
    #[instrument(skip(level, secret, guesses), fields(count = guesses.len()))]
    pub fn replay(
        level: &LevelDefinition,
        secret: Secret,
        guesses: &[Guess],
    ) -> Result<Self, SecretLengthError> {
        let mut state = Self::with_secret(level, secret)?;
        for guess in guesses {
            state = state.submit(guess).state;
        }
        Ok(state)
    }

    #[cfg(test)]
    pub(crate) fn history_mut(&mut self) -> &mut Vec<GuessHistoryEntry> {
        &mut self.history
    }

    #[cfg(test)]
    pub(crate) fn set_remaining_attempts(&mut self, remaining: u32) {
        self.remaining_attempts = remaining;
    }
}
