//! Mutable wrapper driving one level for a presentation layer.

use rand::Rng;
use tracing::{info, instrument};

use super::state::{SecretLengthError, SessionEvent, SessionState, SessionStatus};
use crate::advisory::{Advisory, analyze};
use crate::catalog::LevelDefinition;
use crate::code::{Guess, Secret};
use crate::commentary::Commentary;
use crate::palette::Color;

/// A level being played, plus the guess the player is editing.
///
/// Event inputs are `submit_current`/`submit`, `reset`, and dropping the
/// value to exit. Each input runs to completion before the next.
#[derive(Debug, Clone)]
pub struct GameSession {
    state: SessionState,
    current_guess: Guess,
    commentary: Commentary,
}

impl GameSession {
    /// Starts a session with a random secret.
    #[instrument(skip(level), fields(level_id = *level.id()))]
    pub fn start(level: &LevelDefinition) -> Self {
        Self::from_state(SessionState::start(level))
    }

    /// Starts a session drawing the secret from `rng`.
    #[instrument(skip(level, rng), fields(level_id = *level.id()))]
    pub fn start_with_rng<R: Rng + ?Sized>(level: &LevelDefinition, rng: &mut R) -> Self {
        Self::from_state(SessionState::start_with_rng(level, rng))
    }

    /// Starts a session with a known secret.
    ///
    /// # Errors
    ///
    /// Returns [`SecretLengthError`] if the secret does not fit the level.
    pub fn with_secret(level: &LevelDefinition, secret: Secret) -> Result<Self, SecretLengthError> {
        SessionState::with_secret(level, secret).map(Self::from_state)
    }

    fn from_state(state: SessionState) -> Self {
        let commentary = Commentary::initial(state.level());
        Self {
            current_guess: Guess::blank(state.secret_length()),
            state,
            commentary,
        }
    }

    /// The underlying state.
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// The level being played.
    pub fn level(&self) -> &LevelDefinition {
        self.state.level()
    }

    /// Current status.
    pub fn status(&self) -> SessionStatus {
        *self.state.status()
    }

    /// The guess being edited.
    pub fn current_guess(&self) -> &Guess {
        &self.current_guess
    }

    /// Latest assistant commentary.
    pub fn commentary(&self) -> &Commentary {
        &self.commentary
    }

    /// Advances one slot of the edited guess to the next color.
    ///
    /// Ignored once the session has ended.
    pub fn cycle_slot(&mut self, slot: usize) {
        if self.status() == SessionStatus::Playing {
            self.current_guess.cycle_slot(slot);
        }
    }

    /// Sets one slot of the edited guess. Ignored once the session has ended.
    pub fn set_slot(&mut self, slot: usize, color: Color) {
        if self.status() == SessionStatus::Playing {
            self.current_guess.set_slot(slot, color);
        }
    }

    /// Submits the edited guess. The edited guess is kept for further editing.
    pub fn submit_current(&mut self) -> SessionEvent {
        let guess = self.current_guess.clone();
        self.submit(&guess)
    }

    /// Submits a guess.
    ///
    /// An accepted guess also becomes the edited guess, so the next attempt
    /// starts from it.
    #[instrument(skip(self, guess), fields(level_id = *self.level().id()))]
    pub fn submit(&mut self, guess: &Guess) -> SessionEvent {
        let transition = self.state.clone().submit(guess);
        self.state = transition.state;

        if transition.event.entry().is_some() {
            self.current_guess = guess.clone();
            self.commentary = Commentary::for_event(&self.state, &transition.event);
        }

        transition.event
    }

    /// Throws the play-through away and starts over with a new secret.
    #[instrument(skip(self), fields(level_id = *self.level().id()))]
    pub fn reset(&mut self) {
        self.reset_with_rng(&mut rand::rng());
    }

    /// Like [`GameSession::reset`], drawing the new secret from `rng`.
    pub fn reset_with_rng<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let level = self.state.level().clone();
        info!(level_id = *level.id(), "Session reset");
        *self = Self::start_with_rng(&level, rng);
    }

    /// The secret once the session is over.
    pub fn revealed_secret(&self) -> Option<&Secret> {
        self.state.revealed_secret()
    }

    /// Advisory report for the history so far.
    pub fn advisory(&self) -> Advisory {
        analyze(self.state.history(), self.state.secret_length())
    }
}
