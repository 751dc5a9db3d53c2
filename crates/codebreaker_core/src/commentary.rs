//! Assistant mood and message shown beside the board.

use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::catalog::LevelDefinition;
use crate::session::{SessionEvent, SessionState};

/// The assistant's mood.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Mood {
    /// Waiting for the first guess.
    Thinking,
    /// Strong match or a win.
    Happy,
    /// Partial match.
    Neutral,
    /// Nothing matched, or the game was lost.
    Sad,
}

/// Mood plus a one-line message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commentary {
    /// Current mood.
    pub mood: Mood,
    /// Message for the player.
    pub message: String,
}

impl Commentary {
    /// Commentary before any guess.
    pub fn initial(level: &LevelDefinition) -> Self {
        let message = if level.description().is_empty() {
            "System ready, awaiting input sequence.".to_string()
        } else {
            level.description().clone()
        };
        Self {
            mood: Mood::Thinking,
            message,
        }
    }

    /// Commentary after `event` left the session in `state`.
    ///
    /// Ignored submissions produce no new commentary; callers keep the old one.
    #[instrument(skip_all)]
    pub fn for_event(state: &SessionState, event: &SessionEvent) -> Self {
        let length = state.secret_length();
        match event {
            SessionEvent::Ignored(reason) => Self {
                mood: Mood::Thinking,
                message: reason.to_string(),
            },
            SessionEvent::Won(_) => Self {
                mood: Mood::Happy,
                message: "Sequence fully matched. Access granted.".to_string(),
            },
            SessionEvent::Lost(_) => Self {
                mood: Mood::Sad,
                message: format!(
                    "Access denied. The correct sequence was: {}",
                    state.secret().names()
                ),
            },
            SessionEvent::Continued(entry) => {
                let exact = entry.exact_matches();
                let color = entry.color_matches();
                if entry.is_zero() {
                    Self {
                        mood: Mood::Sad,
                        message: "No correlation detected. Adjust your strategy.".to_string(),
                    }
                } else if exact * 2 >= length {
                    Self {
                        mood: Mood::Happy,
                        message: format!("High correlation: {} positions match exactly.", exact),
                    }
                } else {
                    Self {
                        mood: Mood::Neutral,
                        message: format!(
                            "Partial correlation: {} in position, {} right color.",
                            exact, color
                        ),
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::code::Code;

    fn code(indices: &[usize]) -> Code {
        Code::from_indices(indices).expect("valid indices")
    }

    fn after(guess: &[usize]) -> Commentary {
        let level = LevelDefinition::for_id(12);
        let state = SessionState::with_secret(&level, code(&[0, 1, 2, 3])).expect("valid");
        let t = state.submit(&code(guess));
        Commentary::for_event(&t.state, &t.event)
    }

    #[test]
    fn test_initial_uses_level_description() {
        let level = LevelDefinition::for_id(1);
        let c = Commentary::initial(&level);
        assert_eq!(c.mood, Mood::Thinking);
        assert_eq!(&c.message, level.description());
    }

    #[test]
    fn test_moods_follow_feedback() {
        assert_eq!(after(&[5, 5, 5, 5]).mood, Mood::Sad);
        assert_eq!(after(&[0, 1, 5, 5]).mood, Mood::Happy);
        assert_eq!(after(&[0, 5, 1, 5]).mood, Mood::Neutral);
        assert_eq!(after(&[0, 1, 2, 3]).mood, Mood::Happy);
    }

    #[test]
    fn test_loss_reveals_secret_names() {
        let level = LevelDefinition::custom(7, 2, 1);
        let state = SessionState::with_secret(&level, code(&[4, 5])).expect("valid");
        let t = state.submit(&code(&[0, 0]));
        let c = Commentary::for_event(&t.state, &t.event);
        assert_eq!(c.mood, Mood::Sad);
        assert!(c.message.ends_with("purple, orange"));
    }
}
