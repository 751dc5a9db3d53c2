//! Advisory behavior over real sessions.

use codebreaker_core::{Code, GameSession, LevelDefinition, N_COLORS, analyze};
use proptest::prelude::*;

fn code(indices: &[usize]) -> Code {
    Code::from_indices(indices).expect("valid indices")
}

proptest! {
    #[test]
    fn test_excluded_set_never_shrinks(
        secret in prop::collection::vec(0..N_COLORS, 4),
        guesses in prop::collection::vec(prop::collection::vec(0..N_COLORS, 4), 1..12),
    ) {
        let level = LevelDefinition::for_id(20);
        let mut game = GameSession::with_secret(&level, code(&secret)).expect("valid");
        let mut previous = game.advisory().excluded().clone();

        for guess in guesses {
            game.submit(&code(&guess));
            let current = game.advisory().excluded().clone();
            prop_assert!(previous.is_subset(&current));
            previous = current;
        }
    }

    #[test]
    fn test_secret_always_counts_as_consistent(
        secret in prop::collection::vec(0..N_COLORS, 3),
        guesses in prop::collection::vec(prop::collection::vec(0..N_COLORS, 3), 0..6),
    ) {
        let level = LevelDefinition::custom(1000, 3, 20);
        let mut game = GameSession::with_secret(&level, code(&secret)).expect("valid");
        for guess in guesses {
            game.submit(&code(&guess));
        }
        let remaining = game.advisory().remaining_candidates().expect("short code is enumerated");
        prop_assert!(remaining >= 1);
    }
}

#[test]
fn test_advisory_is_pure_function_of_history() {
    let level = LevelDefinition::for_id(1);
    let mut game = GameSession::with_secret(&level, code(&[0, 1, 2])).expect("valid");
    game.submit(&code(&[3, 4, 5]));
    game.submit(&code(&[2, 1, 0]));

    let from_game = game.advisory();
    let from_history = analyze(game.state().history(), 3);
    assert_eq!(from_game, from_history);
    assert_eq!(analyze(game.state().history(), 3), from_history);
}

#[test]
fn test_suggestion_after_zero_guess_avoids_excluded_colors() {
    let level = LevelDefinition::for_id(1);
    let mut game = GameSession::with_secret(&level, code(&[0, 1, 2])).expect("valid");
    game.submit(&code(&[3, 4, 5]));

    let advisory = game.advisory();
    let suggestion = advisory.suggestion().clone().expect("colors remain");
    assert_eq!(suggestion, code(&[0, 1, 2]));
    assert!(suggestion.colors().iter().all(|c| !advisory.excluded().contains(c)));
}
