//! Play loop driven by scripted input.

use std::collections::BTreeSet;
use std::io::Cursor;
use std::time::Duration;

use codebreaker::{
    Command, CommandError, Console, DbError, DbErrorKind, LedgerError, LevelOutcome, LocalLedger,
    PlayerKey, PlaySettings, ProgressLedger, ProgressRepository, ProgressService, parse_command,
};
use codebreaker_core::{Catalog, Code, GameSession, LevelDefinition, generate_secret_with};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tempfile::NamedTempFile;

fn quiet() -> PlaySettings {
    PlaySettings::new(false, Duration::ZERO)
}

fn code(indices: &[usize]) -> Code {
    Code::from_indices(indices).expect("valid indices")
}

fn console(script: &str, settings: PlaySettings) -> Console<Cursor<Vec<u8>>, Vec<u8>> {
    Console::new(Cursor::new(script.as_bytes().to_vec()), Vec::new(), settings)
}

async fn play(script: &str, game: &mut GameSession, settings: PlaySettings) -> (LevelOutcome, String) {
    let mut console = console(script, settings);
    let outcome = console.play_level(game).await.expect("io");
    let output = String::from_utf8(console.into_output()).expect("utf8");
    (outcome, output)
}

#[test]
fn test_parse_command_recognizes_controls_and_codes() {
    assert_eq!(parse_command("q").expect("parse"), Command::Quit);
    assert_eq!(parse_command(" R \n").expect("parse"), Command::Reset);
    assert_eq!(parse_command("enter").expect("parse"), Command::Enter);
    assert_eq!(parse_command("c 2").expect("parse"), Command::Cycle(2));
    assert_eq!(parse_command("hint").expect("parse"), Command::Hint);
    assert_eq!(
        parse_command("rgb").expect("parse"),
        Command::Submit(code(&[0, 2, 1]))
    );
    assert!(matches!(parse_command("   "), Err(CommandError::Empty)));
    assert!(matches!(parse_command("c x"), Err(CommandError::BadSlot)));
    assert!(matches!(parse_command("zzz"), Err(CommandError::Code(_))));
}

#[tokio::test]
async fn test_correct_guess_wins_level() {
    let level = LevelDefinition::for_id(1);
    let mut game = GameSession::with_secret(&level, code(&[0, 1, 2])).expect("valid");

    let (outcome, output) = play("y y y\nr b g\n", &mut game, quiet()).await;

    assert_eq!(outcome, LevelOutcome::Won);
    assert!(output.contains("Level 1: First Steps"));
    assert!(output.contains("Solved in 2 attempt(s)."));
    assert!(output.contains("Analysis: excluded yellow"));
}

#[tokio::test]
async fn test_wrong_length_guess_is_ignored() {
    let level = LevelDefinition::for_id(1);
    let mut game = GameSession::with_secret(&level, code(&[0, 1, 2])).expect("valid");

    let (outcome, output) = play("r b\n", &mut game, quiet()).await;

    assert_eq!(outcome, LevelOutcome::Exited);
    assert!(output.contains("Ignored: Guess has 2 slots, expected 3"));
    assert!(game.state().history().is_empty());
}

#[tokio::test]
async fn test_cycle_then_enter_submits_edited_guess() {
    let level = LevelDefinition::for_id(1);
    let mut game = GameSession::with_secret(&level, code(&[1, 0, 0])).expect("valid");

    let (outcome, _) = play("c 1\nc 9\nenter\n", &mut game, quiet()).await;

    assert_eq!(outcome, LevelOutcome::Won);
    assert_eq!(game.state().history().len(), 1);
}

#[tokio::test]
async fn test_loss_reveals_secret_and_waits_for_player() {
    let level = LevelDefinition::custom(1, 3, 1);
    let mut game = GameSession::with_secret(&level, code(&[4, 4, 5])).expect("valid");

    let (outcome, output) = play("r r r\nr r r\nq\n", &mut game, quiet()).await;

    assert_eq!(outcome, LevelOutcome::Exited);
    assert!(output.contains("The correct sequence was: purple, purple, orange"));
    assert!(output.contains("Type 'r' to try again"));
    assert!(output.contains("Ignored: Session is already lost"));
}

#[tokio::test]
async fn test_sound_cue_rings_on_accepted_guess() {
    let level = LevelDefinition::for_id(1);
    let mut game = GameSession::with_secret(&level, code(&[0, 1, 2])).expect("valid");

    let (_, output) = play("r b g\n", &mut game, PlaySettings::new(true, Duration::ZERO)).await;

    assert!(output.contains('\x07'));
}

fn setup_service() -> (NamedTempFile, LocalLedger, ProgressService) {
    let db_file = NamedTempFile::new().expect("Failed to create temp file");
    let db_path = db_file.path().to_str().expect("Invalid path").to_string();
    let local = LocalLedger::new(ProgressRepository::open(db_path).expect("open"));
    let service = ProgressService::new(
        Box::new(local.clone()),
        None,
        PlayerKey::Device("dev".to_string()),
    );
    (db_file, local, service)
}

#[tokio::test]
async fn test_campaign_records_wins_and_advances() {
    let (_db, local, service) = setup_service();
    let catalog = Catalog::generate();

    let mut preview = StdRng::seed_from_u64(11);
    let first = generate_secret_with(&mut preview, 3);
    let second = generate_secret_with(&mut preview, 3);
    let script = format!("{}\n{}\nq\n", first, second);

    let mut console =
        console(&script, quiet()).with_rng(StdRng::seed_from_u64(11));
    console
        .run_campaign(&service, &catalog, 1)
        .await
        .expect("campaign");
    let output = String::from_utf8(console.into_output()).expect("utf8");

    assert!(output.contains("Advancing to level 2."));
    assert!(output.contains("Advancing to level 3."));
    assert!(output.contains("Goodbye."));
    assert_eq!(
        local
            .completed_levels(&PlayerKey::Device("dev".to_string()))
            .await
            .expect("read"),
        BTreeSet::from([1, 2])
    );
}

#[tokio::test]
async fn test_campaign_ends_after_last_level() {
    let (_db, _local, service) = setup_service();
    let catalog = Catalog::generate();

    let mut preview = StdRng::seed_from_u64(3);
    let secret = generate_secret_with(&mut preview, 5);

    let mut console =
        console(&format!("{}\n", secret), quiet()).with_rng(StdRng::seed_from_u64(3));
    console
        .run_campaign(&service, &catalog, 100)
        .await
        .expect("campaign");
    let output = String::from_utf8(console.into_output()).expect("utf8");

    assert!(output.contains("Every level is complete."));
}

fn read_only() -> LedgerError {
    DbError::new(DbErrorKind::Query, "attempt to write a readonly database").into()
}

/// Ledger on storage that rejects every write.
struct ReadOnlyLedger;

#[async_trait::async_trait]
impl ProgressLedger for ReadOnlyLedger {
    async fn completed_levels(&self, _key: &PlayerKey) -> Result<BTreeSet<u32>, LedgerError> {
        Ok(BTreeSet::new())
    }

    async fn mark_completed(&self, _key: &PlayerKey, _level_id: u32) -> Result<(), LedgerError> {
        Err(read_only())
    }

    async fn has_record(&self, _key: &PlayerKey) -> Result<bool, LedgerError> {
        Ok(false)
    }

    async fn import(&self, _key: &PlayerKey, _levels: &BTreeSet<u32>) -> Result<(), LedgerError> {
        Err(read_only())
    }

    async fn replace(&self, _key: &PlayerKey, _levels: &BTreeSet<u32>) -> Result<(), LedgerError> {
        Err(read_only())
    }
}

#[tokio::test]
async fn test_unsaved_win_still_advances() {
    let service = ProgressService::new(
        Box::new(ReadOnlyLedger),
        None,
        PlayerKey::Device("dev".to_string()),
    );
    let catalog = Catalog::generate();

    let mut preview = StdRng::seed_from_u64(5);
    let first = generate_secret_with(&mut preview, 3);
    let script = format!("{}\nq\n", first);

    let mut console = console(&script, quiet()).with_rng(StdRng::seed_from_u64(5));
    console
        .run_campaign(&service, &catalog, 1)
        .await
        .expect("a failed save does not end the campaign");
    let output = String::from_utf8(console.into_output()).expect("utf8");

    assert!(output.contains("Progress could not be saved"));
    assert!(output.contains("Advancing to level 2."));
    assert!(output.contains("Goodbye."));
}
