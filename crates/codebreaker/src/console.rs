//! Line-based terminal front end.
//!
//! Reads commands from any [`BufRead`] and writes the board to any [`Write`],
//! so the same loop drives stdin/stdout and in-memory buffers.

use std::io::{self, BufRead, Write};
use std::time::Duration;

use codebreaker_core::{
    Catalog, Code, CodeError, Color, GameSession, Guess, SessionEvent, SessionStatus,
};
use derive_more::{Display, Error, From};
use derive_new::new;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info, instrument, warn};

use crate::progress_service::ProgressService;

/// Presentation settings for the play loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, new)]
pub struct PlaySettings {
    /// Ring the terminal bell on each accepted guess.
    pub sound: bool,
    /// Pause before the advisory is shown.
    pub analysis_delay: Duration,
}

/// One line of player input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Submit this guess.
    Submit(Guess),
    /// Advance one slot (1-based) of the edited guess.
    Cycle(usize),
    /// Submit the edited guess.
    Enter,
    /// Start the level over with a new secret.
    Reset,
    /// Show the advisory now.
    Hint,
    /// Show the command list.
    Help,
    /// Leave the game.
    Quit,
}

/// Unusable input line.
#[derive(Debug, Display, Error, From)]
pub enum CommandError {
    /// Blank line.
    #[display("Type a guess, or 'help' for commands")]
    #[from(ignore)]
    Empty,
    /// `c` without a valid slot number.
    #[display("Usage: c <slot>, e.g. 'c 2'")]
    #[from(ignore)]
    BadSlot,
    /// Neither a command nor a code.
    #[display("{}", _0)]
    Code(CodeError),
}

/// Parses one input line.
///
/// # Errors
///
/// Returns [`CommandError`] for blank lines, malformed slot commands and
/// unparseable codes.
pub fn parse_command(line: &str) -> Result<Command, CommandError> {
    let line = line.trim();
    let lower = line.to_ascii_lowercase();
    match lower.as_str() {
        "" => Err(CommandError::Empty),
        "q" | "quit" | "exit" => Ok(Command::Quit),
        "r" | "reset" => Ok(Command::Reset),
        "enter" | "submit" | "s" => Ok(Command::Enter),
        "h" | "hint" => Ok(Command::Hint),
        "help" | "?" => Ok(Command::Help),
        _ => {
            if let Some(rest) = lower.strip_prefix("c ") {
                let slot = rest.trim().parse().map_err(|_| CommandError::BadSlot)?;
                return Ok(Command::Cycle(slot));
            }
            Ok(Command::Submit(Code::parse(line)?))
        }
    }
}

/// How a level ended from the loop's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelOutcome {
    /// The secret was found.
    Won,
    /// The player quit or input ended.
    Exited,
}

/// Play loop failure.
#[derive(Debug, Display, Error, From)]
pub enum ConsoleError {
    /// Terminal I/O failed.
    #[display("Terminal I/O failed: {}", _0)]
    Io(io::Error),
}

/// Terminal play loop.
pub struct Console<R, W> {
    input: R,
    output: W,
    settings: PlaySettings,
    rng: StdRng,
}

impl<R: BufRead, W: Write> Console<R, W> {
    /// Creates a console with an OS-seeded secret generator.
    pub fn new(input: R, output: W, settings: PlaySettings) -> Self {
        Self {
            input,
            output,
            settings,
            rng: StdRng::from_os_rng(),
        }
    }

    /// Replaces the secret generator.
    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    /// Gives back the output sink.
    pub fn into_output(self) -> W {
        self.output
    }

    /// Plays levels from `start_id`, recording each win and advancing to the
    /// next level until the player quits or the catalog runs out.
    ///
    /// A win that cannot be saved is reported and play continues.
    ///
    /// # Errors
    ///
    /// Returns [`ConsoleError`] on terminal I/O failure.
    #[instrument(skip(self, service, catalog))]
    pub async fn run_campaign(
        &mut self,
        service: &ProgressService,
        catalog: &Catalog,
        start_id: u32,
    ) -> Result<(), ConsoleError> {
        let mut level_id = start_id;
        while let Some(level) = catalog.level(level_id) {
            let mut game = GameSession::start_with_rng(level, &mut self.rng);
            match self.play_level(&mut game).await? {
                LevelOutcome::Exited => {
                    writeln!(self.output, "Goodbye.")?;
                    return Ok(());
                }
                LevelOutcome::Won => match self.record_win(service, catalog, level_id).await? {
                    Some(next) => {
                        info!(from = level_id, to = next, "Advancing");
                        writeln!(self.output, "Advancing to level {}.\n", next)?;
                        level_id = next;
                    }
                    None => {
                        writeln!(self.output, "Every level is complete. Well played.")?;
                        return Ok(());
                    }
                },
            }
        }
        Ok(())
    }

    async fn record_win(
        &mut self,
        service: &ProgressService,
        catalog: &Catalog,
        level_id: u32,
    ) -> io::Result<Option<u32>> {
        match service.record_win(level_id, catalog).await {
            Ok(next) => Ok(next),
            Err(e) => {
                warn!(error = %e, level_id, "Win not saved");
                writeln!(self.output, "Progress could not be saved: {}", e)?;
                Ok(catalog.next_after(level_id).map(|level| *level.id()))
            }
        }
    }

    /// Runs one level until it is won or the player leaves.
    ///
    /// A lost level stays on screen until the player resets or quits.
    ///
    /// # Errors
    ///
    /// Returns [`io::Error`] on terminal I/O failure.
    #[instrument(skip(self, game), fields(level_id = *game.level().id()))]
    pub async fn play_level(&mut self, game: &mut GameSession) -> io::Result<LevelOutcome> {
        self.write_header(game)?;
        loop {
            self.write_prompt(game)?;
            let Some(line) = self.read_line()? else {
                debug!("Input closed");
                return Ok(LevelOutcome::Exited);
            };

            let command = match parse_command(&line) {
                Ok(command) => command,
                Err(e) => {
                    writeln!(self.output, "{}", e)?;
                    continue;
                }
            };

            let event = match command {
                Command::Quit => return Ok(LevelOutcome::Exited),
                Command::Help => {
                    self.write_help()?;
                    continue;
                }
                Command::Hint => {
                    self.write_advisory(game)?;
                    continue;
                }
                Command::Reset => {
                    game.reset_with_rng(&mut self.rng);
                    self.write_header(game)?;
                    continue;
                }
                Command::Cycle(slot) => {
                    if slot == 0 || slot > game.current_guess().len() {
                        writeln!(
                            self.output,
                            "Slot must be between 1 and {}",
                            game.current_guess().len()
                        )?;
                    } else {
                        game.cycle_slot(slot - 1);
                    }
                    continue;
                }
                Command::Enter => game.submit_current(),
                Command::Submit(guess) => game.submit(&guess),
            };

            if self.report(game, event).await? {
                return Ok(LevelOutcome::Won);
            }
        }
    }

    /// Prints the result of a submission. Returns `true` on a win.
    async fn report(&mut self, game: &GameSession, event: SessionEvent) -> io::Result<bool> {
        if let SessionEvent::Ignored(reason) = event {
            writeln!(self.output, "Ignored: {}", reason)?;
            return Ok(false);
        }

        if self.settings.sound {
            write!(self.output, "\x07")?;
        }
        self.write_board(game)?;
        self.write_commentary(game)?;

        match event {
            SessionEvent::Won(_) => {
                writeln!(
                    self.output,
                    "Solved in {} attempt(s).",
                    game.state().history().len()
                )?;
                Ok(true)
            }
            SessionEvent::Lost(_) => {
                writeln!(self.output, "Type 'r' to try again or 'q' to quit.")?;
                Ok(false)
            }
            _ => {
                self.output.flush()?;
                if !self.settings.analysis_delay.is_zero() {
                    tokio::time::sleep(self.settings.analysis_delay).await;
                }
                self.write_advisory(game)?;
                Ok(false)
            }
        }
    }

    fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line))
    }

    fn write_header(&mut self, game: &GameSession) -> io::Result<()> {
        let level = game.level();
        writeln!(
            self.output,
            "== Level {}: {} ({} slots, {} attempts) ==",
            level.id(),
            level.title(),
            level.secret_length(),
            level.max_attempts()
        )?;
        self.write_palette()?;
        self.write_commentary(game)
    }

    fn write_palette(&mut self) -> io::Result<()> {
        let legend: Vec<String> = Color::all()
            .map(|c| format!("{}={}", c.letter(), c.name()))
            .collect();
        writeln!(self.output, "Colors: {}", legend.join(" "))
    }

    fn write_prompt(&mut self, game: &GameSession) -> io::Result<()> {
        if game.status() == SessionStatus::Playing {
            write!(
                self.output,
                "[{}] {} left> ",
                game.current_guess(),
                game.state().remaining_attempts()
            )?;
        } else {
            write!(self.output, "({})> ", game.status())?;
        }
        self.output.flush()
    }

    fn write_board(&mut self, game: &GameSession) -> io::Result<()> {
        for (n, entry) in game.state().history().iter().enumerate() {
            writeln!(
                self.output,
                "{:>3}. {}  | {}",
                n + 1,
                entry.guess(),
                entry.feedback()
            )?;
        }
        Ok(())
    }

    fn write_commentary(&mut self, game: &GameSession) -> io::Result<()> {
        let commentary = game.commentary();
        writeln!(self.output, "[{}] {}", commentary.mood, commentary.message)
    }

    fn write_advisory(&mut self, game: &GameSession) -> io::Result<()> {
        let advisory = game.advisory();
        writeln!(
            self.output,
            "Analysis: excluded {} | confirmed {} | plausible {}",
            color_list(advisory.excluded().iter()),
            color_list(advisory.confirmed().iter()),
            color_list(advisory.plausible().iter()),
        )?;
        if let Some(suggestion) = advisory.suggestion() {
            write!(self.output, "Try: {}", suggestion)?;
        } else {
            write!(self.output, "Try: no colors left to suggest")?;
        }
        match advisory.remaining_candidates() {
            Some(count) => writeln!(self.output, " | {} candidate(s) left", count),
            None => writeln!(self.output),
        }
    }

    fn write_help(&mut self) -> io::Result<()> {
        writeln!(
            self.output,
            "Commands:\n  <code>     submit a guess, e.g. 'rgb' or 'red green blue'\n  c <slot>   cycle one slot of the edited guess\n  enter      submit the edited guess\n  hint       show the analysis\n  r          restart the level\n  q          quit"
        )
    }
}

fn color_list<'a>(colors: impl Iterator<Item = &'a Color>) -> String {
    let names: Vec<&str> = colors.map(|c| c.name()).collect();
    if names.is_empty() {
        "-".to_string()
    } else {
        names.join(", ")
    }
}
