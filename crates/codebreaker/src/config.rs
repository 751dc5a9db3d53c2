//! Application configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

/// Settings for the terminal game.
///
/// Loaded from an optional TOML file, then overridden by `CODEBREAKER_*`
/// environment variables.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct AppConfig {
    /// Directory holding the progress database and identity file.
    #[serde(default = "default_data_dir")]
    data_dir: PathBuf,

    /// Base URL of the remote record store and account service.
    #[serde(default)]
    remote_url: Option<String>,

    /// Ring the terminal bell on each submitted guess.
    #[serde(default = "default_sound")]
    sound: bool,

    /// Pause before the advisory is shown, in milliseconds.
    #[serde(default = "default_analysis_delay_ms")]
    analysis_delay_ms: u64,

    /// Tracing filter used when `RUST_LOG` is not set.
    #[serde(default = "default_log_filter")]
    log_filter: String,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from(".codebreaker")
}

fn default_sound() -> bool {
    true
}

fn default_analysis_delay_ms() -> u64 {
    800
}

fn default_log_filter() -> String {
    "warn".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            remote_url: None,
            sound: default_sound(),
            analysis_delay_ms: default_analysis_delay_ms(),
            log_filter: default_log_filter(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;

        info!(data_dir = %config.data_dir.display(), "Config loaded successfully");
        Ok(config)
    }

    /// Loads the file at `path` if given, else defaults, then applies
    /// environment overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file or an override is invalid.
    #[instrument(skip(path))]
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.with_overrides(|name| std::env::var(name).ok())
    }

    /// Applies `CODEBREAKER_*` overrides read through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if an override does not parse.
    #[instrument(skip(self, lookup))]
    pub fn with_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(dir) = lookup("CODEBREAKER_DATA_DIR") {
            self.data_dir = PathBuf::from(dir);
        }
        if let Some(url) = lookup("CODEBREAKER_REMOTE_URL") {
            self.remote_url = Some(url).filter(|u| !u.trim().is_empty());
        }
        if let Some(sound) = lookup("CODEBREAKER_SOUND") {
            self.sound = parse_flag(&sound).ok_or_else(|| {
                ConfigError::new(format!("CODEBREAKER_SOUND must be a boolean, got '{}'", sound))
            })?;
        }
        if let Some(delay) = lookup("CODEBREAKER_ANALYSIS_DELAY_MS") {
            self.analysis_delay_ms = delay.trim().parse().map_err(|e| {
                ConfigError::new(format!("CODEBREAKER_ANALYSIS_DELAY_MS invalid: {}", e))
            })?;
        }
        Ok(self)
    }

    /// Path of the SQLite progress database.
    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join("progress.db")
    }

    /// Path of the identity file.
    pub fn identity_path(&self) -> PathBuf {
        self.data_dir.join("identity.json")
    }

    /// Advisory delay as a duration.
    pub fn analysis_delay(&self) -> Duration {
        Duration::from_millis(self.analysis_delay_ms)
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}
