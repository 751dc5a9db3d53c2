//! Progress store errors.

use derive_more::{Display, Error};
use tracing::instrument;

/// Which step of talking to the progress store failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum DbErrorKind {
    /// The SQLite file could not be opened.
    #[display("connection")]
    Connection,
    /// The schema could not be brought up to date.
    #[display("migration")]
    Migration,
    /// A read or write statement failed.
    #[display("query")]
    Query,
    /// A level id does not fit the `level_id` column.
    #[display("level id")]
    LevelOutOfRange,
}

/// Progress store failure, tagged with where it was raised.
#[derive(Debug, Clone, Display, Error)]
#[display("Progress store {} error: {} at {}:{}", kind, message, file, line)]
pub struct DbError {
    /// Failed step.
    pub kind: DbErrorKind,
    /// Detail from SQLite or diesel.
    pub message: String,
    /// Line that raised the error.
    pub line: u32,
    /// File that raised the error.
    pub file: &'static str,
}

impl DbError {
    /// Creates an error of `kind` at the caller's location.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(kind: DbErrorKind, message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            kind,
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }

    /// Shorthand for a level id that cannot be stored.
    #[track_caller]
    pub fn level_out_of_range(level_id: u32) -> Self {
        Self::new(
            DbErrorKind::LevelOutOfRange,
            format!("{} exceeds the column range", level_id),
        )
    }
}

impl From<diesel::result::Error> for DbError {
    #[track_caller]
    fn from(err: diesel::result::Error) -> Self {
        Self::new(DbErrorKind::Query, err.to_string())
    }
}

impl From<diesel::ConnectionError> for DbError {
    #[track_caller]
    fn from(err: diesel::ConnectionError) -> Self {
        Self::new(DbErrorKind::Connection, err.to_string())
    }
}
