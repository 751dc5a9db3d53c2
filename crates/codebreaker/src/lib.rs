//! Codebreaker application layer.
//!
//! Wraps the [`codebreaker_core`] engine with persistence and a terminal
//! front end.
//!
//! # Architecture
//!
//! - **Ledger**: completed levels per player, in SQLite and optionally on a
//!   remote record store
//! - **Identity / Auth**: a stable device id plus an optional signed-in account
//! - **Progress service**: chooses the active key and keeps ledgers in sync
//! - **Console**: line-based play loop over any reader and writer
//!
//! # Example
//!
//! ```no_run
//! use codebreaker::{LocalLedger, PlayerKey, ProgressRepository, ProgressService};
//! use codebreaker_core::Catalog;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let repository = ProgressRepository::open("progress.db".to_string())?;
//! let service = ProgressService::new(
//!     Box::new(LocalLedger::new(repository)),
//!     None,
//!     PlayerKey::Device("this-device".to_string()),
//! );
//! let next = service.record_win(1, &Catalog::generate()).await?;
//! assert_eq!(next, Some(2));
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod auth;
mod config;
mod console;
mod db;
mod identity;
mod ledger;
mod progress_service;

pub use auth::{AuthError, AuthenticatedUser, Authenticator, RemoteAuthenticator};
pub use config::{AppConfig, ConfigError};
pub use console::{
    Command, CommandError, Console, ConsoleError, LevelOutcome, PlaySettings, parse_command,
};
pub use db::{CompletedLevel, DbError, DbErrorKind, NewCompletedLevel, ProgressRepository};
pub use identity::{FileIdentity, IdentityError, IdentityProvider};
pub use ledger::{
    LedgerError, LocalLedger, PlayerKey, ProgressLedger, ProgressRecord, RemoteLedger,
};
pub use progress_service::{ProgressService, ProgressSnapshot};
