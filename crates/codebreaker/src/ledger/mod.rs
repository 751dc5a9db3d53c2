//! Per-player record of completed levels.
//!
//! Two implementations exist: [`LocalLedger`] on SQLite and [`RemoteLedger`]
//! against an HTTP record store. Policy about which one to consult lives in
//! [`crate::ProgressService`].

mod local;
mod remote;

use std::collections::BTreeSet;

use derive_more::{Display, Error, From};

use crate::db::DbError;

pub use local::LocalLedger;
pub use remote::{ProgressRecord, RemoteLedger};

/// Identity under which progress is stored.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display)]
pub enum PlayerKey {
    /// Pseudonymous, device-scoped identity.
    #[display("device:{}", _0)]
    Device(String),
    /// Authenticated account.
    #[display("user:{}", _0)]
    User(String),
}

impl PlayerKey {
    /// Key as stored by ledgers.
    pub fn storage_key(&self) -> String {
        self.to_string()
    }

    /// Whether this is an authenticated identity.
    pub fn is_user(&self) -> bool {
        matches!(self, Self::User(_))
    }
}

/// Ledger failure.
#[derive(Debug, Display, Error, From)]
pub enum LedgerError {
    /// Local database failure.
    #[display("Local ledger failed: {}", _0)]
    Local(DbError),
    /// The request never produced a usable response.
    #[display("Remote ledger request failed: {}", _0)]
    Transport(reqwest::Error),
    /// The record store answered with an unexpected status.
    #[display("Remote ledger returned status {}", status)]
    #[from(ignore)]
    Status {
        /// HTTP status code.
        status: u16,
    },
    /// The configured base URL cannot address a record.
    #[display("Remote ledger URL '{}' is not a valid base", url)]
    #[from(ignore)]
    InvalidUrl {
        /// Configured base URL.
        url: String,
    },
}

/// Storage for the set of completed level ids per player.
#[async_trait::async_trait]
pub trait ProgressLedger: Send + Sync {
    /// Completed level ids for `key`; empty when nothing is stored.
    async fn completed_levels(&self, key: &PlayerKey) -> Result<BTreeSet<u32>, LedgerError>;

    /// Records one completion. Recording the same level twice is a no-op.
    async fn mark_completed(&self, key: &PlayerKey, level_id: u32) -> Result<(), LedgerError>;

    /// Whether any record exists for `key`.
    async fn has_record(&self, key: &PlayerKey) -> Result<bool, LedgerError>;

    /// Adds `levels` to the record for `key`.
    async fn import(&self, key: &PlayerKey, levels: &BTreeSet<u32>) -> Result<(), LedgerError>;

    /// Makes the record for `key` exactly `levels`.
    async fn replace(&self, key: &PlayerKey, levels: &BTreeSet<u32>) -> Result<(), LedgerError>;
}
