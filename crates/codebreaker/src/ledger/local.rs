//! SQLite-backed ledger.

use std::collections::BTreeSet;

use tracing::instrument;

use crate::db::ProgressRepository;
use crate::ledger::{LedgerError, PlayerKey, ProgressLedger};

/// Ledger stored in the local SQLite database.
#[derive(Debug, Clone)]
pub struct LocalLedger {
    repository: ProgressRepository,
}

impl LocalLedger {
    /// Wraps a migrated repository.
    pub fn new(repository: ProgressRepository) -> Self {
        Self { repository }
    }

    /// Returns the underlying repository.
    pub fn repository(&self) -> &ProgressRepository {
        &self.repository
    }
}

#[async_trait::async_trait]
impl ProgressLedger for LocalLedger {
    #[instrument(skip(self), fields(key = %key))]
    async fn completed_levels(&self, key: &PlayerKey) -> Result<BTreeSet<u32>, LedgerError> {
        Ok(self.repository.completed_level_ids(&key.storage_key())?)
    }

    #[instrument(skip(self), fields(key = %key))]
    async fn mark_completed(&self, key: &PlayerKey, level_id: u32) -> Result<(), LedgerError> {
        self.repository
            .mark_completed(&key.storage_key(), level_id)?;
        Ok(())
    }

    #[instrument(skip(self), fields(key = %key))]
    async fn has_record(&self, key: &PlayerKey) -> Result<bool, LedgerError> {
        Ok(self.repository.has_player(&key.storage_key())?)
    }

    #[instrument(skip(self, levels), fields(key = %key, count = levels.len()))]
    async fn import(&self, key: &PlayerKey, levels: &BTreeSet<u32>) -> Result<(), LedgerError> {
        self.repository.import(&key.storage_key(), levels)?;
        Ok(())
    }

    #[instrument(skip(self, levels), fields(key = %key, count = levels.len()))]
    async fn replace(&self, key: &PlayerKey, levels: &BTreeSet<u32>) -> Result<(), LedgerError> {
        self.repository.replace(&key.storage_key(), levels)?;
        Ok(())
    }
}
