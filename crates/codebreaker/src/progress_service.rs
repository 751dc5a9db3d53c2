//! Progress business logic: which key to use and how ledgers stay in sync.

use std::collections::BTreeSet;

use codebreaker_core::{Catalog, highest_unlocked, progress_percent};
use derive_getters::Getters;
use tracing::{debug, info, instrument, warn};

use crate::auth::AuthenticatedUser;
use crate::ledger::{LedgerError, PlayerKey, ProgressLedger};

/// Summary of a player's progress through the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct ProgressSnapshot {
    key: PlayerKey,
    completed: BTreeSet<u32>,
    highest_unlocked: u32,
    percent: u32,
}

/// Service layer over the local and optional remote ledgers.
///
/// The local ledger is always written first and is what play relies on. A
/// remote ledger is consulted only for a signed-in user; its failures are
/// logged and otherwise ignored. Reads merge the two, so a win recorded while
/// the remote was down is uploaded on the next successful read.
pub struct ProgressService {
    local: Box<dyn ProgressLedger>,
    remote: Option<Box<dyn ProgressLedger>>,
    device_key: PlayerKey,
    user: Option<AuthenticatedUser>,
}

impl ProgressService {
    /// Creates a service for an anonymous player on `device_key`.
    #[instrument(skip(local, remote), fields(has_remote = remote.is_some()))]
    pub fn new(
        local: Box<dyn ProgressLedger>,
        remote: Option<Box<dyn ProgressLedger>>,
        device_key: PlayerKey,
    ) -> Self {
        info!("Creating ProgressService");
        Self {
            local,
            remote,
            device_key,
            user: None,
        }
    }

    /// Starts with `user` already signed in, without any migration.
    pub fn with_user(mut self, user: Option<AuthenticatedUser>) -> Self {
        self.user = user;
        self
    }

    /// The signed-in account, if any.
    pub fn user(&self) -> Option<&AuthenticatedUser> {
        self.user.as_ref()
    }

    /// The key progress is read from and written to.
    pub fn active_key(&self) -> PlayerKey {
        match &self.user {
            Some(user) => PlayerKey::User(user.user_id().clone()),
            None => self.device_key.clone(),
        }
    }

    fn remote_for_active_key(&self) -> Option<&dyn ProgressLedger> {
        if self.user.is_some() {
            self.remote.as_deref()
        } else {
            None
        }
    }

    /// Completed levels for the active key.
    ///
    /// With a remote and a signed-in user, the remote record is merged with
    /// the local mirror. Levels only known locally are pushed back to the
    /// remote. If the remote fails, the mirror is returned.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError`] only when the local ledger fails.
    #[instrument(skip(self))]
    pub async fn completed_levels(&self) -> Result<BTreeSet<u32>, LedgerError> {
        let key = self.active_key();
        if let Some(remote) = self.remote_for_active_key() {
            match remote.completed_levels(&key).await {
                Ok(levels) => return self.reconcile(remote, &key, levels).await,
                Err(e) => warn!(error = %e, "Remote progress unavailable, using local mirror"),
            }
        }
        self.local.completed_levels(&key).await
    }

    /// Merges `remote_levels` into the local mirror for `key` and uploads
    /// whatever the remote is missing. Returns the union.
    ///
    /// Local completions are never dropped. The upload is best-effort.
    #[instrument(
        skip(self, remote, remote_levels),
        fields(key = %key, remote_count = remote_levels.len())
    )]
    async fn reconcile(
        &self,
        remote: &dyn ProgressLedger,
        key: &PlayerKey,
        remote_levels: BTreeSet<u32>,
    ) -> Result<BTreeSet<u32>, LedgerError> {
        let local_levels = self.local.completed_levels(key).await?;
        let unsynced: BTreeSet<u32> = local_levels.difference(&remote_levels).copied().collect();
        let merged: BTreeSet<u32> = local_levels.union(&remote_levels).copied().collect();

        if merged != local_levels {
            self.local.replace(key, &merged).await?;
            debug!(count = merged.len(), "Local mirror refreshed");
        }
        if !unsynced.is_empty() {
            match remote.import(key, &unsynced).await {
                Ok(()) => info!(count = unsynced.len(), "Unsynced progress uploaded"),
                Err(e) => warn!(error = %e, count = unsynced.len(), "Upload failed, kept locally"),
            }
        }
        Ok(merged)
    }

    /// Records a completion for the active key.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError`] only when the local write fails.
    #[instrument(skip(self))]
    pub async fn mark_completed(&self, level_id: u32) -> Result<(), LedgerError> {
        let key = self.active_key();
        self.local.mark_completed(&key, level_id).await?;
        if let Some(remote) = self.remote_for_active_key() {
            if let Err(e) = remote.mark_completed(&key, level_id).await {
                warn!(error = %e, level_id, "Remote write failed, kept locally");
            }
        }
        info!(key = %key, level_id, "Level completed");
        Ok(())
    }

    /// Records a win and returns the level to advance to, or `None` after the
    /// last level.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError`] only when the local write fails.
    #[instrument(skip(self, catalog))]
    pub async fn record_win(
        &self,
        level_id: u32,
        catalog: &Catalog,
    ) -> Result<Option<u32>, LedgerError> {
        self.mark_completed(level_id).await?;
        Ok(catalog.next_after(level_id).map(|level| *level.id()))
    }

    /// Switches to `user` and reconciles progress.
    ///
    /// If the account has no record yet, device progress is copied into it.
    /// Otherwise the account's record is merged with the local mirror. When
    /// the remote cannot be reached, device progress is still migrated into
    /// the local account record so a later sync uploads it.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError`] only when the local ledger fails.
    #[instrument(skip(self, user), fields(user_id = %user.user_id()))]
    pub async fn on_login(&mut self, user: AuthenticatedUser) -> Result<(), LedgerError> {
        let user_key = PlayerKey::User(user.user_id().clone());
        self.user = Some(user);

        let device_levels = self.local.completed_levels(&self.device_key).await?;

        let Some(remote) = self.remote.as_deref() else {
            self.migrate_locally(&user_key, &device_levels).await?;
            return Ok(());
        };

        match remote.has_record(&user_key).await {
            Ok(false) => {
                self.local.import(&user_key, &device_levels).await?;
                let account_levels = self.local.completed_levels(&user_key).await?;
                if let Err(e) = remote.import(&user_key, &account_levels).await {
                    warn!(error = %e, "Failed to upload device progress");
                } else {
                    info!(count = account_levels.len(), "Device progress migrated to account");
                }
            }
            Ok(true) => match remote.completed_levels(&user_key).await {
                Ok(levels) => {
                    let merged = self.reconcile(remote, &user_key, levels).await?;
                    info!(count = merged.len(), "Account progress pulled");
                }
                Err(e) => warn!(error = %e, "Failed to pull account progress"),
            },
            Err(e) => {
                warn!(error = %e, "Remote unavailable at login, using local mirror");
                self.migrate_locally(&user_key, &device_levels).await?;
            }
        }
        Ok(())
    }

    /// Copies device progress into `user_key` unless it already has a record.
    async fn migrate_locally(
        &self,
        user_key: &PlayerKey,
        device_levels: &BTreeSet<u32>,
    ) -> Result<(), LedgerError> {
        if !self.local.has_record(user_key).await? {
            self.local.import(user_key, device_levels).await?;
            info!(count = device_levels.len(), "Device progress migrated locally");
        }
        Ok(())
    }

    /// Returns to anonymous play on the device key.
    #[instrument(skip(self))]
    pub fn on_logout(&mut self) {
        if self.user.take().is_some() {
            info!("Switched to device progress");
        }
    }

    /// Progress summary for the active key.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError`] only when the local ledger fails.
    #[instrument(skip(self, catalog))]
    pub async fn snapshot(&self, catalog: &Catalog) -> Result<ProgressSnapshot, LedgerError> {
        let completed = self.completed_levels().await?;
        Ok(ProgressSnapshot {
            key: self.active_key(),
            highest_unlocked: highest_unlocked(&completed).min(catalog.last_id()),
            percent: progress_percent(&completed),
            completed,
        })
    }
}
