//! HTTP record-store ledger.

use std::collections::BTreeSet;

use derive_getters::Getters;
use reqwest::{StatusCode, Url};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::ledger::{LedgerError, PlayerKey, ProgressLedger};

/// Body of `GET` and `PUT {base}/progress/{key}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct ProgressRecord {
    completed_levels: BTreeSet<u32>,
}

impl ProgressRecord {
    /// Record holding `completed_levels`.
    pub fn new(completed_levels: BTreeSet<u32>) -> Self {
        Self { completed_levels }
    }
}

/// Ledger stored on a remote record store.
#[derive(Debug, Clone)]
pub struct RemoteLedger {
    base_url: String,
    client: reqwest::Client,
}

impl RemoteLedger {
    /// Creates a ledger against `base_url`. A trailing slash is ignored.
    #[instrument]
    pub fn new(base_url: &str) -> Self {
        info!("Creating RemoteLedger");
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// `{base}/progress/{key}` with the key escaped as one path segment.
    fn record_url(&self, key: &PlayerKey) -> Result<Url, LedgerError> {
        let invalid = || LedgerError::InvalidUrl {
            url: self.base_url.clone(),
        };
        let mut url = Url::parse(&self.base_url).map_err(|_| invalid())?;
        url.path_segments_mut()
            .map_err(|_| invalid())?
            .pop_if_empty()
            .push("progress")
            .push(&key.storage_key());
        Ok(url)
    }

    /// Fetches the record for `key`, or `None` when the store has none.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError`] on transport failure or an unexpected status.
    #[instrument(skip(self), fields(key = %key))]
    pub async fn fetch(&self, key: &PlayerKey) -> Result<Option<ProgressRecord>, LedgerError> {
        let response = self.client.get(self.record_url(key)?).send().await?;
        match response.status() {
            StatusCode::NOT_FOUND => {
                debug!("No remote record");
                Ok(None)
            }
            status if status.is_success() => {
                let record = response.json::<ProgressRecord>().await?;
                debug!(count = record.completed_levels.len(), "Remote record fetched");
                Ok(Some(record))
            }
            status => Err(LedgerError::Status {
                status: status.as_u16(),
            }),
        }
    }

    /// Stores `record` as the full record for `key`.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError`] on transport failure or a non-success status.
    #[instrument(skip(self, record), fields(key = %key, count = record.completed_levels.len()))]
    pub async fn store(&self, key: &PlayerKey, record: &ProgressRecord) -> Result<(), LedgerError> {
        let response = self
            .client
            .put(self.record_url(key)?)
            .json(record)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(LedgerError::Status {
                status: status.as_u16(),
            });
        }
        info!("Remote record stored");
        Ok(())
    }
}

#[async_trait::async_trait]
impl ProgressLedger for RemoteLedger {
    async fn completed_levels(&self, key: &PlayerKey) -> Result<BTreeSet<u32>, LedgerError> {
        Ok(self
            .fetch(key)
            .await?
            .map(|record| record.completed_levels)
            .unwrap_or_default())
    }

    async fn mark_completed(&self, key: &PlayerKey, level_id: u32) -> Result<(), LedgerError> {
        let mut record = self.fetch(key).await?.unwrap_or_default();
        if !record.completed_levels.insert(level_id) {
            debug!(level_id, "Already recorded remotely");
            return Ok(());
        }
        self.store(key, &record).await
    }

    async fn has_record(&self, key: &PlayerKey) -> Result<bool, LedgerError> {
        Ok(self.fetch(key).await?.is_some())
    }

    async fn import(&self, key: &PlayerKey, levels: &BTreeSet<u32>) -> Result<(), LedgerError> {
        let mut record = self.fetch(key).await?.unwrap_or_default();
        record.completed_levels.extend(levels.iter().copied());
        self.store(key, &record).await
    }

    async fn replace(&self, key: &PlayerKey, levels: &BTreeSet<u32>) -> Result<(), LedgerError> {
        self.store(key, &ProgressRecord::new(levels.clone())).await
    }
}
