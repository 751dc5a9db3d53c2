//! Device identity and the signed-in account, persisted between runs.

use std::path::{Path, PathBuf};

use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::auth::AuthenticatedUser;
use crate::ledger::PlayerKey;

/// Supplies the pseudonymous key used when nobody is signed in.
pub trait IdentityProvider: Send + Sync {
    /// Stable device-scoped key.
    fn resolve_player_key(&self) -> PlayerKey;
}

/// Identity file error.
#[derive(Debug, Clone, Display, Error)]
#[display("Identity error: {} at {}:{}", message, file, line)]
pub struct IdentityError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl IdentityError {
    /// Creates a new identity error at the caller's location.
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

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct IdentityRecord {
    device_id: String,
    #[serde(default)]
    user: Option<AuthenticatedUser>,
}

/// Identity stored as JSON on disk.
///
/// The device id is a random UUID generated on first use and never changes
/// afterwards. The signed-in account, if any, is kept beside it.
#[derive(Debug, Clone)]
pub struct FileIdentity {
    path: PathBuf,
    record: IdentityRecord,
}

impl FileIdentity {
    /// Loads the identity at `path`, creating it if the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError`] if the file is unreadable or malformed, or a
    /// new one cannot be written.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn load_or_create(path: impl AsRef<Path>) -> Result<Self, IdentityError> {
        let path = path.as_ref().to_path_buf();
        if path.exists() {
            let content = std::fs::read_to_string(&path)
                .map_err(|e| IdentityError::new(format!("Failed to read identity: {}", e)))?;
            let record: IdentityRecord = serde_json::from_str(&content)
                .map_err(|e| IdentityError::new(format!("Failed to parse identity: {}", e)))?;
            debug!(device_id = %record.device_id, "Identity loaded");
            return Ok(Self { path, record });
        }

        let identity = Self {
            path,
            record: IdentityRecord {
                device_id: uuid::Uuid::new_v4().to_string(),
                user: None,
            },
        };
        identity.save()?;
        info!(device_id = %identity.record.device_id, "New device identity created");
        Ok(identity)
    }

    /// The device id.
    pub fn device_id(&self) -> &str {
        &self.record.device_id
    }

    /// The signed-in account.
    pub fn user(&self) -> Option<&AuthenticatedUser> {
        self.record.user.as_ref()
    }

    /// Remembers `user` as signed in.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError`] if the file cannot be written.
    #[instrument(skip(self, user), fields(user_id = %user.user_id()))]
    pub fn set_user(&mut self, user: AuthenticatedUser) -> Result<(), IdentityError> {
        self.record.user = Some(user);
        self.save()
    }

    /// Forgets the signed-in account and returns it.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError`] if the file cannot be written.
    #[instrument(skip(self))]
    pub fn logout(&mut self) -> Result<Option<AuthenticatedUser>, IdentityError> {
        let previous = self.record.user.take();
        self.save()?;
        info!(was_signed_in = previous.is_some(), "Logged out");
        Ok(previous)
    }

    fn save(&self) -> Result<(), IdentityError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                IdentityError::new(format!("Failed to create {}: {}", parent.display(), e))
            })?;
        }
        let content = serde_json::to_string_pretty(&self.record)
            .map_err(|e| IdentityError::new(format!("Failed to encode identity: {}", e)))?;
        std::fs::write(&self.path, content)
            .map_err(|e| IdentityError::new(format!("Failed to write identity: {}", e)))
    }
}

impl IdentityProvider for FileIdentity {
    fn resolve_player_key(&self) -> PlayerKey {
        PlayerKey::Device(self.record.device_id.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_id_survives_reload() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("nested").join("identity.json");

        let first = FileIdentity::load_or_create(&path).expect("create");
        let second = FileIdentity::load_or_create(&path).expect("reload");

        assert_eq!(first.device_id(), second.device_id());
        assert!(uuid::Uuid::parse_str(first.device_id()).is_ok());
        assert_eq!(
            second.resolve_player_key(),
            PlayerKey::Device(first.device_id().to_string())
        );
    }

    #[test]
    fn test_user_persists_until_logout() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("identity.json");
        let user = AuthenticatedUser::new("7".to_string(), "ada".to_string());

        let mut identity = FileIdentity::load_or_create(&path).expect("create");
        identity.set_user(user.clone()).expect("set user");
        let reloaded = FileIdentity::load_or_create(&path).expect("reload");
        assert_eq!(reloaded.user(), Some(&user));

        let mut reloaded = reloaded;
        assert_eq!(reloaded.logout().expect("logout"), Some(user));
        let after = FileIdentity::load_or_create(&path).expect("reload");
        assert!(after.user().is_none());
        assert_eq!(after.device_id(), identity.device_id());
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("identity.json");
        std::fs::write(&path, "not json").expect("write");
        assert!(FileIdentity::load_or_create(&path).is_err());
    }
}
