//! Session persistence backends.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use parish_core::UserRecord;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::debug;

use super::Session;

/// Errors reading or writing a persisted session.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("corrupt session record: {0}")]
    Corrupt(#[from] serde_json::Error),
    #[error("incomplete session record: {0}")]
    Incomplete(&'static str),
}

/// Durable home for the current session.
///
/// Implementations hold at most one session. `save` replaces it, `clear`
/// removes it and succeeds when there is nothing to remove.
pub trait SessionStore: Send + Sync + 'static {
    /// Read the stored session, if any.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the record exists but cannot be read or parsed.
    fn load(&self) -> Result<Option<Session>, StoreError>;

    /// Replace the stored session.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the record cannot be written.
    fn save(&self, session: &Session) -> Result<(), StoreError>;

    /// Remove the stored session.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if an existing record cannot be removed.
    fn clear(&self) -> Result<(), StoreError>;
}

/// On-disk shape: token and user always travel in one record.
#[derive(Serialize, Deserialize)]
struct SessionRecord {
    token: String,
    user: UserRecord,
}

impl SessionRecord {
    fn from_session(session: &Session) -> Self {
        Self {
            token: session.token().expose_secret().to_owned(),
            user: session.user().clone(),
        }
    }

    fn into_session(self) -> Result<Session, StoreError> {
        if self.token.trim().is_empty() {
            return Err(StoreError::Incomplete("empty token"));
        }
        Ok(Session::new(SecretString::from(self.token), self.user))
    }
}

// =============================================================================
// File store
// =============================================================================

/// Stores the session as a single JSON file.
///
/// Writes go to a sibling temp file that is renamed over the target, so a
/// crash never leaves a half-written session behind. The temp file is
/// created owner-only on unix and removed if the write fails.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    /// Store the session at `path`. Parent directories are created on save.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the session file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Result<Option<Session>, StoreError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let record: SessionRecord = serde_json::from_slice(&bytes)?;
        record.into_session().map(Some)
    }

    fn save(&self, session: &Session) -> Result<(), StoreError> {
        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(dir)?;

        let json = serde_json::to_vec_pretty(&SessionRecord::from_session(session))?;
        // Dropped (and deleted) on any early return.
        let mut temp = NamedTempFile::new_in(dir)?;
        temp.write_all(&json)?;
        temp.as_file().sync_all()?;
        temp.persist(&self.path).map_err(|e| e.error)?;

        debug!(path = %self.path.display(), "Session saved");
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                debug!(path = %self.path.display(), "Session removed");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

// =============================================================================
// Memory store
// =============================================================================

/// Keeps the session in memory only. Used by tests and one-shot tools.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    slot: Mutex<Option<Session>>,
}

impl MemorySessionStore {
    /// Empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store that already holds `session`, as if saved by a previous run.
    #[must_use]
    pub fn with_session(session: Session) -> Self {
        Self {
            slot: Mutex::new(Some(session)),
        }
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Result<Option<Session>, StoreError> {
        Ok(self
            .slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    fn save(&self, session: &Session) -> Result<(), StoreError> {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(session.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::session::fixtures;
    use parish_core::Role;

    #[test]
    fn test_file_store_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path().join("session.json"));
        assert!(store.load().unwrap().is_none());
        store.clear().unwrap();
    }

    #[test]
    fn test_file_store_persists_token_with_user() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("session.json");
        let store = FileSessionStore::new(&path);

        store.save(&fixtures::session(3, Role::Member)).unwrap();
        let entries = fs::read_dir(path.parent().unwrap()).unwrap().count();
        assert_eq!(entries, 1);

        let loaded = FileSessionStore::new(&path).load().unwrap().unwrap();
        assert_eq!(loaded.token().expose_secret(), "token-3");
        assert_eq!(loaded.user(), &fixtures::user(3, Role::Member));

        store.clear().unwrap();
        assert!(!path.exists());
        assert!(store.load().unwrap().is_none());
    }

    #[cfg(unix)]
    #[test]
    fn test_file_store_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path().join("session.json"));
        store.save(&fixtures::session(1, Role::Admin)).unwrap();

        let mode = fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[cfg(unix)]
    #[test]
    fn test_file_store_replaces_loose_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, "{}").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).unwrap();

        FileSessionStore::new(&path)
            .save(&fixtures::session(1, Role::Admin))
            .unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_failed_save_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        // A non-empty directory where the session file should go.
        let path = dir.path().join("session.json");
        fs::create_dir(&path).unwrap();
        fs::write(path.join("keep"), "x").unwrap();

        let result = FileSessionStore::new(&path).save(&fixtures::session(1, Role::Admin));

        assert!(matches!(result, Err(StoreError::Io(_))));
        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("session.json")]);
    }

    #[test]
    fn test_file_store_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, "{not json").unwrap();
        assert!(matches!(
            FileSessionStore::new(&path).load(),
            Err(StoreError::Corrupt(_))
        ));
    }

    #[test]
    fn test_file_store_rejects_token_without_user() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, r#"{"token": "abc"}"#).unwrap();
        assert!(FileSessionStore::new(&path).load().is_err());

        fs::write(
            &path,
            r#"{"token": " ", "user": {"id": 1, "name": "A", "email": "a@b.c", "role": "admin"}}"#,
        )
        .unwrap();
        assert!(matches!(
            FileSessionStore::new(&path).load(),
            Err(StoreError::Incomplete(_))
        ));
    }

    #[test]
    fn test_memory_store_round_trip() {
        let store = MemorySessionStore::new();
        assert!(store.load().unwrap().is_none());
        store.save(&fixtures::session(2, Role::Staff)).unwrap();
        assert_eq!(store.load().unwrap().unwrap().user().id.as_i32(), 2);
        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());
    }
}
