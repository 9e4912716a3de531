//! Durable session-token storage.
//!
//! The access token is the only artifact that survives a restart; identity
//! is always re-derived from the backend before the stored token is trusted
//! (see `session::manager`). Two implementations:
//! - [`FileTokenStore`] — one token in a mode-0600 file under the app dir,
//!   the desktop stand-in for browser local storage.
//! - [`MemoryTokenStore`] — in-process slot for tests and ephemeral sessions.

use parking_lot::Mutex;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::StoreError;

/// Abstract durable key-value slot for the session access token.
///
/// Implementations must be internally synchronized: the manager may clear
/// the store from a synchronous `logout` while an async verification holds
/// its own reference.
pub trait SessionStore: Send + Sync {
    /// Read the stored token, if any.
    fn get(&self) -> Result<Option<String>, StoreError>;

    /// Persist a token, replacing any previous one.
    fn set(&self, token: &str) -> Result<(), StoreError>;

    /// Remove the stored token. Removing an absent token is not an error.
    fn clear(&self) -> Result<(), StoreError>;
}

// ── File-backed store ───────────────────────────────────────────

/// Stores the token as the sole content of a file (trailing newline
/// tolerated). The parent directory is created on first write.
#[derive(Debug)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStore for FileTokenStore {
    fn get(&self) -> Result<Option<String>, StoreError> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => {
                let token = contents.trim();
                if token.is_empty() {
                    Ok(None)
                } else {
                    Ok(Some(token.to_string()))
                }
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, token: &str) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, token)?;

        // Token file readable by the owner only.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o600);
            std::fs::set_permissions(&self.path, perms)?;
        }

        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

// ── In-memory store ─────────────────────────────────────────────

/// Mutex-guarded single-token slot.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    slot: Mutex<Option<String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemoryTokenStore {
    fn get(&self) -> Result<Option<String>, StoreError> {
        Ok(self.slot.lock().clone())
    }

    fn set(&self, token: &str) -> Result<(), StoreError> {
        *self.slot.lock() = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        *self.slot.lock() = None;
        Ok(())
    }
}

// ── Tests ───────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn file_store() -> (TempDir, FileTokenStore) {
        let tmp = TempDir::new().unwrap();
        let store = FileTokenStore::new(tmp.path().join("session.token"));
        (tmp, store)
    }

    #[test]
    fn file_store_round_trip() {
        let (_tmp, store) = file_store();

        assert_eq!(store.get().unwrap(), None);
        store.set("tok_abc123").unwrap();
        assert_eq!(store.get().unwrap().as_deref(), Some("tok_abc123"));
    }

    #[test]
    fn file_store_set_replaces() {
        let (_tmp, store) = file_store();

        store.set("tok_old").unwrap();
        store.set("tok_new").unwrap();
        assert_eq!(store.get().unwrap().as_deref(), Some("tok_new"));
    }

    #[test]
    fn file_store_clear_removes_file() {
        let (_tmp, store) = file_store();

        store.set("tok_abc").unwrap();
        store.clear().unwrap();
        assert_eq!(store.get().unwrap(), None);
        assert!(!store.path().exists());
    }

    #[test]
    fn file_store_clear_when_absent_is_ok() {
        let (_tmp, store) = file_store();
        store.clear().unwrap();
    }

    #[test]
    fn file_store_creates_parent_dirs() {
        let tmp = TempDir::new().unwrap();
        let store = FileTokenStore::new(tmp.path().join("nested/dir/session.token"));
        store.set("tok_nested").unwrap();
        assert_eq!(store.get().unwrap().as_deref(), Some("tok_nested"));
    }

    #[test]
    fn file_store_trims_trailing_newline() {
        let (_tmp, store) = file_store();
        std::fs::write(store.path(), "tok_abc\n").unwrap();
        assert_eq!(store.get().unwrap().as_deref(), Some("tok_abc"));
    }

    #[test]
    fn file_store_empty_file_reads_as_none() {
        let (_tmp, store) = file_store();
        std::fs::write(store.path(), "\n").unwrap();
        assert_eq!(store.get().unwrap(), None);
    }

    #[cfg(unix)]
    #[test]
    fn file_store_token_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let (_tmp, store) = file_store();
        store.set("tok_secret").unwrap();
        let mode = std::fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn memory_store_round_trip() {
        let store = MemoryTokenStore::new();

        assert_eq!(store.get().unwrap(), None);
        store.set("tok_mem").unwrap();
        assert_eq!(store.get().unwrap().as_deref(), Some("tok_mem"));
        store.clear().unwrap();
        assert_eq!(store.get().unwrap(), None);
    }
}
