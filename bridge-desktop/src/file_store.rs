//! File-backed Secure Storage
//!
//! Fallback for desktops without a keyring daemon. Each secret lives in its own
//! file under the application data directory, readable only by the owner.

use bridge_traits::{
    error::{BridgeError, Result},
    storage::SecureStore,
};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const APP_DIR: &str = "campus-mobile-core";
const SECRETS_DIR: &str = "secrets";

/// Secure store persisting each secret as a file
pub struct FileSecureStore {
    directory: PathBuf,
}

impl FileSecureStore {
    /// Create a store under the platform data directory
    /// (e.g. `~/.local/share/campus-mobile-core/secrets`)
    pub fn new() -> Result<Self> {
        let data_dir = dirs::data_dir().ok_or_else(|| {
            BridgeError::NotAvailable("No platform data directory available".to_string())
        })?;
        Ok(Self::with_directory(data_dir.join(APP_DIR).join(SECRETS_DIR)))
    }

    /// Create a store rooted at an explicit directory
    pub fn with_directory(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
            && key != "."
            && key != "..";

        if !valid {
            return Err(BridgeError::OperationFailed(format!(
                "Invalid secret key: {:?}",
                key
            )));
        }

        Ok(self.directory.join(key))
    }

    fn write_atomically(&self, key: &str, path: &Path, value: &[u8]) -> io::Result<()> {
        fs::create_dir_all(&self.directory)?;

        let tmp_path = self.directory.join(format!(".{}.tmp", key));
        let written = write_private(&tmp_path, value).and_then(|()| fs::rename(&tmp_path, path));
        if written.is_err() {
            fs::remove_file(&tmp_path).ok();
        }
        written
    }
}

fn write_private(path: &Path, value: &[u8]) -> io::Result<()> {
    let mut file = open_private(path)?;
    file.write_all(value)?;
    file.sync_all()
}

#[cfg(unix)]
fn open_private(path: &Path) -> io::Result<fs::File> {
    use std::os::unix::fs::OpenOptionsExt;

    fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)
}

#[cfg(not(unix))]
fn open_private(path: &Path) -> io::Result<fs::File> {
    fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
}

impl SecureStore for FileSecureStore {
    fn set_secret(&self, key: &str, value: &[u8]) -> Result<()> {
        let path = self.path_for(key)?;

        self.write_atomically(key, &path, value).map_err(|e| {
            warn!(key = key, error = %e, "Failed to write secret file");
            BridgeError::Io(e)
        })?;

        debug!(key = key, "Stored secret on disk");
        Ok(())
    }

    fn get_secret(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.path_for(key)?;

        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(BridgeError::Io(e)),
        }
    }

    fn delete_secret(&self, key: &str) -> Result<()> {
        let path = self.path_for(key)?;

        match fs::remove_file(&path) {
            Ok(()) => {
                debug!(key = key, "Deleted secret file");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(BridgeError::Io(e)),
        }
    }

    fn has_secret(&self, key: &str) -> Result<bool> {
        Ok(self.path_for(key)?.is_file())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_set_get_delete() {
        let dir = TempDir::new().unwrap();
        let store = FileSecureStore::with_directory(dir.path().join("secrets"));

        assert_eq!(store.get_secret("session_credential").unwrap(), None);

        store.set_secret("session_credential", b"T1").unwrap();
        assert_eq!(
            store.get_secret("session_credential").unwrap(),
            Some(b"T1".to_vec())
        );
        assert!(store.has_secret("session_credential").unwrap());

        store.delete_secret("session_credential").unwrap();
        assert_eq!(store.get_secret("session_credential").unwrap(), None);
        store.delete_secret("session_credential").unwrap();
    }

    #[test]
    fn test_survives_new_instance() {
        let dir = TempDir::new().unwrap();

        FileSecureStore::with_directory(dir.path())
            .set_secret("session_credential", b"persisted")
            .unwrap();

        let reopened = FileSecureStore::with_directory(dir.path());
        assert_eq!(
            reopened.get_secret("session_credential").unwrap(),
            Some(b"persisted".to_vec())
        );
    }

    #[test]
    fn test_overwrite_replaces_value() {
        let dir = TempDir::new().unwrap();
        let store = FileSecureStore::with_directory(dir.path());

        store.set_secret("slot", b"a-much-longer-first-value").unwrap();
        store.set_secret("slot", b"short").unwrap();

        assert_eq!(store.get_secret("slot").unwrap(), Some(b"short".to_vec()));
    }

    #[test]
    fn test_rejects_path_traversal_keys() {
        let dir = TempDir::new().unwrap();
        let store = FileSecureStore::with_directory(dir.path());

        assert!(store.set_secret("../escape", b"x").is_err());
        assert!(store.set_secret("", b"x").is_err());
        assert!(store.get_secret("..").is_err());
    }

    #[test]
    fn test_failed_write_leaves_no_temp_file() {
        let dir = TempDir::new().unwrap();
        let store = FileSecureStore::with_directory(dir.path());
        fs::create_dir_all(dir.path().join("slot").join("occupied")).unwrap();

        assert!(store.set_secret("slot", b"value").is_err());
        assert!(!dir.path().join(".slot.tmp").exists());
        assert!(dir.path().join("slot").is_dir());
    }

    #[cfg(unix)]
    #[test]
    fn test_secret_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let store = FileSecureStore::with_directory(dir.path());
        store.set_secret("slot", b"value").unwrap();

        let mode = fs::metadata(dir.path().join("slot"))
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
