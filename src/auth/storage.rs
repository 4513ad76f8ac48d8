//! Persistent key/value storage for the session token.
//!
//! Plays the role of the browser's local storage: the session store writes
//! the bearer token under [`TOKEN_KEY`] and wipes everything on logout.
//! Backends: a JSON file in the user's data directory, the OS keychain,
//! or plain memory.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use thiserror::Error;

/// Key the bearer token is stored under.
pub const TOKEN_KEY: &str = "token";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage file is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),

    #[cfg(feature = "keychain")]
    #[error("Keychain operation failed: {0}")]
    Keychain(String),

    #[error("No data directory available for file storage")]
    NoDataDir,
}

#[cfg(feature = "keychain")]
impl From<keyring::Error> for StorageError {
    fn from(err: keyring::Error) -> Self {
        StorageError::Keychain(err.to_string())
    }
}

/// Minimal local-storage style interface.
pub trait TokenStorage: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
    /// Remove every key this storage holds.
    fn clear(&self) -> Result<(), StorageError>;
}

// ── Memory ──────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn entries(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, String>> {
        // A poisoned map is still a valid map.
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl TokenStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.entries().remove(key);
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        self.entries().clear();
        Ok(())
    }
}

// ── File ────────────────────────────────────────────────────────────────

/// Storage backed by a single JSON object on disk.
///
/// The file is read on every access and rewritten on every change, so two
/// processes sharing it see each other's writes.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// `<data_dir>/imis-client/storage.json`
    pub fn default_location() -> Result<Self, StorageError> {
        let dir = dirs::data_dir().ok_or(StorageError::NoDataDir)?;
        Ok(Self::new(dir.join("imis-client").join("storage.json")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<String, String>, StorageError> {
        match fs::read(&self.path) {
            Ok(bytes) if bytes.is_empty() => Ok(BTreeMap::new()),
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_vec_pretty(entries)?)?;
        Ok(())
    }

    fn update<F>(&self, f: F) -> Result<(), StorageError>
    where
        F: FnOnce(&mut BTreeMap<String, String>),
    {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut entries = self.load()?;
        f(&mut entries);
        self.save(&entries)
    }
}

impl TokenStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        Ok(self.load()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.update(|entries| {
            entries.insert(key.to_string(), value.to_string());
        })
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.update(|entries| {
            entries.remove(key);
        })
    }

    fn clear(&self) -> Result<(), StorageError> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

// ── Keychain ────────────────────────────────────────────────────────────

#[cfg(feature = "keychain")]
pub use keychain::KeychainStorage;

#[cfg(feature = "keychain")]
mod keychain {
    use keyring::Entry;

    use super::{StorageError, TokenStorage};

    /// Keychain service name for all entries written by this client.
    const SERVICE_NAME: &str = "de.coronavirus.imis.client";

    /// Entry listing every key written, so `clear()` can find them.
    const INDEX_KEY: &str = "__keys";

    /// Storage in the OS keychain, one entry per key.
    #[derive(Debug, Default)]
    pub struct KeychainStorage;

    impl KeychainStorage {
        pub fn new() -> Self {
            Self
        }

        fn read(key: &str) -> Result<Option<String>, StorageError> {
            let entry = Entry::new(SERVICE_NAME, key)?;
            match entry.get_password() {
                Ok(value) => Ok(Some(value)),
                Err(keyring::Error::NoEntry) => Ok(None),
                Err(e) => Err(e.into()),
            }
        }

        fn delete(key: &str) -> Result<(), StorageError> {
            let entry = Entry::new(SERVICE_NAME, key)?;
            match entry.delete_credential() {
                Ok(()) => Ok(()),
                Err(keyring::Error::NoEntry) => Ok(()), // already gone
                Err(e) => Err(e.into()),
            }
        }

        fn index() -> Result<Vec<String>, StorageError> {
            Ok(Self::read(INDEX_KEY)?
                .map(|s| s.split('\n').filter(|k| !k.is_empty()).map(String::from).collect())
                .unwrap_or_default())
        }

        fn write_index(keys: &[String]) -> Result<(), StorageError> {
            if keys.is_empty() {
                return Self::delete(INDEX_KEY);
            }
            Entry::new(SERVICE_NAME, INDEX_KEY)?.set_password(&keys.join("\n"))?;
            Ok(())
        }
    }

    impl TokenStorage for KeychainStorage {
        fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
            Self::read(key)
        }

        fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
            Entry::new(SERVICE_NAME, key)?.set_password(value)?;
            let mut keys = Self::index()?;
            if !keys.iter().any(|k| k == key) {
                keys.push(key.to_string());
                Self::write_index(&keys)?;
            }
            Ok(())
        }

        fn remove(&self, key: &str) -> Result<(), StorageError> {
            Self::delete(key)?;
            let mut keys = Self::index()?;
            keys.retain(|k| k != key);
            Self::write_index(&keys)
        }

        fn clear(&self) -> Result<(), StorageError> {
            for key in Self::index()? {
                Self::delete(&key)?;
            }
            Self::delete(INDEX_KEY)
        }
    }
}
