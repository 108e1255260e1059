//! Persistence for the session token.
//!
//! Exactly one token is stored per install, under [`TOKEN_KEY`].

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use keyring::Entry;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Key the token is stored under, in every backend.
pub const TOKEN_KEY: &str = "auth_token";

/// Keychain service name.
const SERVICE_NAME: &str = "booktrack";

/// Session file name in the session directory.
const SESSION_FILE: &str = "session.json";

/// Whether this build links a platform keychain. Without one, `keyring` falls
/// back to a mock store that forgets everything when the entry is dropped.
pub const NATIVE_KEYCHAIN: bool = cfg!(any(target_os = "macos", target_os = "windows"));

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Secure storage unavailable: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("Session storage unavailable: {0}")]
    Io(#[from] std::io::Error),

    #[error("Session file is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),

    #[error("No OS keychain in this build, use the file token backend")]
    NoKeychain,
}

/// Device-local storage for the bearer token.
///
/// A missing token is a normal state and is reported as `Ok(None)`, never as
/// an error. Clearing an absent token succeeds.
pub trait TokenStore: Send + Sync {
    fn set_token(&self, token: &str) -> Result<(), StorageError>;
    fn get_token(&self) -> Result<Option<String>, StorageError>;
    fn clear_token(&self) -> Result<(), StorageError>;
}

// ============================================================================
// Keychain
// ============================================================================

/// Token stored in the OS keychain.
///
/// Holds one keychain entry for its whole lifetime. Which credential store
/// backs it is decided by `keyring`'s default builder at construction.
pub struct KeyringTokenStore {
    entry: Entry,
}

impl KeyringTokenStore {
    pub fn new() -> Result<Self, StorageError> {
        Self::with_service(SERVICE_NAME)
    }

    /// Use a different keychain service, e.g. one per backend environment.
    pub fn with_service(service: &str) -> Result<Self, StorageError> {
        Ok(Self {
            entry: Entry::new(service, TOKEN_KEY)?,
        })
    }
}

impl TokenStore for KeyringTokenStore {
    fn set_token(&self, token: &str) -> Result<(), StorageError> {
        self.entry.set_password(token)?;
        Ok(())
    }

    fn get_token(&self) -> Result<Option<String>, StorageError> {
        match self.entry.get_password() {
            Ok(token) => Ok(Some(token)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn clear_token(&self) -> Result<(), StorageError> {
        match self.entry.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

// ============================================================================
// File
// ============================================================================

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(transparent)]
struct SessionFile(BTreeMap<String, String>);

/// Token stored in a small JSON key-value file.
pub struct FileTokenStore {
    dir: PathBuf,
}

impl FileTokenStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(SESSION_FILE)
    }

    fn load(&self) -> Result<SessionFile, StorageError> {
        let path = self.path();
        if !path.exists() {
            return Ok(SessionFile::default());
        }
        let contents = std::fs::read_to_string(&path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    fn save(&self, file: &SessionFile) -> Result<(), StorageError> {
        let path = self.path();
        if file.0.is_empty() {
            return remove_if_exists(&path);
        }
        std::fs::create_dir_all(&self.dir)?;
        // Write then rename so a crash never leaves a truncated file behind
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, serde_json::to_string_pretty(file)?)?;
        std::fs::rename(&tmp, &path)?;
        Ok(())
    }
}

fn remove_if_exists(path: &Path) -> Result<(), StorageError> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

impl TokenStore for FileTokenStore {
    fn set_token(&self, token: &str) -> Result<(), StorageError> {
        let mut file = self.load()?;
        file.0.insert(TOKEN_KEY.to_string(), token.to_string());
        self.save(&file)?;
        debug!(path = %self.path().display(), "Session token saved");
        Ok(())
    }

    fn get_token(&self) -> Result<Option<String>, StorageError> {
        Ok(self.load()?.0.remove(TOKEN_KEY))
    }

    fn clear_token(&self) -> Result<(), StorageError> {
        let mut file = self.load()?;
        if file.0.remove(TOKEN_KEY).is_some() {
            self.save(&file)?;
        }
        Ok(())
    }
}

// ============================================================================
// Memory
// ============================================================================

/// Token held only for the lifetime of the process.
#[derive(Default)]
pub struct MemoryTokenStore {
    token: Mutex<Option<String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenStore for MemoryTokenStore {
    fn set_token(&self, token: &str) -> Result<(), StorageError> {
        *self.token.lock().unwrap_or_else(PoisonError::into_inner) = Some(token.to_string());
        Ok(())
    }

    fn get_token(&self) -> Result<Option<String>, StorageError> {
        Ok(self.token.lock().unwrap_or_else(PoisonError::into_inner).clone())
    }

    fn clear_token(&self) -> Result<(), StorageError> {
        self.token.lock().unwrap_or_else(PoisonError::into_inner).take();
        Ok(())
    }
}

// ============================================================================
// Backend selection
// ============================================================================

/// Which store holds the token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenBackend {
    Keyring,
    File,
    Memory,
}

/// The keychain where this build has one, the session file otherwise.
impl Default for TokenBackend {
    fn default() -> Self {
        if NATIVE_KEYCHAIN {
            TokenBackend::Keyring
        } else {
            TokenBackend::File
        }
    }
}

impl TokenBackend {
    /// Open the store for this backend. `session_dir` is only used by `File`.
    pub fn open(self, session_dir: &Path) -> Result<Box<dyn TokenStore>, StorageError> {
        Ok(match self {
            TokenBackend::Keyring if !NATIVE_KEYCHAIN => return Err(StorageError::NoKeychain),
            TokenBackend::Keyring => Box::new(KeyringTokenStore::new()?),
            TokenBackend::File => Box::new(FileTokenStore::new(session_dir)),
            TokenBackend::Memory => Box::new(MemoryTokenStore::new()),
        })
    }
}

impl std::str::FromStr for TokenBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "keyring" | "keychain" => Ok(TokenBackend::Keyring),
            "file" => Ok(TokenBackend::File),
            "memory" => Ok(TokenBackend::Memory),
            other => Err(format!("Unknown token backend: {}", other)),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn exercise(store: &dyn TokenStore) {
        // Absent on first launch
        assert_eq!(store.get_token().unwrap(), None);

        store.set_token("abc").unwrap();
        assert_eq!(store.get_token().unwrap().as_deref(), Some("abc"));

        // Overwrite replaces
        store.set_token("def").unwrap();
        assert_eq!(store.get_token().unwrap().as_deref(), Some("def"));

        store.clear_token().unwrap();
        assert_eq!(store.get_token().unwrap(), None);

        // Clearing twice is a no-op
        store.clear_token().unwrap();
        assert_eq!(store.get_token().unwrap(), None);
    }

    #[test]
    fn test_memory_store_lifecycle() {
        exercise(&MemoryTokenStore::new());
    }

    #[test]
    fn test_file_store_lifecycle() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileTokenStore::new(dir.path().join("nested"));
        exercise(&store);
        // Empty session file is removed rather than left behind
        assert!(!store.path().exists());
    }

    #[test]
    fn test_file_store_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        FileTokenStore::new(dir.path()).set_token("persisted").unwrap();

        let reopened = FileTokenStore::new(dir.path());
        assert_eq!(reopened.get_token().unwrap().as_deref(), Some("persisted"));

        let raw = std::fs::read_to_string(reopened.path()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value[TOKEN_KEY], "persisted");
    }

    #[test]
    fn test_file_store_keeps_unrelated_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileTokenStore::new(dir.path());
        std::fs::write(store.path(), r#"{"theme":"dark"}"#).unwrap();

        store.set_token("abc").unwrap();
        store.clear_token().unwrap();

        let raw = std::fs::read_to_string(store.path()).unwrap();
        assert!(raw.contains("dark"));
        assert!(!raw.contains(TOKEN_KEY));
    }

    #[test]
    fn test_file_store_corrupt_file_is_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileTokenStore::new(dir.path());
        std::fs::write(store.path(), "not json").unwrap();
        assert!(matches!(store.get_token(), Err(StorageError::Corrupt(_))));
    }

    #[test]
    fn test_keyring_store_lifecycle() {
        // Mock credentials live as long as the entry, so this checks the
        // store reuses its entry rather than the OS keychain itself.
        keyring::set_default_credential_builder(keyring::mock::default_credential_builder());
        let store = KeyringTokenStore::with_service("booktrack-test").unwrap();
        exercise(&store);
    }

    #[test]
    fn test_default_backend_persists_across_opens() {
        let dir = tempfile::tempdir().unwrap();
        let backend = TokenBackend::default();
        if backend == TokenBackend::Keyring {
            // Covered by the keyring test; don't touch the real keychain
            return;
        }
        assert_eq!(backend, TokenBackend::File);

        backend.open(dir.path()).unwrap().set_token("abc").unwrap();
        let reopened = backend.open(dir.path()).unwrap();
        assert_eq!(reopened.get_token().unwrap().as_deref(), Some("abc"));
        reopened.clear_token().unwrap();
        assert_eq!(backend.open(dir.path()).unwrap().get_token().unwrap(), None);
    }

    #[test]
    fn test_keyring_backend_without_keychain_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let opened = TokenBackend::Keyring.open(dir.path());
        if NATIVE_KEYCHAIN {
            assert!(opened.is_ok());
        } else {
            assert!(matches!(opened, Err(StorageError::NoKeychain)));
        }
    }

    #[test]
    fn test_token_backend_parse() {
        assert_eq!("file".parse::<TokenBackend>(), Ok(TokenBackend::File));
        assert_eq!(" Keychain ".parse::<TokenBackend>(), Ok(TokenBackend::Keyring));
        assert_eq!("memory".parse::<TokenBackend>(), Ok(TokenBackend::Memory));
        assert!("floppy".parse::<TokenBackend>().is_err());
    }
}
