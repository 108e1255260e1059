use std::fmt;
use std::sync::{PoisonError, RwLock, RwLockWriteGuard};

use tracing::{debug, info};

use super::store::{MemoryTokenStore, StorageError, TokenStore};

/// Where the session is in its lifecycle.
#[derive(Clone, PartialEq, Eq)]
pub enum SessionState {
    /// The store has not been read yet.
    Uninitialized,
    /// A token is held and attached to authenticated requests.
    Active(String),
    /// No token: never logged in, logged out, or rejected by the server.
    Cleared,
}

impl fmt::Debug for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Uninitialized => f.write_str("Uninitialized"),
            SessionState::Active(_) => f.write_str("Active(<redacted>)"),
            SessionState::Cleared => f.write_str("Cleared"),
        }
    }
}

/// The current login, shared by the API client and the screens.
///
/// Writes go through to the backing [`TokenStore`] before the in-memory state
/// changes, so a storage failure never leaves the two out of sync. The state
/// lock is held across each store call, so concurrent logins, logouts and
/// expiries apply to both in the same order.
///
/// Store access is blocking. Call [`Session::restore`] at startup so request
/// paths only ever read the in-memory state.
pub struct Session {
    store: Box<dyn TokenStore>,
    state: RwLock<SessionState>,
}

impl Session {
    pub fn new(store: impl TokenStore + 'static) -> Self {
        Self::from_store(Box::new(store))
    }

    pub fn from_store(store: Box<dyn TokenStore>) -> Self {
        Self {
            store,
            state: RwLock::new(SessionState::Uninitialized),
        }
    }

    /// A session that forgets its token when the process exits.
    pub fn in_memory() -> Self {
        Self::new(MemoryTokenStore::new())
    }

    /// Read the persisted token, e.g. on app launch.
    pub fn restore(&self) -> Result<Option<String>, StorageError> {
        let mut state = self.write_state();
        let token = self.store.get_token()?;
        debug!(found = token.is_some(), "Session restored from store");
        *state = match token {
            Some(ref t) => SessionState::Active(t.clone()),
            None => SessionState::Cleared,
        };
        Ok(token)
    }

    /// The current token. Reads the store only if [`Session::restore`] has
    /// not run yet.
    pub fn token(&self) -> Result<Option<String>, StorageError> {
        match self.state() {
            SessionState::Uninitialized => self.restore(),
            SessionState::Active(token) => Ok(Some(token)),
            SessionState::Cleared => Ok(None),
        }
    }

    /// Start a session with a freshly issued token, replacing any previous one.
    pub fn begin(&self, token: &str) -> Result<(), StorageError> {
        let mut state = self.write_state();
        self.store.set_token(token)?;
        *state = SessionState::Active(token.to_string());
        info!("Session started");
        Ok(())
    }

    /// End the session. Ending an already-ended session is a no-op.
    pub fn end(&self) -> Result<(), StorageError> {
        let mut state = self.write_state();
        Self::clear(&*self.store, &mut state)?;
        info!("Session ended");
        Ok(())
    }

    /// End the session only if `token` is still the active one. A rejection
    /// of a token that has since been replaced by a new login is ignored.
    /// Returns whether the session was ended.
    pub fn expire(&self, token: &str) -> Result<bool, StorageError> {
        let mut state = self.write_state();
        if !matches!(&*state, SessionState::Active(current) if current == token) {
            return Ok(false);
        }
        Self::clear(&*self.store, &mut state)?;
        Ok(true)
    }

    pub fn state(&self) -> SessionState {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state(), SessionState::Active(_))
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, SessionState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn clear(store: &dyn TokenStore, state: &mut SessionState) -> Result<(), StorageError> {
        store.clear_token()?;
        *state = SessionState::Cleared;
        Ok(())
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    struct BrokenStore;

    impl TokenStore for BrokenStore {
        fn set_token(&self, _token: &str) -> Result<(), StorageError> {
            Err(std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only").into())
        }

        fn get_token(&self) -> Result<Option<String>, StorageError> {
            Err(std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into())
        }

        fn clear_token(&self) -> Result<(), StorageError> {
            Err(std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only").into())
        }
    }

    #[test]
    fn test_lifecycle() {
        let session = Session::in_memory();
        assert_eq!(session.state(), SessionState::Uninitialized);

        assert_eq!(session.token().unwrap(), None);
        assert_eq!(session.state(), SessionState::Cleared);

        session.begin("abc").unwrap();
        assert_eq!(session.state(), SessionState::Active("abc".to_string()));
        assert_eq!(session.token().unwrap().as_deref(), Some("abc"));

        session.end().unwrap();
        assert_eq!(session.token().unwrap(), None);
        assert!(!session.is_active());

        // Idempotent
        session.end().unwrap();
        assert_eq!(session.state(), SessionState::Cleared);
    }

    #[test]
    fn test_restores_persisted_token() {
        let store = MemoryTokenStore::new();
        store.set_token("saved").unwrap();
        let session = Session::new(store);
        assert_eq!(session.token().unwrap().as_deref(), Some("saved"));
        assert!(session.is_active());
    }

    #[test]
    fn test_storage_failure_leaves_state_untouched() {
        let session = Session::new(BrokenStore);
        assert!(matches!(session.token(), Err(StorageError::Io(_))));
        assert!(session.begin("abc").is_err());
        assert_eq!(session.state(), SessionState::Uninitialized);
    }

    #[test]
    fn test_expire_ignores_replaced_token() {
        let session = Session::in_memory();
        session.begin("old").unwrap();
        session.begin("new").unwrap();

        assert!(!session.expire("old").unwrap());
        assert_eq!(session.token().unwrap().as_deref(), Some("new"));

        assert!(session.expire("new").unwrap());
        assert_eq!(session.state(), SessionState::Cleared);
        assert!(!session.expire("new").unwrap());
    }

    /// Store that shares its contents with the test.
    struct SharedStore(Arc<MemoryTokenStore>);

    impl TokenStore for SharedStore {
        fn set_token(&self, token: &str) -> Result<(), StorageError> {
            self.0.set_token(token)
        }

        fn get_token(&self) -> Result<Option<String>, StorageError> {
            self.0.get_token()
        }

        fn clear_token(&self) -> Result<(), StorageError> {
            self.0.clear_token()
        }
    }

    #[test]
    fn test_concurrent_writes_keep_store_and_state_in_step() {
        let store = Arc::new(MemoryTokenStore::new());
        let session = Arc::new(Session::new(SharedStore(store.clone())));

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let session = session.clone();
                std::thread::spawn(move || {
                    for n in 0..200 {
                        let token = format!("t{}-{}", i, n);
                        session.begin(&token).unwrap();
                        if n % 3 == 0 {
                            session.end().unwrap();
                        } else {
                            session.expire(&token).unwrap();
                        }
                    }
                    session.begin(&format!("last-{}", i)).unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let expected = match session.state() {
            SessionState::Active(token) => Some(token),
            _ => None,
        };
        assert!(expected.is_some());
        assert_eq!(store.get_token().unwrap(), expected);
    }

    #[test]
    fn test_debug_redacts_token() {
        let session = Session::in_memory();
        session.begin("super-secret").unwrap();
        let printed = format!("{:?}", session);
        assert!(printed.contains("Active"));
        assert!(!printed.contains("super-secret"));
    }
}
