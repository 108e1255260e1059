//! Authentication module for managing the user's session.
//!
//! This module provides:
//! - `TokenStore`: persistence for the single bearer token, with keychain,
//!   file and in-memory backends
//! - `Session`: the in-process session lifecycle built on top of a store
//!
//! The token never expires client-side; the server decides when it is no
//! longer valid.

pub mod session;
pub mod store;

pub use session::{Session, SessionState};
pub use store::{
    FileTokenStore, KeyringTokenStore, MemoryTokenStore, StorageError, TokenBackend, TokenStore,
    NATIVE_KEYCHAIN, TOKEN_KEY,
};
