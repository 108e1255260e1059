//! Data models for Booktrack entities.
//!
//! This module contains the data structures exchanged with the backend:
//!
//! - `Book`, `NewBook`, `BookUpdate`, `BookDraft`: reading list entries and
//!   the payloads used to create and edit them
//! - `UserProfile`, `ProfileUpdate`: the logged-in account
//! - `Credentials`, `Registration`: authentication payloads
//! - `Envelope`, `ErrorBody`: the backend's JSON response wrappers

pub mod auth;
pub mod book;
pub mod envelope;
pub mod profile;

pub use auth::{Credentials, LoginData, Registration};
pub use book::{Book, BookDraft, BookUpdate, NewBook};
pub use envelope::{Envelope, ErrorBody, MessageOnly};
pub use profile::{ProfileUpdate, UserProfile};

/// Returns true if a required form field is missing.
pub(crate) fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// A form failed client-side checks; no request was sent.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct ValidationError(String);

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }

    pub fn message(&self) -> &str {
        &self.0
    }
}
