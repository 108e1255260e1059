//! Booktrack core library.
//!
//! Everything a front end needs to track a personal reading list against the
//! Booktrack REST backend:
//!
//! - `auth`: the persisted bearer token and the session lifecycle around it
//! - `api`: the authenticated API client and its normalized error type
//! - `models`: books, user profiles and request/response payloads
//! - `screens`: UI-agnostic view-models for each screen of the app
//! - `config`: application configuration
//! - `utils`: display formatting helpers

pub mod api;
pub mod auth;
pub mod config;
pub mod models;
pub mod screens;
pub mod utils;

pub use api::{ApiClient, ApiError};
pub use auth::{Session, SessionState, StorageError, TokenStore};
pub use config::Config;
