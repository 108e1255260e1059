//! REST API client module for the Booktrack backend.
//!
//! This module provides the `ApiClient` for registering, logging in, and
//! managing the user's profile and reading list.
//!
//! Authenticated endpoints use a bearer token taken from the shared
//! [`Session`](crate::auth::Session).

pub mod client;
pub mod error;

pub use client::{ApiClient, DEFAULT_BASE_URL};
pub use error::ApiError;
