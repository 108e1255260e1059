//! API client for communicating with the Booktrack REST API.
//!
//! This module provides the `ApiClient` struct. Every request goes through a
//! single path that attaches the session's bearer token and turns the outcome
//! into either a typed payload or an [`ApiError`]:
//!
//! ```text
//! Built -> TokenAttached | TokenSkipped -> Sent -> Succeeded | Failed
//! ```
//!
//! There is exactly one attempt per call; nothing is retried.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::{Client, Method, Response, Url};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

use crate::auth::Session;
use crate::config::Config;
use crate::models::{
    Book, BookUpdate, Credentials, Envelope, LoginData, MessageOnly, NewBook, ProfileUpdate,
    Registration, UserProfile, ValidationError,
};

use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// Production backend.
pub const DEFAULT_BASE_URL: &str = "https://backendbooktrack-production.up.railway.app";

/// HTTP request timeout in seconds, used when no config is supplied.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Whether an endpoint needs a logged-in user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Auth {
    /// Fail with `Unauthenticated` before sending if there is no token.
    Required,
    /// Attach the token if there is one, send anyway if not.
    Optional,
}

/// API client for the Booktrack backend.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling,
/// and clones share the same session.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Url,
    session: Arc<Session>,
}

impl ApiClient {
    /// Create a client for `base_url` using the default timeout.
    pub fn new(base_url: &str, session: Arc<Session>) -> Result<Self> {
        Self::with_timeout(base_url, session, Duration::from_secs(REQUEST_TIMEOUT_SECS))
    }

    pub fn from_config(config: &Config, session: Arc<Session>) -> Result<Self> {
        Self::with_timeout(&config.api_base_url, session, config.request_timeout())
    }

    pub fn with_timeout(base_url: &str, session: Arc<Session>, timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(base_url.trim())
            .with_context(|| format!("Invalid API base URL: {}", base_url))?;
        if base_url.cannot_be_a_base() {
            anyhow::bail!("API base URL cannot have paths appended: {}", base_url);
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url,
            session,
        })
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    // ===== Auth =====

    /// Log in and start a session with the returned token.
    pub async fn login(&self, credentials: &Credentials) -> Result<String, ApiError> {
        credentials.validate()?;
        let envelope: Envelope<LoginData> = self
            .request(Method::POST, &["api", "auth", "login"], Some(credentials), Auth::Optional)
            .await?;

        let token = envelope.data.token;
        if token.trim().is_empty() {
            return Err(ApiError::InvalidResponse("Invalid login response".to_string()));
        }
        self.session.begin(&token)?;
        debug!(username = %credentials.username, "Logged in");
        Ok(token)
    }

    /// Create an account. Returns the server's confirmation message.
    pub async fn register(&self, registration: &Registration) -> Result<String, ApiError> {
        registration.validate()?;
        let response: MessageOnly = self
            .request(Method::POST, &["api", "auth", "register"], Some(registration), Auth::Optional)
            .await?;
        Ok(response.message)
    }

    /// Forget the session token. No request is sent.
    pub fn logout(&self) -> Result<(), ApiError> {
        self.session.end()?;
        Ok(())
    }

    // ===== Profile =====

    pub async fn fetch_profile(&self) -> Result<UserProfile, ApiError> {
        let envelope: Envelope<UserProfile> = self
            .request(Method::GET, &["api", "profile"], None::<&()>, Auth::Required)
            .await?;
        Ok(envelope.data)
    }

    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<UserProfile, ApiError> {
        update.validate()?;
        let envelope: Envelope<UserProfile> = self
            .request(Method::PUT, &["api", "profile"], Some(update), Auth::Required)
            .await?;
        Ok(envelope.data)
    }

    // ===== Books =====

    pub async fn list_books(&self) -> Result<Vec<Book>, ApiError> {
        let envelope: Envelope<Vec<Book>> = self
            .request(Method::GET, &["api", "books"], None::<&()>, Auth::Required)
            .await?;
        debug!(count = envelope.data.len(), "Fetched books");
        Ok(envelope.data)
    }

    pub async fn create_book(&self, book: &NewBook) -> Result<Book, ApiError> {
        book.validate()?;
        let envelope: Envelope<Book> = self
            .request(Method::POST, &["api", "books"], Some(book), Auth::Required)
            .await?;
        Ok(envelope.data)
    }

    /// Returns the server's confirmation message.
    pub async fn update_book(&self, id: &str, update: &BookUpdate) -> Result<String, ApiError> {
        Self::check_book_id(id)?;
        update.validate()?;
        let response: MessageOnly = self
            .request(Method::PUT, &["api", "books", id], Some(update), Auth::Required)
            .await?;
        Ok(response.message)
    }

    /// Returns the server's confirmation message.
    pub async fn delete_book(&self, id: &str) -> Result<String, ApiError> {
        Self::check_book_id(id)?;
        let response: MessageOnly = self
            .request(Method::DELETE, &["api", "books", id], None::<&()>, Auth::Required)
            .await?;
        Ok(response.message)
    }

    fn check_book_id(id: &str) -> Result<(), ValidationError> {
        if id.trim().is_empty() {
            return Err(ValidationError::new("Book id is required"));
        }
        Ok(())
    }

    // ===== Request plumbing =====

    /// Base URL with `segments` appended, each percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // cannot_be_a_base() was rejected at construction, so this always succeeds
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// Token to attach, or `Unauthenticated` if one is required and absent.
    fn bearer(&self, auth: Auth) -> Result<Option<String>, ApiError> {
        match (self.session.token()?, auth) {
            (Some(token), _) => Ok(Some(token)),
            (None, Auth::Optional) => Ok(None),
            (None, Auth::Required) => Err(ApiError::Unauthenticated),
        }
    }

    async fn request<T, B>(
        &self,
        method: Method,
        segments: &[&str],
        body: Option<&B>,
        auth: Auth,
    ) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let url = self.endpoint(segments);
        let token = self.bearer(auth)?;

        let mut builder = self.client.request(method.clone(), url.clone());
        if let Some(ref token) = token {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = body {
            builder = builder.json(body);
        }

        debug!(%method, path = url.path(), authenticated = token.is_some(), "Sending request");
        let response = builder.send().await.map_err(|e| {
            warn!(%method, path = url.path(), error = %e, "Request failed before a response was received");
            ApiError::Network(e)
        })?;

        let response = self.check_response(response, token.as_deref(), auth).await?;
        Self::parse(response, url.path()).await
    }

    /// Turn a non-2xx response into a `Server` error.
    async fn check_response(
        &self,
        response: Response,
        token: Option<&str>,
        auth: Auth,
    ) -> Result<Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let path = response.url().path().to_string();
        let body = response.text().await.unwrap_or_default();
        warn!(status = status.as_u16(), path = %path, body = %ApiError::truncate_body(&body), "Request rejected");

        if status == reqwest::StatusCode::UNAUTHORIZED && auth == Auth::Required {
            if let Some(token) = token {
                self.expire_session(token);
            }
        }
        Err(ApiError::from_status(status, &body))
    }

    /// The server no longer accepts `token`; forget it so the user is sent to login.
    fn expire_session(&self, token: &str) {
        match self.session.expire(token) {
            Ok(true) => warn!("Token rejected by server, session cleared"),
            Ok(false) => debug!("Rejected token was already replaced, session kept"),
            Err(e) => warn!(error = %e, "Token rejected by server, but clearing it failed"),
        }
    }

    async fn parse<T: DeserializeOwned>(response: Response, path: &str) -> Result<T, ApiError> {
        let text = response.text().await.map_err(ApiError::Network)?;
        // Some endpoints answer 200 with an empty body
        let text = if text.trim().is_empty() { "{}" } else { text.as_str() };
        serde_json::from_str(text).map_err(|e| {
            warn!(path = path, error = %e, "Failed to parse response");
            ApiError::InvalidResponse(format!("{}: {}", path, e))
        })
    }
}

// ============================================================================
// Tests
// ============================================================================
