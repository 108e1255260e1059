//! Application configuration management.
//!
//! This module handles loading and saving the application configuration,
//! which includes the backend address, where the session token is kept,
//! and the last used username.
//!
//! Configuration is stored at `~/.config/booktrack/config.json`.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::api::DEFAULT_BASE_URL;
use crate::auth::{Session, TokenBackend};

/// Application name used for config/cache directory paths
const APP_NAME: &str = "booktrack";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Environment variable that overrides the configured backend address
pub const API_URL_ENV: &str = "BOOKTRACK_API_URL";

/// HTTP request timeout in seconds.
/// 30s allows for slow API responses while failing fast enough for good UX.
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_base_url: String,
    pub token_backend: TokenBackend,
    pub request_timeout_secs: u64,
    pub last_username: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_BASE_URL.to_string(),
            token_backend: TokenBackend::default(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            last_username: None,
        }
    }
}

impl Config {
    /// Load from the default location, then apply environment overrides.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&Self::config_path()?)?;
        config.override_api_url(std::env::var(API_URL_ENV).ok());
        Ok(config)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)
            .with_context(|| format!("Failed to write config file {}", path.display()))?;
        Ok(())
    }

    /// Persist the last used username. Overrides applied in memory (environment,
    /// command-line flags) are not written back.
    pub fn remember_username(&mut self, username: &str) -> Result<()> {
        self.last_username = Some(username.to_string());
        let path = Self::config_path()?;
        let mut stored = Self::load_from(&path)?;
        stored.last_username = self.last_username.clone();
        stored.save_to(&path)
    }

    /// Blank values are ignored so an empty variable doesn't break the client.
    pub fn override_api_url(&mut self, url: Option<String>) {
        if let Some(url) = url.filter(|u| !u.trim().is_empty()) {
            self.api_base_url = url.trim().to_string();
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Directory for the file-backed session store.
    pub fn session_dir(&self) -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }

    /// Open the session using the configured token backend.
    pub fn open_session(&self) -> Result<Arc<Session>> {
        self.open_session_in(&self.session_dir()?)
    }

    /// Open the session and read the stored token once, up front, so requests
    /// never wait on the keychain. A failed read is retried on first use.
    pub fn open_session_in(&self, session_dir: &Path) -> Result<Arc<Session>> {
        let store = self
            .token_backend
            .open(session_dir)
            .with_context(|| format!("Failed to open {:?} token store", self.token_backend))?;
        let session = Session::from_store(store);
        if let Err(e) = session.restore() {
            warn!(error = %e, "Failed to read stored session");
        }
        Ok(Arc::new(session))
    }
}
