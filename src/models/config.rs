// src/models/config.rs

//! Application configuration structures.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{AppError, Result};
use crate::models::ListingSelectors;

/// Primary environment variable holding the webhook URL.
pub const WEBHOOK_ENV: &str = "SLACK_WEBHOOK_URL";

/// Compatibility fallback for [`WEBHOOK_ENV`].
pub const WEBHOOK_ENV_FALLBACK: &str = "WEBHOOK_URL";

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Listing site and HTTP behavior
    #[serde(default)]
    pub source: SourceConfig,

    /// Markup selectors for the listing site
    #[serde(default)]
    pub selectors: ListingSelectors,

    /// Date window settings
    #[serde(default)]
    pub filter: FilterConfig,

    /// Webhook delivery settings
    #[serde(default)]
    pub notifier: NotifierConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if the file is absent or broken.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            log::debug!("No config file at {:?}, using defaults", path);
            return Self::default();
        }
        Self::load(path).unwrap_or_else(|e| {
            log::warn!("Config load failed from {:?}: {}. Using defaults.", path, e);
            Self::default()
        })
    }

    /// Fill the webhook URL from the environment.
    ///
    /// `SLACK_WEBHOOK_URL` wins over `WEBHOOK_URL`; both win over the file.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let from_env = [WEBHOOK_ENV, WEBHOOK_ENV_FALLBACK]
            .into_iter()
            .find_map(|key| lookup(key).filter(|v| !v.trim().is_empty()));

        if let Some(url) = from_env {
            self.notifier.webhook_url = Some(url);
        }
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.source.user_agent.trim().is_empty() {
            return Err(AppError::validation("source.user_agent is empty"));
        }
        if self.source.timeout_secs == 0 {
            return Err(AppError::validation("source.timeout_secs must be > 0"));
        }
        if self.source.max_attempts == 0 {
            return Err(AppError::validation("source.max_attempts must be > 0"));
        }
        if self.source.max_pages == 0 {
            return Err(AppError::validation("source.max_pages must be > 0"));
        }
        if self.notifier.timeout_secs == 0 {
            return Err(AppError::validation("notifier.timeout_secs must be > 0"));
        }
        let base = self.source.base_url()?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(AppError::validation(format!(
                "source.base_url must be http(s), got '{}'",
                base.scheme()
            )));
        }
        self.selectors.compile()?;
        Ok(())
    }
}

/// Listing site and fetch behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Listing page URL (page 0)
    #[serde(default = "defaults::base_url")]
    pub base_url: String,

    /// Display name used in the digest header (defaults to the host)
    #[serde(default)]
    pub name: Option<String>,

    /// User-Agent header for listing requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Per-attempt request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Total attempts for a page answering 503
    #[serde(default = "defaults::max_attempts")]
    pub max_attempts: u32,

    /// Backoff unit in milliseconds; attempt `n` waits `n` units
    #[serde(default = "defaults::retry_backoff")]
    pub retry_backoff_ms: u64,

    /// Hard cap on the number of pages fetched per run
    #[serde(default = "defaults::max_pages")]
    pub max_pages: usize,

    /// Skip TLS certificate checks for the listing host only
    #[serde(default)]
    pub accept_invalid_certs: bool,
}

impl SourceConfig {
    /// Parsed listing URL.
    pub fn base_url(&self) -> Result<Url> {
        Ok(Url::parse(&self.base_url)?)
    }

    /// Name shown in the digest header.
    pub fn display_name(&self) -> String {
        if let Some(name) = self.name.as_deref().filter(|n| !n.trim().is_empty()) {
            return name.trim().to_string();
        }
        Url::parse(&self.base_url)
            .ok()
            .and_then(|u| u.host_str().map(|h| h.trim_start_matches("www.").to_string()))
            .unwrap_or_else(|| self.base_url.clone())
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::base_url(),
            name: None,
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            max_attempts: defaults::max_attempts(),
            retry_backoff_ms: defaults::retry_backoff(),
            max_pages: defaults::max_pages(),
            accept_invalid_certs: false,
        }
    }
}

/// Date window settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Days after today covered by the window (today is always included)
    #[serde(default = "defaults::days_ahead")]
    pub days_ahead: u32,

    /// Keep events that carry no machine-readable start timestamp
    #[serde(default)]
    pub include_undated: bool,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            days_ahead: defaults::days_ahead(),
            include_undated: false,
        }
    }
}

/// Webhook delivery settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifierConfig {
    /// Destination webhook; usually supplied through the environment
    #[serde(default)]
    pub webhook_url: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,
}

impl NotifierConfig {
    /// The configured webhook URL, or a configuration error when absent.
    pub fn webhook_url(&self) -> Result<&str> {
        self.webhook_url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .ok_or_else(|| {
                AppError::config(format!(
                    "webhook URL not set (export {WEBHOOK_ENV} or {WEBHOOK_ENV_FALLBACK})"
                ))
            })
    }
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            webhook_url: None,
            timeout_secs: defaults::timeout(),
        }
    }
}

mod defaults {
    pub fn base_url() -> String {
        "https://pakexcel.com/events-upcoming".into()
    }
    pub fn user_agent() -> String {
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
         (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36"
            .into()
    }
    pub fn timeout() -> u64 {
        10
    }
    pub fn max_attempts() -> u32 {
        3
    }
    pub fn retry_backoff() -> u64 {
        2000
    }
    pub fn max_pages() -> usize {
        50
    }
    pub fn days_ahead() -> u32 {
        3
    }
}
