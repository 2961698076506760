// src/services/fetcher.rs

//! Listing page fetcher.
//!
//! Retrieves one listing page per call, retrying only when the server
//! answers 503.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use url::Url;

use crate::error::{AppError, Result};
use crate::models::SourceConfig;

/// Query parameter carrying the page index.
pub const PAGE_PARAM: &str = "page";

/// Anything that can produce the raw markup of a listing page.
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Fetch the body of page `page` (0-based).
    async fn fetch_page(&self, page: usize) -> Result<String>;
}

/// Build the URL for a page index; page 0 is the base URL itself.
pub fn page_url(base: &Url, page: usize) -> Url {
    let mut url = base.clone();
    if page > 0 {
        url.query_pairs_mut()
            .append_pair(PAGE_PARAM, &page.to_string());
    }
    url
}

/// HTTP-backed [`PageSource`].
pub struct PageFetcher {
    client: Client,
    base_url: Url,
    max_attempts: u32,
    backoff: Duration,
}

impl PageFetcher {
    /// Create a fetcher for the configured listing.
    pub fn new(client: Client, config: &SourceConfig) -> Result<Self> {
        Ok(Self {
            client,
            base_url: config.base_url()?,
            max_attempts: config.max_attempts.max(1),
            backoff: Duration::from_millis(config.retry_backoff_ms),
        })
    }
}

#[async_trait]
impl PageSource for PageFetcher {
    async fn fetch_page(&self, page: usize) -> Result<String> {
        let url = page_url(&self.base_url, page);
        let mut attempt = 1;

        loop {
            log::debug!("GET {} (attempt {}/{})", url, attempt, self.max_attempts);

            let response = self
                .client
                .get(url.clone())
                .send()
                .await
                .map_err(|e| AppError::fetch(page, url.as_str(), e))?;
            let status = response.status();

            if status == StatusCode::SERVICE_UNAVAILABLE && attempt < self.max_attempts {
                let delay = self.backoff * attempt;
                log::warn!(
                    "Page {} answered 503, retrying in {:?} (attempt {}/{})",
                    page,
                    delay,
                    attempt,
                    self.max_attempts
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
                continue;
            }

            if !status.is_success() {
                return Err(AppError::fetch(
                    page,
                    url.as_str(),
                    format!("HTTP {status} after {attempt} attempt(s)"),
                ));
            }

            return response
                .text()
                .await
                .map_err(|e| AppError::fetch(page, url.as_str(), e));
        }
    }
}
