// src/utils/http.rs

//! HTTP client utilities.

use std::time::Duration;

use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, HeaderMap, HeaderValue};
use reqwest::redirect::Policy;

use crate::error::{AppError, Result};
use crate::models::{NotifierConfig, SourceConfig};

const BROWSER_ACCEPT: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8";
const BROWSER_ACCEPT_LANGUAGE: &str = "en-US,en;q=0.9";
const MAX_REDIRECTS: usize = 10;

/// Create the client used for listing pages.
///
/// When `accept_invalid_certs` is set, certificate checks are skipped and the
/// client refuses to follow redirects that leave the listing host.
pub fn create_listing_client(config: &SourceConfig) -> Result<reqwest::Client> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static(BROWSER_ACCEPT));
    headers.insert(
        ACCEPT_LANGUAGE,
        HeaderValue::from_static(BROWSER_ACCEPT_LANGUAGE),
    );

    let mut builder = reqwest::Client::builder()
        .user_agent(&config.user_agent)
        .default_headers(headers)
        .timeout(Duration::from_secs(config.timeout_secs));

    if config.accept_invalid_certs {
        let host = config
            .base_url()?
            .host_str()
            .map(str::to_string)
            .ok_or_else(|| AppError::config("source.base_url has no host"))?;

        log::warn!("TLS certificate verification disabled for {host}");
        builder = builder
            .danger_accept_invalid_certs(true)
            .redirect(same_host_policy(host));
    }

    Ok(builder.build()?)
}

/// Create the client used for webhook delivery. Always verifies TLS.
pub fn create_webhook_client(config: &NotifierConfig) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()?;
    Ok(client)
}

fn same_host_policy(host: String) -> Policy {
    Policy::custom(move |attempt| {
        if attempt.previous().len() >= MAX_REDIRECTS {
            attempt.error("too many redirects")
        } else if attempt.url().host_str() == Some(host.as_str()) {
            attempt.follow()
        } else {
            log::warn!("Not following redirect off {host} to {}", attempt.url());
            attempt.stop()
        }
    })
}
