// src/services/notifier.rs

//! Webhook notifier.

use reqwest::{Client, StatusCode};
use serde::Serialize;

use crate::error::{AppError, Result};

/// JSON body accepted by chat webhooks.
#[derive(Debug, Serialize)]
struct WebhookPayload<'a> {
    text: &'a str,
}

/// A successful delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub status: u16,
    pub body: String,
}

/// Posts digest messages to a single webhook.
pub struct WebhookNotifier {
    client: Client,
    url: String,
}

impl WebhookNotifier {
    /// Create a notifier; an absent or blank URL is a configuration error.
    pub fn new(client: Client, url: Option<&str>) -> Result<Self> {
        let url = url
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .ok_or_else(|| AppError::config("webhook URL is not configured"))?;

        Ok(Self {
            client,
            url: url.to_string(),
        })
    }

    /// Deliver `text` in one attempt. Only HTTP 200 counts as success.
    pub async fn deliver(&self, text: &str) -> Result<Delivery> {
        let response = self
            .client
            .post(&self.url)
            .json(&WebhookPayload { text })
            .send()
            .await?;

        let status = response.status();
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                log::warn!("Could not read webhook response body: {e}");
                format!("<unreadable response body: {e}>")
            }
        };

        if status != StatusCode::OK {
            log::error!("Webhook answered {status}: {body}");
            return Err(AppError::Delivery {
                status: status.as_u16(),
                body,
            });
        }

        log::info!("Webhook accepted the digest ({status})");
        Ok(Delivery {
            status: status.as_u16(),
            body,
        })
    }
}
