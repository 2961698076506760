// src/pipeline/digest.rs

//! Digest pipeline: fetch → extract → filter → format → deliver.

use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::models::{Config, EventRecord};
use crate::services::{
    DateWindow, DigestContext, EventExtractor, ExtractStats, PageFetcher, PageSource, Pager,
    StopReason, WebhookNotifier, filter_events, format_digest,
};
use crate::utils::http::{create_listing_client, create_webhook_client};
use crate::utils::log::{header, sub_item, summary};

/// Run-level counters.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub pages_fetched: usize,
    pub stop: StopReason,
    pub extract: ExtractStats,
    pub collected: usize,
    pub kept: usize,
    pub out_of_window: usize,
    pub undated: usize,
    pub unparseable: usize,
    pub message_chars: usize,
    pub delivered: bool,
}

impl RunSummary {
    fn log(&self) {
        summary(
            "Digest Results",
            &[
                ("Pages fetched", self.pages_fetched.to_string()),
                ("Stopped because", self.stop.to_string()),
                ("Containers seen", self.extract.containers().to_string()),
                ("Events extracted", self.extract.extracted.to_string()),
                ("Containers skipped", self.extract.skipped.to_string()),
                ("Containers failed", self.extract.failed.to_string()),
                ("Events in window", self.kept.to_string()),
                ("Outside window", self.out_of_window.to_string()),
                ("Undated", self.undated.to_string()),
                ("Unparseable dates", self.unparseable.to_string()),
                ("Message length", self.message_chars.to_string()),
                ("Delivered", self.delivered.to_string()),
            ],
        );
    }
}

/// A rendered digest and the events it lists.
#[derive(Debug, Clone)]
pub struct Digest {
    pub message: String,
    pub events: Vec<EventRecord>,
    pub summary: RunSummary,
}

/// Collect, filter and render events from `source`.
pub async fn build_digest<S: PageSource + ?Sized>(
    source: &S,
    config: &Config,
    now: DateTime<Utc>,
) -> Result<Digest> {
    let base_url = config.source.base_url()?;
    let extractor = EventExtractor::new(&config.selectors, &base_url)?;

    log::info!("Scraping events from {base_url}");
    let collected = Pager::new(source, &extractor, config.source.max_pages)
        .collect()
        .await;
    log::info!(
        "Collected {} event(s) from {} page(s) ({})",
        collected.events.len(),
        collected.pages_fetched,
        collected.stop
    );

    let window = DateWindow::upcoming(now, config.filter.days_ahead);
    let total = collected.events.len();
    let filtered = filter_events(collected.events, &window, config.filter.include_undated);
    log::info!(
        "{} of {} event(s) start between {} and {}",
        filtered.kept.len(),
        total,
        window.start.format("%Y-%m-%d"),
        window.end.format("%Y-%m-%d")
    );
    for event in &filtered.kept {
        sub_item(&format!("- {}", event.title));
    }

    let context = DigestContext {
        source: config.source.display_name(),
        days_ahead: config.filter.days_ahead,
    };
    let message = format_digest(&filtered.kept, &context, now);

    Ok(Digest {
        summary: RunSummary {
            pages_fetched: collected.pages_fetched,
            stop: collected.stop,
            extract: collected.stats,
            collected: total,
            kept: filtered.kept.len(),
            out_of_window: filtered.out_of_window,
            undated: filtered.undated,
            unparseable: filtered.unparseable,
            message_chars: message.chars().count(),
            delivered: false,
        },
        message,
        events: filtered.kept,
    })
}

/// Build the digest from the live listing without delivering it.
pub async fn preview_digest(config: &Config, now: DateTime<Utc>) -> Result<Digest> {
    let fetcher = PageFetcher::new(create_listing_client(&config.source)?, &config.source)?;
    let digest = build_digest(&fetcher, config, now).await?;
    digest.summary.log();
    Ok(digest)
}

/// Build the digest from `source` and post it to the configured webhook.
///
/// The webhook URL is checked before any request is made.
pub async fn deliver_digest<S: PageSource + ?Sized>(
    source: &S,
    config: &Config,
    now: DateTime<Utc>,
) -> Result<RunSummary> {
    let webhook_url = config.notifier.webhook_url()?;
    let client = create_webhook_client(&config.notifier)?;
    let notifier = WebhookNotifier::new(client, Some(webhook_url))?;

    let mut digest = build_digest(source, config, now).await?;

    log::info!("Sending digest to webhook...");
    let outcome = notifier.deliver(&digest.message).await;
    digest.summary.delivered = outcome.is_ok();
    digest.summary.log();
    let delivery = outcome?;
    log::debug!("Webhook replied {}: {}", delivery.status, delivery.body);

    Ok(digest.summary)
}

/// Run the full pipeline against the live listing.
pub async fn run_digest(config: &Config, now: DateTime<Utc>) -> Result<RunSummary> {
    header("Event Digest");
    let fetcher = PageFetcher::new(create_listing_client(&config.source)?, &config.source)?;
    deliver_digest(&fetcher, config, now).await
}
