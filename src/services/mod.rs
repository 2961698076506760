// src/services/mod.rs

//! Service layer for the digest pipeline.
//!
//! This module contains the business logic for:
//! - Page fetching (`PageFetcher`, `PageSource`)
//! - Event extraction (`EventExtractor`)
//! - Pagination (`Pager`)
//! - Date-window filtering (`filter_events`)
//! - Message rendering (`format_digest`)
//! - Webhook delivery (`WebhookNotifier`)

pub mod digest;
pub mod extractor;
pub mod fetcher;
pub mod filter;
pub mod notifier;
pub mod pager;

pub use digest::{DigestContext, NO_EVENTS, format_digest};
pub use extractor::{ContainerOutcome, EventExtractor, ExtractStats, PageScan, Pagination};
pub use fetcher::{PageFetcher, PageSource, page_url};
pub use filter::{DateWindow, FilterOutcome, Placement, filter_events};
pub use notifier::{Delivery, WebhookNotifier};
pub use pager::{Pager, PagerOutcome, StopReason};
