// src/services/pager.rs

//! Pager: walks listing pages until the site runs out of them.

use std::fmt;

use crate::models::EventRecord;
use crate::services::extractor::{ContainerSource, EventExtractor, ExtractStats, Pagination};
use crate::services::fetcher::PageSource;

/// Why pagination ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    /// A page had no containers under either selector.
    Exhausted,
    /// The page carried no pagination control (single-page listing).
    NoPagination,
    /// The pagination control offered no next page.
    LastPage,
    /// A page could not be fetched; earlier pages are kept.
    FetchFailed(String),
    /// The hard page cap was hit while a next page was still offered.
    PageLimitReached(usize),
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exhausted => write!(f, "no more events"),
            Self::NoPagination => write!(f, "single page listing"),
            Self::LastPage => write!(f, "last page reached"),
            Self::FetchFailed(reason) => write!(f, "fetch failed: {reason}"),
            Self::PageLimitReached(limit) => write!(f, "page limit of {limit} reached"),
        }
    }
}

/// Everything collected across pages.
#[derive(Debug, Clone)]
pub struct PagerOutcome {
    pub events: Vec<EventRecord>,
    pub pages_fetched: usize,
    pub stop: StopReason,
    pub stats: ExtractStats,
}

/// Drives a [`PageSource`] and an [`EventExtractor`] across pages.
pub struct Pager<'a, S: PageSource + ?Sized> {
    source: &'a S,
    extractor: &'a EventExtractor,
    max_pages: usize,
}

impl<'a, S: PageSource + ?Sized> Pager<'a, S> {
    /// Create a pager that fetches at most `max_pages` pages.
    pub fn new(source: &'a S, extractor: &'a EventExtractor, max_pages: usize) -> Self {
        Self {
            source,
            extractor,
            max_pages: max_pages.max(1),
        }
    }

    /// Fetch pages 0, 1, 2, ... and collect their events.
    pub async fn collect(&self) -> PagerOutcome {
        let mut events = Vec::new();
        let mut stats = ExtractStats::default();
        let mut page = 0;

        let stop = loop {
            if page == self.max_pages {
                log::warn!(
                    "Stopping after {} pages although the listing offers more",
                    self.max_pages
                );
                break StopReason::PageLimitReached(self.max_pages);
            }

            let body = match self.source.fetch_page(page).await {
                Ok(body) => body,
                Err(e) => {
                    log::error!("Page {page}: {e}");
                    break StopReason::FetchFailed(e.to_string());
                }
            };
            page += 1;

            let scan = self.extractor.scan(&body);
            if scan.source == ContainerSource::None {
                log::info!("Page {}: no event containers found", page - 1);
                break StopReason::Exhausted;
            }

            let page_stats = scan.stats();
            let pagination = scan.pagination;
            log::info!(
                "Page {}: {} event(s), {} skipped, {} failed",
                page - 1,
                page_stats.extracted,
                page_stats.skipped,
                page_stats.failed
            );
            stats += page_stats;
            events.extend(scan.into_events());

            match pagination {
                Pagination::HasNext => continue,
                Pagination::LastPage => break StopReason::LastPage,
                Pagination::Absent => break StopReason::NoPagination,
            }
        };

        PagerOutcome {
            events,
            pages_fetched: page,
            stop,
            stats,
        }
    }
}
