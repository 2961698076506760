// src/services/extractor.rs

//! Event extractor.
//!
//! Turns one listing page into per-container outcomes plus what the page says
//! about pagination. Every container is handled on its own: a malformed one
//! is reported as [`ContainerOutcome::Failed`] and never affects its siblings.

use std::collections::HashSet;
use std::ops::AddAssign;

use scraper::{ElementRef, Html};
use url::Url;

use crate::error::Result;
use crate::models::{CompiledSelectors, DATE_NOT_FOUND, EventRecord, ListingSelectors};
use crate::utils::{normalize_whitespace, origin_of, resolve_url, resolved_path};

/// Why a container produced no record without being an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    MissingTitle,
}

/// Result of extracting a single event container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContainerOutcome {
    Extracted(EventRecord),
    Skipped(SkipReason),
    Failed(String),
}

/// Which container selector produced the page's containers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerSource {
    Primary,
    Fallback,
    /// Neither selector matched; the listing is exhausted.
    None,
}

/// What the page's pagination control offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pagination {
    /// No pagination control on the page.
    Absent,
    /// A control exists but has no "next" affordance.
    LastPage,
    HasNext,
}

/// Extraction counters, summed across pages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractStats {
    pub extracted: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl ExtractStats {
    fn record(&mut self, outcome: &ContainerOutcome) {
        match outcome {
            ContainerOutcome::Extracted(_) => self.extracted += 1,
            ContainerOutcome::Skipped(_) => self.skipped += 1,
            ContainerOutcome::Failed(_) => self.failed += 1,
        }
    }

    /// Number of containers seen.
    pub fn containers(&self) -> usize {
        self.extracted + self.skipped + self.failed
    }
}

impl AddAssign for ExtractStats {
    fn add_assign(&mut self, other: Self) {
        self.extracted += other.extracted;
        self.skipped += other.skipped;
        self.failed += other.failed;
    }
}

/// Everything learned from one listing page.
#[derive(Debug, Clone)]
pub struct PageScan {
    pub outcomes: Vec<ContainerOutcome>,
    pub source: ContainerSource,
    pub pagination: Pagination,
}

impl PageScan {
    /// Extraction counters for this page.
    pub fn stats(&self) -> ExtractStats {
        let mut stats = ExtractStats::default();
        for outcome in &self.outcomes {
            stats.record(outcome);
        }
        stats
    }

    /// Consume the scan, keeping only extracted records.
    pub fn into_events(self) -> Vec<EventRecord> {
        self.outcomes
            .into_iter()
            .filter_map(|outcome| match outcome {
                ContainerOutcome::Extracted(event) => Some(event),
                _ => None,
            })
            .collect()
    }
}

/// One date element: displayed text plus optional machine timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
struct DateField {
    text: String,
    timestamp: Option<String>,
}

/// Extracts [`EventRecord`]s from listing page markup.
pub struct EventExtractor {
    selectors: CompiledSelectors,
    origin: Url,
}

impl EventExtractor {
    /// Create an extractor for a listing whose pages live under `base_url`.
    pub fn new(selectors: &ListingSelectors, base_url: &Url) -> Result<Self> {
        Ok(Self {
            selectors: selectors.compile()?,
            origin: origin_of(base_url),
        })
    }

    /// Scan a whole page: containers, their outcomes, and pagination.
    pub fn scan(&self, html: &str) -> PageScan {
        let document = Html::parse_document(html);

        let mut containers: Vec<ElementRef> = document.select(&self.selectors.container).collect();
        let mut source = ContainerSource::Primary;
        if containers.is_empty() {
            containers = innermost(
                document
                    .select(&self.selectors.fallback_container)
                    .collect(),
            );
            source = if containers.is_empty() {
                ContainerSource::None
            } else {
                log::debug!("Primary container selector matched nothing, using fallback");
                ContainerSource::Fallback
            };
        }

        let outcomes = containers
            .into_iter()
            .map(|container| self.extract_container(container))
            .collect();

        PageScan {
            outcomes,
            source,
            pagination: self.pagination(&document),
        }
    }

    /// Extract a single event container.
    pub fn extract_container(&self, container: ElementRef) -> ContainerOutcome {
        let Some(title) = self.title(container) else {
            log::debug!("Skipping container without title");
            return ContainerOutcome::Skipped(SkipReason::MissingTitle);
        };

        match self.build_record(container, title) {
            Ok(event) => ContainerOutcome::Extracted(event),
            Err(reason) => {
                log::warn!("Failed to extract event: {reason}");
                ContainerOutcome::Failed(reason)
            }
        }
    }

    fn build_record(
        &self,
        container: ElementRef,
        title: String,
    ) -> std::result::Result<EventRecord, String> {
        let (start, end) = self.date_range(container);

        let details_url = self
            .details_href(container)
            .map(|href| self.resolve(&title, "details link", href))
            .transpose()?;
        let organizer_url = container
            .select(&self.selectors.organizer_link)
            .find_map(|a| a.value().attr("href"))
            .map(|href| self.resolve(&title, "organizer link", href))
            .transpose()?;
        let image_url = container
            .select(&self.selectors.image)
            .find_map(|img| img.value().attr("src"))
            .map(|src| self.resolve(&title, "image", src))
            .transpose()?;

        Ok(EventRecord {
            title,
            start_date_text: start.text,
            end_date_text: end.text,
            start_timestamp: start.timestamp,
            end_timestamp: end.timestamp,
            details_url,
            organizer_url,
            image_url,
        })
    }

    fn title(&self, container: ElementRef) -> Option<String> {
        let heading = container.select(&self.selectors.title).next()?;
        let text = normalize_whitespace(&heading.text().collect::<String>());
        (!text.is_empty()).then_some(text)
    }

    /// Start and end dates; a lone date element is a single-day event.
    fn date_range(&self, container: ElementRef) -> (DateField, DateField) {
        let mut fields = container
            .select(&self.selectors.date)
            .take(2)
            .map(|el| self.date_field(el));

        match (fields.next(), fields.next()) {
            (Some(start), Some(end)) => (start, end),
            (Some(single), None) => (single.clone(), single),
            _ => {
                let missing = DateField {
                    text: DATE_NOT_FOUND.to_string(),
                    timestamp: None,
                };
                (missing.clone(), missing)
            }
        }
    }

    fn date_field(&self, element: ElementRef) -> DateField {
        let timestamp = element
            .value()
            .attr(&self.selectors.date_attr)
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string);

        let text = normalize_whitespace(&element.text().collect::<String>());
        let text = if !text.is_empty() {
            text
        } else {
            timestamp
                .clone()
                .unwrap_or_else(|| DATE_NOT_FOUND.to_string())
        };

        DateField { text, timestamp }
    }

    fn details_href<'a>(&self, container: ElementRef<'a>) -> Option<&'a str> {
        container
            .select(&self.selectors.link)
            .filter_map(|a| a.value().attr("href"))
            .find(|href| {
                resolved_path(&self.origin, href)
                    .is_some_and(|path| self.selectors.details_path.is_match(&path))
            })
    }

    fn resolve(&self, title: &str, what: &str, href: &str) -> std::result::Result<String, String> {
        resolve_url(&self.origin, href)
            .map_err(|e| format!("'{title}': cannot resolve {what} '{href}': {e}"))
    }

    fn pagination(&self, document: &Html) -> Pagination {
        let controls: Vec<ElementRef> = document.select(&self.selectors.pagination).collect();
        if controls.is_empty() {
            return Pagination::Absent;
        }

        let has_next = controls
            .iter()
            .any(|control| control.select(&self.selectors.next_page).next().is_some());
        if has_next {
            Pagination::HasNext
        } else {
            Pagination::LastPage
        }
    }
}

/// Drop matches that enclose another match, so a section wrapper never
/// stands in for the cards inside it.
fn innermost(matches: Vec<ElementRef<'_>>) -> Vec<ElementRef<'_>> {
    let ids: HashSet<_> = matches.iter().map(|el| (**el).id()).collect();
    matches
        .into_iter()
        .filter(|el| !el.descendants().skip(1).any(|node| ids.contains(&node.id())))
        .collect()
}
