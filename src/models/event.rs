// src/models/event.rs

//! Event record extracted from a listing page.

use serde::{Deserialize, Serialize};

/// Placeholder date text used when a container carries no date element.
pub const DATE_NOT_FOUND: &str = "Date not found";

/// An event scraped from one container on a listing page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EventRecord {
    /// Event title (never empty)
    pub title: String,

    /// Start date as displayed on the page
    pub start_date_text: String,

    /// End date as displayed on the page (equal to start for single-day events)
    pub end_date_text: String,

    /// Machine-readable start timestamp, if the page provides one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_timestamp: Option<String>,

    /// Machine-readable end timestamp, if the page provides one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_timestamp: Option<String>,

    /// Absolute URL of the event's detail page
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details_url: Option<String>,

    /// External organizer link
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organizer_url: Option<String>,

    /// Absolute URL of the event image
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl EventRecord {
    /// Create a record with only a title and the "not found" date placeholder.
    pub fn untimed(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            start_date_text: DATE_NOT_FOUND.to_string(),
            end_date_text: DATE_NOT_FOUND.to_string(),
            start_timestamp: None,
            end_timestamp: None,
            details_url: None,
            organizer_url: None,
            image_url: None,
        }
    }

    /// Whether the event starts and ends on the same displayed date.
    pub fn is_single_day(&self) -> bool {
        self.start_date_text == self.end_date_text
    }
}
