// src/services/filter.rs

//! Date-range filter.
//!
//! Keeps events whose start timestamp lies in
//! `[today 00:00 UTC, today 00:00 UTC + (days + 1) days)`.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, Utc};

use crate::models::EventRecord;

/// Naive layouts accepted after RFC 3339 fails; read as UTC.
const NAIVE_DATETIME_FORMATS: [&str; 3] =
    ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M"];
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Half-open window of instants an event must start in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DateWindow {
    /// Window covering today plus `days_ahead` further calendar days.
    ///
    /// A window reaching past the last representable instant is open-ended.
    pub fn upcoming(now: DateTime<Utc>, days_ahead: u32) -> Self {
        let start = now.date_naive().and_time(NaiveTime::MIN).and_utc();
        let end = Duration::try_days(i64::from(days_ahead) + 1)
            .and_then(|span| start.checked_add_signed(span))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        Self { start, end }
    }

    /// Whether `instant` falls inside the window.
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant < self.end
    }
}

/// Where an event lands relative to the window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Placement {
    InWindow,
    OutOfWindow,
    /// No machine-readable start timestamp.
    Undated,
    /// Start timestamp present but not understood.
    Unparseable(String),
}

/// Filtered events plus how many landed in each placement.
#[derive(Debug, Clone, Default)]
pub struct FilterOutcome {
    pub kept: Vec<EventRecord>,
    pub in_window: usize,
    pub out_of_window: usize,
    pub undated: usize,
    pub unparseable: usize,
}

/// Parse a machine-readable timestamp into UTC.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .ok()
        .map(|date| date.and_time(NaiveTime::MIN).and_utc())
}

/// Decide where a single event lands.
pub fn place(event: &EventRecord, window: &DateWindow) -> Placement {
    let Some(raw) = event.start_timestamp.as_deref() else {
        return Placement::Undated;
    };
    match parse_timestamp(raw) {
        Some(start) if window.contains(start) => Placement::InWindow,
        Some(_) => Placement::OutOfWindow,
        None => Placement::Unparseable(raw.to_string()),
    }
}

/// Filter events to the window, preserving their order.
///
/// Undated events are dropped unless `include_undated` is set; unparseable
/// timestamps are always dropped.
pub fn filter_events(
    events: Vec<EventRecord>,
    window: &DateWindow,
    include_undated: bool,
) -> FilterOutcome {
    let mut outcome = FilterOutcome::default();

    for event in events {
        match place(&event, window) {
            Placement::InWindow => {
                outcome.in_window += 1;
                outcome.kept.push(event);
            }
            Placement::OutOfWindow => {
                log::debug!("'{}' starts outside the window", event.title);
                outcome.out_of_window += 1;
            }
            Placement::Undated => {
                outcome.undated += 1;
                if include_undated {
                    log::warn!("'{}' has no start timestamp, keeping it", event.title);
                    outcome.kept.push(event);
                } else {
                    log::info!("'{}' has no start timestamp, excluded", event.title);
                }
            }
            Placement::Unparseable(raw) => {
                log::warn!(
                    "'{}' has unparseable start timestamp '{}', excluded",
                    event.title,
                    raw
                );
                outcome.unparseable += 1;
            }
        }
    }

    outcome
}
