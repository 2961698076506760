// src/services/digest.rs

//! Digest formatter.
//!
//! Renders filtered events into a single chat message (Slack `mrkdwn`).

use chrono::{DateTime, Utc};

use crate::models::EventRecord;

/// Phrase used when the window holds no events.
pub const NO_EVENTS: &str = "No events found";

const SEPARATOR: &str = "───────────────";

/// What the digest is about.
#[derive(Debug, Clone)]
pub struct DigestContext {
    /// Name of the listing site shown in the header
    pub source: String,
    /// Days after today covered by the window
    pub days_ahead: u32,
}

impl DigestContext {
    fn window_label(&self) -> String {
        match self.days_ahead {
            1 => "1 Day".to_string(),
            n => format!("{n} Days"),
        }
    }
}

/// Render the digest message.
pub fn format_digest(
    events: &[EventRecord],
    context: &DigestContext,
    generated_at: DateTime<Utc>,
) -> String {
    let mut message = format!(
        "📅 *Upcoming Events at {} - Next {}*\n\n",
        context.source,
        context.window_label()
    );

    if events.is_empty() {
        message.push_str(&format!(
            "{NO_EVENTS} in the next {}.\n",
            context.window_label().to_lowercase()
        ));
    } else {
        let blocks: Vec<String> = events
            .iter()
            .enumerate()
            .map(|(i, event)| format_event(i + 1, event))
            .collect();
        let separator = format!("{SEPARATOR}\n");
        message.push_str(&blocks.join(separator.as_str()));
    }

    message.push('\n');
    message.push_str(&footer(generated_at));
    message
}

fn format_event(number: usize, event: &EventRecord) -> String {
    let mut block = format!("*{number}. {}*\n", event.title);

    if event.is_single_day() {
        block.push_str(&format!("🗓️ {}\n", event.start_date_text));
    } else {
        block.push_str(&format!(
            "🗓️ {} → {}\n",
            event.start_date_text, event.end_date_text
        ));
    }
    if let Some(url) = &event.organizer_url {
        block.push_str(&format!("🏢 Organizer: {url}\n"));
    }
    if let Some(url) = &event.details_url {
        block.push_str(&format!("🔗 Details: {url}\n"));
    }
    block
}

fn footer(generated_at: DateTime<Utc>) -> String {
    format!(
        "_Last checked: {} UTC_",
        generated_at.format("%b %d, %Y at %I:%M %p")
    )
}
