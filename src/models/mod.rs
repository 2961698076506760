// src/models/mod.rs

//! Domain models for the digest pipeline.

mod config;
mod event;
mod selectors;

// Re-export all public types
pub use config::{
    Config, FilterConfig, NotifierConfig, SourceConfig, WEBHOOK_ENV, WEBHOOK_ENV_FALLBACK,
};
pub use event::{DATE_NOT_FOUND, EventRecord};
pub use selectors::{CompiledSelectors, ListingSelectors};
