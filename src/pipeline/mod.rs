// src/pipeline/mod.rs

//! Pipeline entry points.
//!
//! - `run_digest`: scrape, filter, render and deliver
//! - `preview_digest`: same without delivery
//! - `build_digest` / `deliver_digest`: the same steps over any `PageSource`

pub mod digest;

pub use digest::{Digest, RunSummary, build_digest, deliver_digest, preview_digest, run_digest};
