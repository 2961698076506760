// src/lib.rs

//! Event Digest Library
//!
//! Scrapes an events listing, keeps the events starting in the next few
//! days and posts them to a chat webhook as one message.

pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod utils;
