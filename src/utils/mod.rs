// src/utils/mod.rs

//! Utility functions and helpers.

pub mod http;
pub mod log;

use url::Url;

use crate::error::Result;

/// Scheme and host of a URL, with an empty path.
pub fn origin_of(url: &Url) -> Url {
    let mut origin = url.clone();
    origin.set_path("/");
    origin.set_query(None);
    origin.set_fragment(None);
    origin
}

/// Resolve a potentially relative URL against a site origin.
///
/// Hrefs that already parse as absolute URLs are returned untouched.
pub fn resolve_url(origin: &Url, href: &str) -> Result<String> {
    let href = href.trim();
    if Url::parse(href).is_ok() {
        return Ok(href.to_string());
    }
    Ok(origin.join(href)?.to_string())
}

/// Path component of an href, resolved against a site origin.
pub fn resolved_path(origin: &Url, href: &str) -> Option<String> {
    origin.join(href.trim()).ok().map(|u| u.path().to_string())
}

/// Collapse runs of whitespace into single spaces.
pub fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
