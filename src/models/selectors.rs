// src/models/selectors.rs

//! CSS selectors for scraping an events listing page.

use regex::Regex;
use scraper::Selector;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// CSS selectors (and the detail path convention) for one listing site.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingSelectors {
    /// Selector for each event container on a listing page
    #[serde(default = "defaults::container")]
    pub container: String,

    /// Selector tried when `container` matches nothing; only the innermost
    /// matches are kept
    #[serde(default = "defaults::fallback_container")]
    pub fallback_container: String,

    /// Selector for the title element within a container
    #[serde(default = "defaults::title")]
    pub title: String,

    /// Selector for timestamped date elements within a container (first two
    /// are used)
    #[serde(default = "defaults::date")]
    pub date: String,

    /// Attribute holding the machine-readable timestamp on date elements
    #[serde(default = "defaults::date_attr")]
    pub date_attr: String,

    /// Regex a link path must match to count as the event's detail page
    #[serde(default = "defaults::details_path_pattern")]
    pub details_path_pattern: String,

    /// Selector for the organizer (external) link
    #[serde(default = "defaults::organizer_link")]
    pub organizer_link: String,

    /// Selector for the event image
    #[serde(default = "defaults::image")]
    pub image: String,

    /// Selector for the pagination control
    #[serde(default = "defaults::pagination")]
    pub pagination: String,

    /// Selector for the "next page" affordance inside the pagination control
    #[serde(default = "defaults::next_page")]
    pub next_page: String,
}

impl Default for ListingSelectors {
    fn default() -> Self {
        Self {
            container: defaults::container(),
            fallback_container: defaults::fallback_container(),
            title: defaults::title(),
            date: defaults::date(),
            date_attr: defaults::date_attr(),
            details_path_pattern: defaults::details_path_pattern(),
            organizer_link: defaults::organizer_link(),
            image: defaults::image(),
            pagination: defaults::pagination(),
            next_page: defaults::next_page(),
        }
    }
}

impl ListingSelectors {
    /// Parse every selector and the detail path pattern.
    pub fn compile(&self) -> Result<CompiledSelectors> {
        Ok(CompiledSelectors {
            container: parse_selector(&self.container)?,
            fallback_container: parse_selector(&self.fallback_container)?,
            title: parse_selector(&self.title)?,
            date: parse_selector(&self.date)?,
            date_attr: self.date_attr.clone(),
            link: parse_selector("a[href]")?,
            details_path: Regex::new(&self.details_path_pattern)?,
            organizer_link: parse_selector(&self.organizer_link)?,
            image: parse_selector(&self.image)?,
            pagination: parse_selector(&self.pagination)?,
            next_page: parse_selector(&self.next_page)?,
        })
    }
}

/// Parsed form of [`ListingSelectors`], ready for matching.
#[derive(Debug, Clone)]
pub struct CompiledSelectors {
    pub container: Selector,
    pub fallback_container: Selector,
    pub title: Selector,
    pub date: Selector,
    pub date_attr: String,
    pub link: Selector,
    pub details_path: Regex,
    pub organizer_link: Selector,
    pub image: Selector,
    pub pagination: Selector,
    pub next_page: Selector,
}

fn parse_selector(s: &str) -> Result<Selector> {
    Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
}

mod defaults {
    pub fn container() -> String {
        "div.views-row".into()
    }
    pub fn fallback_container() -> String {
        "div:has(> h2):has(time), div:has(> h3):has(time)".into()
    }
    pub fn title() -> String {
        "h2, h3".into()
    }
    pub fn date() -> String {
        "time[datetime]".into()
    }
    pub fn date_attr() -> String {
        "datetime".into()
    }
    pub fn details_path_pattern() -> String {
        r"^/(?:node|events?)/".into()
    }
    pub fn organizer_link() -> String {
        r#"a[href][target="_blank"]"#.into()
    }
    pub fn image() -> String {
        "img[src]".into()
    }
    pub fn pagination() -> String {
        "nav.pager, ul.pager, .pagination".into()
    }
    pub fn next_page() -> String {
        r#".pager__item--next a, a[rel="next"], li.next a"#.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_selectors_compile() {
        assert!(ListingSelectors::default().compile().is_ok());
    }

    #[test]
    fn test_invalid_selector_is_reported() {
        let selectors = ListingSelectors {
            title: "[[invalid".to_string(),
            ..ListingSelectors::default()
        };
        let err = selectors.compile().unwrap_err();
        assert!(matches!(err, AppError::Selector { ref selector, .. } if selector == "[[invalid"));
    }

    #[test]
    fn test_invalid_details_pattern_is_reported() {
        let selectors = ListingSelectors {
            details_path_pattern: "(unclosed".to_string(),
            ..ListingSelectors::default()
        };
        assert!(matches!(selectors.compile(), Err(AppError::Regex(_))));
    }
}
