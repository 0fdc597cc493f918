//! Page Scraping
//!
//! Pulls machine-readable pieces (JSON-LD, meta tags, visible text) out of a
//! parsed page. Every function here is synchronous: callers parse, scrape
//! and drop the document before the next await point.

mod utils;

use scraper::Html;

use crate::tools::types::{Jsonld, Metadata};

pub(crate) use utils::{count_links, jsonld_from, metadata_from, visible_text};

/// Scrape JSON-LD from HTML, with arrays and `@graph` containers flattened.
pub fn scrape_jsonld(html: &str) -> Jsonld {
    jsonld_from(&Html::parse_document(html))
}

/// Scrape `<title>` and meta tags from HTML.
pub fn scrape_metadata(html: &str) -> Metadata {
    metadata_from(&Html::parse_document(html))
}

/// Visible body text, excluding scripts, styles and templates.
pub fn scrape_text(html: &str) -> String {
    visible_text(&Html::parse_document(html))
}

/// First metadata value for any of the given keys.
pub fn meta_value<'a>(metadata: &'a Metadata, keys: &[&str]) -> Option<&'a str> {
    keys.iter().find_map(|key| {
        metadata
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    })
}

#[cfg(test)]
mod tests;
