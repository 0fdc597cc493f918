//! Render Mode Detection
//!
//! Best-effort guess at whether a fetched page carries its content in the
//! markup or is a JavaScript shell that only renders in a browser.

use scraper::Html;
use serde::{Deserialize, Serialize};

use crate::selectors::SCRIPT_SELECTOR;
use crate::tools::scrape::{count_links, visible_text};

/// Fewer links than this, together with little text, marks a shell page.
const SPARSE_LINKS: usize = 5;
/// Visible text threshold (characters) for a shell page.
const SPARSE_TEXT: usize = 500;
/// A framework signature only counts below this many links.
const SPA_LINK_CEILING: usize = 10;

const SPA_SIGNATURES: &[&str] = &[
    "react",
    "vue",
    "angular",
    "_next/",
    "__next_data__",
    "__nuxt",
    "ember",
    "svelte",
    "gatsby",
    "webpack",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderMode {
    #[default]
    ServerRendered,
    ClientRendered,
}

impl RenderMode {
    pub fn is_client_rendered(self) -> bool {
        matches!(self, RenderMode::ClientRendered)
    }
}

/// Classify raw HTML.
pub fn classify_html(html: &str) -> RenderMode {
    classify(&Html::parse_document(html))
}

/// Classify a parsed page.
pub fn classify(document: &Html) -> RenderMode {
    let links = count_links(document);
    let text_len = visible_text(document).chars().count();

    if links < SPARSE_LINKS && text_len < SPARSE_TEXT {
        return RenderMode::ClientRendered;
    }
    if links < SPA_LINK_CEILING && has_spa_signature(document) {
        return RenderMode::ClientRendered;
    }
    RenderMode::ServerRendered
}

fn has_spa_signature(document: &Html) -> bool {
    document.select(&SCRIPT_SELECTOR).any(|script| {
        let src = script.value().attr("src").unwrap_or_default().to_lowercase();
        let id = script.value().attr("id").unwrap_or_default().to_lowercase();
        let body = script.text().collect::<String>().to_lowercase();
        SPA_SIGNATURES
            .iter()
            .any(|sig| src.contains(sig) || id.contains(sig) || body.contains(sig))
    })
}
