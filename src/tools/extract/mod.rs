//! Event Extraction
//!
//! Structured data (JSON-LD) first; markup heuristics when a page carries
//! none. Listing pages are read link by link, everything else through the
//! typed selector rules.

mod elements;
mod fields;
mod listing;
mod rules;
mod structured;

use chrono::NaiveDate;
use scraper::Html;
use url::Url;

use crate::selectors::BODY_SELECTOR;
use crate::tools::clean::clean;
use crate::tools::map::normalize_text;
use crate::tools::scrape::{jsonld_from, meta_value, metadata_from};
use crate::types::{EventDraft, Provenance, ScrapedEvent};

use elements::element_drafts;
use fields::{apply_schedule, description_of, image_of, location_of, schedule_of};
use listing::{is_listing_page, listing_drafts};
use structured::drafts_from_jsonld;

const OG_IMAGE_KEYS: &[&str] = &["og:image", "og:image:secure_url", "twitter:image"];
const DESCRIPTION_KEYS: &[&str] = &["og:description", "description", "twitter:description"];

fn finish_all(drafts: Vec<EventDraft>, page_url: &str, today: NaiveDate) -> Vec<ScrapedEvent> {
    drafts
        .into_iter()
        .filter_map(|draft| draft.finish(page_url, today))
        .collect()
}

/// Events described by the page's JSON-LD.
///
/// ```
/// use chrono::NaiveDate;
/// use venue_scout::tools::extract::extract_structured;
///
/// let html = r#"<script type="application/ld+json">
///   {"@type": "ExhibitionEvent", "name": "Light Atlas", "startDate": "2025-09-20", "endDate": "2026-02-08"}
/// </script>"#;
/// let today = NaiveDate::from_ymd_opt(2025, 9, 1).unwrap();
/// let events = extract_structured(html, "https://museum.org/exhibitions", today);
/// assert_eq!(events[0].title(), "Light Atlas");
/// assert_eq!(events[0].end_date(), NaiveDate::from_ymd_opt(2026, 2, 8));
/// ```
pub fn extract_structured(html: &str, page_url: &str, today: NaiveDate) -> Vec<ScrapedEvent> {
    let Ok(page) = Url::parse(page_url) else {
        return Vec::new();
    };
    let doc = Html::parse_document(html);
    let drafts = drafts_from_jsonld(&jsonld_from(&doc), &page, today);
    finish_all(drafts, page_url, today)
}

/// Events found by markup heuristics alone.
pub fn extract_from_markup(html: &str, page_url: &str, today: NaiveDate) -> Vec<ScrapedEvent> {
    let Ok(page) = Url::parse(page_url) else {
        return Vec::new();
    };
    let doc = Html::parse_document(html);
    finish_all(markup_drafts(&doc, &page, today), page_url, today)
}

fn markup_drafts(doc: &Html, page: &Url, today: NaiveDate) -> Vec<EventDraft> {
    if is_listing_page(page) {
        let drafts = listing_drafts(doc, page, today);
        if !drafts.is_empty() {
            return drafts;
        }
    }
    let metadata = metadata_from(doc);
    element_drafts(doc, page, today, meta_value(&metadata, OG_IMAGE_KEYS))
}

/// Drafts for one fetched page: structured data when present, markup otherwise.
pub(crate) fn extract_drafts(html: &str, page: &Url, today: NaiveDate) -> Vec<EventDraft> {
    let doc = Html::parse_document(html);
    let structured = drafts_from_jsonld(&jsonld_from(&doc), page, today);
    if !structured.is_empty() {
        return structured;
    }
    markup_drafts(&doc, page, today)
}

/// A draft worth a detail-page fetch: it links elsewhere and misses fields.
pub(crate) fn needs_enrichment(draft: &EventDraft, page_url: &str) -> bool {
    let Some(link) = draft.link.as_deref() else {
        return false;
    };
    let distinct = match (Url::parse(link), Url::parse(page_url)) {
        (Ok(link), Ok(page)) => {
            link.host_str() == page.host_str()
                && link.path().trim_end_matches('/') != page.path().trim_end_matches('/')
        }
        _ => false,
    };
    distinct
        && (draft.start_date.is_none() || draft.description.is_none() || draft.image_url.is_none())
}

/// Fill missing fields of `draft` from its detail page. Set fields are never overwritten.
pub(crate) fn enrich_draft(draft: &mut EventDraft, html: &str, detail: &Url, today: NaiveDate) {
    let doc = Html::parse_document(html);

    let structured = drafts_from_jsonld(&jsonld_from(&doc), detail, today);
    let wanted = normalize_text(&draft.title);
    let best = structured
        .iter()
        .position(|d| normalize_text(&d.title) == wanted)
        .or((!structured.is_empty()).then_some(0));
    if let Some(index) = best {
        draft.fill_missing(structured[index].clone());
    }

    let metadata = metadata_from(&doc);
    let Some(body) = doc.select(&BODY_SELECTOR).next() else {
        return;
    };
    let mut page = EventDraft::new(draft.title.clone(), Provenance::Markup);
    if let Some(schedule) = schedule_of(&body, today, false) {
        apply_schedule(&mut page, schedule);
    }
    page.description = meta_value(&metadata, DESCRIPTION_KEYS)
        .map(clean)
        .filter(|d| !d.is_empty())
        .or_else(|| description_of(&body, &draft.title));
    page.image_url = meta_value(&metadata, OG_IMAGE_KEYS)
        .and_then(|src| crate::tools::map::resolve_href(src, detail))
        .map(String::from)
        .or_else(|| image_of(&body, detail, None));
    page.location = location_of(&body);
    draft.fill_missing(page);
}

#[cfg(test)]
mod tests;
