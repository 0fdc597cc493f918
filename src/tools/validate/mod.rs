//! Event Validation
//!
//! Pure predicates that keep calendar chrome and navigation text from
//! surfacing as events.

use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

use crate::tools::dates::{contains_date, strip_times, MONTH};
use crate::types::ScrapedEvent;

/// Minimum description length that alone qualifies a record.
pub const MIN_DESCRIPTION_LEN: usize = 20;

const MIN_TITLE_LEN: usize = 3;

/// Whole-title matches (lowercased, trimmed).
const CHROME_PHRASES: &[&str] = &[
    "view calendar",
    "events search and views navigation",
    "previous month",
    "next month",
    "previous events",
    "next events",
    "today",
    "this month",
    "this week",
    "list view",
    "month view",
    "day view",
    "week view",
    "photo view",
    "subscribe",
    "subscribe to calendar",
    "export events",
    "view all events",
    "see all",
    "see all events",
    "view all",
    "load more",
    "show more",
    "read more",
    "learn more",
    "more info",
    "more information",
    "details",
    "buy tickets",
    "get tickets",
    "tickets",
    "register",
    "register now",
    "rsvp",
    "filter events",
    "search events",
    "find events",
    "google calendar",
    "icalendar",
    "ical",
    "outlook 365",
    "add to calendar",
    "upcoming events",
    "past events",
    "events",
    "calendar",
    "exhibitions",
    "current exhibitions",
    "upcoming exhibitions",
    "past exhibitions",
    "programs",
    "no events",
    "no events found",
    "there are no upcoming events",
];

/// Substrings that mark a title as widget text wherever they appear.
const CHROME_FRAGMENTS: &[&str] = &[
    "views navigation",
    "skip to content",
    "skip to main",
    "event views",
    "select date",
];

const NAV_GLYPHS: &[char] = &['→', '←', '›', '‹', '»', '«', '>', '<'];

const DAY_NAMES: &[&str] = &[
    "mon", "tue", "tues", "wed", "thu", "thur", "thurs", "fri", "sat", "sun", "monday", "tuesday",
    "wednesday", "thursday", "friday", "saturday", "sunday", "mo", "tu", "we", "th", "fr", "sa",
    "su",
];

/// Final path segments that name a listing rather than one event.
const LISTING_SEGMENTS: &[&str] = &[
    "calendar",
    "events",
    "event",
    "exhibitions",
    "exhibition",
    "programs",
    "public-programs",
    "whats-on",
    "on-view",
    "tours",
    "talks",
    "workshops",
    "list",
    "month",
    "day",
    "upcoming",
    "current",
    "past",
    "archive",
    "all",
];

static EVENT_COUNT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^[\d\s,./:#-]*(?:events?|items?|results?)?[\d\s,./:#-]*$")
        .expect("valid event count regex")
});

static DATE_WORDS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?i)\b(?:{MONTH}|mon(?:day)?|tue(?:s|sday)?|wed(?:nesday)?|thu(?:r|rs|rsday)?|fri(?:day)?|sat(?:urday)?|sun(?:day)?|\d{{1,2}}(?:st|nd|rd|th)|to|through|until|and|from|am|pm|a\.m|p\.m|noon)\b"
    ))
    .expect("valid date words regex")
});

/// True when a candidate title reads like an event name.
pub fn is_valid_title(title: &str) -> bool {
    let trimmed = title.trim();
    if trimmed.chars().count() < MIN_TITLE_LEN {
        return false;
    }
    let lower = trimmed.to_lowercase();
    let bare = lower.trim_end_matches(|c: char| c == '.' || c == ':' || c == ',');

    if DAY_NAMES.contains(&bare) {
        return false;
    }
    if EVENT_COUNT_RE.is_match(bare) {
        return false;
    }
    if CHROME_PHRASES.contains(&bare) {
        return false;
    }
    if CHROME_FRAGMENTS.iter().any(|f| lower.contains(f)) {
        return false;
    }
    if trimmed.starts_with(NAV_GLYPHS) || trimmed.ends_with(NAV_GLYPHS) {
        return false;
    }
    !is_bare_date_text(trimmed)
}

/// Text made only of dates, times and their connective words.
fn is_bare_date_text(text: &str) -> bool {
    let without_times = strip_times(text);
    let has_temporal = contains_date(text) || without_times.len() != text.len();
    if !has_temporal {
        return false;
    }
    let residue = DATE_WORDS_RE.replace_all(&without_times, " ");
    !residue.chars().any(|c| c.is_alphabetic())
}

/// True when an extracted record is a plausible event rather than page chrome.
pub fn is_valid_event(event: &ScrapedEvent, page_url: &str) -> bool {
    if !is_valid_title(event.title()) {
        return false;
    }

    let link = event.source_url();
    if is_rejected_link(link, page_url, event.start_date().is_some()) {
        return false;
    }

    let has_date = event.start_date().is_some();
    let has_own_link = !same_page(link, page_url);
    let has_description = event
        .description()
        .map(|d| d.trim().chars().count() >= MIN_DESCRIPTION_LEN)
        .unwrap_or(false);

    has_date || has_own_link || has_description
}

fn is_rejected_link(link: &str, page_url: &str, has_date: bool) -> bool {
    let lower = link.trim().to_ascii_lowercase();
    if lower.starts_with("javascript:") || lower.starts_with("mailto:") || lower.starts_with("tel:")
    {
        return true;
    }
    if lower.starts_with('#') {
        return true;
    }

    let (Ok(link_url), Ok(page)) = (Url::parse(link), Url::parse(page_url)) else {
        return false;
    };
    if link_url.fragment().is_some() && same_page(link, page_url) && link != page_url {
        return true;
    }
    if !has_date && link_url.as_str() != page.as_str() && is_listing_path(&link_url) {
        return true;
    }
    false
}

fn same_page(a: &str, b: &str) -> bool {
    match (Url::parse(a), Url::parse(b)) {
        (Ok(mut a), Ok(mut b)) => {
            a.set_fragment(None);
            b.set_fragment(None);
            a.host_str() == b.host_str()
                && a.path().trim_end_matches('/') == b.path().trim_end_matches('/')
                && a.query() == b.query()
        }
        _ => a == b,
    }
}

/// A listing or calendar path with no event-specific slug.
fn is_listing_path(url: &Url) -> bool {
    let segments: Vec<&str> = url
        .path_segments()
        .map(|s| s.filter(|seg| !seg.is_empty()).collect())
        .unwrap_or_default();
    match segments.last() {
        None => true,
        Some(last) => {
            let last = last.to_ascii_lowercase();
            LISTING_SEGMENTS.contains(&last.as_str())
                || last.chars().all(|c| c.is_ascii_digit() || c == '-')
        }
    }
}

#[cfg(test)]
mod tests;
