//! Event Deduplication
//!
//! Three independent keys per event: (title, date), (url, date) and
//! (title, url). An event is dropped when any of its keys was already seen.
//! Undated events skip the (url, date) key.

use std::collections::HashSet;

use url::Url;

use crate::types::ScrapedEvent;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum EventKey {
    TitleDate(String, String),
    UrlDate(String, String),
    TitleUrl(String, String),
}

/// Drop duplicate events, keeping the first occurrence and input order.
pub fn dedupe_events(events: Vec<ScrapedEvent>) -> Vec<ScrapedEvent> {
    let mut seen: HashSet<EventKey> = HashSet::new();
    let mut kept = Vec::with_capacity(events.len());

    for event in events {
        let keys = keys_for(&event);
        if keys.iter().any(|key| seen.contains(key)) {
            tracing::trace!(title = event.title(), "duplicate event dropped");
            continue;
        }
        seen.extend(keys);
        kept.push(event);
    }
    kept
}

/// Undated events get no (url, date) key: several of them often share the
/// page they were described on.
fn keys_for(event: &ScrapedEvent) -> Vec<EventKey> {
    let title = title_key(event.title());
    let url = url_key(event.source_url());
    let date = event
        .start_date()
        .map(|d| d.to_string())
        .unwrap_or_default();

    let mut keys = vec![EventKey::TitleDate(title.clone(), date.clone())];
    if !date.is_empty() {
        keys.push(EventKey::UrlDate(url.clone(), date));
    }
    keys.push(EventKey::TitleUrl(title, url));
    keys
}

/// Lowercase alphanumerics only, so punctuation and spacing never split keys.
fn title_key(title: &str) -> String {
    title
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

fn url_key(raw: &str) -> String {
    match Url::parse(raw) {
        Ok(url) => {
            let host = url.host_str().unwrap_or_default().trim_start_matches("www.");
            let path = url.path().trim_end_matches('/');
            match url.query() {
                Some(q) => format!("{host}{path}?{q}"),
                None => format!("{host}{path}"),
            }
        }
        Err(_) => raw.trim().trim_end_matches('/').to_ascii_lowercase(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{EventDraft, Provenance};
    use chrono::NaiveDate;

    const PAGE: &str = "https://museum.org/events";

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 9, 1).unwrap()
    }

    fn event(title: &str, link: &str, date: Option<(i32, u32, u32)>) -> ScrapedEvent {
        let mut draft = EventDraft::new(title, Provenance::Markup);
        draft.link = Some(link.to_string());
        draft.start_date = date.and_then(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d));
        draft.finish(PAGE, today()).unwrap()
    }

    #[test]
    fn same_title_and_date_with_different_urls_collapse() {
        let events = vec![
            event("Light Atlas", "https://museum.org/exhibitions/light-atlas", Some((2025, 9, 20))),
            event("Light Atlas", "https://museum.org/on-view/light-atlas", Some((2025, 9, 20))),
        ];
        let out = dedupe_events(events);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].source_url(), "https://museum.org/exhibitions/light-atlas");
    }

    #[test]
    fn same_url_and_date_collapse_despite_title_noise() {
        let events = vec![
            event("Gallery Talk", "https://museum.org/events/talk", Some((2025, 10, 2))),
            event("Gallery Talk: Members", "https://www.museum.org/events/talk/", Some((2025, 10, 2))),
        ];
        assert_eq!(dedupe_events(events).len(), 1);
    }

    #[test]
    fn recurring_title_on_same_url_collapses() {
        let events = vec![
            event("Highlights Tour", "https://museum.org/tours/highlights", Some((2025, 10, 2))),
            event("Highlights Tour", "https://museum.org/tours/highlights", Some((2025, 10, 9))),
        ];
        assert_eq!(dedupe_events(events).len(), 1);
    }

    #[test]
    fn distinct_events_survive_in_order() {
        let events = vec![
            event("Highlights Tour", "https://museum.org/tours/highlights", Some((2025, 10, 2))),
            event("Print Workshop", "https://museum.org/learn/print", Some((2025, 10, 2))),
            event("Sculpture Walk", "https://museum.org/tours/sculpture", None),
        ];
        let out = dedupe_events(events);
        let titles: Vec<&str> = out.iter().map(|e| e.title()).collect();
        assert_eq!(titles, ["Highlights Tour", "Print Workshop", "Sculpture Walk"]);
    }

    #[test]
    fn undated_events_sharing_a_page_survive() {
        let events = vec![
            event("Permanent Collection", PAGE, None),
            event("Sculpture Garden", PAGE, None),
            event("Permanent Collection", PAGE, None),
        ];
        let out = dedupe_events(events);
        let titles: Vec<&str> = out.iter().map(|e| e.title()).collect();
        assert_eq!(titles, ["Permanent Collection", "Sculpture Garden"]);
    }

    #[test]
    fn dedupe_is_idempotent() {
        let events = vec![
            event("Light Atlas", "https://museum.org/a", Some((2025, 9, 20))),
            event("light atlas", "https://museum.org/b", Some((2025, 9, 20))),
            event("Night Walk", "https://museum.org/a", None),
        ];
        let once = dedupe_events(events);
        let twice = dedupe_events(once.clone());
        assert_eq!(once, twice);
    }
}
