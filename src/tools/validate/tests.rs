use super::*;
use crate::types::{EventDraft, Provenance};
use chrono::NaiveDate;

const PAGE: &str = "https://museum.org/events";

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 9, 1).unwrap()
}

fn event(title: &str, link: Option<&str>, date: Option<NaiveDate>, desc: Option<&str>) -> ScrapedEvent {
    let mut draft = EventDraft::new(title, Provenance::Markup);
    draft.link = link.map(str::to_string);
    draft.start_date = date;
    draft.description = desc.map(str::to_string);
    draft.finish(PAGE, today()).unwrap()
}

#[test]
fn rejects_calendar_chrome() {
    for title in [
        "View Calendar",
        "Events Search and Views Navigation",
        "Today",
        "Load more",
        "Subscribe",
        "Google Calendar",
        "Previous Month",
    ] {
        assert!(!is_valid_title(title), "{title}");
    }
}

#[test]
fn rejects_day_names_and_counts() {
    for title in ["Sat", "Tue", "Wednesday", "3 events,5", "12", "2 events"] {
        assert!(!is_valid_title(title), "{title}");
    }
}

#[test]
fn rejects_navigation_glyphs() {
    assert!(!is_valid_title("Next →"));
    assert!(!is_valid_title("« Previous"));
    assert!(!is_valid_title("More events ›"));
}

#[test]
fn rejects_bare_dates_and_times() {
    assert!(!is_valid_title("Friday, Dec 5, 2025 | 1:00 p.m. - 2:00 p.m."));
    assert!(!is_valid_title("September 20, 2025 – February 8, 2026"));
    assert!(!is_valid_title("Oct 5th"));
    assert!(!is_valid_title("6:00 pm"));
}

#[test]
fn accepts_real_titles() {
    for title in [
        "Cynthia Daignault: Light Atlas",
        "May Day Parade",
        "Members Night, Oct 3",
        "Architecture Tour",
        "Sunday Sketching",
    ] {
        assert!(is_valid_title(title), "{title}");
    }
}

#[test]
fn requires_date_link_or_description() {
    let bare = event("Gallery Talk", None, None, None);
    assert!(!is_valid_event(&bare, PAGE));

    let dated = event("Gallery Talk", None, NaiveDate::from_ymd_opt(2025, 10, 2), None);
    assert!(is_valid_event(&dated, PAGE));

    let linked = event("Gallery Talk", Some("https://museum.org/events/gallery-talk"), None, None);
    assert!(is_valid_event(&linked, PAGE));

    let described = event(
        "Gallery Talk",
        None,
        None,
        Some("A conversation with the curator in the east wing."),
    );
    assert!(is_valid_event(&described, PAGE));

    let short = event("Gallery Talk", None, None, Some("Free"));
    assert!(!is_valid_event(&short, PAGE));
}

#[test]
fn rejects_script_and_contact_links() {
    let date = NaiveDate::from_ymd_opt(2025, 10, 2);
    for link in ["javascript:void(0)", "mailto:info@museum.org", "tel:+15555550100"] {
        let ev = event("Gallery Talk", Some(link), date, None);
        assert!(!is_valid_event(&ev, PAGE), "{link}");
    }
}

#[test]
fn rejects_fragments_of_the_page() {
    let ev = event("Gallery Talk", Some("https://museum.org/events#main"), None, None);
    assert!(!is_valid_event(&ev, PAGE));
}

#[test]
fn rejects_undated_listing_links() {
    let ev = event("Family Days", Some("https://museum.org/calendar/"), None, None);
    assert!(!is_valid_event(&ev, PAGE));

    let dated = event(
        "Family Days",
        Some("https://museum.org/calendar/"),
        NaiveDate::from_ymd_opt(2025, 10, 4),
        None,
    );
    assert!(is_valid_event(&dated, PAGE));
}
