use chrono::{NaiveDate, NaiveTime};
use url::Url;

use super::structured::parse_datetime;
use super::*;
use crate::types::{Confidence, EventType};

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn t(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

fn today() -> NaiveDate {
    d(2025, 9, 1)
}

const STRUCTURED_PAGE: &str = r#"<html><head>
<script type="application/ld+json">
{"@context": "https://schema.org", "@graph": [
  {"@type": "WebPage", "name": "Calendar"},
  {"@type": "ExhibitionEvent", "name": "Light Atlas",
   "startDate": "2025-09-20T00:00:00-04:00", "endDate": "2026-02-08",
   "location": {"@type": "Place", "name": "Gallery 4"},
   "image": [{"@type": "ImageObject", "url": "/media/atlas.jpg"}],
   "url": "/exhibitions/light-atlas",
   "description": "<p>Paintings of <em>weather</em> and light</p>"},
  {"@type": "ItemList", "itemListElement": [
    {"@type": "ListItem", "position": 1, "item": {
      "@type": "Event", "name": "Curator Talk",
      "startDate": "2025-12-05T13:00:00-05:00", "endDate": "2025-12-05T14:00:00-05:00",
      "location": {"@type": "Place", "address": {"@type": "PostalAddress",
        "streetAddress": "1 Museum Way", "addressLocality": "Springfield"}}}}
  ]}
]}
</script>
<script type="application/ld+json">{not json</script>
<script type="application/ld+json">
{"@type": "TheaterEvent", "name": "Winter Festival", "startDate": "2025-12-12",
 "subEvent": [{"@type": "Event", "name": "Opening Night", "startDate": "2025-12-12T19:00"}]}
</script>
</head><body><div class="event-card"><h3>Markup Only Event</h3></div></body></html>"#;

const CARDS_PAGE: &str = r#"<html><head><meta property="og:image" content="/og.jpg"></head><body>
<header><nav><div class="event-card"><a href="/events">Events</a></div></nav></header>
<div class="calendar-widget"><div class="event-card"><h3>Members Night</h3></div></div>
<main>
  <div class="event-card">
    <img src="/img/logo-icon.png"><img src="/media/garden-tour.jpg">
    <h3><a href="/events/garden-tour">Sculpture Garden Tour</a></h3>
    <div class="event-date">Friday, Dec 5, 2025 | 1:00 p.m. - 2:00 p.m.</div>
    <p>Walk the sculpture garden with a docent and hear how the collection grew.</p>
    <div class="event-location">Sculpture Garden</div>
    <div class="event-card"><h4>Nested Card</h4></div>
  </div>
  <div class="event-card">
    <h3>Print Fair</h3>
    <time datetime="2025-10-03">Oct 3</time> – <time datetime="2025-10-05">Oct 5</time>
    <a href="/events/print-fair">Details</a>
  </div>
</main></body></html>"#;

const LISTING_PAGE: &str = r#"<html><body>
<nav><a href="/exhibitions">Exhibitions</a><a href="/events/">Events</a></nav>
<main><ul>
  <li><a href="/exhibitions/cynthia-daignault-light-atlas">Cynthia Daignault: Light Atlas September 20, 2025 – February 8, 2026</a></li>
  <li><a href="/exhibitions/quiet-rooms"><h3>Quiet Rooms</h3></a><p>Through March 5, 2026</p></li>
  <li><a href="/exhibitions/quiet-rooms">Quiet Rooms</a></li>
  <li><a href="/exhibitions?page=2">Next page</a></li>
</ul></main></body></html>"#;

#[test]
fn test_parse_datetime_strips_offsets() {
    assert_eq!(
        parse_datetime("2025-12-05T13:00:00-05:00", today()),
        (Some(d(2025, 12, 5)), Some(t(13, 0)))
    );
    assert_eq!(
        parse_datetime("2025-12-05T13:30:00.000Z", today()),
        (Some(d(2025, 12, 5)), Some(t(13, 30)))
    );
    assert_eq!(parse_datetime("2025-12-05T00:00:00+01:00", today()), (Some(d(2025, 12, 5)), None));
    assert_eq!(parse_datetime("2025-12-05", today()), (Some(d(2025, 12, 5)), None));
    assert_eq!(parse_datetime("December 5, 2025", today()), (Some(d(2025, 12, 5)), None));
}

#[test]
fn test_structured_events_graph_itemlist_and_sub_events() {
    let events = extract_structured(STRUCTURED_PAGE, "https://museum.org/calendar", today());
    let titles: Vec<&str> = events.iter().map(|e| e.title()).collect();
    assert_eq!(
        titles,
        vec!["Light Atlas", "Curator Talk", "Winter Festival", "Opening Night"]
    );

    let atlas = &events[0];
    assert_eq!(atlas.start_date(), Some(d(2025, 9, 20)));
    assert_eq!(atlas.end_date(), Some(d(2026, 2, 8)));
    assert_eq!(atlas.start_time(), None);
    assert_eq!(atlas.location(), Some("Gallery 4"));
    assert_eq!(atlas.image_url(), Some("https://museum.org/media/atlas.jpg"));
    assert_eq!(atlas.source_url(), "https://museum.org/exhibitions/light-atlas");
    assert_eq!(atlas.description(), Some("Paintings of weather and light"));
    assert_eq!(atlas.event_type(), EventType::Exhibition);
    assert_eq!(atlas.provenance(), Provenance::StructuredData);
    assert_eq!(atlas.confidence(), Confidence::High);

    let talk = &events[1];
    assert_eq!(talk.start_date(), Some(d(2025, 12, 5)));
    assert_eq!(talk.end_date(), None);
    assert_eq!(talk.start_time(), Some(t(13, 0)));
    assert_eq!(talk.end_time(), Some(t(14, 0)));
    assert_eq!(talk.location(), Some("1 Museum Way, Springfield"));
    assert_eq!(talk.event_type(), EventType::Talk);
    assert_eq!(talk.source_url(), "https://museum.org/calendar");

    let opening = &events[3];
    assert_eq!(opening.start_time(), Some(t(19, 0)));
    assert_eq!(opening.end_time(), Some(t(21, 0)));
}

#[test]
fn test_extract_drafts_prefers_structured_data() {
    let page = Url::parse("https://museum.org/calendar").unwrap();
    let drafts = extract_drafts(STRUCTURED_PAGE, &page, today());
    assert_eq!(drafts.len(), 4);
    assert!(drafts
        .iter()
        .all(|d| d.provenance == Provenance::StructuredData));
}

#[test]
fn test_element_cards() {
    let events = extract_from_markup(CARDS_PAGE, "https://museum.org/visit", today());
    assert_eq!(events.len(), 2, "{events:#?}");

    let tour = &events[0];
    assert_eq!(tour.title(), "Sculpture Garden Tour");
    assert_eq!(tour.start_date(), Some(d(2025, 12, 5)));
    assert_eq!(tour.start_time(), Some(t(13, 0)));
    assert_eq!(tour.end_time(), Some(t(14, 0)));
    assert_eq!(tour.source_url(), "https://museum.org/events/garden-tour");
    assert_eq!(
        tour.description(),
        Some("Walk the sculpture garden with a docent and hear how the collection grew.")
    );
    assert_eq!(tour.location(), Some("Sculpture Garden"));
    assert_eq!(tour.image_url(), Some("https://museum.org/media/garden-tour.jpg"));
    assert_eq!(tour.event_type(), EventType::Tour);
    assert_eq!(tour.provenance(), Provenance::Markup);

    let fair = &events[1];
    assert_eq!(fair.title(), "Print Fair");
    assert_eq!(fair.start_date(), Some(d(2025, 10, 3)));
    assert_eq!(fair.end_date(), Some(d(2025, 10, 5)));
    assert_eq!(fair.source_url(), "https://museum.org/events/print-fair");
    assert_eq!(fair.image_url(), None);
    assert_eq!(fair.event_type(), EventType::Event);
}

#[test]
fn test_first_matching_group_wins() {
    let html = r#"<html><body>
        <article><h2>About the Museum</h2><p>Founded in 1901 by a group of painters.</p></article>
        <div class="event-item"><h3>Gallery Talk</h3></div>
    </body></html>"#;
    let events = extract_from_markup(html, "https://museum.org/", today());
    let titles: Vec<&str> = events.iter().map(|e| e.title()).collect();
    assert_eq!(titles, vec!["Gallery Talk"]);
}

#[test]
fn test_group_without_titles_falls_through() {
    let html = r#"<html><body>
        <div class="event-card"><span>›</span></div>
        <article class="program"><h2>Family Day</h2></article>
    </body></html>"#;
    let events = extract_from_markup(html, "https://museum.org/", today());
    let titles: Vec<&str> = events.iter().map(|e| e.title()).collect();
    assert_eq!(titles, vec!["Family Day"]);
}

#[test]
fn test_candidates_are_capped() {
    let cards: String = (1..=150)
        .map(|i| format!(r#"<div class="event-card"><h3>Gallery Talk {i}</h3></div>"#))
        .collect();
    let html = format!("<html><body>{cards}</body></html>");
    let events = extract_from_markup(&html, "https://museum.org/", today());
    assert_eq!(events.len(), 100);
}

#[test]
fn test_listing_title_with_same_line_dates() {
    let events = extract_from_markup(LISTING_PAGE, "https://museum.org/exhibitions", today());
    assert_eq!(events.len(), 2, "{events:#?}");

    let atlas = &events[0];
    assert_eq!(atlas.title(), "Cynthia Daignault: Light Atlas");
    assert_eq!(atlas.start_date(), Some(d(2025, 9, 20)));
    assert_eq!(atlas.end_date(), Some(d(2026, 2, 8)));
    assert_eq!(
        atlas.source_url(),
        "https://museum.org/exhibitions/cynthia-daignault-light-atlas"
    );
    assert_eq!(atlas.event_type(), EventType::Exhibition);

    let rooms = &events[1];
    assert_eq!(rooms.title(), "Quiet Rooms");
    assert_eq!(rooms.end_date(), Some(d(2026, 3, 5)));
    // Only an end date: the run started by the discovery date.
    assert_eq!(rooms.start_date(), Some(today()));
}

#[test]
fn test_listing_slug_title_fallback() {
    let html = r#"<html><body><ul>
        <li><a href="/programs/family-day-2025/"><img src="/media/family.jpg"></a></li>
    </ul></body></html>"#;
    let events = extract_from_markup(html, "https://museum.org/programs", today());
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].title(), "Family Day");
    assert_eq!(events[0].image_url(), Some("https://museum.org/media/family.jpg"));
}

#[test]
fn test_listing_falls_back_to_elements() {
    let html = r#"<html><body>
        <div class="exhibition-card"><h3>Permanent Collection Highlights</h3>
        <p>Selected works from four centuries of painting and sculpture.</p></div>
    </body></html>"#;
    let events = extract_from_markup(html, "https://museum.org/exhibitions", today());
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].title(), "Permanent Collection Highlights");
}

#[test]
fn test_enrichment_fills_only_missing_fields() {
    let mut draft = EventDraft::new("Print Fair", Provenance::Markup);
    draft.link = Some("https://museum.org/events/print-fair".into());
    draft.start_date = Some(d(2025, 10, 3));
    assert!(needs_enrichment(&draft, "https://museum.org/events"));

    let detail = r#"<html><head>
        <meta property="og:description" content="Forty printmakers sell editions in the courtyard.">
        <meta property="og:image" content="/media/print-fair.jpg">
    </head><body>
        <h1>Print Fair</h1>
        <div class="event-date">October 4, 2025</div>
        <div class="venue">Courtyard</div>
    </body></html>"#;
    let url = Url::parse("https://museum.org/events/print-fair").unwrap();
    enrich_draft(&mut draft, detail, &url, today());

    assert_eq!(draft.start_date, Some(d(2025, 10, 3)));
    assert_eq!(
        draft.description.as_deref(),
        Some("Forty printmakers sell editions in the courtyard.")
    );
    assert_eq!(
        draft.image_url.as_deref(),
        Some("https://museum.org/media/print-fair.jpg")
    );
    assert_eq!(draft.location.as_deref(), Some("Courtyard"));
    assert!(!needs_enrichment(&draft, "https://museum.org/events"));
}

#[test]
fn test_enrichment_needs_a_distinct_link() {
    let mut draft = EventDraft::new("Print Fair", Provenance::Markup);
    assert!(!needs_enrichment(&draft, "https://museum.org/events"));
    draft.link = Some("https://museum.org/events/".into());
    assert!(!needs_enrichment(&draft, "https://museum.org/events"));
    draft.link = Some("https://tickets.example.com/print-fair".into());
    assert!(!needs_enrichment(&draft, "https://museum.org/events"));
}
