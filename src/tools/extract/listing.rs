//! Listing-page extraction: one event per detail link.

use chrono::NaiveDate;
use scraper::{ElementRef, Html};
use url::Url;

use super::fields::*;
use crate::selectors::{HEADING_SELECTOR, LINK_SELECTOR};
use crate::tools::clean::{clean, clean_title, split_title_and_dates, CleanTitle};
use crate::tools::dates::parse_schedule_from;
use crate::tools::map::{normalize_text, resolve_href};
use crate::tools::validate::is_valid_title;
use crate::types::{Domain, EventDraft, Provenance};

/// Path keywords that switch a page into listing mode.
const LISTING_PATH_KEYWORDS: &[&str] = &["exhibition", "program", "whats-on", "on-view"];

/// Href keywords of links that lead to one event.
const DETAIL_KEYWORDS: &[&str] = &[
    "exhibition",
    "event",
    "program",
    "tour",
    "talk",
    "lecture",
    "workshop",
    "show",
    "whats-on",
    "on-view",
];

/// Ancestor levels searched for an item container.
const CONTAINER_DEPTH: usize = 4;

pub(crate) fn is_listing_page(page: &Url) -> bool {
    let path = page.path().to_ascii_lowercase();
    LISTING_PATH_KEYWORDS.iter().any(|k| path.contains(k))
}

/// Detail links in document order, anchors to the same URL grouped together.
fn detail_links<'a>(doc: &'a Html, page: &Url) -> Vec<(Url, Vec<ElementRef<'a>>)> {
    let page_path = page.path().trim_end_matches('/').to_string();
    let page_domain = Domain::from_url(page);
    let mut groups: Vec<(Url, Vec<ElementRef<'a>>)> = Vec::new();

    for anchor in doc.select(&LINK_SELECTOR) {
        if in_chrome(&anchor) {
            continue;
        }
        let Some(mut url) = anchor
            .value()
            .attr("href")
            .and_then(|href| resolve_href(href, page))
        else {
            continue;
        };
        url.set_fragment(None);

        let same_site = match (&page_domain, Domain::from_url(&url)) {
            (Some(site), Some(other)) => site.contains(&other),
            _ => false,
        };
        let path = url.path().to_ascii_lowercase();
        let trimmed = path.trim_end_matches('/');
        if !same_site
            || trimmed.is_empty()
            || trimmed == page_path.to_ascii_lowercase()
            || !DETAIL_KEYWORDS.iter().any(|k| path.contains(k))
        {
            continue;
        }

        match groups.iter_mut().find(|(seen, _)| *seen == url) {
            Some((_, anchors)) => anchors.push(anchor),
            None => groups.push((url, vec![anchor])),
        }
    }
    groups
}

/// Closest list item, article or row; otherwise the closest block with more text than the link.
fn container_of(anchor: ElementRef) -> ElementRef {
    let anchor_len = text_of(&anchor).len();
    let mut block = None;
    for el in anchor
        .ancestors()
        .filter_map(ElementRef::wrap)
        .take(CONTAINER_DEPTH)
    {
        match el.value().name() {
            "li" | "article" | "tr" => return el,
            "div" | "section" | "p" if block.is_none() && text_of(&el).len() > anchor_len => {
                block = Some(el)
            }
            _ => {}
        }
    }
    block.unwrap_or(anchor)
}

/// Title from the slug: `/exhibitions/light-atlas/` → "Light Atlas".
pub(crate) fn title_from_slug(url: &Url) -> Option<String> {
    let slug = url
        .path_segments()?
        .filter(|segment| !segment.is_empty())
        .last()?;
    let words: Vec<String> = slug
        .split(['-', '_'])
        .filter(|w| !w.is_empty() && !w.chars().all(|c| c.is_ascii_digit()))
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect();
    let title = words.join(" ");
    is_valid_title(&title).then_some(title)
}

fn draft_for_link(
    url: &Url,
    anchors: &[ElementRef],
    page: &Url,
    today: NaiveDate,
) -> Option<EventDraft> {
    let container = container_of(anchors[0]);

    // Link text, possibly with dates on the same line.
    let mut title: Option<CleanTitle> = None;
    let mut date_text: Option<String> = None;
    for anchor in anchors {
        let (raw_title, dates) = split_title_and_dates(&text_of(anchor));
        let cleaned = clean_title(&raw_title, today);
        if is_valid_title(&cleaned.title) {
            title = Some(cleaned);
            date_text = dates;
            break;
        }
    }

    let title = title
        .or_else(|| {
            container
                .select(&HEADING_SELECTOR)
                .map(|h| clean_title(&h.text().collect::<String>(), today))
                .find(|c| is_valid_title(&c.title))
        })
        .or_else(|| {
            title_from_slug(url).map(|title| CleanTitle {
                title,
                end_date: None,
            })
        })?;

    let mut draft = EventDraft::new(title.title.clone(), Provenance::Markup);
    let schedule = date_text
        .and_then(|text| parse_schedule_from(&text, today))
        .or_else(|| same_line_dates(&container, &title.title, today))
        .or_else(|| schedule_of(&container, today, false))
        .or_else(|| {
            let text = text_of(&container).replace(&title.title, " ");
            parse_schedule_from(&text, today)
        });
    if let Some(schedule) = schedule {
        apply_schedule(&mut draft, schedule);
    }
    if draft.end_date.is_none() {
        draft.end_date = title.end_date;
    }

    draft.link = Some(url.to_string());
    draft.description = description_of(&container, &draft.title);
    draft.location = location_of(&container);
    draft.image_url = image_of(&container, page, None);
    draft.event_type = event_type_of(&draft.title, &text_of(&container), Some(url.path()), page);
    Some(draft)
}

/// Dates trailing the title inside the same text node.
fn same_line_dates(
    container: &ElementRef,
    title: &str,
    today: NaiveDate,
) -> Option<crate::tools::dates::Schedule> {
    let needle = normalize_text(title);
    container
        .text()
        .map(clean)
        .filter(|line| normalize_text(line).contains(&needle))
        .find_map(|line| {
            let (_, dates) = split_title_and_dates(&line);
            dates.and_then(|d| parse_schedule_from(&d, today))
        })
}

/// One draft per distinct detail link on a listing page.
pub(crate) fn listing_drafts(doc: &Html, page: &Url, today: NaiveDate) -> Vec<EventDraft> {
    detail_links(doc, page)
        .iter()
        .filter_map(|(url, anchors)| draft_for_link(url, anchors, page, today))
        .collect()
}
