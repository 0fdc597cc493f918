//! Field extraction from one event container.

use chrono::NaiveDate;
use scraper::ElementRef;
use url::Url;

use super::structured::parse_datetime;
use crate::selectors::{
    DATE_CLASS_SELECTOR, DESCRIPTION_SELECTOR, HEADING_SELECTOR, HERO_IMG_SELECTOR,
    IMG_SELECTOR, LINK_SELECTOR, LOCATION_SELECTOR, TIME_SELECTOR, TITLE_CLASS_SELECTOR,
};
use crate::tools::clean::{clean, clean_title, CleanTitle};
use crate::tools::dates::{contains_date, parse_schedule_from, DateRange, Schedule};
use crate::tools::map::resolve_href;
use crate::tools::validate::{is_valid_title, MIN_DESCRIPTION_LEN};
use crate::types::{EventDraft, EventType};

const MAX_LOCATION_LEN: usize = 160;
const MIN_IMAGE_SIDE: u32 = 50;

const IMAGE_KEYWORDS: &[&str] = &["event", "exhibition", "program", "tour", "hero", "featured"];
const ICON_HINTS: &[&str] = &[
    "icon", "logo", "sprite", "avatar", "placeholder", "spacer", "pixel", "badge",
];
const IMAGE_SRC_ATTRS: &[&str] = &["src", "data-src", "data-lazy-src", "data-original"];

/// Classes of calendar widgets whose cells look like events.
const WIDGET_CLASS_HINTS: &[&str] = &[
    "calendar-widget",
    "widget_calendar",
    "datepicker",
    "mini-cal",
    "minical",
    "fc-",
    "tribe-events-c-",
    "date-picker",
];

/// Text of an element with text nodes joined by spaces, then cleaned.
pub(crate) fn text_of(el: &ElementRef) -> String {
    clean(&el.text().collect::<Vec<_>>().join(" "))
}

/// Inside site navigation or a calendar widget.
pub(crate) fn in_chrome(el: &ElementRef) -> bool {
    std::iter::once(*el)
        .chain(el.ancestors().filter_map(ElementRef::wrap))
        .any(|node| {
            let value = node.value();
            if matches!(value.name(), "nav" | "header" | "footer") {
                return true;
            }
            if value.attr("role") == Some("navigation") {
                return true;
            }
            value.classes().any(|class| {
                let class = class.to_ascii_lowercase();
                WIDGET_CLASS_HINTS.iter().any(|hint| class.contains(hint))
            })
        })
}

fn valid_title(raw: &str, today: NaiveDate) -> Option<CleanTitle> {
    let cleaned = clean_title(raw, today);
    is_valid_title(&cleaned.title).then_some(cleaned)
}

/// Heading, then class-tagged title, then link text.
pub(crate) fn title_of(el: &ElementRef, today: NaiveDate) -> Option<CleanTitle> {
    let headings = el
        .select(&HEADING_SELECTOR)
        .map(|h| h.text().collect::<String>());
    let tagged = el
        .select(&TITLE_CLASS_SELECTOR)
        .map(|t| t.text().collect::<String>());
    let links = el
        .select(&LINK_SELECTOR)
        .map(|a| a.text().collect::<String>());

    headings
        .chain(tagged)
        .chain(links)
        .find_map(|raw| valid_title(&raw, today))
}

/// Longest paragraph-like text that is not the title or a bare date.
pub(crate) fn description_of(el: &ElementRef, title: &str) -> Option<String> {
    el.select(&DESCRIPTION_SELECTOR)
        .map(|d| text_of(&d))
        .filter(|text| text.chars().count() >= MIN_DESCRIPTION_LEN)
        .filter(|text| text != title && !title.contains(text.as_str()))
        .filter(|text| !(contains_date(text) && text.chars().count() < 60))
        .max_by_key(|text| text.chars().count())
}

/// Dates and times from `<time datetime>` first, then date-classed text,
/// then (when `scan_text` is set) the whole container.
pub(crate) fn schedule_of(el: &ElementRef, today: NaiveDate, scan_text: bool) -> Option<Schedule> {
    let stamps: Vec<_> = el
        .select(&TIME_SELECTOR)
        .filter_map(|t| t.value().attr("datetime"))
        .map(|raw| parse_datetime(raw, today))
        .filter(|(date, _)| date.is_some())
        .collect();

    let classed = || {
        el.select(&DATE_CLASS_SELECTOR)
            .find_map(|d| parse_schedule_from(&text_of(&d), today))
    };

    if let Some(&(Some(start), start_time)) = stamps.first() {
        let (end, end_time) = stamps.get(1).copied().unwrap_or((None, None));
        let dates = match end {
            Some(end) if end > start => DateRange::between(start, end),
            _ => DateRange::single(start),
        };
        let mut schedule = Schedule {
            dates: Some(dates),
            start_time,
            end_time: if dates.is_multi_day() { None } else { end_time },
        };
        if schedule.start_time.is_none() {
            if let Some(text_times) = classed() {
                schedule.start_time = text_times.start_time;
                schedule.end_time = text_times.end_time;
            }
        }
        return Some(schedule);
    }

    classed().or_else(|| {
        scan_text
            .then(|| parse_schedule_from(&text_of(el), today))
            .flatten()
    })
}

pub(crate) fn location_of(el: &ElementRef) -> Option<String> {
    el.select(&LOCATION_SELECTOR)
        .map(|l| text_of(&l))
        .find(|text| {
            let len = text.chars().count();
            (3..=MAX_LOCATION_LEN).contains(&len) && !contains_date(text)
        })
}

fn image_src(img: &ElementRef, base: &Url) -> Option<String> {
    let value = img.value();
    let raw = IMAGE_SRC_ATTRS
        .iter()
        .find_map(|attr| value.attr(attr).filter(|v| !v.trim().is_empty()))
        .or_else(|| {
            value
                .attr("srcset")
                .and_then(|set| set.split(',').next())
                .and_then(|first| first.split_whitespace().next())
        })?;
    if raw.trim_start().starts_with("data:") {
        return None;
    }
    resolve_href(raw, base).map(String::from)
}

fn is_icon(img: &ElementRef, src: &str) -> bool {
    let lower = src.to_ascii_lowercase();
    let path = lower.split(['?', '#']).next().unwrap_or(&lower);
    if path.ends_with(".svg") || path.ends_with(".gif") || path.ends_with(".ico") {
        return true;
    }
    if ICON_HINTS.iter().any(|hint| lower.contains(hint)) {
        return true;
    }
    ["width", "height"].iter().any(|attr| {
        img.value()
            .attr(attr)
            .and_then(|v| v.trim_end_matches("px").parse::<u32>().ok())
            .is_some_and(|side| side < MIN_IMAGE_SIDE)
    })
}

/// Hero image, then keyword-named image, then the first real photo, then `og:image`.
pub(crate) fn image_of(el: &ElementRef, base: &Url, og_image: Option<&str>) -> Option<String> {
    let usable = |img: ElementRef| image_src(&img, base).filter(|src| !is_icon(&img, src));

    el.select(&HERO_IMG_SELECTOR)
        .find_map(usable)
        .or_else(|| {
            el.select(&IMG_SELECTOR).find_map(|img| {
                usable(img).filter(|src| {
                    let lower = src.to_ascii_lowercase();
                    IMAGE_KEYWORDS.iter().any(|k| lower.contains(k))
                })
            })
        })
        .or_else(|| {
            el.select(&IMG_SELECTOR)
                .filter(|img| !in_chrome(img))
                .find_map(usable)
        })
        .or_else(|| og_image.and_then(|src| resolve_href(src, base)).map(String::from))
}

/// Title words, then the container text, then URL keywords.
pub(crate) fn event_type_of(
    title: &str,
    text: &str,
    link: Option<&str>,
    page: &Url,
) -> Option<EventType> {
    EventType::infer(title)
        .or_else(|| EventType::infer(text))
        .or_else(|| link.and_then(EventType::infer))
        .or_else(|| EventType::infer(page.path()))
}

/// Copy a parsed schedule onto a draft.
pub(crate) fn apply_schedule(draft: &mut EventDraft, schedule: Schedule) {
    draft.start_date = schedule.start_date();
    draft.end_date = schedule.end_date();
    draft.start_time = schedule.start_time;
    draft.end_time = schedule.end_time;
}
