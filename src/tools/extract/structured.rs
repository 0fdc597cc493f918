//! schema.org `*Event` objects from JSON-LD.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde_json::Value;
use url::Url;

use crate::tools::clean::{clean, clean_markup, clean_title};
use crate::tools::dates::parse_single_date_from;
use crate::tools::map::resolve_href;
use crate::types::{EventDraft, EventType, Provenance};

/// Keys under which events hide inside other objects.
const NESTING_KEYS: &[&str] = &["subEvent", "subEvents", "itemListElement", "item", "event", "events"];

const DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"];

fn type_names(value: &Value) -> Vec<&str> {
    match value.get("@type") {
        Some(Value::String(s)) => vec![s.as_str()],
        Some(Value::Array(arr)) => arr.iter().filter_map(Value::as_str).collect(),
        _ => Vec::new(),
    }
}

/// `Event` itself or any schema.org subtype (`ExhibitionEvent`, `TheaterEvent`, ...).
pub(crate) fn is_event_type(value: &Value) -> bool {
    type_names(value).iter().any(|t| {
        let t = t.rsplit(['/', ':']).next().unwrap_or(t);
        t.ends_with("Event")
    })
}

/// Walk a JSON-LD value and collect every event object, nested ones included.
pub(crate) fn collect_events<'a>(value: &'a Value, out: &mut Vec<&'a Value>) {
    match value {
        Value::Array(arr) => arr.iter().for_each(|v| collect_events(v, out)),
        Value::Object(obj) => {
            if is_event_type(value) {
                out.push(value);
            }
            for key in NESTING_KEYS {
                if let Some(nested) = obj.get(*key) {
                    collect_events(nested, out);
                }
            }
        }
        _ => {}
    }
}

fn text_field(value: &Value, key: &str) -> Option<String> {
    let raw = match value.get(key)? {
        Value::String(s) => s.clone(),
        Value::Array(arr) => arr.iter().find_map(Value::as_str)?.to_string(),
        _ => return None,
    };
    let cleaned = clean(&raw);
    (!cleaned.is_empty()).then_some(cleaned)
}

/// ISO-8601 date-time with the offset stripped. Midnight means "no time".
pub(crate) fn parse_datetime(raw: &str, today: NaiveDate) -> (Option<NaiveDate>, Option<NaiveTime>) {
    let raw = raw.trim();
    // Drop a trailing `Z`, `+hh:mm` or `-hh:mm` offset.
    let local = match raw.find('T') {
        Some(t) => {
            let (date, time) = raw.split_at(t);
            let end = time[1..]
                .find(|c: char| c == 'Z' || c == '+' || c == '-')
                .map(|i| i + 1)
                .unwrap_or(time.len());
            let time = &time[..end];
            // Fractional seconds.
            let time = time.split('.').next().unwrap_or(time);
            format!("{date}{time}")
        }
        None => raw.to_string(),
    };

    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(&local, format) {
            let time = dt.time();
            let time = (time != NaiveTime::MIN).then_some(time);
            return (Some(dt.date()), time);
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(&local, "%Y-%m-%d") {
        return (Some(date), None);
    }
    (parse_single_date_from(raw, today), None)
}

fn location_of(value: &Value) -> Option<String> {
    match value.get("location")? {
        Value::String(s) => Some(clean(s)).filter(|s| !s.is_empty()),
        Value::Array(arr) => arr.iter().find_map(|v| place_text(v)),
        place @ Value::Object(_) => place_text(place),
        _ => None,
    }
}

fn place_text(place: &Value) -> Option<String> {
    if let Some(name) = text_field(place, "name") {
        return Some(name);
    }
    match place.get("address")? {
        Value::String(s) => Some(clean(s)).filter(|s| !s.is_empty()),
        address @ Value::Object(_) => {
            let parts: Vec<String> = ["streetAddress", "addressLocality", "addressRegion"]
                .iter()
                .filter_map(|key| text_field(address, key))
                .collect();
            (!parts.is_empty()).then(|| parts.join(", "))
        }
        _ => None,
    }
}

fn image_of(value: &Value) -> Option<String> {
    fn from(value: &Value) -> Option<String> {
        match value {
            Value::String(s) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
            Value::Array(arr) => arr.iter().find_map(from),
            Value::Object(obj) => obj
                .get("url")
                .or_else(|| obj.get("contentUrl"))
                .and_then(from),
            _ => None,
        }
    }
    from(value.get("image")?)
}

/// `ExhibitionEvent` and friends say more than the name does.
fn schema_event_type(value: &Value) -> Option<EventType> {
    type_names(value).iter().find_map(|t| match *t {
        "ExhibitionEvent" | "VisualArtsEvent" => Some(EventType::Exhibition),
        "EducationEvent" => Some(EventType::Workshop),
        _ => None,
    })
}

/// Convert one JSON-LD event object into a draft.
pub(crate) fn draft_from_jsonld(value: &Value, page: &Url, today: NaiveDate) -> Option<EventDraft> {
    let name = text_field(value, "name")?;
    let cleaned = clean_title(&name, today);
    if cleaned.title.is_empty() {
        return None;
    }

    let mut draft = EventDraft::new(cleaned.title, Provenance::StructuredData);
    draft.description = value
        .get("description")
        .and_then(Value::as_str)
        .map(clean_markup)
        .filter(|d| !d.is_empty());

    if let Some(start) = value.get("startDate").and_then(Value::as_str) {
        let (date, time) = parse_datetime(start, today);
        draft.start_date = date;
        draft.start_time = time;
    }
    if let Some(end) = value.get("endDate").and_then(Value::as_str) {
        let (date, time) = parse_datetime(end, today);
        draft.end_date = date;
        draft.end_time = time;
    }
    if draft.end_date.is_none() {
        draft.end_date = cleaned.end_date;
    }
    // Same-day end only; a multi-day end time belongs to the last day.
    if draft.end_date.is_some() && draft.end_date != draft.start_date {
        draft.end_time = None;
    }
    if draft.end_date == draft.start_date {
        draft.end_date = None;
    }

    draft.location = location_of(value);
    draft.image_url = image_of(value).and_then(|src| resolve_href(&src, page).map(String::from));
    draft.link = value
        .get("url")
        .and_then(Value::as_str)
        .and_then(|href| resolve_href(href, page))
        .map(String::from);
    draft.event_type = schema_event_type(value)
        .or_else(|| EventType::infer(&draft.title))
        .or_else(|| draft.link.as_deref().and_then(EventType::infer))
        .or_else(|| EventType::infer(page.path()));
    Some(draft)
}

/// Drafts for every event in a page's JSON-LD blocks.
pub(crate) fn drafts_from_jsonld(blocks: &[Value], page: &Url, today: NaiveDate) -> Vec<EventDraft> {
    let mut events = Vec::new();
    for block in blocks {
        collect_events(block, &mut events);
    }
    events
        .into_iter()
        .filter_map(|value| draft_from_jsonld(value, page, today))
        .collect()
}
