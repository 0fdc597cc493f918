//! Date Range Parser
//!
//! Turns the free-form date and time text found on venue pages into
//! concrete dates and same-day times.
//!
//! ```rust
//! use chrono::NaiveDate;
//! use venue_scout::tools::dates::parse_range_from;
//!
//! let today = NaiveDate::from_ymd_opt(2025, 9, 1).unwrap();
//! let range = parse_range_from("September 20, 2025 – February 8, 2026", today).unwrap();
//! assert_eq!(range.start, NaiveDate::from_ymd_opt(2025, 9, 20));
//! assert_eq!(range.end, NaiveDate::from_ymd_opt(2026, 2, 8));
//! ```

mod types;
mod utils;

pub use types::{DateRange, Schedule, DEFAULT_DURATION_HOURS, LONG_FORM_DURATION_HOURS};

pub(crate) use utils::{contains_date, strip_times, COMBINED_RE, DATE_EXPR, MONTH, RANGE_EXPR};

use chrono::{Local, NaiveDate, NaiveTime};

/// Keywords marking festival-length events that default to a longer duration.
const LONG_FORM_KEYWORDS: &[&str] = &[
    "festival",
    "workshop",
    "conference",
    "fair",
    "symposium",
    "camp",
    "retreat",
];

/// Parse a date or date range relative to today.
pub fn parse_range(text: &str) -> Option<DateRange> {
    parse_range_from(text, Local::now().date_naive())
}

/// Parse a date or date range; yearless dates resolve against `reference`.
pub fn parse_range_from(text: &str, reference: NaiveDate) -> Option<DateRange> {
    utils::parse_range(text, reference)
}

/// Parse exactly one date relative to today.
pub fn parse_single_date(text: &str) -> Option<NaiveDate> {
    parse_single_date_from(text, Local::now().date_naive())
}

/// Parse exactly one date. Explicit formats win, then a looser scan.
pub fn parse_single_date_from(text: &str, reference: NaiveDate) -> Option<NaiveDate> {
    utils::parse_single(text, reference)
}

/// Parse the first time or time range; a start without am/pm borrows the end's.
pub fn parse_time_span(text: &str) -> Option<(NaiveTime, Option<NaiveTime>)> {
    utils::parse_times(text)
}

/// Parse dates and times together relative to today.
pub fn parse_schedule(text: &str) -> Option<Schedule> {
    parse_schedule_from(text, Local::now().date_naive())
}

/// Parse dates and times together.
///
/// A date immediately followed by a time is matched as one unit first. A
/// true multi-day range elsewhere in the text still supplies the dates.
pub fn parse_schedule_from(text: &str, reference: NaiveDate) -> Option<Schedule> {
    let range = parse_range_from(text, reference);

    if let Some(caps) = COMBINED_RE.captures(text) {
        let date = caps
            .name("date")
            .and_then(|m| parse_single_date_from(m.as_str(), reference));
        let times = caps.name("time").and_then(|m| utils::parse_times(m.as_str()));
        let dates = match range {
            Some(r) if r.is_multi_day() => Some(r),
            _ => date.map(DateRange::single).or(range),
        };
        let schedule = Schedule {
            dates,
            start_time: times.map(|t| t.0),
            end_time: times.and_then(|t| t.1),
        };
        if !schedule.is_empty() {
            return Some(schedule);
        }
    }

    let times = utils::parse_times(text);
    let schedule = Schedule {
        dates: range,
        start_time: times.map(|t| t.0),
        end_time: times.and_then(|t| t.1),
    };
    (!schedule.is_empty()).then_some(schedule)
}

/// True when the text names a festival-length event.
pub fn is_long_form(text: &str) -> bool {
    let lower = text.to_lowercase();
    lower
        .split(|c: char| !c.is_alphanumeric())
        .any(|word| LONG_FORM_KEYWORDS.iter().any(|k| word == *k || word == format!("{k}s")))
}
