use chrono::{Datelike, Duration, NaiveDate, NaiveTime};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use super::types::DateRange;

/// Month names and abbreviations, including "Sept".
pub(crate) const MONTH: &str = r"(?:jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|may|june?|july?|aug(?:ust)?|sep(?:t(?:ember)?)?|oct(?:ober)?|nov(?:ember)?|dec(?:ember)?)";

const DAY_NAME: &str = r"(?:mon(?:day)?|tue(?:s|sday)?|wed(?:nesday)?|thu(?:r|rs|rsday)?|fri(?:day)?|sat(?:urday)?|sun(?:day)?)";

const ORDINAL: &str = r"(?:st|nd|rd|th)?";

const RANGE_SEP: &str = r"(?:–|—|-|\bto\b|\bthrough\b|\bthru\b|\buntil\b)";

const MERIDIEM: &str = r"([ap])\.?\s?m\b\.?";

/// Any single date expression, non-capturing.
pub(crate) static DATE_EXPR: Lazy<String> = Lazy::new(|| {
    format!(
        r"(?:\b{m}\b\.?\s+\d{{1,2}}{o}\b(?:,?\s*\d{{4}}\b)?|\b\d{{1,2}}{o}\s+(?:of\s+)?{m}\b\.?(?:,?\s*\d{{4}}\b)?|\b\d{{4}}-\d{{1,2}}-\d{{1,2}}\b|\b\d{{1,2}}/\d{{1,2}}/\d{{2,4}}\b|\b{m}\b\.?,?\s+\d{{4}}\b)",
        m = MONTH,
        o = ORDINAL
    )
});

/// A date optionally followed by a separator and a second date or bare day.
pub(crate) static RANGE_EXPR: Lazy<String> = Lazy::new(|| {
    format!(
        r"(?:{d}(?:\s*{s}\s*(?:{d}|\d{{1,2}}{o}\b(?:,?\s*\d{{4}}\b)?))?)",
        d = DATE_EXPR.as_str(),
        s = RANGE_SEP,
        o = ORDINAL
    )
});

static PARTS_RE: Lazy<Regex> = Lazy::new(|| {
    let pattern = format!(
        r"(?i)(?P<iso>\b(?P<iy>\d{{4}})-(?P<im>\d{{1,2}})-(?P<id>\d{{1,2}})\b)|(?P<us>\b(?P<um>\d{{1,2}})/(?P<ud>\d{{1,2}})/(?P<uy>\d{{2,4}})\b)|(?P<mdy>\b(?P<m1>{m})\b\.?\s+(?P<d1>\d{{1,2}}){o}\b(?:,?\s*(?P<y1>\d{{4}})\b)?)|(?P<dmy>\b(?P<d2>\d{{1,2}}){o}\s+(?:of\s+)?(?P<m2>{m})\b\.?(?:,?\s*(?P<y2>\d{{4}})\b)?)|(?P<my>\b(?P<m3>{m})\b\.?,?\s+(?P<y3>\d{{4}})\b)",
        m = MONTH,
        o = ORDINAL
    );
    Regex::new(&pattern).expect("valid date parts regex")
});

static BARE_DAY_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(\d{1,2})(?:st|nd|rd|th)?\b(?:,?\s*(\d{4})\b)?").expect("valid bare day regex")
});

static BARE_DAY_SUFFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:^|[^\d/:-])\b(\d{1,2})(?:st|nd|rd|th)?\s*$").expect("valid bare day regex")
});

static MONTH_SUFFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"(?i)\b({MONTH})\b\.?\s*$")).expect("valid month suffix regex")
});

static ISO_DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(\d{4})-(\d{2})-(\d{2})\b").expect("valid iso regex"));

static BARE_YEAR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{4}$").expect("valid year regex"));

static WORD_SEP_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:to|through|thru|until)\b").expect("valid word separator regex")
});

static WEEKDAY_PREFIX_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"(?i)^\s*{DAY_NAME}\b\.?,?\s*")).expect("valid weekday regex")
});

static ORDINAL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(\d)(?:st|nd|rd|th)\b").expect("valid ordinal regex"));

static SEPT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bsept\b").expect("valid sept regex"));

static ABBREV_DOT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b([A-Za-z]{3,4})\.").expect("valid abbreviation regex"));

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));

pub(crate) static TIME_RANGE_RE: Lazy<Regex> = Lazy::new(|| {
    let pattern = format!(
        r"(?i)\b(?P<sh>\d{{1,2}})(?::(?P<sm>\d{{2}}))?\s*(?:{mer_s})?\s*(?:–|—|-|\bto\b|\buntil\b)\s*(?P<eh>\d{{1,2}})(?::(?P<em>\d{{2}}))?\s*{mer_e}",
        mer_s = MERIDIEM.replace("([ap])", "(?P<sp>[ap])"),
        mer_e = MERIDIEM.replace("([ap])", "(?P<ep>[ap])")
    );
    Regex::new(&pattern).expect("valid time range regex")
});

static TIME_RANGE_24_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b([01]?\d|2[0-3]):([0-5]\d)\s*(?:–|—|-|to)\s*([01]?\d|2[0-3]):([0-5]\d)\b")
        .expect("valid 24h time range regex")
});

pub(crate) static SINGLE_TIME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"(?i)\b(\d{{1,2}})(?::(\d{{2}}))?\s*{MERIDIEM}"))
        .expect("valid time regex")
});

static TIME_24_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b([01]?\d|2[0-3]):([0-5]\d)\b").expect("valid 24h time regex")
});

static NOON_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(noon|midnight)\b").expect("valid noon regex"));

/// A single date immediately followed by a time or time range.
pub(crate) static COMBINED_RE: Lazy<Regex> = Lazy::new(|| {
    let time_range = TIME_RANGE_RE.as_str().trim_start_matches("(?i)");
    let single = SINGLE_TIME_RE.as_str().trim_start_matches("(?i)");
    let pattern = format!(
        r"(?i)(?P<date>{d})\s*(?:[,|@·•]|\bat\b|\bfrom\b)?\s*(?:[,|@·•]\s*)?(?P<time>{time_range}|{single}|\b(?:[01]?\d|2[0-3]):[0-5]\d\b|\bnoon\b)",
        d = DATE_EXPR.as_str()
    );
    Regex::new(&pattern).expect("valid combined regex")
});

const EXPLICIT_FORMATS: &[&str] = &[
    "%B %d, %Y",
    "%B %d %Y",
    "%b %d, %Y",
    "%b %d %Y",
    "%d %B %Y",
    "%d %b %Y",
    "%d %B, %Y",
    "%Y-%m-%d",
    "%m/%d/%Y",
];

/// Yearless dates this far behind the reference roll into the next year.
const ROLLOVER_DAYS: i64 = 90;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(super) struct DateParts {
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub day: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Pick {
    First,
    Last,
}

pub(super) fn month_number(name: &str) -> Option<u32> {
    let lower = name.trim_end_matches('.').to_ascii_lowercase();
    let key = lower.get(..3)?;
    let month = match key {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => return None,
    };
    Some(month)
}

fn number<T: std::str::FromStr>(caps: &Captures<'_>, name: &str) -> Option<T> {
    caps.name(name).and_then(|m| m.as_str().parse().ok())
}

fn group<T: std::str::FromStr>(caps: &Captures<'_>, idx: usize) -> Option<T> {
    caps.get(idx).and_then(|m| m.as_str().parse().ok())
}

fn expand_year(year: i32) -> i32 {
    if year < 100 {
        2000 + year
    } else {
        year
    }
}

fn parts_from(caps: &Captures<'_>) -> DateParts {
    if caps.name("iso").is_some() {
        return DateParts {
            year: number(caps, "iy"),
            month: number(caps, "im"),
            day: number(caps, "id"),
        };
    }
    if caps.name("us").is_some() {
        return DateParts {
            year: number::<i32>(caps, "uy").map(expand_year),
            month: number(caps, "um"),
            day: number(caps, "ud"),
        };
    }
    if caps.name("mdy").is_some() {
        return DateParts {
            year: number(caps, "y1"),
            month: caps.name("m1").and_then(|m| month_number(m.as_str())),
            day: number(caps, "d1"),
        };
    }
    if caps.name("dmy").is_some() {
        return DateParts {
            year: number(caps, "y2"),
            month: caps.name("m2").and_then(|m| month_number(m.as_str())),
            day: number(caps, "d2"),
        };
    }
    DateParts {
        year: number(caps, "y3"),
        month: caps.name("m3").and_then(|m| month_number(m.as_str())),
        day: None,
    }
}

/// Locate a date expression in free text.
pub(super) fn find_parts(text: &str, pick: Pick) -> Option<DateParts> {
    let mut found = PARTS_RE.captures_iter(text).map(|caps| parts_from(&caps));
    match pick {
        Pick::First => found.next(),
        Pick::Last => found.last(),
    }
}

fn bare_day_prefix(text: &str) -> Option<DateParts> {
    let caps = BARE_DAY_PREFIX.captures(text)?;
    Some(DateParts {
        year: group(&caps, 2),
        month: None,
        day: group(&caps, 1),
    })
}

fn bare_day_suffix(text: &str) -> Option<DateParts> {
    let caps = BARE_DAY_SUFFIX.captures(text)?;
    Some(DateParts {
        year: None,
        month: None,
        day: group(&caps, 1),
    })
}

fn month_suffix(text: &str) -> Option<DateParts> {
    let caps = MONTH_SUFFIX.captures(text)?;
    Some(DateParts {
        year: None,
        month: month_number(caps.get(1)?.as_str()),
        day: None,
    })
}

fn last_day_of_month(year: i32, month: u32) -> Option<u32> {
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some((next - Duration::days(1)).day())
}

/// Yearless dates default to the reference year, rolling forward when long past.
fn roll_forward(date: NaiveDate, reference: NaiveDate) -> NaiveDate {
    if reference - date > Duration::days(ROLLOVER_DAYS) {
        date.with_year(date.year() + 1).unwrap_or(date)
    } else {
        date
    }
}

fn plausible(date: NaiveDate) -> Option<NaiveDate> {
    (1900..=2100).contains(&date.year()).then_some(date)
}

fn build_single(parts: DateParts, reference: NaiveDate) -> Option<NaiveDate> {
    let month = parts.month?;
    let day = parts.day.unwrap_or(1);
    match parts.year {
        Some(year) => plausible(NaiveDate::from_ymd_opt(year, month, day)?),
        None => {
            let date = NaiveDate::from_ymd_opt(reference.year(), month, day)?;
            Some(roll_forward(date, reference))
        }
    }
}

/// Merge both sides of a range; missing parts are borrowed from the other side.
pub(super) fn combine(start: DateParts, end: DateParts, reference: NaiveDate) -> Option<DateRange> {
    let start_month = start.month.or(end.month)?;
    let end_month = end.month.or(start.month)?;
    let start_year_given = start.year.is_some();
    let end_year_given = end.year.is_some();
    let default_year = reference.year();
    let start_year = start.year.or(end.year).unwrap_or(default_year);
    let end_year = end.year.or(start.year).unwrap_or(default_year);

    let end_day = match end.day {
        Some(day) => day,
        None => last_day_of_month(end_year, end_month)?,
    };
    let mut first = NaiveDate::from_ymd_opt(start_year, start_month, start.day.unwrap_or(1))?;
    let mut last = NaiveDate::from_ymd_opt(end_year, end_month, end_day)?;

    if first > last {
        if !start_year_given && end_year_given {
            first = first.with_year(first.year() - 1)?;
        } else if !end_year_given {
            last = last.with_year(last.year() + 1)?;
        }
    }
    if !start_year_given && !end_year_given && reference - last > Duration::days(ROLLOVER_DAYS) {
        first = first.with_year(first.year() + 1)?;
        last = last.with_year(last.year() + 1)?;
    }
    Some(DateRange::between(plausible(first)?, plausible(last)?))
}

/// Trim, drop weekday prefixes and ordinals, and canonicalize abbreviations.
pub(super) fn normalize_date_text(text: &str) -> String {
    let text = WHITESPACE_RE.replace_all(text.trim(), " ");
    let text = WEEKDAY_PREFIX_RE.replace(&text, "");
    let text = ORDINAL_RE.replace_all(&text, "$1");
    let text = SEPT_RE.replace_all(&text, "Sep");
    let text = ABBREV_DOT_RE.replace_all(&text, "$1");
    text.trim()
        .trim_matches(|c: char| matches!(c, ',' | '.' | ';' | '|' | ':' | '·' | '•') || c.is_whitespace())
        .to_string()
}

pub(super) fn parse_explicit(text: &str) -> Option<NaiveDate> {
    for fmt in EXPLICIT_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(text, fmt) {
            if let Some(date) = plausible(date) {
                return Some(date);
            }
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(&format!("1 {text}"), "%d %B %Y") {
        return plausible(date);
    }
    if BARE_YEAR_RE.is_match(text) {
        let year = text.parse().ok()?;
        return plausible(NaiveDate::from_ymd_opt(year, 1, 1)?);
    }
    None
}

pub(super) fn parse_single(text: &str, reference: NaiveDate) -> Option<NaiveDate> {
    let cleaned = normalize_date_text(text);
    if cleaned.is_empty() {
        return None;
    }
    parse_explicit(&cleaned)
        .or_else(|| find_parts(&cleaned, Pick::First).and_then(|p| build_single(p, reference)))
}

/// Byte offsets of every candidate separator with its width.
fn separator_positions(text: &str) -> Vec<(usize, usize, bool)> {
    let mut positions = Vec::new();
    for sep in ['–', '—', '-'] {
        for (idx, _) in text.match_indices(sep) {
            positions.push((idx, sep.len_utf8(), false));
        }
    }
    for m in WORD_SEP_RE.find_iter(text) {
        positions.push((m.start(), m.len(), true));
    }
    positions
}

pub(super) fn parse_range(text: &str, reference: NaiveDate) -> Option<DateRange> {
    let stripped = strip_times(text);
    let text = WHITESPACE_RE.replace_all(stripped.trim(), " ");

    let isos: Vec<NaiveDate> = ISO_DATE_RE
        .captures_iter(&text)
        .filter_map(|caps| {
            let year = caps.get(1)?.as_str().parse().ok()?;
            let month = caps.get(2)?.as_str().parse().ok()?;
            let day = caps.get(3)?.as_str().parse().ok()?;
            NaiveDate::from_ymd_opt(year, month, day).and_then(plausible)
        })
        .collect();
    let text = match isos.as_slice() {
        [start, end, ..] => return Some(DateRange::between(*start, *end)),
        [_] => spell_out_iso(&text),
        [] => text.into_owned(),
    };
    let scanned = scan_separators(&text, reference);

    match (isos.first(), scanned) {
        (None, scanned) => scanned.or_else(|| parse_single(&text, reference).map(DateRange::single)),
        (Some(&iso), Some(range)) => match (range.start, range.end) {
            (Some(start), Some(end)) => Some(DateRange::between(start, end)),
            (None, Some(end)) if end >= iso => Some(DateRange::between(iso, end)),
            _ => Some(DateRange::single(iso)),
        },
        (Some(&iso), None) => Some(DateRange::single(iso)),
    }
}

/// Rewrite ISO dates as "September 20, 2025" so their hyphens never read as separators.
fn spell_out_iso(text: &str) -> String {
    ISO_DATE_RE
        .replace_all(text, |caps: &Captures<'_>| {
            let date = NaiveDate::parse_from_str(&caps[0], "%Y-%m-%d").ok().and_then(plausible);
            match date {
                Some(date) => date.format("%B %-d, %Y").to_string(),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

/// First separator that splits the text into a usable range.
fn scan_separators(text: &str, reference: NaiveDate) -> Option<DateRange> {
    for (idx, width, is_word) in separator_positions(text) {
        let left = &text[..idx];
        let right = &text[idx + width..];
        let end = find_parts(right, Pick::First).or_else(|| bare_day_prefix(right));
        let start = find_parts(left, Pick::Last)
            .or_else(|| bare_day_suffix(left))
            .or_else(|| month_suffix(left));
        match (start, end) {
            (Some(start), Some(end)) => {
                if let Some(range) = combine(start, end, reference) {
                    return Some(range);
                }
            }
            (None, Some(end)) if is_word && left.trim().chars().all(|c| !c.is_ascii_digit()) => {
                if end.month.is_some() {
                    if let Some(date) = build_single(end, reference) {
                        let date = match end.day {
                            Some(_) => date,
                            None => {
                                let last = last_day_of_month(date.year(), date.month())?;
                                date.with_day(last)?
                            }
                        };
                        return Some(DateRange::until(date));
                    }
                }
            }
            _ => {}
        }
    }
    None
}

fn to_time(hour: u32, minute: u32, meridiem: Option<char>) -> Option<NaiveTime> {
    let hour = match meridiem {
        Some('a') if hour == 12 => 0,
        Some('a') => hour,
        Some('p') if hour == 12 => 12,
        Some('p') => hour + 12,
        _ => hour,
    };
    NaiveTime::from_hms_opt(hour, minute, 0)
}

fn meridiem(caps: &Captures<'_>, name: &str) -> Option<char> {
    caps.name(name)
        .and_then(|m| m.as_str().chars().next())
        .map(|c| c.to_ascii_lowercase())
}

/// First time or time range found in the text.
pub(super) fn parse_times(text: &str) -> Option<(NaiveTime, Option<NaiveTime>)> {
    if let Some(caps) = TIME_RANGE_RE.captures(text) {
        let sh: u32 = number(&caps, "sh")?;
        let sm: u32 = number(&caps, "sm").unwrap_or(0);
        let eh: u32 = number(&caps, "eh")?;
        let em: u32 = number(&caps, "em").unwrap_or(0);
        let end_mer = meridiem(&caps, "ep");
        let end = to_time(eh, em, end_mer)?;
        let start = match meridiem(&caps, "sp") {
            Some(m) => to_time(sh, sm, Some(m))?,
            None => {
                let inherited = to_time(sh, sm, end_mer)?;
                if inherited > end {
                    to_time(sh, sm, Some('a'))?
                } else {
                    inherited
                }
            }
        };
        return Some((start, Some(end)));
    }
    if let Some(caps) = TIME_RANGE_24_RE.captures(text) {
        let start = to_time(group(&caps, 1)?, group(&caps, 2)?, None)?;
        let end = to_time(group(&caps, 3)?, group(&caps, 4)?, None)?;
        return Some((start, Some(end)));
    }
    if let Some(caps) = SINGLE_TIME_RE.captures(text) {
        let hour: u32 = group(&caps, 1)?;
        let minute: u32 = group(&caps, 2).unwrap_or(0);
        return Some((to_time(hour, minute, meridiem_at(&caps, 3))?, None));
    }
    if let Some(caps) = TIME_24_RE.captures(text) {
        return Some((to_time(group(&caps, 1)?, group(&caps, 2)?, None)?, None));
    }
    NOON_RE.captures(text).and_then(|caps| {
        let word = caps.get(1)?.as_str().to_ascii_lowercase();
        let hour = if word == "noon" { 12 } else { 0 };
        Some((NaiveTime::from_hms_opt(hour, 0, 0)?, None))
    })
}

fn meridiem_at(caps: &Captures<'_>, idx: usize) -> Option<char> {
    caps.get(idx)
        .and_then(|m| m.as_str().chars().next())
        .map(|c| c.to_ascii_lowercase())
}

/// Remove every time expression so the remaining text only carries dates.
pub(crate) fn strip_times(text: &str) -> String {
    let text = TIME_RANGE_RE.replace_all(text, " ");
    let text = TIME_RANGE_24_RE.replace_all(&text, " ");
    let text = SINGLE_TIME_RE.replace_all(&text, " ");
    let text = TIME_24_RE.replace_all(&text, " ");
    NOON_RE.replace_all(&text, " ").into_owned()
}

/// True when the text holds a recognizable date expression.
pub(crate) fn contains_date(text: &str) -> bool {
    PARTS_RE.is_match(text)
}
