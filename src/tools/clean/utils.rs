/// Private helper functions for text and title cleaning
use chrono::NaiveDate;
use regex::Regex;
use std::sync::LazyLock;
use unicode_normalization::UnicodeNormalization;

use crate::tools::dates::{parse_single_date_from, DATE_EXPR, RANGE_EXPR};

static WHITESPACE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

static TAG_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").expect("valid tag regex"));

/// "ExhibitionOpening" -> "Exhibition Opening"
static LOWER_UPPER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([a-z]{2})([A-Z])").expect("valid regex"));

/// "Women'sHistory" -> "Women's History"
static APOSTROPHE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(['’][a-z]{1,2})([A-Z])").expect("valid regex"));

/// "Tour.Members" -> "Tour. Members"
static PERIOD_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([a-z]{2}\.)([A-Z])").expect("valid regex"));

/// "Daignault:Light" -> "Daignault: Light"
static COLON_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r":([A-Za-z])").expect("valid regex"));

static THROUGH_SUFFIX_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)[\s,;:|–—-]*\b(?:on\s+view\s+)?(?:through|thru|until|till)\s+(?P<date>{})[\s.]*$",
        DATE_EXPR.as_str()
    ))
    .expect("valid through regex")
});

static TRAILING_DATE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i)[\s,;:|–—-]*{}[\s.]*$", RANGE_EXPR.as_str()))
        .expect("valid trailing date regex")
});

/// Decode HTML entities (named and numeric).
///
/// Examples:
/// - `&amp;` → `&`
/// - `&#39;` → `'`
pub fn decode_html_entities(text: &str) -> String {
    html_escape::decode_html_entities(text).to_string()
}

/// Normalize Unicode to NFC (Canonical Composition).
pub fn normalize_unicode(text: &str) -> String {
    text.nfc().collect::<String>()
}

/// Remove zero-width characters that are invisible but break matching.
pub fn remove_zero_width_chars(text: &str) -> String {
    text.chars()
        .filter(|c| !matches!(*c, '\u{200B}' | '\u{200C}' | '\u{200D}' | '\u{FEFF}'))
        .collect()
}

/// Remove control characters except newlines and tabs.
pub fn remove_control_chars(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_control() || *c == '\n' || *c == '\t')
        .collect()
}

/// Collapse runs of whitespace and trim.
pub fn normalize_whitespace(text: &str) -> String {
    WHITESPACE_REGEX.replace_all(text, " ").trim().to_string()
}

/// Replace tags with spaces so adjacent block text does not fuse.
pub fn strip_tags(fragment: &str) -> String {
    TAG_REGEX.replace_all(fragment, " ").into_owned()
}

/// Reinsert spaces lost when inline markup was flattened.
pub fn restore_word_breaks(text: &str) -> String {
    let text = LOWER_UPPER_REGEX.replace_all(text, "$1 $2");
    let text = APOSTROPHE_REGEX.replace_all(&text, "$1 $2");
    let text = PERIOD_REGEX.replace_all(&text, "$1 $2");
    let text = COLON_REGEX.replace_all(&text, ": $1");
    normalize_whitespace(&text)
}

pub fn is_separator(c: char) -> bool {
    matches!(c, ',' | '|' | '–' | '—' | '-' | ':' | ';')
}

pub fn trim_trailing_separators(text: &str) -> String {
    text.trim_end_matches(|c: char| is_separator(c) || c.is_whitespace())
        .trim()
        .to_string()
}

/// Remove a "Through <date>" suffix, returning the parsed date.
pub fn split_through_suffix(text: &str, today: NaiveDate) -> (String, Option<NaiveDate>) {
    let Some(caps) = THROUGH_SUFFIX_REGEX.captures(text) else {
        return (text.to_string(), None);
    };
    let (Some(whole), Some(date)) = (caps.get(0), caps.name("date")) else {
        return (text.to_string(), None);
    };
    let end = parse_single_date_from(date.as_str(), today);
    (text[..whole.start()].to_string(), end)
}

/// Byte offset where a trailing date expression begins.
pub fn trailing_date_span(text: &str) -> Option<usize> {
    TRAILING_DATE_REGEX
        .find(text)
        .map(|m| m.start())
        .filter(|start| *start > 0)
}

/// Remove trailing date expressions, keeping the rest.
pub fn strip_trailing_dates(text: &str) -> String {
    let mut current = text.to_string();
    // A date range may be preceded by a second date block ("Sep 20 | Through Feb 8").
    for _ in 0..2 {
        match trailing_date_span(&current) {
            Some(start) => current.truncate(start),
            None => break,
        }
    }
    current
}
