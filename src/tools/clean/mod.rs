mod utils;

use chrono::NaiveDate;
use serde::Serialize;

use utils::*;

/// Clean text.
///
/// Performs the following operations in order:
/// 1. Decode HTML entities (`&amp;` → `&`, `&#39;` → `'`)
/// 2. Normalize Unicode to NFC (canonical composition)
/// 3. Remove zero-width characters
/// 4. Remove control characters (except newlines/tabs)
/// 5. Normalize whitespace (collapse multiple spaces, trim)
///
/// # Examples
/// ```
/// use venue_scout::tools::clean::clean;
///
/// let dirty = "Gallery &amp; &#39;Garden&#39;   Tour";
/// assert_eq!(clean(dirty), "Gallery & 'Garden' Tour");
/// ```
pub fn clean(text: &str) -> String {
    let result = decode_html_entities(text);
    let result = normalize_unicode(&result);
    let result = remove_zero_width_chars(&result);
    let result = remove_control_chars(&result);
    normalize_whitespace(&result)
}

/// Strip tags from an HTML fragment and clean the remaining text.
pub fn clean_markup(fragment: &str) -> String {
    clean(&strip_tags(fragment))
}

/// A heading cleaned for use as an event title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CleanTitle {
    pub title: String,
    /// End date recovered from a "Through <date>" suffix.
    pub end_date: Option<NaiveDate>,
}

/// Clean heading text into an event title.
///
/// Reinserts word breaks lost when markup collapsed, strips a
/// "Through <date>" suffix (keeping the date as the end date), strips
/// trailing date expressions and trailing separators.
///
/// ```
/// use chrono::NaiveDate;
/// use venue_scout::tools::clean::clean_title;
///
/// let today = NaiveDate::from_ymd_opt(2025, 9, 1).unwrap();
/// let cleaned = clean_title("Light AtlasThrough March 5, 2026", today);
/// assert_eq!(cleaned.title, "Light Atlas");
/// assert_eq!(cleaned.end_date, NaiveDate::from_ymd_opt(2026, 3, 5));
/// ```
pub fn clean_title(raw: &str, today: NaiveDate) -> CleanTitle {
    let text = clean(raw);
    let text = restore_word_breaks(&text);

    let (text, end_date) = split_through_suffix(&text, today);
    let stripped = strip_trailing_dates(&text);
    let title = trim_trailing_separators(&stripped);

    let title = if title.is_empty() {
        trim_trailing_separators(&text)
    } else {
        title
    };
    CleanTitle { title, end_date }
}

/// Split heading-plus-dates text at the trailing date expression.
///
/// Returns the title part and the date text, when any trails the title.
pub fn split_title_and_dates(text: &str) -> (String, Option<String>) {
    match trailing_date_span(text) {
        Some(start) => {
            let title = trim_trailing_separators(&text[..start]);
            let dates = text[start..]
                .trim_start_matches(|c: char| is_separator(c) || c.is_whitespace())
                .trim()
                .to_string();
            (title, (!dates.is_empty()).then_some(dates))
        }
        None => (trim_trailing_separators(text), None),
    }
}
