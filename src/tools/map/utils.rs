use scraper::{ElementRef, Html};
use url::Url;

use crate::selectors::{BREADCRUMB_LINK_SELECTOR, LINK_SELECTOR};
use crate::types::Domain;

/// Path keywords that mark a page as likely to list events.
pub(crate) const EVENT_KEYWORDS: &[&str] = &[
    "exhibition",
    "event",
    "program",
    "tour",
    "show",
    "talk",
    "lecture",
    "workshop",
    "calendar",
    "whats-on",
    "on-view",
];

/// Probe paths tried by the pattern strategy, most common first.
pub(crate) const PROBE_PATHS: &[&str] = &[
    "/exhibitions",
    "/exhibitions/current",
    "/exhibitions/upcoming",
    "/events",
    "/events/upcoming",
    "/calendar",
    "/programs",
    "/public-programs",
    "/whats-on",
    "/on-view",
    "/visit/tours",
    "/tours",
    "/shows",
    "/talks",
    "/lectures",
    "/workshops",
    "/learn/programs",
    "/visit/exhibitions",
    "/art/exhibitions",
    "/museum/exhibitions",
];

/// Listing paths only kept through the detail links they expand into.
const EXPANSION_ONLY_PATHS: &[&str] = &["/calendar"];

const EXCLUDED_SEGMENTS: &[&str] = &[
    "search",
    "donate",
    "donation",
    "ticket",
    "tickets",
    "login",
    "signin",
    "cart",
    "checkout",
    "account",
    "feed",
    "wp-admin",
    "wp-json",
    "membership",
    "shop",
    "store",
    "privacy",
];

const EXCLUDED_EXTENSIONS: &[&str] = &[
    ".pdf", ".jpg", ".jpeg", ".png", ".gif", ".webp", ".svg", ".zip", ".ics", ".xml", ".mp4",
    ".mp3", ".doc", ".docx",
];

/// Tags whose links are weighted up by the navigation strategy.
const NAV_TAGS: &[&str] = &["nav", "header", "footer"];

const SEE_ALL_PHRASES: &[&str] = &[
    "see all",
    "view all",
    "all events",
    "all exhibitions",
    "all programs",
    "full calendar",
    "see more events",
    "more events",
    "more exhibitions",
];

/// Clean href by stripping escape sequences, quotes, and whitespace.
/// Handles malformed HTML where hrefs have literal quote characters or escape sequences.
pub(crate) fn clean_href(href: &str) -> String {
    href.replace('\\', "")
        .replace("&quot;", "")
        .replace("&#34;", "")
        .replace("&apos;", "")
        .replace("&#39;", "")
        .trim()
        .trim_matches('"')
        .trim_matches('\'')
        .trim()
        .to_string()
}

/// Resolve an href against the page URL; only http(s) survives.
pub(crate) fn resolve_href(href: &str, base: &Url) -> Option<Url> {
    let href = clean_href(href);
    if href.is_empty() {
        return None;
    }
    let url = if href.starts_with("//") {
        Url::parse(&format!("{}:{}", base.scheme(), href)).ok()?
    } else {
        Url::parse(&href).ok().or_else(|| base.join(&href).ok())?
    };
    is_valid_scheme(&url).then_some(url)
}

/// Check if URL scheme is acceptable (http/https).
pub(crate) fn is_valid_scheme(url: &Url) -> bool {
    matches!(url.scheme(), "http" | "https")
}

/// Check if element is inside a specific HTML tag.
pub(crate) fn is_inside_tag(element: &ElementRef, tag_name: &str) -> bool {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .any(|el| el.value().name() == tag_name)
}

/// Scheme, host and path; no query, fragment or trailing slash.
pub(crate) fn normalize_url(url: &Url) -> Url {
    let mut normalized = url.clone();
    normalized.set_query(None);
    normalized.set_fragment(None);
    let trimmed = normalized.path().trim_end_matches('/').to_string();
    if trimmed.is_empty() {
        normalized.set_path("/");
    } else {
        normalized.set_path(&trimmed);
    }
    normalized
}

pub(crate) fn is_same_site(url: &Url, domain: &Domain) -> bool {
    Domain::from_url(url)
        .map(|d| domain.contains(&d))
        .unwrap_or(false)
}

/// Utility, commerce and file URLs that never list events.
pub(crate) fn is_excluded(url: &Url) -> bool {
    let path = url.path().to_ascii_lowercase();
    if EXCLUDED_EXTENSIONS.iter().any(|ext| path.ends_with(ext)) {
        return true;
    }
    path.split('/')
        .filter(|seg| !seg.is_empty())
        .any(|seg| EXCLUDED_SEGMENTS.contains(&seg))
}

pub(crate) fn has_event_keyword(text: &str) -> bool {
    let lower = text.to_ascii_lowercase();
    EVENT_KEYWORDS.iter().any(|k| lower.contains(k)) || lower.contains("what's on")
}

pub(crate) fn is_expansion_only(path: &str) -> bool {
    EXPANSION_ONLY_PATHS.contains(&path.trim_end_matches('/'))
}

/// Same-site, non-excluded link targets on a page with their anchor text.
fn page_links<'a>(
    doc: &'a Html,
    base: &'a Url,
    domain: &'a Domain,
) -> impl Iterator<Item = (ElementRef<'a>, Url, String)> + 'a {
    doc.select(&LINK_SELECTOR).filter_map(move |link| {
        let url = resolve_href(link.value().attr("href")?, base)?;
        if !is_same_site(&url, domain) || is_excluded(&url) {
            return None;
        }
        let text = normalize_text(&link.text().collect::<String>());
        Some((link, normalize_url(&url), text))
    })
}

/// Event-keyword links, navigation chrome first.
pub(crate) fn navigation_links(html: &str, base: &Url, domain: &Domain) -> Vec<Url> {
    let doc = Html::parse_document(html);
    let mut weighted: Vec<(u8, Url)> = page_links(&doc, base, domain)
        .filter(|(_, url, text)| has_event_keyword(text) || has_event_keyword(url.path()))
        .filter(|(_, url, _)| url.path() != "/")
        .map(|(link, url, _)| {
            let in_nav = NAV_TAGS.iter().any(|tag| is_inside_tag(&link, tag));
            (if in_nav { 2 } else { 1 }, url)
        })
        .collect();
    weighted.sort_by(|a, b| b.0.cmp(&a.0));
    dedupe_urls(weighted.into_iter().map(|(_, url)| url))
}

/// "See all" style links and breadcrumb ancestors that point at listings.
pub(crate) fn structure_links(html: &str, base: &Url, domain: &Domain) -> Vec<Url> {
    let doc = Html::parse_document(html);
    let see_all = page_links(&doc, base, domain)
        .filter(|(_, _, text)| SEE_ALL_PHRASES.iter().any(|p| text.contains(p)))
        .map(|(_, url, _)| url);

    let breadcrumbs = doc.select(&BREADCRUMB_LINK_SELECTOR).filter_map(|link| {
        let url = resolve_href(link.value().attr("href")?, base)?;
        (is_same_site(&url, domain) && !is_excluded(&url) && has_event_keyword(url.path()))
            .then(|| normalize_url(&url))
    });

    dedupe_urls(see_all.chain(breadcrumbs).filter(|url| url.path() != "/"))
}

/// Detail links nested under a listing path (`/events` → `/events/gallery-talk`).
pub(crate) fn listing_children(html: &str, listing: &Url, domain: &Domain, limit: usize) -> Vec<Url> {
    let doc = Html::parse_document(html);
    let prefix = format!("{}/", listing.path().trim_end_matches('/'));
    let children = page_links(&doc, listing, domain)
        .map(|(_, url, _)| url)
        .filter(|url| url.path().starts_with(&prefix) && url.path().len() > prefix.len());
    let mut out = dedupe_urls(children);
    out.truncate(limit);
    out
}

fn dedupe_urls(urls: impl Iterator<Item = Url>) -> Vec<Url> {
    let mut seen = std::collections::HashSet::new();
    urls.filter(|url| seen.insert(url.as_str().to_string()))
        .collect()
}

fn has_meaningful_text(text: &str) -> bool {
    !text.trim().is_empty()
}

fn is_heading_tag(name: &str) -> bool {
    matches!(name, "h1" | "h2" | "h3" | "h4")
}

fn is_heading_link(link: &ElementRef, text: &str) -> bool {
    if !has_meaningful_text(text) {
        return false;
    }
    if is_heading_tag(link.value().name()) {
        return true;
    }
    if ["h1", "h2", "h3", "h4"]
        .iter()
        .any(|heading| is_inside_tag(link, heading))
    {
        return true;
    }
    link.descendants()
        .filter_map(ElementRef::wrap)
        .any(|el| is_heading_tag(el.value().name()))
}

fn is_utility_text(text: &str) -> bool {
    matches!(
        text.trim().to_ascii_lowercase().as_str(),
        "share"
            | "print"
            | "email"
            | "facebook"
            | "twitter"
            | "instagram"
            | "linkedin"
            | "copy link"
            | "add to calendar"
            | "google calendar"
            | "ical"
            | "buy tickets"
            | "tickets"
            | "register"
    )
}

pub(crate) fn normalize_text(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

fn collect_heading_texts(element: &ElementRef) -> Vec<String> {
    element
        .descendants()
        .filter_map(ElementRef::wrap)
        .filter(|el| is_heading_tag(el.value().name()))
        .map(|el| normalize_text(&el.text().collect::<String>()))
        .filter(|text| !text.is_empty())
        .collect()
}

fn link_matches_heading(link_text_norm: &str, headings: &[String]) -> bool {
    !link_text_norm.is_empty()
        && headings
            .iter()
            .any(|h| link_text_norm == h || link_text_norm.contains(h.as_str()) || h.contains(link_text_norm))
}

/// Canonical link of a content block.
///
/// Prefers the link wrapping or matching a heading, then the first link with
/// meaningful non-utility text, then any link.
pub(crate) fn select_primary_link_in_element(element: &ElementRef, base: &Url) -> Option<Url> {
    let headings = collect_heading_texts(element);
    let mut primary_text: Option<Url> = None;
    let mut fallback: Option<Url> = None;
    let mut heading_links: Vec<(Url, String)> = Vec::new();

    let own = (element.value().name() == "a")
        .then(|| *element)
        .into_iter();
    for link in own.chain(element.select(&LINK_SELECTOR)) {
        let Some(url) = link
            .value()
            .attr("href")
            .and_then(|href| resolve_href(href, base))
        else {
            continue;
        };

        if fallback.is_none() {
            fallback = Some(url.clone());
        }

        let text_raw = link.text().collect::<String>();
        let text_norm = normalize_text(&text_raw);
        if is_heading_link(&link, &text_raw) || link_matches_heading(&text_norm, &headings) {
            heading_links.push((url.clone(), text_norm));
            continue;
        }
        if primary_text.is_none() && has_meaningful_text(&text_raw) && !is_utility_text(&text_raw)
        {
            primary_text = Some(url);
        }
    }

    // Exact heading match beats containment.
    let exact = heading_links
        .iter()
        .find(|(_, text)| headings.iter().any(|h| h == text))
        .map(|(url, _)| url.clone());
    exact
        .or_else(|| heading_links.into_iter().next().map(|(url, _)| url))
        .or(primary_text)
        .or(fallback)
}
