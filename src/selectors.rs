//! Shared Selectors

use once_cell::sync::Lazy;
use scraper::Selector;

/// Selector for anchor elements with hrefs.
pub static LINK_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a[href]").expect("valid link selector"));

/// Selector for JSON-LD script tags.
pub static JSONLD_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("script[type='application/ld+json']").expect("valid jsonld selector")
});

/// Selector for `<body>` elements.
pub static BODY_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("body").expect("valid body selector"));

/// Selector for `<title>` tags.
pub static TITLE_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("title").expect("valid title selector"));

/// Selector for metadata tags with name/property attributes.
pub static META_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("meta[name], meta[property]").expect("valid metadata selector"));

/// Selector for `<script>` tags (inline and external).
pub static SCRIPT_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("script").expect("valid script selector"));

/// Selector for headings h1-h6.
pub static HEADING_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("h1, h2, h3, h4, h5, h6").expect("valid heading selector"));

/// Selector for paragraph-like description text.
pub static DESCRIPTION_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(
        "p, [class*='description'], [class*='summary'], [class*='excerpt'], [class*='teaser'], [class*='dek']",
    )
    .expect("valid description selector")
});

/// Selector for class-tagged titles.
pub static TITLE_CLASS_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("[class*='title'], [class*='name'], [class*='heading'], [itemprop='name']")
        .expect("valid title class selector")
});

/// Selector for machine-readable `<time>` tags.
pub static TIME_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("time[datetime]").expect("valid time selector"));

/// Selector for human-readable date containers.
pub static DATE_CLASS_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("[class*='date'], [class*='time'], [class*='when'], [class*='schedule']")
        .expect("valid date selector")
});

/// Selector for location containers.
pub static LOCATION_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(
        "[class*='location'], [class*='venue'], [class*='where'], [itemprop='location'], address",
    )
    .expect("valid location selector")
});

/// Selector for images.
pub static IMG_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("img").expect("valid img selector"));

/// Selector for images whose own class or wrapper class marks them as the hero.
pub static HERO_IMG_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(
        "img[class*='hero'], img[class*='featured'], img[class*='event'], img[class*='exhibition'], \
         [class*='hero'] img, [class*='featured'] img, [class*='thumbnail'] img, [class*='image'] img",
    )
    .expect("valid hero image selector")
});

/// Selector for breadcrumb links.
pub static BREADCRUMB_LINK_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(
        "[class*='breadcrumb'] a[href], nav[aria-label*='readcrumb'] a[href], [itemtype*='BreadcrumbList'] a[href]",
    )
    .expect("valid breadcrumb selector")
});
