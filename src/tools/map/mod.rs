//! Page Discovery
//!
//! Finds the pages of a venue site that are likely to list events. Four
//! strategies run in priority order under one wall-clock budget: sitemaps,
//! navigation links, conventional URL paths and "see all" structure links.

mod sitemap;
mod utils;

use std::collections::HashSet;
use std::time::Instant;

use futures_util::stream::{self, StreamExt};
use scraper::Html;
use tokio::sync::OnceCell;
use tracing::debug;
use url::Url;

use crate::options::DiscoveryOptions;
use crate::selectors::LINK_SELECTOR;
use crate::tools::fetch::PageSource;
use crate::types::{DiscoveredPage, DiscoveryStrategy, Domain};

use sitemap::parse_sitemap;
use utils::*;

pub(crate) use utils::{normalize_text, resolve_href, select_primary_link_in_element};

const SITEMAP_PATHS: &[&str] = &[
    "/sitemap.xml",
    "/sitemap_index.xml",
    "/sitemap-index.xml",
    "/wp-sitemap.xml",
];

/// Probes in flight at once.
const PROBE_CONCURRENCY: usize = 4;

/// Map URLs from HTML.
///
/// Every http(s) link on the page, resolved against `url`.
pub fn map_page(html: &str, url: &str) -> Vec<String> {
    let Ok(base) = Url::parse(url) else {
        return Vec::new();
    };
    let doc = Html::parse_document(html);
    doc.select(&LINK_SELECTOR)
        .filter_map(|link| resolve_href(link.value().attr("href")?, &base))
        .map(|url| url.to_string())
        .collect()
}

/// Ordered, deduplicated discovery results.
#[derive(Default)]
struct Found {
    pages: Vec<DiscoveredPage>,
    seen: HashSet<String>,
}

impl Found {
    fn len(&self) -> usize {
        self.pages.len()
    }

    /// Add URLs from one strategy; returns how many were new.
    fn extend(&mut self, urls: Vec<Url>, strategy: DiscoveryStrategy, cap: usize) -> usize {
        let mut added = 0;
        for url in urls {
            if self.pages.len() >= cap {
                break;
            }
            let url = normalize_url(&url);
            if self.seen.insert(url.as_str().to_string()) {
                self.pages.push(DiscoveredPage { url, strategy });
                added += 1;
            }
        }
        added
    }
}

/// Per-call discovery state. The homepage is fetched at most once.
struct Discovery<'a, S: PageSource + ?Sized> {
    source: &'a S,
    base: &'a Url,
    domain: &'a Domain,
    opts: &'a DiscoveryOptions,
    homepage: OnceCell<Option<String>>,
}

impl<'a, S: PageSource + ?Sized> Discovery<'a, S> {
    fn root(&self) -> Url {
        let mut root = self.base.clone();
        root.set_path("/");
        root.set_query(None);
        root.set_fragment(None);
        root
    }

    fn accepts(&self, url: &Url) -> bool {
        is_valid_scheme(url) && is_same_site(url, self.domain) && !is_excluded(url)
    }

    async fn homepage(&self) -> Option<&str> {
        self.homepage
            .get_or_init(|| async {
                match self.source.fetch(self.base.as_str()).await {
                    Ok(result) => Some(result.html),
                    Err(e) => {
                        debug!(url = %self.base, error = %e, "homepage fetch failed");
                        None
                    }
                }
            })
            .await
            .as_deref()
    }

    async fn run(&self, strategy: DiscoveryStrategy) -> Vec<Url> {
        match strategy {
            DiscoveryStrategy::Sitemap => self.from_sitemaps().await,
            DiscoveryStrategy::Navigation => self.from_navigation().await,
            DiscoveryStrategy::Pattern => self.from_patterns().await,
            DiscoveryStrategy::Structure => self.from_structure().await,
        }
    }

    async fn from_sitemaps(&self) -> Vec<Url> {
        let root = self.root();
        for path in SITEMAP_PATHS {
            let Ok(sitemap_url) = root.join(path) else {
                continue;
            };
            let Ok(xml) = self.source.fetch_text(sitemap_url.as_str()).await else {
                continue;
            };
            let sitemap = parse_sitemap(&xml);
            if sitemap.is_empty() {
                continue;
            }
            debug!(url = %sitemap_url, pages = sitemap.pages.len(), children = sitemap.children.len(), "sitemap found");

            let mut locs = sitemap.pages;
            let mut children = sitemap.children;
            // Content-named child sitemaps first.
            children.sort_by_key(|child| !has_event_keyword(child));
            for child in children.into_iter().take(self.opts.max_child_sitemaps) {
                match self.source.fetch_text(&child).await {
                    Ok(xml) => locs.extend(parse_sitemap(&xml).pages),
                    Err(e) => debug!(url = %child, error = %e, "child sitemap fetch failed"),
                }
            }

            return locs
                .iter()
                .filter_map(|loc| Url::parse(loc).ok())
                .filter(|url| self.accepts(url) && has_event_keyword(url.path()))
                .collect();
        }
        Vec::new()
    }

    async fn from_navigation(&self) -> Vec<Url> {
        match self.homepage().await {
            Some(html) => navigation_links(html, self.base, self.domain),
            None => Vec::new(),
        }
    }

    async fn from_patterns(&self) -> Vec<Url> {
        let root = self.root();
        let candidates: Vec<Url> = PROBE_PATHS
            .iter()
            .filter_map(|path| root.join(path).ok())
            .collect();

        let hits: Vec<Url> = stream::iter(candidates)
            .map(|url| async move {
                let exists = self.source.probe(url.as_str()).await;
                exists.then_some(url)
            })
            .buffered(PROBE_CONCURRENCY)
            .filter_map(|hit| async move { hit })
            .collect()
            .await;
        debug!(hits = hits.len(), "pattern probes finished");

        let mut urls = Vec::new();
        for listing in hits {
            let children = if self.opts.expand_listings {
                self.expand_listing(&listing).await
            } else {
                Vec::new()
            };
            if !is_expansion_only(listing.path()) {
                urls.push(listing);
            }
            urls.extend(children);
        }
        urls
    }

    async fn expand_listing(&self, listing: &Url) -> Vec<Url> {
        match self.source.fetch(listing.as_str()).await {
            Ok(result) => listing_children(
                &result.html,
                listing,
                self.domain,
                self.opts.max_links_per_listing,
            ),
            Err(e) => {
                debug!(url = %listing, error = %e, "listing expansion failed");
                Vec::new()
            }
        }
    }

    async fn from_structure(&self) -> Vec<Url> {
        match self.homepage().await {
            Some(html) => structure_links(html, self.base, self.domain),
            None => Vec::new(),
        }
    }
}

/// Discover candidate event pages for a venue site.
///
/// Results are ordered by strategy priority, deduplicated by normalized URL
/// and capped at `max_pages`. A strategy that alone adds `short_circuit_at`
/// URLs ends discovery. Whatever was found when the budget runs out is
/// returned.
pub(crate) async fn discover<S: PageSource + ?Sized>(
    source: &S,
    base: &Url,
    domain: &Domain,
    opts: &DiscoveryOptions,
) -> Vec<DiscoveredPage> {
    let started = Instant::now();
    let discovery = Discovery {
        source,
        base,
        domain,
        opts,
        homepage: OnceCell::new(),
    };
    let mut found = Found::default();

    for strategy in [
        DiscoveryStrategy::Sitemap,
        DiscoveryStrategy::Navigation,
        DiscoveryStrategy::Pattern,
        DiscoveryStrategy::Structure,
    ] {
        if found.len() >= opts.max_pages {
            break;
        }
        if strategy == DiscoveryStrategy::Structure && found.len() >= opts.structure_threshold {
            break;
        }
        let remaining = opts.budget.saturating_sub(started.elapsed());
        if remaining.is_zero() {
            debug!(url = %base, "discovery budget exhausted");
            break;
        }

        let urls = match tokio::time::timeout(remaining, discovery.run(strategy)).await {
            Ok(urls) => urls,
            Err(_) => {
                debug!(url = %base, ?strategy, "discovery strategy timed out");
                break;
            }
        };
        let urls = urls.into_iter().filter(|u| discovery.accepts(u)).collect();
        let added = found.extend(urls, strategy, opts.max_pages);
        debug!(url = %base, ?strategy, added, total = found.len(), "discovery strategy finished");

        if added >= opts.short_circuit_at {
            break;
        }
    }

    found.pages
}
