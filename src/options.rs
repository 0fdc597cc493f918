//! Engine configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// HTTP behavior for one venue call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchOptions {
    /// Per-request timeout.
    pub request_timeout: Duration,
    /// Direct attempts before escalating to the bot-protection session.
    pub max_attempts: u32,
    /// First backoff delay, doubled on every retry.
    pub backoff_base: Duration,
    /// Pause between warming the session and retrying the target.
    pub warmup_delay: Duration,
    /// Allow escalation to the bot-protection session at all.
    pub escalate: bool,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(20),
            max_attempts: 3,
            backoff_base: Duration::from_secs(2),
            warmup_delay: Duration::from_millis(1500),
            escalate: true,
        }
    }
}

/// Page discovery limits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryOptions {
    /// Wall-clock budget shared by every strategy.
    pub budget: Duration,
    pub max_pages: usize,
    /// A single strategy yielding this many URLs skips the rest.
    pub short_circuit_at: usize,
    /// The site-structure strategy only runs below this many URLs.
    pub structure_threshold: usize,
    pub max_child_sitemaps: usize,
    /// Recurse one level into probed listing pages.
    pub expand_listings: bool,
    pub max_links_per_listing: usize,
}

impl Default for DiscoveryOptions {
    fn default() -> Self {
        Self {
            budget: Duration::from_secs(30),
            max_pages: 20,
            short_circuit_at: 10,
            structure_threshold: 5,
            max_child_sitemaps: 5,
            expand_listings: true,
            max_links_per_listing: 10,
        }
    }
}

/// Top-level options for [`crate::Scout`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrapeOptions {
    pub fetch: FetchOptions,
    pub discovery: DiscoveryOptions,
    /// Detail pages fetched per listing page to fill missing fields.
    pub max_enrichments_per_page: usize,
    /// Ask the text-generation collaborator when a page is client-rendered.
    pub llm_fallback: bool,
    /// Venues processed at once by `scrape_venues`.
    pub concurrency: usize,
}

impl Default for ScrapeOptions {
    fn default() -> Self {
        Self {
            fetch: FetchOptions::default(),
            discovery: DiscoveryOptions::default(),
            max_enrichments_per_page: 5,
            llm_fallback: true,
            concurrency: 4,
        }
    }
}

impl ScrapeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.fetch.request_timeout = timeout;
        self
    }

    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.fetch.max_attempts = attempts.max(1);
        self
    }

    pub fn with_backoff(mut self, base: Duration) -> Self {
        self.fetch.backoff_base = base;
        self
    }

    pub fn with_warmup_delay(mut self, delay: Duration) -> Self {
        self.fetch.warmup_delay = delay;
        self
    }

    pub fn with_discovery_budget(mut self, budget: Duration) -> Self {
        self.discovery.budget = budget;
        self
    }

    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.discovery.max_pages = max_pages;
        self
    }

    pub fn with_llm_fallback(mut self, enabled: bool) -> Self {
        self.llm_fallback = enabled;
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Hard ceiling for one venue: discovery plus a fixed multiple of page timeouts.
    pub fn venue_budget(&self) -> Duration {
        let pages = (self.discovery.max_pages.max(1) * 2) as u32;
        self.discovery.budget + self.fetch.request_timeout * pages
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_limits() {
        let opts = ScrapeOptions::default();
        assert_eq!(opts.fetch.request_timeout, Duration::from_secs(20));
        assert_eq!(opts.fetch.max_attempts, 3);
        assert_eq!(opts.fetch.backoff_base, Duration::from_secs(2));
        assert_eq!(opts.discovery.budget, Duration::from_secs(30));
        assert_eq!(opts.discovery.max_pages, 20);
        assert_eq!(opts.discovery.short_circuit_at, 10);
    }

    #[test]
    fn venue_budget_scales_with_pages() {
        let opts = ScrapeOptions::default()
            .with_max_pages(2)
            .with_request_timeout(Duration::from_secs(5))
            .with_discovery_budget(Duration::from_secs(10));
        assert_eq!(opts.venue_budget(), Duration::from_secs(30));
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let opts: ScrapeOptions =
            serde_json::from_str(r#"{"llm_fallback": false, "discovery": {"max_pages": 7}}"#)
                .unwrap();
        assert!(!opts.llm_fallback);
        assert_eq!(opts.discovery.max_pages, 7);
        assert_eq!(opts.discovery.short_circuit_at, 10);
        assert_eq!(opts.concurrency, 4);
    }
}
