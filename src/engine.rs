//! Extraction Orchestrator
//!
//! [`Scout`] drives one venue call end to end: discover candidate pages,
//! fetch them one at a time, extract drafts (structured data first, markup
//! otherwise), enrich thin drafts from their detail pages, fall back to the
//! text generator for client-rendered shells, then validate, filter and
//! dedupe.

use std::collections::HashSet;
use std::sync::Arc;

use tokio::time::{timeout_at, Instant};
use tracing::{debug, info, warn};
use url::Url;

use crate::error::{Result, ScoutError};
use crate::options::ScrapeOptions;
use crate::runtime;
use crate::tools::batch::batch_ordered;
use crate::tools::dedupe::dedupe_events;
use crate::tools::extract::{enrich_draft, extract_drafts, needs_enrichment};
use crate::tools::fallback::{extract_via_fallback, TextGenerator};
use crate::tools::fetch::{FetchError, FetchResult, PageFetcher, PageSource};
use crate::tools::map::discover;
use crate::tools::validate::is_valid_event;
use crate::types::*;

/// Event extraction engine. Cheap to clone; holds no per-venue state.
#[derive(Clone, Default)]
pub struct Scout {
    options: ScrapeOptions,
    generator: Option<Arc<dyn TextGenerator>>,
}

impl Scout {
    pub fn new(options: ScrapeOptions) -> Self {
        Self {
            options,
            generator: None,
        }
    }

    /// Attach the text generator used for client-rendered pages.
    pub fn with_generator(mut self, generator: Arc<dyn TextGenerator>) -> Self {
        self.generator = Some(generator);
        self
    }

    pub fn options(&self) -> &ScrapeOptions {
        &self.options
    }

    /// Scrape one venue site.
    ///
    /// Only a malformed URL or an HTTP client that cannot be built is an
    /// error; unreachable pages simply contribute no events.
    ///
    /// # Examples
    /// ```no_run
    /// use venue_scout::{EventType, Scout, ScrapeOptions, TimeWindow};
    ///
    /// # async fn example() -> venue_scout::Result<()> {
    /// let scout = Scout::new(ScrapeOptions::default());
    /// let events = scout
    ///     .scrape_venue("https://museum.example", "Example Museum", Some(EventType::Exhibition), TimeWindow::ThisMonth)
    ///     .await?;
    /// for event in &events {
    ///     println!("{} {:?}", event.title(), event.start_date());
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub async fn scrape_venue(
        &self,
        venue_url: &str,
        venue_name: &str,
        event_type: Option<EventType>,
        window: TimeWindow,
    ) -> Result<Vec<ScrapedEvent>> {
        let venue = VenueContext::new(venue_url, venue_name, event_type, window)?;
        self.scrape_context(&venue).await
    }

    /// Scrape a venue described by a prepared context.
    pub async fn scrape_context(&self, venue: &VenueContext) -> Result<Vec<ScrapedEvent>> {
        let fetcher = PageFetcher::new(self.options.fetch.clone())
            .map_err(|e| ScoutError::Config(e.to_string()))?;
        Ok(self.scrape_with(&fetcher, venue).await)
    }

    /// Blocking wrapper over [`Scout::scrape_venue`] for sync callers.
    ///
    /// Must not be called from inside a tokio runtime.
    pub fn scrape_venue_blocking(
        &self,
        venue_url: &str,
        venue_name: &str,
        event_type: Option<EventType>,
        window: TimeWindow,
    ) -> Result<Vec<ScrapedEvent>> {
        runtime::block_on(self.scrape_venue(venue_url, venue_name, event_type, window))
    }

    /// Scrape several venues, `options.concurrency` at a time.
    ///
    /// Results line up with `venues`. Each venue gets its own HTTP session.
    pub async fn scrape_venues(&self, venues: Vec<VenueContext>) -> Vec<Result<Vec<ScrapedEvent>>> {
        batch_ordered(venues, self.options.concurrency, |venue| async move {
            self.scrape_context(&venue).await
        })
        .await
    }

    /// Run the pipeline against any page source.
    pub async fn scrape_with<S: PageSource + ?Sized>(
        &self,
        source: &S,
        venue: &VenueContext,
    ) -> Vec<ScrapedEvent> {
        let deadline = Instant::now() + self.options.venue_budget();
        let mut run = VenueRun {
            scout: self,
            source,
            venue,
            deadline,
            fallback_used: false,
            seen_pages: HashSet::new(),
            events: Vec::new(),
        };

        let mut pages: Vec<Url> = discover(
            source,
            &venue.base_url,
            &venue.domain,
            &self.options.discovery,
        )
        .await
        .into_iter()
        .map(|page| page.url)
        .collect();
        if pages.is_empty() {
            debug!(venue = %venue.base_url, "discovery found nothing, using the venue page");
            pages.push(venue.base_url.clone());
        }
        let discovered = pages.len();

        for page in pages {
            if Instant::now() >= deadline {
                warn!(venue = %venue.base_url, "venue deadline reached, stopping early");
                break;
            }
            run.process_page(&page).await;
        }

        let before_dedupe = run.events.len();
        let events = dedupe_events(run.events);
        info!(
            venue = %venue.base_url,
            name = %venue.name,
            pages = discovered,
            kept = events.len(),
            duplicates = before_dedupe - events.len(),
            fallback = run.fallback_used,
            "venue scraped"
        );
        events
    }
}

/// Mutable state for one venue call.
struct VenueRun<'a, S: ?Sized> {
    scout: &'a Scout,
    source: &'a S,
    venue: &'a VenueContext,
    deadline: Instant,
    fallback_used: bool,
    seen_pages: HashSet<String>,
    events: Vec<ScrapedEvent>,
}

impl<S: PageSource + ?Sized> VenueRun<'_, S> {
    async fn fetch(&self, url: &str) -> std::result::Result<FetchResult, FetchError> {
        match timeout_at(self.deadline, self.source.fetch(url)).await {
            Ok(result) => result,
            Err(_) => Err(FetchError::Timeout { url: url.into() }),
        }
    }

    async fn process_page(&mut self, page: &Url) {
        let result = match self.fetch(page.as_str()).await {
            Ok(result) => result,
            Err(e) => {
                warn!(url = %page, error = %e, "page skipped");
                return;
            }
        };
        if !self.seen_pages.insert(result.final_url.clone()) {
            debug!(url = %page, final_url = %result.final_url, "page already processed");
            return;
        }
        let page_url = Url::parse(&result.final_url).unwrap_or_else(|_| page.clone());
        let today = self.venue.today;

        let mut drafts = extract_drafts(&result.html, &page_url, today);
        debug!(
            url = %page_url,
            drafts = drafts.len(),
            render_mode = ?result.render_mode,
            "page extracted"
        );

        if drafts.is_empty() {
            if result.render_mode.is_client_rendered() {
                self.try_fallback().await;
            }
            return;
        }

        self.enrich(&mut drafts, page_url.as_str()).await;

        for draft in drafts {
            let Some(event) = draft.finish(page_url.as_str(), today) else {
                continue;
            };
            if !is_valid_event(&event, page_url.as_str()) {
                debug!(title = event.title(), "event rejected");
                continue;
            }
            if self.venue.wants(&event) {
                self.events.push(event);
            }
        }
    }

    /// Fetch detail pages for thin drafts, up to the per-page cap.
    async fn enrich(&self, drafts: &mut [EventDraft], page_url: &str) {
        let cap = self.scout.options.max_enrichments_per_page;
        let mut fetched = 0;
        for draft in drafts.iter_mut() {
            if fetched >= cap {
                break;
            }
            if !needs_enrichment(draft, page_url) {
                continue;
            }
            let Some(link) = draft.link.clone() else {
                continue;
            };
            fetched += 1;
            match self.fetch(&link).await {
                Ok(detail) => {
                    let detail_url = Url::parse(&detail.final_url).or_else(|_| Url::parse(&link));
                    if let Ok(detail_url) = detail_url {
                        enrich_draft(draft, &detail.html, &detail_url, self.venue.today);
                    }
                }
                Err(e) => debug!(url = %link, error = %e, "detail page skipped"),
            }
        }
    }

    /// Ask the text generator once per venue call.
    async fn try_fallback(&mut self) {
        if self.fallback_used || !self.scout.options.llm_fallback {
            return;
        }
        let Some(generator) = self.scout.generator.as_deref() else {
            debug!(venue = %self.venue.base_url, "client-rendered page, no text generator configured");
            return;
        };
        self.fallback_used = true;
        let base = self.venue.base_url.as_str();
        for event in extract_via_fallback(generator, self.venue).await {
            if is_valid_event(&event, base) && self.venue.wants(&event) {
                self.events.push(event);
            }
        }
    }
}
