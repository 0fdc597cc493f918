//! In-memory [`PageSource`] for tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use super::types::*;
use super::PageSource;
use crate::tools::render::classify_html;

/// A fixed set of pages keyed by URL. Unknown URLs are 404s.
#[derive(Default)]
pub(crate) struct StaticSite {
    pages: HashMap<String, String>,
    documents: HashMap<String, String>,
    fetched: Mutex<Vec<String>>,
    probes: AtomicUsize,
}

impl StaticSite {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, url: &str, html: impl Into<String>) -> Self {
        self.pages.insert(url.to_string(), html.into());
        self
    }

    pub fn document(mut self, url: &str, body: impl Into<String>) -> Self {
        self.documents.insert(url.to_string(), body.into());
        self
    }

    /// HTML fetches made so far, in order.
    pub fn fetched(&self) -> Vec<String> {
        self.fetched.lock().map(|f| f.clone()).unwrap_or_default()
    }

    pub fn fetch_count(&self, url: &str) -> usize {
        self.fetched().iter().filter(|u| *u == url).count()
    }

    pub fn probe_count(&self) -> usize {
        self.probes.load(Ordering::SeqCst)
    }

    fn not_found(url: &str) -> FetchError {
        FetchError::Status {
            url: url.into(),
            status: 404,
        }
    }
}

#[async_trait]
impl PageSource for StaticSite {
    async fn fetch(&self, url: &str) -> Result<FetchResult, FetchError> {
        if let Ok(mut fetched) = self.fetched.lock() {
            fetched.push(url.to_string());
        }
        let html = self.pages.get(url).ok_or_else(|| Self::not_found(url))?;
        Ok(FetchResult {
            html: html.clone(),
            final_url: url.to_string(),
            profile_used: FetchProfile::Windows,
            duration_ms: 0,
            attempts: 1,
            escalated: false,
            render_mode: classify_html(html),
        })
    }

    async fn fetch_text(&self, url: &str) -> Result<String, FetchError> {
        self.documents
            .get(url)
            .cloned()
            .ok_or_else(|| Self::not_found(url))
    }

    async fn probe(&self, url: &str) -> bool {
        self.probes.fetch_add(1, Ordering::SeqCst);
        self.pages.contains_key(url)
    }
}
