//! Page Fetching
//!
//! [`PageSource`] is the seam between the pipeline and the network:
//! [`PageFetcher`] is the HTTP implementation, tests substitute in-memory
//! sources.

mod client;
mod headers;
mod profile;
mod strategies;
mod utils;

#[cfg(test)]
pub(crate) mod fake;

pub mod types;

pub use strategies::PageFetcher;
pub use types::*;

use async_trait::async_trait;

use crate::options::FetchOptions;

/// Where pages come from.
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Fetch an HTML page, retrying and escalating as needed.
    async fn fetch(&self, url: &str) -> Result<FetchResult, FetchError>;

    /// Fetch a non-HTML document (sitemaps). One attempt, status-checked only.
    async fn fetch_text(&self, url: &str) -> Result<String, FetchError>;

    /// Cheap existence check for a candidate path.
    async fn probe(&self, url: &str) -> bool;
}

/// Fetch one page with default options and a throwaway session.
///
/// # Examples
/// ```no_run
/// use venue_scout::tools::fetch::fetch;
///
/// # async fn example() -> Result<(), venue_scout::tools::fetch::FetchError> {
/// let result = fetch("https://example.org/exhibitions").await?;
/// println!("{} bytes via {:?} in {}ms", result.html.len(), result.profile_used, result.duration_ms);
/// # Ok(())
/// # }
/// ```
pub async fn fetch(url: &str) -> Result<FetchResult, FetchError> {
    PageFetcher::new(FetchOptions::default())?.fetch(url).await
}

/// Fetch HTML from URL (convenience function that returns only the HTML).
pub async fn fetch_html(url: &str) -> Result<String, FetchError> {
    fetch(url).await.map(FetchResult::into_html)
}

#[cfg(test)]
mod tests;
