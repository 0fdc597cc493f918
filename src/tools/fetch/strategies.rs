use std::time::Instant;

use async_trait::async_trait;
use reqwest::{Client, Method, StatusCode};
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

use super::client::build_client_for_profile;
use super::headers::{headers_for_profile, headers_with_referer};
use super::types::*;
use super::utils::*;
use super::PageSource;
use crate::options::FetchOptions;
use crate::tools::render::classify_html;

/// HTTP session for one venue call.
///
/// Direct fetches retry with exponential backoff. Blocks and exhausted
/// retries escalate to a second client that warms a cookie session on the
/// site root first. The session is dropped with the fetcher, so nothing
/// leaks between venues.
pub struct PageFetcher {
    options: FetchOptions,
    direct: Client,
    minimal: Client,
    stealth: OnceCell<Client>,
    warmed: OnceCell<()>,
}

impl PageFetcher {
    pub fn new(options: FetchOptions) -> Result<Self, FetchError> {
        let direct = build_client_for_profile(FetchProfile::Windows, options.request_timeout)?;
        let minimal = build_client_for_profile(FetchProfile::Minimal, options.request_timeout)?;
        Ok(Self {
            options,
            direct,
            minimal,
            stealth: OnceCell::new(),
            warmed: OnceCell::new(),
        })
    }

    pub fn options(&self) -> &FetchOptions {
        &self.options
    }

    async fn stealth_client(&self) -> Result<&Client, FetchError> {
        self.stealth
            .get_or_try_init(|| async {
                debug!("building bot-protection session");
                build_client_for_profile(FetchProfile::Stealth, self.options.request_timeout)
            })
            .await
    }

    /// Visit the site root once so the session carries its cookies.
    async fn warm_up(&self, client: &Client, root: &str) {
        self.warmed
            .get_or_init(|| async {
                let outcome = client
                    .get(root)
                    .headers(headers_for_profile(FetchProfile::Stealth))
                    .send()
                    .await;
                match outcome {
                    Ok(resp) => debug!(root, status = resp.status().as_u16(), "session warmed"),
                    Err(e) => debug!(root, error = %e, "session warm-up failed"),
                }
                tokio::time::sleep(self.options.warmup_delay).await;
            })
            .await;
    }

    async fn get_page(
        &self,
        client: &Client,
        url: &str,
        profile: FetchProfile,
        referer: Option<&str>,
    ) -> Result<(String, String), FetchError> {
        let headers = match referer {
            Some(referer) => headers_with_referer(profile, referer),
            None => headers_for_profile(profile),
        };
        let response = client
            .get(url)
            .headers(headers)
            .send()
            .await
            .map_err(|e| classify_request_error(url, &e))?;

        let status = response.status();
        let final_url = response.url().to_string();
        let body = response
            .text()
            .await
            .map_err(|e| classify_request_error(url, &e))?;

        validate_response(url, status, &body)?;
        Ok((body, final_url))
    }

    async fn escalated_get(&self, url: &str) -> Result<(String, String), FetchError> {
        let client = self.stealth_client().await?;
        let root = origin_of(url);
        if let Some(root) = root.as_deref() {
            self.warm_up(client, root).await;
        }
        self.get_page(client, url, FetchProfile::Stealth, root.as_deref())
            .await
    }

    async fn fetch_page(&self, url: &str) -> Result<FetchResult, FetchError> {
        let start = Instant::now();
        let mut state = FetchState::Direct;
        let mut attempts = 0u32;
        let mut last_error: Option<FetchError> = None;

        loop {
            state = match state {
                FetchState::Direct | FetchState::Retrying { .. } => {
                    if let FetchState::Retrying { attempt } = state {
                        let delay = backoff_delay(self.options.backoff_base, attempt);
                        debug!(url, attempt, delay_ms = delay.as_millis() as u64, "retrying");
                        tokio::time::sleep(delay).await;
                    }
                    attempts += 1;
                    match self.get_page(&self.direct, url, FetchProfile::Windows, None).await {
                        Ok((html, final_url)) => {
                            return Ok(FetchResult {
                                render_mode: classify_html(&html),
                                html,
                                final_url,
                                profile_used: FetchProfile::Windows,
                                duration_ms: start.elapsed().as_millis() as u64,
                                attempts,
                                escalated: false,
                            });
                        }
                        Err(error) => {
                            let next = next_state(&error, attempts, &self.options);
                            debug!(url, attempts, error = %error, next = ?next, "direct fetch failed");
                            last_error = Some(error);
                            next
                        }
                    }
                }
                FetchState::Escalated => {
                    attempts += 1;
                    info!(url, "escalating to bot-protection session");
                    return match self.escalated_get(url).await {
                        Ok((html, final_url)) => Ok(FetchResult {
                            render_mode: classify_html(&html),
                            html,
                            final_url,
                            profile_used: FetchProfile::Stealth,
                            duration_ms: start.elapsed().as_millis() as u64,
                            attempts,
                            escalated: true,
                        }),
                        Err(error) => {
                            warn!(url, attempts, error = %error, "fetch failed after escalation");
                            Err(error)
                        }
                    };
                }
                FetchState::Failed => {
                    let error = last_error.unwrap_or_else(|| FetchError::Request {
                        url: url.into(),
                        message: "no attempt made".into(),
                    });
                    debug!(url, attempts, error = %error, "fetch failed");
                    return Err(error);
                }
            };
        }
    }

    async fn head_or_get(&self, url: &str) -> Result<reqwest::Response, reqwest::Error> {
        let headers = headers_for_profile(FetchProfile::Minimal);
        let response = self
            .minimal
            .request(Method::HEAD, url)
            .headers(headers.clone())
            .send()
            .await?;
        if matches!(
            response.status(),
            StatusCode::METHOD_NOT_ALLOWED | StatusCode::NOT_IMPLEMENTED
        ) {
            return self.minimal.get(url).headers(headers).send().await;
        }
        Ok(response)
    }
}

#[async_trait]
impl PageSource for PageFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchResult, FetchError> {
        self.fetch_page(url).await
    }

    async fn fetch_text(&self, url: &str) -> Result<String, FetchError> {
        let response = self
            .direct
            .get(url)
            .headers(headers_for_profile(FetchProfile::Windows))
            .send()
            .await
            .map_err(|e| classify_request_error(url, &e))?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.into(),
                status: status.as_u16(),
            });
        }
        response
            .text()
            .await
            .map_err(|e| classify_request_error(url, &e))
    }

    async fn probe(&self, url: &str) -> bool {
        match self.head_or_get(url).await {
            Ok(response) => {
                response.status().is_success() && !redirected_home(url, response.url())
            }
            Err(e) => {
                debug!(url, error = %e, "probe failed");
                false
            }
        }
    }
}
