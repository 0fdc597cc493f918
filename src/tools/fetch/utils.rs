use std::error::Error as StdError;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use reqwest::StatusCode;
use url::Url;

use super::types::{FetchError, FetchState};
use crate::options::FetchOptions;

const MIN_BODY_LEN: usize = 64;

/// Access-denied wording only counts on small pages; long pages mention it in passing.
const UNAUTHORIZED_MAX_BODY_LEN: usize = 20_000;

const UNAUTHORIZED_PATTERNS: [&str; 3] = ["access denied", "permission denied", "unauthorized"];

const SUSPICIOUS_PATTERNS: [&str; 12] = [
    "verify you are a human",
    "please complete the captcha",
    "solve this captcha",
    "captcha challenge",
    "cf-browser-verification",
    "cf-captcha-container",
    "px-captcha",
    "blocked by cloudflare",
    "please enable javascript and cookies",
    "checking your browser before accessing",
    "bot detection",
    "perimeterx",
];

const DNS_MARKERS: [&str; 5] = [
    "dns error",
    "failed to lookup address",
    "name or service not known",
    "no such host",
    "nodename nor servname",
];

/// Random-ish jitter in milliseconds within [0, range).
pub(super) fn jitter_ms(range: u64) -> u64 {
    if range == 0 {
        return 0;
    }
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::from_nanos(0));
    let nanos = now.subsec_nanos() as u64;
    let micros = (now.as_micros() & 0xFFFF) as u64;
    (nanos ^ (micros << 5)) % range
}

/// Exponential backoff before direct attempt `attempt + 1`.
pub(super) fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
    let jitter = jitter_ms((base.as_millis() as u64 / 4).max(1));
    base.saturating_mul(factor) + Duration::from_millis(jitter)
}

/// Next state after a failed attempt.
pub(crate) fn next_state(error: &FetchError, attempts: u32, options: &FetchOptions) -> FetchState {
    let escalate_or_fail = if options.escalate {
        FetchState::Escalated
    } else {
        FetchState::Failed
    };
    if error.is_terminal() {
        return FetchState::Failed;
    }
    if error.is_blocked() {
        return escalate_or_fail;
    }
    if error.is_retryable() {
        if attempts < options.max_attempts {
            return FetchState::Retrying { attempt: attempts };
        }
        return escalate_or_fail;
    }
    FetchState::Failed
}

/// Map a transport error onto the fetch taxonomy.
pub(super) fn classify_request_error(url: &str, error: &reqwest::Error) -> FetchError {
    if is_dns_error(error) {
        return FetchError::Dns { url: url.into() };
    }
    if error.is_timeout() {
        return FetchError::Timeout { url: url.into() };
    }
    if error.is_connect() {
        return FetchError::Connect {
            url: url.into(),
            message: error.to_string(),
        };
    }
    FetchError::Request {
        url: url.into(),
        message: error.to_string(),
    }
}

fn is_dns_error(error: &reqwest::Error) -> bool {
    let mut source: Option<&(dyn StdError + 'static)> = Some(error);
    while let Some(err) = source {
        let message = err.to_string().to_ascii_lowercase();
        if DNS_MARKERS.iter().any(|marker| message.contains(marker)) {
            return true;
        }
        source = err.source();
    }
    false
}

/// Validate a response for scrapable HTML.
///
/// Checks, in order:
/// - non-success status codes
/// - bot challenge markers
/// - access-denied wording on small pages
/// - missing HTML markers or an empty body
pub(crate) fn validate_response(url: &str, status: StatusCode, body: &str) -> Result<(), FetchError> {
    if !status.is_success() {
        return Err(FetchError::Status {
            url: url.into(),
            status: status.as_u16(),
        });
    }

    let lower = body.to_ascii_lowercase();
    if let Some(pattern) = SUSPICIOUS_PATTERNS.iter().find(|p| lower.contains(*p)) {
        return Err(FetchError::Blocked {
            url: url.into(),
            reason: format!("suspicious: {pattern}"),
        });
    }
    if body.len() < UNAUTHORIZED_MAX_BODY_LEN {
        if let Some(pattern) = UNAUTHORIZED_PATTERNS.iter().find(|p| lower.contains(*p)) {
            return Err(FetchError::Blocked {
                url: url.into(),
                reason: format!("unauthorized: {pattern}"),
            });
        }
    }
    if body.trim().len() < MIN_BODY_LEN {
        return Err(FetchError::InvalidContent {
            url: url.into(),
            reason: "body is too short".into(),
        });
    }
    if !["<html", "<!doctype", "<body", "<head"]
        .iter()
        .any(|marker| lower.contains(marker))
    {
        return Err(FetchError::InvalidContent {
            url: url.into(),
            reason: "missing HTML markers".into(),
        });
    }
    Ok(())
}

/// Scheme, host and port of a URL, with a trailing slash.
pub(super) fn origin_of(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let origin = parsed.origin();
    origin
        .is_tuple()
        .then(|| format!("{}/", origin.ascii_serialization()))
}

/// A probe that was bounced to the home page did not find the path.
pub(super) fn redirected_home(requested: &str, final_url: &Url) -> bool {
    let Ok(requested) = Url::parse(requested) else {
        return false;
    };
    let requested_path = requested.path().trim_end_matches('/');
    let final_path = final_url.path().trim_end_matches('/');
    !requested_path.is_empty() && final_path.is_empty()
}
