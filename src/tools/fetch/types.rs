use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use super::profile::FetchProfile;
pub use crate::tools::render::RenderMode;

/// Why a fetch did not produce a usable page.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("DNS lookup failed for {url}")]
    Dns { url: String },

    #[error("request to {url} timed out")]
    Timeout { url: String },

    #[error("connection to {url} failed: {message}")]
    Connect { url: String, message: String },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("{url} served a bot challenge ({reason})")]
    Blocked { url: String, reason: String },

    #[error("{url} returned unusable content: {reason}")]
    InvalidContent { url: String, reason: String },

    #[error("request to {url} failed: {message}")]
    Request { url: String, message: String },

    #[error("failed to build HTTP client: {0}")]
    Client(String),
}

impl FetchError {
    /// Nothing will change on retry: the host or page does not exist.
    pub fn is_terminal(&self) -> bool {
        match self {
            Self::Dns { .. } | Self::Client(_) => true,
            Self::Status { status, .. } => matches!(status, 404 | 410),
            _ => false,
        }
    }

    /// The site recognized us as a bot.
    pub fn is_blocked(&self) -> bool {
        match self {
            Self::Blocked { .. } => true,
            Self::Status { status, .. } => matches!(status, 401 | 403),
            _ => false,
        }
    }

    /// Transient failure worth another direct attempt.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout { .. } | Self::Connect { .. } | Self::Request { .. } => true,
            Self::Status { status, .. } => *status == 429 || (500..600).contains(status),
            _ => false,
        }
    }
}

/// Position in the retry/escalation state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchState {
    Direct,
    Retrying { attempt: u32 },
    Escalated,
    Failed,
}

/// Result of a fetch operation including telemetry metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchResult {
    /// The fetched HTML content
    pub html: String,
    /// URL after redirects
    pub final_url: String,
    /// The profile that succeeded
    pub profile_used: FetchProfile,
    /// Total duration in milliseconds
    pub duration_ms: u64,
    /// Requests sent for this page, including the failed ones
    pub attempts: u32,
    /// Whether the bot-protection session was needed
    pub escalated: bool,
    /// Whether the body looks like a JavaScript shell
    pub render_mode: RenderMode,
}

impl FetchResult {
    pub fn into_html(self) -> String {
        self.html
    }
}
