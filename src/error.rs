use thiserror::Error;

pub type Result<T> = std::result::Result<T, ScoutError>;

/// Errors that abort a venue call.
///
/// Network, parse and validation failures for individual pages are absorbed
/// inside the engine; only configuration problems reach the caller.
#[derive(Debug, Error)]
pub enum ScoutError {
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    #[error("missing domain in URL: {0}")]
    MissingDomain(String),
    #[error("configuration error: {0}")]
    Config(String),
}

/* Conversions so `?` works smoothly */
impl From<url::ParseError> for ScoutError {
    fn from(e: url::ParseError) -> Self {
        ScoutError::InvalidUrl(e.to_string())
    }
}
