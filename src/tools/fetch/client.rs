use super::profile::FetchProfile;
use super::types::FetchError;
use reqwest::{redirect, Client};
use std::time::Duration;

const REDIRECT_LIMIT: usize = 10;
const POOL_IDLE_TIMEOUT_SEC: u64 = 30;
const POOL_MAX_IDLE_PER_HOST: usize = 8;

/// Build a reqwest client for the given profile.
///
/// Clients live for one venue call, so the pool stays small.
pub(crate) fn build_client_for_profile(
    profile: FetchProfile,
    timeout: Duration,
) -> Result<Client, FetchError> {
    let builder = Client::builder()
        .cookie_store(true)
        .redirect(redirect::Policy::limited(REDIRECT_LIMIT))
        .gzip(true)
        .brotli(true)
        .deflate(true)
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(10)))
        .pool_idle_timeout(Duration::from_secs(POOL_IDLE_TIMEOUT_SEC))
        .pool_max_idle_per_host(POOL_MAX_IDLE_PER_HOST);

    let builder = match profile {
        FetchProfile::Minimal => builder
            .cookie_store(false)
            .redirect(redirect::Policy::limited(5)),
        FetchProfile::Windows | FetchProfile::Stealth => builder,
    };

    builder
        .build()
        .map_err(|e| FetchError::Client(e.to_string()))
}
