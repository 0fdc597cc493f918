use super::profile::FetchProfile;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, REFERER, USER_AGENT};

const CHROME_UA: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/139.0.0.0 Safari/537.36";

const MINIMAL_UA: &str = "Mozilla/5.0 (compatible; venue-scout/0.1)";

const DOCUMENT_ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,image/apng,*/*;q=0.8";

/// Build complete header map for the given profile, including User-Agent.
pub(crate) fn headers_for_profile(profile: FetchProfile) -> HeaderMap {
    let mut headers = HeaderMap::new();

    for (k, v) in header_pairs_for_profile(profile) {
        let Ok(name) = HeaderName::from_bytes(k.to_ascii_lowercase().as_bytes()) else {
            continue;
        };
        if let Ok(val) = HeaderValue::from_str(v) {
            headers.insert(name, val);
        }
    }

    let ua = match profile {
        FetchProfile::Minimal => MINIMAL_UA,
        FetchProfile::Windows | FetchProfile::Stealth => CHROME_UA,
    };
    headers.insert(USER_AGENT, HeaderValue::from_static(ua));

    headers
}

/// Headers for a same-site navigation from `referer`.
pub(crate) fn headers_with_referer(profile: FetchProfile, referer: &str) -> HeaderMap {
    let mut headers = headers_for_profile(profile);
    if let Ok(value) = HeaderValue::from_str(referer) {
        headers.insert(REFERER, value);
        headers.insert(
            HeaderName::from_static("sec-fetch-site"),
            HeaderValue::from_static("same-origin"),
        );
    }
    headers
}

/// Header pairs for the given profile (without User-Agent).
fn header_pairs_for_profile(profile: FetchProfile) -> Vec<(&'static str, &'static str)> {
    match profile {
        FetchProfile::Minimal => Vec::new(),
        FetchProfile::Windows => vec![
            ("Accept", DOCUMENT_ACCEPT),
            ("Accept-Language", "en-US,en;q=0.9"),
            ("Upgrade-Insecure-Requests", "1"),
            ("Sec-Fetch-Dest", "document"),
            ("Sec-Fetch-Mode", "navigate"),
            ("Sec-Fetch-Site", "none"),
            ("Sec-Ch-Ua", "\"Not;A=Brand\";v=\"99\", \"Google Chrome\";v=\"139\", \"Chromium\";v=\"139\""),
            ("Sec-Ch-Ua-Mobile", "?0"),
            ("Sec-Ch-Ua-Platform", "\"Windows\""),
        ],
        FetchProfile::Stealth => vec![
            ("Accept", DOCUMENT_ACCEPT),
            ("Accept-Language", "en-US,en;q=0.9"),
            ("Cache-Control", "no-cache"),
            ("Pragma", "no-cache"),
            ("Upgrade-Insecure-Requests", "1"),
            ("Sec-Fetch-Dest", "document"),
            ("Sec-Fetch-Mode", "navigate"),
            ("Sec-Fetch-Site", "none"),
            ("Sec-Fetch-User", "?1"),
            ("Sec-Ch-Ua", "\"Not;A=Brand\";v=\"99\", \"Google Chrome\";v=\"139\", \"Chromium\";v=\"139\""),
            ("Sec-Ch-Ua-Mobile", "?0"),
            ("Sec-Ch-Ua-Platform", "\"Windows\""),
            ("Sec-Ch-Ua-Platform-Version", "\"15.0.0\""),
            ("Sec-Ch-Ua-Full-Version", "\"139.0.7258.127\""),
            ("Sec-Ch-Ua-Full-Version-List", "\"Not;A=Brand\";v=\"99.0.0.0\", \"Google Chrome\";v=\"139.0.7258.127\", \"Chromium\";v=\"139.0.7258.127\""),
            ("Sec-Ch-Ua-Arch", "\"x86\""),
            ("Sec-Ch-Ua-Bitness", "\"64\""),
            ("Sec-Ch-Ua-Model", "\"\""),
            ("Sec-Ch-Ua-Wow64", "?0"),
            ("Dnt", "1"),
        ],
    }
}
