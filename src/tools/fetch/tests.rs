use std::time::Duration;

use reqwest::StatusCode;
use wiremock::matchers::{header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::headers::{headers_for_profile, headers_with_referer};
use super::profile::FetchProfile;
use super::utils::{backoff_delay, jitter_ms, next_state, validate_response};
use super::*;
use crate::options::FetchOptions;

const PAGE: &str = "https://museum.org/events";

fn padded_html(marker: &str) -> String {
    let filler = "Lorem ipsum dolor sit amet, consectetur adipiscing elit. ";
    format!(
        "<!DOCTYPE html><html><body>{marker} {}</body></html>",
        filler.repeat(12)
    )
}

fn fast_options() -> FetchOptions {
    FetchOptions {
        request_timeout: Duration::from_secs(5),
        max_attempts: 2,
        backoff_base: Duration::from_millis(1),
        warmup_delay: Duration::from_millis(1),
        escalate: true,
    }
}

fn html_response(marker: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .insert_header("content-type", "text/html")
        .set_body_string(padded_html(marker))
}

#[test]
fn minimal_has_only_user_agent() {
    let headers = headers_for_profile(FetchProfile::Minimal);
    assert!(headers.contains_key("user-agent"));
    assert_eq!(headers.len(), 1);
}

#[test]
fn windows_has_chrome_headers() {
    let headers = headers_for_profile(FetchProfile::Windows);
    assert!(headers.contains_key("sec-ch-ua"));
    assert_eq!(
        headers
            .get("sec-ch-ua-platform")
            .and_then(|v| v.to_str().ok()),
        Some("\"Windows\"")
    );
}

#[test]
fn stealth_has_full_suite_and_referer() {
    let headers = headers_with_referer(FetchProfile::Stealth, "https://museum.org/");
    assert!(headers.contains_key("sec-ch-ua-full-version-list"));
    assert!(headers.contains_key("sec-ch-ua-bitness"));
    assert_eq!(
        headers.get("referer").and_then(|v| v.to_str().ok()),
        Some("https://museum.org/")
    );
    assert_eq!(
        headers.get("sec-fetch-site").and_then(|v| v.to_str().ok()),
        Some("same-origin")
    );
}

#[test]
fn jitter_returns_within_range() {
    for _ in 0..100 {
        let result = jitter_ms(100);
        assert!(result < 100, "jitter_ms returned {}", result);
    }
    assert_eq!(jitter_ms(0), 0);
}

#[test]
fn backoff_doubles_per_attempt() {
    let base = Duration::from_millis(400);
    let first = backoff_delay(base, 1);
    let second = backoff_delay(base, 2);
    let third = backoff_delay(base, 3);
    assert!(first >= base && first < base + Duration::from_millis(100));
    assert!(second >= base * 2 && second < base * 2 + Duration::from_millis(100));
    assert!(third >= base * 4 && third < base * 4 + Duration::from_millis(100));
}

#[test]
fn state_machine_transitions() {
    let opts = FetchOptions::default();
    let status = |status| FetchError::Status {
        url: PAGE.into(),
        status,
    };

    assert_eq!(next_state(&status(404), 1, &opts), FetchState::Failed);
    assert_eq!(next_state(&status(410), 1, &opts), FetchState::Failed);
    assert_eq!(
        next_state(&FetchError::Dns { url: PAGE.into() }, 1, &opts),
        FetchState::Failed
    );
    assert_eq!(next_state(&status(403), 1, &opts), FetchState::Escalated);
    assert_eq!(
        next_state(&status(503), 1, &opts),
        FetchState::Retrying { attempt: 1 }
    );
    assert_eq!(next_state(&status(429), 3, &opts), FetchState::Escalated);
    assert_eq!(next_state(&status(400), 1, &opts), FetchState::Failed);

    let no_escalation = FetchOptions {
        escalate: false,
        ..FetchOptions::default()
    };
    assert_eq!(next_state(&status(403), 1, &no_escalation), FetchState::Failed);
    assert_eq!(next_state(&status(500), 3, &no_escalation), FetchState::Failed);
}

#[test]
fn is_suspicious_cloudflare_challenge() {
    let html = padded_html("Checking your browser before accessing... cf-browser-verification");
    let err = validate_response(PAGE, StatusCode::OK, &html).unwrap_err();
    assert!(err.is_blocked());
    assert!(err.to_string().contains("suspicious"));
}

#[test]
fn is_unauthorized_access_denied() {
    let html = padded_html("<h1>Access Denied</h1>");
    let err = validate_response(PAGE, StatusCode::OK, &html).unwrap_err();
    assert!(err.is_blocked());
    assert!(err.to_string().contains("access denied"));
}

#[test]
fn long_pages_may_mention_access() {
    let mut html = padded_html("Members get unauthorized previews? No: access denied to none.");
    html.push_str(&"<p>Exhibition text.</p>".repeat(1200));
    assert!(validate_response(PAGE, StatusCode::OK, &html).is_ok());
}

#[test]
fn small_client_rendered_shell_is_valid() {
    let html = r#"<!doctype html><html><head><script src="/app.js"></script></head><body><div id="root"></div></body></html>"#;
    assert!(validate_response(PAGE, StatusCode::OK, html).is_ok());
}

#[test]
fn rejects_status_short_and_non_html() {
    let html = padded_html("ok");
    let err = validate_response(PAGE, StatusCode::NOT_FOUND, &html).unwrap_err();
    assert_eq!(
        err,
        FetchError::Status {
            url: PAGE.into(),
            status: 404
        }
    );

    let err = validate_response(PAGE, StatusCode::OK, "<html></html>").unwrap_err();
    assert!(err.to_string().contains("body is too short"));

    let json = format!("{{\"data\": \"{}\"}}", "x".repeat(200));
    let err = validate_response(PAGE, StatusCode::OK, &json).unwrap_err();
    assert!(err.to_string().contains("missing HTML markers"));
}

#[tokio::test]
async fn fetch_returns_page_on_first_attempt() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/events"))
        .respond_with(html_response("Gallery Talk"))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = PageFetcher::new(fast_options()).unwrap();
    let result = fetcher.fetch(&format!("{}/events", server.uri())).await.unwrap();
    assert!(result.html.contains("Gallery Talk"));
    assert_eq!(result.attempts, 1);
    assert!(!result.escalated);
    assert_eq!(result.profile_used, FetchProfile::Windows);
    assert_eq!(result.render_mode, RenderMode::ServerRendered);
}

#[tokio::test]
async fn not_found_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = PageFetcher::new(fast_options()).unwrap();
    let err = fetcher
        .fetch(&format!("{}/gone", server.uri()))
        .await
        .unwrap_err();
    assert!(err.is_terminal());
}

#[tokio::test]
async fn server_errors_retry_then_escalate() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/events"))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_response("Home"))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = PageFetcher::new(fast_options()).unwrap();
    let err = fetcher
        .fetch(&format!("{}/events", server.uri()))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        FetchError::Status {
            url: format!("{}/events", server.uri()),
            status: 503
        }
    );
}

#[tokio::test]
async fn forbidden_escalates_with_warmed_session() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/events"))
        .and(header_exists("referer"))
        .respond_with(html_response("Curator Talk"))
        .with_priority(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/events"))
        .respond_with(ResponseTemplate::new(403))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_response("Home"))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = PageFetcher::new(fast_options()).unwrap();
    let result = fetcher
        .fetch(&format!("{}/events", server.uri()))
        .await
        .unwrap();
    assert!(result.escalated);
    assert_eq!(result.attempts, 2);
    assert_eq!(result.profile_used, FetchProfile::Stealth);
    assert!(result.html.contains("Curator Talk"));
}

#[tokio::test]
async fn challenge_without_escalation_fails_blocked() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/events"))
        .respond_with(html_response("Please complete the captcha"))
        .expect(1)
        .mount(&server)
        .await;

    let options = FetchOptions {
        escalate: false,
        ..fast_options()
    };
    let fetcher = PageFetcher::new(options).unwrap();
    let err = fetcher
        .fetch(&format!("{}/events", server.uri()))
        .await
        .unwrap_err();
    assert!(err.is_blocked());
}

#[tokio::test]
async fn probe_uses_head_and_falls_back_to_get() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .and(path("/exhibitions"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    Mock::given(method("HEAD"))
        .and(path("/tours"))
        .respond_with(ResponseTemplate::new(405))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/tours"))
        .respond_with(html_response("Tours"))
        .mount(&server)
        .await;
    Mock::given(method("HEAD"))
        .and(path("/talks"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let fetcher = PageFetcher::new(fast_options()).unwrap();
    assert!(fetcher.probe(&format!("{}/exhibitions", server.uri())).await);
    assert!(fetcher.probe(&format!("{}/tours", server.uri())).await);
    assert!(!fetcher.probe(&format!("{}/talks", server.uri())).await);
}

#[tokio::test]
async fn probe_rejects_redirect_to_home() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .and(path("/whats-on"))
        .respond_with(
            ResponseTemplate::new(302).insert_header("location", format!("{}/", server.uri())),
        )
        .mount(&server)
        .await;
    Mock::given(method("HEAD"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let fetcher = PageFetcher::new(fast_options()).unwrap();
    assert!(!fetcher.probe(&format!("{}/whats-on", server.uri())).await);
}

#[tokio::test]
async fn fetch_text_returns_raw_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<urlset></urlset>"))
        .mount(&server)
        .await;

    let fetcher = PageFetcher::new(fast_options()).unwrap();
    let body = fetcher
        .fetch_text(&format!("{}/sitemap.xml", server.uri()))
        .await
        .unwrap();
    assert_eq!(body, "<urlset></urlset>");
    assert!(fetcher
        .fetch_text(&format!("{}/missing.xml", server.uri()))
        .await
        .is_err());
}
