mod support;

use std::time::{Duration, Instant};

use chrono::{DateTime, TimeZone, Utc};
use event_digest::error::AppError;
use event_digest::models::Config;
use event_digest::pipeline::{build_digest, deliver_digest};
use event_digest::services::{PageFetcher, PageSource, StopReason, WebhookNotifier};
use event_digest::utils::http::{create_listing_client, create_webhook_client};

use support::{MockServer, Reply};

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 10, 0, 0, 0).unwrap()
}

fn config_for(listing: &MockServer, webhook: Option<&MockServer>) -> Config {
    let mut config = Config::default();
    config.source.base_url = listing.url("/events-upcoming");
    config.source.name = Some("Expo Centre".to_string());
    config.source.retry_backoff_ms = 10;
    config.notifier.webhook_url = webhook.map(|w| w.url("/hook"));
    config
}

fn fetcher(config: &Config) -> PageFetcher {
    let client = create_listing_client(&config.source).unwrap();
    PageFetcher::new(client, &config.source).unwrap()
}

const THREE_EVENTS: &str = r#"<html><body>
<div class="view-content">
  <div class="views-row">
    <h3><a href="/node/101">Lahore Auto Show</a></h3>
    <time datetime="2024-06-12T05:00:00Z">Jun 12, 2024</time>
    <time datetime="2024-06-13T13:00:00Z">Jun 13, 2024</time>
    <a href="https://organizer.example.com" target="_blank">Organizer</a>
  </div>
  <div class="views-row">
    <h3><a href="/node/102">Textile Week</a></h3>
    <time datetime="2024-07-01T05:00:00Z">Jul 01, 2024</time>
  </div>
  <div class="views-row">
    <h3><a href="/node/103">Garden Fair</a></h3>
    <time datetime="sometime soon">TBA</time>
  </div>
</div>
</body></html>"#;

#[tokio::test]
async fn fetcher_retries_503_then_succeeds() {
    let listing = MockServer::start(vec![
        Reply::new(503, "busy"),
        Reply::ok("<html>ok</html>"),
    ])
    .await;
    let config = config_for(&listing, None);

    let body = fetcher(&config).fetch_page(0).await.unwrap();
    assert_eq!(body, "<html>ok</html>");
    assert_eq!(listing.requests().len(), 2);
}

#[tokio::test]
async fn fetcher_gives_up_after_three_503s() {
    let listing = MockServer::start(vec![
        Reply::new(503, "busy"),
        Reply::new(503, "busy"),
        Reply::new(503, "busy"),
        Reply::ok("<html>too late</html>"),
    ])
    .await;
    let config = config_for(&listing, None);

    let err = fetcher(&config).fetch_page(0).await.unwrap_err();
    assert!(matches!(err, AppError::Fetch { page: 0, .. }));
    assert_eq!(listing.requests().len(), 3);
}

#[tokio::test]
async fn fetcher_does_not_retry_other_errors() {
    let listing = MockServer::start(vec![Reply::new(500, "boom"), Reply::ok("unused")]).await;
    let config = config_for(&listing, None);

    let err = fetcher(&config).fetch_page(0).await.unwrap_err();
    assert!(err.to_string().contains("500"));
    assert_eq!(listing.requests().len(), 1);
}

#[tokio::test]
async fn fetcher_requests_page_query() {
    let listing = MockServer::start(vec![Reply::ok("<html></html>")]).await;
    let config = config_for(&listing, None);

    fetcher(&config).fetch_page(2).await.unwrap();
    let requests = listing.requests();
    assert_eq!(requests[0].method, "GET");
    assert_eq!(requests[0].target, "/events-upcoming?page=2");
}

#[tokio::test]
async fn fetcher_timeout_is_not_retried() {
    let listing = MockServer::start(vec![
        Reply::ok("<html>late</html>").stalled(Duration::from_secs(5)),
        Reply::ok("<html>unused</html>"),
    ])
    .await;
    let mut config = config_for(&listing, None);
    config.source.timeout_secs = 1;

    let started = Instant::now();
    let err = fetcher(&config).fetch_page(0).await.unwrap_err();
    assert!(matches!(err, AppError::Fetch { page: 0, .. }));
    assert!(started.elapsed() < Duration::from_secs(4));

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(listing.requests().len(), 1);
}

#[tokio::test]
async fn fetcher_connection_error_is_a_fetch_failure() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let mut config = Config::default();
    config.source.base_url = format!("http://{addr}/events-upcoming");
    config.source.retry_backoff_ms = 10;

    let err = fetcher(&config).fetch_page(1).await.unwrap_err();
    assert!(matches!(err, AppError::Fetch { page: 1, ref url, .. } if url.ends_with("?page=1")));
}

#[tokio::test]
async fn insecure_client_refuses_off_host_redirect() {
    let elsewhere = MockServer::start(vec![Reply::ok("<html>elsewhere</html>")]).await;
    let listing = MockServer::start(vec![Reply::redirect(format!(
        "http://localhost:{}/landing",
        elsewhere.port()
    ))])
    .await;
    let mut config = config_for(&listing, None);
    config.source.accept_invalid_certs = true;

    let err = fetcher(&config).fetch_page(0).await.unwrap_err();
    assert!(matches!(err, AppError::Fetch { page: 0, .. }));
    assert!(err.to_string().contains("302"));
    assert!(elsewhere.requests().is_empty());
}

#[tokio::test]
async fn insecure_client_follows_same_host_redirect() {
    let listing = MockServer::start(vec![
        Reply::redirect("/events-moved"),
        Reply::ok("<html>moved</html>"),
    ])
    .await;
    let mut config = config_for(&listing, None);
    config.source.accept_invalid_certs = true;

    let body = fetcher(&config).fetch_page(0).await.unwrap();
    assert_eq!(body, "<html>moved</html>");

    let targets: Vec<_> = listing.requests().into_iter().map(|r| r.target).collect();
    assert_eq!(targets, vec!["/events-upcoming", "/events-moved"]);
}

#[tokio::test]
async fn notifier_accepts_only_200() {
    let webhook = MockServer::start(vec![Reply::ok("ok"), Reply::new(500, "invalid_payload")]).await;
    let client = create_webhook_client(&Config::default().notifier).unwrap();
    let url = webhook.url("/hook");
    let notifier = WebhookNotifier::new(client, Some(url.as_str())).unwrap();

    let delivered = notifier.deliver("hello").await.unwrap();
    assert_eq!(delivered.status, 200);
    assert_eq!(delivered.body, "ok");

    let err = notifier.deliver("hello again").await.unwrap_err();
    assert!(
        matches!(err, AppError::Delivery { status: 500, ref body } if body == "invalid_payload")
    );

    let requests = webhook.requests();
    assert_eq!(requests[0].method, "POST");
    let payload: serde_json::Value = serde_json::from_str(&requests[0].body).unwrap();
    assert_eq!(payload, serde_json::json!({ "text": "hello" }));
}

#[tokio::test]
async fn notifier_reports_unreadable_error_body() {
    let webhook = MockServer::start(vec![Reply::new(500, "partial").truncated()]).await;
    let client = create_webhook_client(&Config::default().notifier).unwrap();
    let url = webhook.url("/hook");
    let notifier = WebhookNotifier::new(client, Some(url.as_str())).unwrap();

    let err = notifier.deliver("hello").await.unwrap_err();
    assert!(
        matches!(err, AppError::Delivery { status: 500, ref body } if body.starts_with("<unreadable response body"))
    );
}

#[tokio::test]
async fn digest_lists_only_in_window_event() {
    let listing = MockServer::start(vec![Reply::ok(THREE_EVENTS)]).await;
    let webhook = MockServer::start(vec![Reply::ok("ok")]).await;
    let config = config_for(&listing, Some(&webhook));

    let summary = deliver_digest(&fetcher(&config), &config, now())
        .await
        .unwrap();
    assert!(summary.delivered);
    assert_eq!(summary.collected, 3);
    assert_eq!(summary.kept, 1);
    assert_eq!(summary.out_of_window, 1);
    assert_eq!(summary.unparseable, 1);
    assert_eq!(summary.stop, StopReason::NoPagination);

    let payload: serde_json::Value =
        serde_json::from_str(&webhook.requests()[0].body).unwrap();
    let text = payload["text"].as_str().unwrap();
    assert!(text.contains("Upcoming Events at Expo Centre - Next 3 Days"));
    assert!(text.contains("*1. Lahore Auto Show*"));
    assert!(text.contains("Jun 12, 2024 → Jun 13, 2024"));
    assert!(text.contains("Details: http://127.0.0.1:"));
    assert!(!text.contains("2. "));
    assert!(!text.contains("Textile Week"));
    assert!(!text.contains("Garden Fair"));
}

#[tokio::test]
async fn empty_digest_is_still_delivered() {
    let listing = MockServer::start(vec![Reply::ok("<html><body></body></html>")]).await;
    let webhook = MockServer::start(vec![Reply::ok("ok")]).await;
    let config = config_for(&listing, Some(&webhook));

    let summary = deliver_digest(&fetcher(&config), &config, now())
        .await
        .unwrap();
    assert!(summary.delivered);
    assert_eq!(summary.stop, StopReason::Exhausted);

    let payload: serde_json::Value =
        serde_json::from_str(&webhook.requests()[0].body).unwrap();
    assert!(payload["text"].as_str().unwrap().contains("No events found"));
}

#[tokio::test]
async fn missing_webhook_fails_before_fetching() {
    let listing = MockServer::start(vec![Reply::ok(THREE_EVENTS)]).await;
    let config = config_for(&listing, None);

    let err = deliver_digest(&fetcher(&config), &config, now())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Config(_)));
    assert!(listing.requests().is_empty());
}

#[tokio::test]
async fn webhook_failure_fails_the_run() {
    let listing = MockServer::start(vec![Reply::ok(THREE_EVENTS)]).await;
    let webhook = MockServer::start(vec![Reply::new(500, "server error")]).await;
    let config = config_for(&listing, Some(&webhook));

    let err = deliver_digest(&fetcher(&config), &config, now())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Delivery { status: 500, .. }));
}

#[tokio::test]
async fn failed_second_page_keeps_first_page_events() {
    let first_page = THREE_EVENTS.replace(
        "</body>",
        r#"<nav class="pager"><a rel="next" href="?page=1">Next</a></nav></body>"#,
    );
    let listing = MockServer::start(vec![Reply::ok(first_page), Reply::new(404, "gone")]).await;
    let config = config_for(&listing, None);

    let digest = build_digest(&fetcher(&config), &config, now()).await.unwrap();
    assert!(matches!(digest.summary.stop, StopReason::FetchFailed(_)));
    assert_eq!(digest.summary.pages_fetched, 1);
    assert_eq!(digest.summary.collected, 3);
    assert_eq!(digest.events.len(), 1);

    let targets: Vec<_> = listing.requests().into_iter().map(|r| r.target).collect();
    assert_eq!(targets, vec!["/events-upcoming", "/events-upcoming?page=1"]);
}
