//! HTTP API integration tests
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use readaloud_core::{Fetcher, HtmlDomBuilder, Pipeline, RawDocument, ReadaloudError, Result};
use readaloud_server::{AppState, router};
use serde_json::Value;
use tower::ServiceExt;
use url::Url;

const ARTICLE_URL: &str = "https%3A%2F%2Fblog.example.com%2Fposts%2Fownership";

fn fixture(name: &str) -> String {
    std::fs::read_to_string(format!("../../tests/fixtures/{}", name)).expect("fixture should exist")
}

/// Serves a fixed body, or fails, and counts how often it was asked.
struct StubFetcher {
    body: Option<String>,
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl Fetcher for StubFetcher {
    async fn fetch(&self, url: &Url) -> Result<RawDocument> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.body {
            Some(body) => Ok(RawDocument::from_html(body.clone(), url.clone())),
            None => Err(ReadaloudError::Timeout { timeout: 30 }),
        }
    }
}

fn app(body: Option<String>) -> (Router, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let fetcher = StubFetcher { body, calls: Arc::clone(&calls) };
    let state = AppState::new(Pipeline::new(fetcher, HtmlDomBuilder::default()), Duration::from_secs(5));
    (router(state), calls)
}

async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_fetch_url_success() {
    let (app, calls) = app(Some(fixture("article.html")));
    let (status, body) = get(app, &format!("/api/fetch-url?url={}", ARTICLE_URL)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Understanding Ownership in Rust");

    let text = body["textContent"].as_str().unwrap();
    assert!(!text.is_empty());
    assert!(text.chars().count() <= 10_000);
    assert!(!text.starts_with("Understanding Ownership in Rust"));
    assert!(!text.contains("doc.rust-lang.org"));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_missing_url_is_bad_request() {
    for uri in ["/api/fetch-url", "/api/fetch-url?url=", "/api/fetch-url?other=1"] {
        let (app, calls) = app(Some(fixture("article.html")));
        let (status, body) = get(app, uri).await;

        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(body, serde_json::json!({ "error": "URL required" }));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }
}

#[tokio::test]
async fn test_repeated_url_uses_first() {
    let (app, calls) = app(Some(fixture("article.html")));
    let uri = format!("/api/fetch-url?url={}&url=https%3A%2F%2Fother.example.com%2F", ARTICLE_URL);
    let (status, body) = get(app, &uri).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Understanding Ownership in Rust");
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_malformed_query_answers_json() {
    let (app, calls) = app(Some(fixture("article.html")));
    let (status, body) = get(app, "/api/fetch-url?url=%ZZ%&url").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, serde_json::json!({ "error": "Failed to extract blog" }));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_concurrent_requests() {
    let (app, calls) = app(Some(fixture("article.html")));
    let uri = format!("/api/fetch-url?url={}", ARTICLE_URL);

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let app = app.clone();
            let uri = uri.clone();
            tokio::spawn(async move { get(app, &uri).await })
        })
        .collect();

    for handle in handles {
        let (status, body) = handle.await.unwrap();
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["title"], "Understanding Ownership in Rust");
    }
    assert_eq!(calls.load(Ordering::SeqCst), 8);
}

#[tokio::test]
async fn test_invalid_url_skips_pipeline() {
    for url in ["not-a-url", "ftp%3A%2F%2Fexample.com%2Ffile"] {
        let (app, calls) = app(Some(fixture("article.html")));
        let (status, body) = get(app, &format!("/api/fetch-url?url={}", url)).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, serde_json::json!({ "error": "Failed to extract blog" }));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }
}

#[tokio::test]
async fn test_navigation_only_page() {
    let (app, _) = app(Some(fixture("nav_only.html")));
    let (status, body) = get(app, &format!("/api/fetch-url?url={}", ARTICLE_URL)).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, serde_json::json!({ "error": "Failed to extract blog" }));
}

#[tokio::test]
async fn test_fetch_failure_is_generic() {
    let (app, calls) = app(None);
    let (status, body) = get(app, &format!("/api/fetch-url?url={}", ARTICLE_URL)).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Failed to extract blog");
    assert!(!body.to_string().contains("timed out"));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_repeated_requests_match() {
    let (app, _) = app(Some(fixture("article.html")));
    let uri = format!("/api/fetch-url?url={}", ARTICLE_URL);

    let (_, first) = get(app.clone(), &uri).await;
    let (_, second) = get(app, &uri).await;
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_health() {
    let (app, _) = app(None);
    let (status, body) = get(app, "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_cors_headers() {
    let (app, _) = app(None);
    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .header("origin", "http://localhost:5173")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.headers()["access-control-allow-origin"], "*");
}
