//! Integration tests for the HTTP API
//!
//! Serves the router on an ephemeral port with stub fetchers so no network
//! access is needed.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use daily_content::api;
use daily_content::cache::ContentCache;
use daily_content::content::{fallback, ContentKind, Item, Theme};
use daily_content::fetch::{ContentFetcher, SourceAggregator};
use daily_content::service::ContentService;

/// Returns scraped-looking items once `online` is set, nothing before
struct SwitchableFetcher {
    online: AtomicBool,
}

#[async_trait]
impl ContentFetcher for SwitchableFetcher {
    async fn fetch(&self, kind: ContentKind) -> Vec<Item> {
        if !self.online.load(Ordering::SeqCst) {
            return Vec::new();
        }
        let text = match kind {
            ContentKind::Quotes => "Silence is the language of god, all else is poor translation.",
            ContentKind::GoodDeeds => "Plant a tree or tend to a garden",
        };
        vec![Item::new(text, Theme::Spiritual).unwrap()]
    }
}

async fn spawn_server(fetcher: Arc<dyn ContentFetcher>) -> String {
    let service = Arc::new(ContentService::new(Arc::new(ContentCache::new()), fetcher));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, api::router(service)).await.unwrap();
    });
    format!("http://{}", addr)
}

async fn get_json(url: &str) -> (reqwest::StatusCode, Value) {
    let response = reqwest::get(url).await.unwrap();
    let status = response.status();
    (status, response.json::<Value>().await.unwrap())
}

fn fallback_texts(kind: ContentKind) -> Vec<String> {
    fallback(kind)
        .items()
        .iter()
        .map(|i| i.text().to_string())
        .collect()
}

#[tokio::test]
async fn test_daily_content_on_fresh_process_uses_fallback() {
    let base = spawn_server(Arc::new(SourceAggregator::default())).await;

    let (status, body) = get_json(&format!("{}/api/daily-content", base)).await;

    assert_eq!(status, reqwest::StatusCode::OK);
    assert_eq!(body["status"], "success");
    let quote = body["quote"]["text"].as_str().unwrap();
    let deed = body["goodDeed"]["text"].as_str().unwrap();
    assert!(fallback_texts(ContentKind::Quotes).iter().any(|t| t == quote));
    assert!(fallback_texts(ContentKind::GoodDeeds).iter().any(|t| t == deed));
    assert!(body["quote"]["author"].is_string());
    assert_eq!(body["goodDeed"]["difficulty"], "easy");
    assert!(body["date"].as_str().unwrap().contains('T'));
}

#[tokio::test]
async fn test_daily_content_is_stable_across_calls() {
    let base = spawn_server(Arc::new(SourceAggregator::default())).await;
    let url = format!("{}/api/daily-content", base);

    let (_, first) = get_json(&url).await;
    let (_, second) = get_json(&url).await;

    assert_eq!(first["quote"], second["quote"]);
    assert_eq!(first["goodDeed"], second["goodDeed"]);
}

#[tokio::test]
async fn test_random_endpoints() {
    let base = spawn_server(Arc::new(SourceAggregator::default())).await;

    let (status, quote) = get_json(&format!("{}/api/random-quote", base)).await;
    assert_eq!(status, reqwest::StatusCode::OK);
    assert_eq!(quote["status"], "success");
    assert_eq!(quote["quote"]["category"], "spiritual");
    assert!(quote.get("goodDeed").is_none());

    let (status, deed) = get_json(&format!("{}/api/random-deed", base)).await;
    assert_eq!(status, reqwest::StatusCode::OK);
    assert_eq!(deed["status"], "success");
    let text = deed["goodDeed"]["text"].as_str().unwrap();
    assert!(fallback_texts(ContentKind::GoodDeeds).iter().any(|t| t == text));
}

#[tokio::test]
async fn test_update_content_switches_from_fallback_to_fetched() {
    let fetcher = Arc::new(SwitchableFetcher {
        online: AtomicBool::new(false),
    });
    let base = spawn_server(fetcher.clone()).await;

    let (_, body) = get_json(&format!("{}/api/random-quote", base)).await;
    let text = body["quote"]["text"].as_str().unwrap().to_string();
    assert!(fallback_texts(ContentKind::Quotes).contains(&text));

    fetcher.online.store(true, Ordering::SeqCst);
    let (status, update) = get_json(&format!("{}/api/update-content", base)).await;
    assert_eq!(status, reqwest::StatusCode::OK);
    assert_eq!(update["status"], "success");
    assert_eq!(update["message"], "Content updated successfully");
    assert!(update["last_updated"].is_string());

    let (_, body) = get_json(&format!("{}/api/random-quote", base)).await;
    assert_eq!(
        body["quote"]["text"],
        "Silence is the language of god, all else is poor translation."
    );
}

#[tokio::test]
async fn test_responses_allow_any_origin() {
    let base = spawn_server(Arc::new(SourceAggregator::default())).await;

    let response = reqwest::get(format!("{}/api/random-quote", base)).await.unwrap();

    assert_eq!(
        response.headers().get("access-control-allow-origin").unwrap(),
        "*"
    );
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let base = spawn_server(Arc::new(SourceAggregator::default())).await;
    let response = reqwest::get(format!("{}/api/nothing", base)).await.unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::NOT_FOUND);
}
