use axum::extract::{Query, State};
use axum::http::{HeaderName, StatusCode, header};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use libremore::adapters::calil::CalilProvider;
use libremore::adapters::feeds::{CiniiFeed, NdlFeed};
use libremore::adapters::http::create_http_client;
use libremore::ports::{AvailabilityProvider, MetadataFeed};
use serde_json::json;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

// ============================================================================
// テスト用のローカルHTTPサーバー
// ============================================================================

type Recorded = Arc<Mutex<Vec<HashMap<String, String>>>>;

const NDL_RSS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0" xmlns:dc="http://purl.org/dc/elements/1.1/"
     xmlns:dcterms="http://purl.org/dc/terms/"
     xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">
  <channel>
    <title>NDL Search</title>
    <item>
      <title>統計学入門</title>
      <author>山田 太郎</author>
      <dc:publisher>東京大学出版会</dc:publisher>
      <dcterms:issued>1991</dcterms:issued>
      <dc:identifier xsi:type="dcndl:ISBN">978-4-13-042065-5</dc:identifier>
    </item>
    <item>
      <title>ISBNなし</title>
    </item>
  </channel>
</rss>"#;

const CINII_RSS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0" xmlns:dc="http://purl.org/dc/elements/1.1/">
  <channel>
    <item>
      <title>はじめての機械学習</title>
      <dc:creator>佐藤 花子</dc:creator>
      <dc:date>2018</dc:date>
      <description>ISBN:9784000000019</description>
    </item>
  </channel>
</rss>"#;

async fn calil_check(
    State(recorded): State<Recorded>,
    Query(params): Query<HashMap<String, String>>,
) -> impl IntoResponse {
    let has_session = params.contains_key("session");
    recorded.lock().unwrap().push(params);
    if has_session {
        Json(json!({
            "session": "s1",
            "continue": 0,
            "books": {"9784000000019": {"Sys-1": {"status": "OK", "libkey": {"本館": "貸出可"}}}}
        }))
    } else {
        Json(json!({"session": "s1", "continue": 1, "books": {}}))
    }
}

fn rss(
    recorded: &Recorded,
    params: HashMap<String, String>,
    body: &'static str,
) -> ([(HeaderName, &'static str); 1], &'static str) {
    recorded.lock().unwrap().push(params);
    ([(header::CONTENT_TYPE, "application/rss+xml")], body)
}

async fn ndl_search(
    State(recorded): State<Recorded>,
    Query(params): Query<HashMap<String, String>>,
) -> impl IntoResponse {
    rss(&recorded, params, NDL_RSS)
}

async fn cinii_search(
    State(recorded): State<Recorded>,
    Query(params): Query<HashMap<String, String>>,
) -> impl IntoResponse {
    rss(&recorded, params, CINII_RSS)
}

async fn garbage() -> &'static str {
    "<rss><channel><item><title>x"
}

async fn broken() -> StatusCode {
    StatusCode::INTERNAL_SERVER_ERROR
}

/// 127.0.0.1の空きポートでサーバーを起動し、ベースURLを返す
async fn spawn_server(recorded: Recorded) -> String {
    let app = Router::new()
        .route("/calil/check", get(calil_check))
        .route("/ndl", get(ndl_search))
        .route("/cinii", get(cinii_search))
        .route("/broken/check", get(broken))
        .route("/broken", get(broken))
        .route("/garbage", get(garbage))
        .with_state(recorded);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

fn client() -> reqwest::Client {
    create_http_client(Duration::from_secs(5)).unwrap()
}

// ============================================================================
// Calil
// ============================================================================

#[tokio::test]
async fn test_calil_check_then_poll() {
    let recorded = Recorded::default();
    let base = spawn_server(recorded.clone()).await;
    let provider = CalilProvider::new(client(), &format!("{}/calil/", base), "test-key");

    let started = provider
        .check(
            &["9784000000019".to_string(), "9784000000026".to_string()],
            &["Sys-1".to_string(), "Sys-2".to_string()],
        )
        .await
        .unwrap();
    assert!(started.should_continue());
    assert_eq!(started.session.as_deref(), Some("s1"));

    let finished = provider.poll("s1").await.unwrap();
    assert!(!finished.should_continue());
    assert_eq!(finished.books["9784000000019"]["Sys-1"]["status"], "OK");

    let requests = recorded.lock().unwrap().clone();
    assert_eq!(requests.len(), 2);

    let check = &requests[0];
    assert_eq!(check["appkey"], "test-key");
    assert_eq!(check["isbn"], "9784000000019,9784000000026");
    assert_eq!(check["systemid"], "Sys-1,Sys-2");
    assert_eq!(check["format"], "json");
    assert_eq!(check["callback"], "no");

    let poll = &requests[1];
    assert_eq!(poll["session"], "s1");
    assert_eq!(poll["callback"], "no");
    assert!(!poll.contains_key("isbn"));
}

#[tokio::test]
async fn test_calil_server_error_is_an_error() {
    let base = spawn_server(Recorded::default()).await;
    let provider = CalilProvider::new(client(), &format!("{}/broken", base), "test-key");

    let result = provider
        .check(&["9784000000019".to_string()], &["Sys-1".to_string()])
        .await;

    assert!(result.is_err());
}

// ============================================================================
// フィード
// ============================================================================

#[tokio::test]
async fn test_ndl_feed_fetches_and_parses() {
    let recorded = Recorded::default();
    let base = spawn_server(recorded.clone()).await;
    let feed = NdlFeed::new(client(), &format!("{}/ndl", base));

    let candidates = feed.search("統計 入門", 30).await;

    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].isbn13, "9784130420655");
    assert_eq!(candidates[0].title.as_deref(), Some("統計学入門"));
    assert_eq!(candidates[0].pubyear, Some(1991));

    let requests = recorded.lock().unwrap().clone();
    assert_eq!(requests[0]["q"], "統計 入門");
    assert_eq!(requests[0]["cnt"], "30");
}

#[tokio::test]
async fn test_cinii_feed_fetches_and_parses() {
    let recorded = Recorded::default();
    let base = spawn_server(recorded.clone()).await;
    let feed = CiniiFeed::new(client(), &format!("{}/cinii", base));

    let candidates = feed.search("機械学習", 20).await;

    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].isbn13, "9784000000019");
    assert_eq!(candidates[0].author.as_deref(), Some("佐藤 花子"));
    assert_eq!(candidates[0].pubyear, Some(2018));

    let requests = recorded.lock().unwrap().clone();
    assert_eq!(requests[0]["title"], "機械学習");
    assert_eq!(requests[0]["count"], "20");
    assert_eq!(requests[0]["format"], "rss");
}

#[tokio::test]
async fn test_feed_failures_yield_empty_results() {
    let base = spawn_server(Recorded::default()).await;

    let ndl = NdlFeed::new(client(), &format!("{}/broken", base));
    assert!(ndl.search("統計", 30).await.is_empty());

    let cinii = CiniiFeed::new(client(), &format!("{}/garbage", base));
    assert!(cinii.search("統計", 20).await.is_empty());

    // 接続できないホスト
    let unreachable = NdlFeed::new(client(), "http://127.0.0.1:9/ndl");
    assert!(unreachable.search("統計", 30).await.is_empty());
}
