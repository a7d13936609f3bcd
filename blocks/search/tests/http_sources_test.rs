//! Integration tests for the HTTP-backed sources and the search handler.
//!
//! The index store and the external catalog are served by a wiremock server,
//! so these exercise real reqwest round trips, status handling and decoding.

use std::sync::Arc;
use std::time::Duration;

use gallery_atoms::query::SearchParams;
use lambda_http::Body;
use search_block::http::search_handler;
use search_block::{
    DanbooruClient, EngineSettings, ExternalCatalog, FetchError, HttpIndexStore, IndexStore,
    MemoryIndexStore, SearchCaches, SearchEngine, SearchResponse, TagIndexLayout,
};
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TIMEOUT: Duration = Duration::from_secs(5);
const SHORT_TIMEOUT: Duration = Duration::from_millis(100);
const SLOW_RESPONSE: Duration = Duration::from_millis(1000);

fn http_store(server: &MockServer) -> HttpIndexStore {
    http_store_with_timeout(server, TIMEOUT)
}

fn http_store_with_timeout(server: &MockServer, timeout: Duration) -> HttpIndexStore {
    HttpIndexStore::new(reqwest::Client::new(), &server.uri(), "indices", timeout)
}

fn danbooru(server: &MockServer) -> DanbooruClient {
    danbooru_with_timeout(server, TIMEOUT)
}

fn danbooru_with_timeout(server: &MockServer, timeout: Duration) -> DanbooruClient {
    DanbooruClient::new(reqwest::Client::new(), &server.uri(), "gallery-test/1.0", timeout)
}

fn body_json(body: &Body) -> serde_json::Value {
    match body {
        Body::Text(text) => serde_json::from_str(text).expect("json body"),
        Body::Binary(bytes) => serde_json::from_slice(bytes).expect("json body"),
        Body::Empty => serde_json::Value::Null,
    }
}

async fn mount_index(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/indices/tags/l.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "lumine": ["historical_1", "historical_3"],
        })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/indices/items/batch-001.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [
                { "id": "historical_1", "file_url": "images/historical_1.jpg", "tags": ["lumine"] },
                { "id": "historical_3", "file_url": "images/historical_3.jpg", "tags": ["lumine", "paimon"] },
            ],
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_http_store_fetches_under_prefix() {
    let server = MockServer::start().await;
    mount_index(&server).await;

    let store = http_store(&server);
    let bytes = store.fetch("tags/l.json").await.expect("fetch");
    let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(value["lumine"][1], "historical_3");
}

#[tokio::test]
async fn test_http_store_maps_statuses() {
    let server = MockServer::start().await;
    Mock::given(path("/indices/tags/x.json"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let store = http_store(&server);
    assert!(matches!(
        store.fetch("tags/x.json").await,
        Err(FetchError::Status { status: 503, .. })
    ));
    // unmatched requests get wiremock's 404
    assert!(matches!(
        store.fetch("tags/q.json").await,
        Err(FetchError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_danbooru_client_normalizes_posts() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/posts.json"))
        .and(query_param("tags", "lumine"))
        .and(query_param("page", "2"))
        .and(query_param("limit", "3"))
        .and(header("User-Agent", "gallery-test/1.0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 101, "file_url": "https://cdn/101.png", "tag_string": "lumine", "score": 12, "rating": "s" },
            { "id": 102, "preview_file_url": "https://cdn/102_preview.jpg" },
            { "id": 103 },
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let page = danbooru(&server).search("lumine", 2, 3).await.expect("search");
    assert_eq!(page.total, 3);
    assert_eq!(page.posts.len(), 2);
    assert_eq!(page.posts[0].id, "101");
    assert_eq!(page.posts[0].file_ext, "png");
    assert_eq!(page.posts[1].file_url, "https://cdn/102_preview.jpg");
    assert_eq!(page.posts[1].rating, "q");
}

#[tokio::test]
async fn test_danbooru_client_rejects_malformed_json() {
    let server = MockServer::start().await;
    Mock::given(path("/posts.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>rate limited</html>"))
        .mount(&server)
        .await;

    assert!(matches!(
        danbooru(&server).search("lumine", 1, 5).await,
        Err(FetchError::Decode { .. })
    ));
}

#[tokio::test]
async fn test_unified_over_http_with_failing_catalog() {
    let server = MockServer::start().await;
    mount_index(&server).await;
    Mock::given(path("/posts.json"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let engine = SearchEngine::new(
        Arc::new(http_store(&server)),
        Arc::new(danbooru(&server)),
        Arc::new(SearchCaches::default()),
        EngineSettings {
            storage_base_url: "https://r2.example.dev".to_string(),
            layout: TagIndexLayout::Sharded,
            batch_count: 2,
            batch_fanout: 2,
        },
    );

    let params = SearchParams {
        tags: Some("LUMINE".to_string()),
        ..Default::default()
    };
    let resp = search_handler(&engine, &params).await.expect("handler");
    assert_eq!(resp.status(), 200);

    let body: SearchResponse = serde_json::from_value(body_json(resp.body())).unwrap();
    assert_eq!(body.posts.len(), 2);
    assert_eq!(body.total, 2);
    assert_eq!(body.source, "historical");
    assert_eq!(body.sources.map(|s| s.external), Some(0));
}

#[tokio::test]
async fn test_http_store_times_out_slow_objects() {
    let server = MockServer::start().await;
    Mock::given(path("/indices/tags/s.json"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "slow": ["1"] }))
                .set_delay(SLOW_RESPONSE),
        )
        .mount(&server)
        .await;

    let store = http_store_with_timeout(&server, SHORT_TIMEOUT);
    assert!(matches!(
        store.fetch("tags/s.json").await,
        Err(FetchError::Timeout(key)) if key == "tags/s.json"
    ));
}

#[tokio::test]
async fn test_danbooru_client_times_out() {
    let server = MockServer::start().await;
    Mock::given(path("/posts.json"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([]))
                .set_delay(SLOW_RESPONSE),
        )
        .mount(&server)
        .await;

    let client = danbooru_with_timeout(&server, SHORT_TIMEOUT);
    assert!(matches!(
        client.search("lumine", 1, 5).await,
        Err(FetchError::Timeout(_))
    ));
}

#[tokio::test]
async fn test_slow_shard_and_catalog_only_drop_their_part() {
    let server = MockServer::start().await;
    mount_index(&server).await;
    Mock::given(path("/indices/tags/p.json"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "paimon": ["historical_3"] }))
                .set_delay(SLOW_RESPONSE),
        )
        .mount(&server)
        .await;
    Mock::given(path("/posts.json"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([{ "id": 1, "file_url": "https://cdn/1.png" }]))
                .set_delay(SLOW_RESPONSE),
        )
        .mount(&server)
        .await;

    let engine = SearchEngine::new(
        Arc::new(http_store_with_timeout(&server, SHORT_TIMEOUT)),
        Arc::new(danbooru_with_timeout(&server, SHORT_TIMEOUT)),
        Arc::new(SearchCaches::default()),
        EngineSettings {
            storage_base_url: "https://r2.example.dev".to_string(),
            layout: TagIndexLayout::Sharded,
            batch_count: 1,
            batch_fanout: 1,
        },
    );

    let params = SearchParams {
        tags: Some("lumine paimon".to_string()),
        mode: Some("unified".to_string()),
        ..Default::default()
    };
    let resp = search_handler(&engine, &params).await.expect("handler");
    assert_eq!(resp.status(), 200);

    // paimon's shard timed out, so only lumine constrains the result
    let body: SearchResponse = serde_json::from_value(body_json(resp.body())).unwrap();
    let ids: Vec<&str> = body.posts.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["historical_1", "historical_3"]);
    assert_eq!(body.source, "historical");
    assert_eq!(body.sources.map(|s| s.external), Some(0));
    assert!(engine.caches().tag_shards.get("tags/p.json").await.is_none());
}

fn memory_engine() -> SearchEngine {
    struct NoCatalog;

    #[async_trait::async_trait]
    impl ExternalCatalog for NoCatalog {
        async fn search(
            &self,
            _tags: &str,
            _page: u32,
            _limit: u32,
        ) -> Result<search_block::ExternalPage, FetchError> {
            Ok(Default::default())
        }
    }

    let store = MemoryIndexStore::new()
        .with_json(
            "tags/g.json",
            json!({ "genshin_impact": ["1", "2"], "genshin": ["3"] }),
        )
        .with_json(
            "items/batch-001.json",
            json!({ "items": [{ "id": "1" }, { "id": "2" }, { "id": "3" }] }),
        );

    SearchEngine::new(
        Arc::new(store),
        Arc::new(NoCatalog),
        Arc::new(SearchCaches::default()),
        EngineSettings {
            batch_count: 1,
            ..Default::default()
        },
    )
}

#[tokio::test]
async fn test_handler_coerces_malformed_numbers() {
    let engine = memory_engine();
    let params = SearchParams {
        tags: Some("genshin_impact".to_string()),
        page: Some("abc".to_string()),
        limit: Some("not-a-number".to_string()),
        mode: Some("historical".to_string()),
        autocomplete: None,
    };

    let resp = search_handler(&engine, &params).await.expect("handler");
    assert_eq!(resp.status(), 200);
    let body = body_json(resp.body());
    assert_eq!(body["page"], 1);
    assert_eq!(body["total"], 2);
    assert!(body.get("sources").is_none());
}

#[tokio::test]
async fn test_handler_autocomplete_returns_array() {
    let engine = memory_engine();
    let params = SearchParams {
        autocomplete: Some("GENSH".to_string()),
        limit: Some("1".to_string()),
        ..Default::default()
    };

    let resp = search_handler(&engine, &params).await.expect("handler");
    let body = body_json(resp.body());
    let suggestions = body.as_array().expect("array");
    assert_eq!(suggestions.len(), 1);
    assert_eq!(suggestions[0]["name"], "genshin_impact");
    assert_eq!(suggestions[0]["category"], 0);

    let empty = SearchParams {
        autocomplete: Some(String::new()),
        ..Default::default()
    };
    let resp = search_handler(&engine, &empty).await.expect("handler");
    assert_eq!(body_json(resp.body()), json!([]));
}
