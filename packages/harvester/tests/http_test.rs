//! HTTP client tests against a mock OpenLibrary server.

use std::time::Duration;

use openlibrary_harvester::http::{create_client, fetch_json};
use openlibrary_harvester::{
    harvest, CatalogSource, HarvestConfig, HarvestState, OpenLibraryClient, ThreadPacer,
};
use pretty_assertions::assert_eq;
use reqwest::Url;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Run blocking client code off the async runtime.
async fn blocking<T, F>(f: F) -> T
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    tokio::task::spawn_blocking(f).await.unwrap()
}

#[tokio::test(flavor = "multi_thread")]
async fn test_fetch_json_returns_object() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/works/OL1W.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"title": "Dune"})))
        .expect(1)
        .mount(&server)
        .await;

    let url = Url::parse(&format!("{}/works/OL1W.json", server.uri())).unwrap();
    let body = blocking(move || {
        let client = create_client().unwrap();
        fetch_json(&client, &url, Duration::from_secs(5))
    })
    .await;

    assert_eq!(body.get("title"), Some(&json!("Dune")));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_fetch_json_non_200_is_empty() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"error": "notfound"})))
        .mount(&server)
        .await;

    let url = Url::parse(&format!("{}/works/OL404W.json", server.uri())).unwrap();
    let body = blocking(move || {
        let client = create_client().unwrap();
        fetch_json(&client, &url, Duration::from_secs(5))
    })
    .await;

    assert!(body.is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_fetch_json_invalid_body_is_empty() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/garbage"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/array"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([1, 2, 3])))
        .mount(&server)
        .await;

    let base = server.uri();
    let (garbage, array) = blocking(move || {
        let client = create_client().unwrap();
        let timeout = Duration::from_secs(5);
        let garbage = Url::parse(&format!("{base}/garbage")).unwrap();
        let array = Url::parse(&format!("{base}/array")).unwrap();
        (
            fetch_json(&client, &garbage, timeout),
            fetch_json(&client, &array, timeout),
        )
    })
    .await;

    assert!(garbage.is_empty());
    assert!(array.is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_fetch_json_timeout_is_empty() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"late": true}))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;

    let url = Url::parse(&format!("{}/slow", server.uri())).unwrap();
    let body = blocking(move || {
        let client = create_client().unwrap();
        fetch_json(&client, &url, Duration::from_millis(50))
    })
    .await;

    assert!(body.is_empty());
}

#[test]
fn test_fetch_json_unreachable_host_is_empty() {
    let client = create_client().unwrap();
    // Port 9 (discard) on localhost is closed in test environments
    let url = Url::parse("http://127.0.0.1:9/search.json").unwrap();
    assert!(fetch_json(&client, &url, Duration::from_secs(2)).is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_client_sends_expected_requests() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search.json"))
        .and(query_param("q", "science fiction"))
        .and(query_param("limit", "100"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"docs": []})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/works/OL1W/editions.json"))
        .and(query_param("limit", "200"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"entries": []})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/authors/OL1A/works.json"))
        .and(query_param("limit", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"size": 12})))
        .expect(1)
        .mount(&server)
        .await;

    let base = server.uri();
    let (search, editions, author) = blocking(move || {
        let source = OpenLibraryClient::new(&base).unwrap();
        (
            source.search("science fiction", 2, 100),
            source.editions("/works/OL1W", 200),
            source.author_works("/authors/OL1A"),
        )
    })
    .await;

    assert_eq!(search.get("docs"), Some(&json!([])));
    assert_eq!(editions.get("entries"), Some(&json!([])));
    assert_eq!(author.get("size"), Some(&json!(12)));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_harvest_against_mock_catalog() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search.json"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "docs": [
                {
                    "key": "/works/OL1W",
                    "title": "Dracula",
                    "author_name": ["Bram Stoker"],
                    "author_key": ["OL2A"],
                    "first_publish_year": 1897,
                    "edition_count": 418,
                },
                {"key": "/works/OL2W", "title": "Obscure"},
            ]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/search.json"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"docs": []})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/works/OL1W/ratings.json"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"summary": {"count": 57, "average": 4.05}})),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/works/OL2W/ratings.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"summary": {"count": 1}})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/works/OL1W.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "subjects": ["Vampires", "Horror tales"],
            "languages": [{"key": "/languages/eng"}],
        })))
        .mount(&server)
        .await;
    // Editions endpoint is down; the row is still produced
    Mock::given(method("GET"))
        .and(path("/works/OL1W/editions.json"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let base = server.uri();
    let state = blocking(move || {
        let source = OpenLibraryClient::new(&base).unwrap();
        let config = HarvestConfig::default()
            .with_base_url(base.clone())
            .with_queries(["horror"])
            .with_pause(Duration::ZERO)
            .with_jitter(Duration::ZERO)
            .with_output_csv(false);
        harvest(&source, &mut ThreadPacer, &config, HarvestState::new(), |_, _| {}).unwrap()
    })
    .await;

    assert_eq!(state.len(), 1);
    let row = &state.rows[0];
    assert_eq!(row.title, "Dracula");
    assert_eq!(row.author, "Bram Stoker");
    assert_eq!(row.first_publish_year, Some(1897));
    assert_eq!(row.subject, "Vampires, Horror tales");
    assert_eq!(row.language.as_deref(), Some("eng"));
    assert_eq!(row.publisher, None);
    assert_eq!(row.ratings_count, Some(57));
    assert_eq!(row.ratings_average, Some(4.05));
    assert_eq!(row.author_key.as_deref(), Some("/authors/OL2A"));
}
