use reelrank_engine::{ImageLookup, TmdbImageClient};
use std::time::Duration;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const IMAGE_BASE: &str = "https://img.test/w780";

fn client(server: &MockServer, timeout: Duration) -> TmdbImageClient {
    TmdbImageClient::with_options(
        "test-key".to_string(),
        server.uri(),
        IMAGE_BASE.to_string(),
        timeout,
        100,
    )
    .expect("client builds")
}

/// Backdrops win over posters
#[tokio::test]
async fn test_backdrop_preferred() {
    let mock_server = MockServer::start().await;

    let response_body = serde_json::json!({
        "id": 550,
        "backdrops": [{ "file_path": "/fight-club-wide.jpg" }],
        "posters": [{ "file_path": "/fight-club.jpg" }]
    });

    Mock::given(method("GET"))
        .and(path("/movie/550/images"))
        .and(query_param("api_key", "test-key"))
        .and(query_param("include_image_language", "en,null"))
        .respond_with(ResponseTemplate::new(200).set_body_json(response_body))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client(&mock_server, Duration::from_secs(2));

    let url = client.lookup(550).await;
    assert_eq!(
        url.as_deref(),
        Some("https://img.test/w780/fight-club-wide.jpg")
    );

    // Second call is served from cache
    assert_eq!(client.lookup(550).await, url);
    assert_eq!(client.cached_entries().await, 1);
}

#[tokio::test]
async fn test_poster_fallback() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/movie/603/images"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": 603,
            "backdrops": [],
            "posters": [{ "file_path": "/matrix.jpg" }, { "file_path": "/matrix-alt.jpg" }]
        })))
        .mount(&mock_server)
        .await;

    let client = client(&mock_server, Duration::from_secs(2));
    assert_eq!(
        client.lookup(603).await.as_deref(),
        Some("https://img.test/w780/matrix.jpg")
    );
}

/// A response with no images is a cached answer, not a failure
#[tokio::test]
async fn test_no_images_cached_as_none() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/movie/42/images"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "id": 42 })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client(&mock_server, Duration::from_secs(2));
    assert!(client.lookup(42).await.is_none());
    assert!(client.lookup(42).await.is_none());
}

/// Upstream errors are masked and retried on the next call
#[tokio::test]
async fn test_server_error_not_cached() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/movie/7/images"))
        .respond_with(ResponseTemplate::new(500))
        .expect(2)
        .mount(&mock_server)
        .await;

    let client = client(&mock_server, Duration::from_secs(2));
    assert!(client.lookup(7).await.is_none());
    assert!(client.lookup(7).await.is_none());
    assert_eq!(client.cached_entries().await, 0);
}

#[tokio::test]
async fn test_unauthorized_is_none() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/movie/550/images"))
        .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
            "status_code": 7,
            "status_message": "Invalid API key"
        })))
        .mount(&mock_server)
        .await;

    let client = client(&mock_server, Duration::from_secs(2));
    assert!(client.lookup(550).await.is_none());
}

#[tokio::test]
async fn test_slow_upstream_times_out() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/movie/550/images"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({
                    "backdrops": [{ "file_path": "/late.jpg" }]
                }))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&mock_server)
        .await;

    let client = client(&mock_server, Duration::from_millis(50));
    assert!(client.lookup(550).await.is_none());
}

#[tokio::test]
async fn test_malformed_body_is_none() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/movie/1/images"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&mock_server)
        .await;

    let client = client(&mock_server, Duration::from_secs(2));
    assert!(client.lookup(1).await.is_none());
}
