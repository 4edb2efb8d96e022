// End-to-end pipeline tests against scripted upstreams
// Each test drives Gateway::handle directly and inspects both the response
// and the requests the mock upstream received.

use super::test_harness::*;
use hato::request::ImageRequest;
use hato::response::GatewayResponse;
use rstest::rstest;
use std::time::{Duration, Instant};

fn line_request(id: Option<&str>) -> ImageRequest {
    ImageRequest {
        source: Some("line".to_string()),
        id: id.map(str::to_string),
        ..Default::default()
    }
}

fn direct_request(url: String) -> ImageRequest {
    ImageRequest {
        image_url: Some(url),
        ..Default::default()
    }
}

fn expect_success(response: GatewayResponse) -> (String, f64) {
    match response {
        GatewayResponse::Success(body) => (body.base64_image, body.meta.size_kb),
        GatewayResponse::Failure(body) => panic!("expected success, got failure: {}", body.error),
    }
}

fn expect_failure(response: GatewayResponse) -> String {
    match response {
        GatewayResponse::Failure(body) => body.error,
        GatewayResponse::Success(_) => panic!("expected failure, got success"),
    }
}

#[tokio::test]
async fn test_line_fetch_success_sends_bearer_token() {
    let upstream = MockUpstream::start().await;
    upstream.respond_image("/v2/bot/message/12345/content", jpeg_fixture(64, 48));

    let gateway = gateway(&config_for(&upstream), secrets(None, Some("line-token"), None));
    let (data_uri, size_kb) = expect_success(gateway.handle(line_request(Some("12345"))).await);

    assert_eq!(data_uri_dimensions(&data_uri), (64, 48));
    assert!(size_kb > 0.0);

    let requests = upstream.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, "GET");
    assert_eq!(requests[0].header("authorization"), Some("Bearer line-token"));
}

#[tokio::test]
async fn test_line_without_id_makes_no_call() {
    let upstream = MockUpstream::start().await;
    let gateway = gateway(&config_for(&upstream), secrets(None, Some("line-token"), None));

    let error = expect_failure(gateway.handle(line_request(None)).await);

    assert_eq!(error, "Missing 'id' for LINE");
    assert!(upstream.requests().is_empty());
}

#[tokio::test]
async fn test_line_without_token_is_config_error() {
    let upstream = MockUpstream::start().await;
    let gateway = gateway(&config_for(&upstream), secrets(None, None, None));

    let error = expect_failure(gateway.handle(line_request(Some("1"))).await);

    assert_eq!(error, "LINE Token not found in Secrets");
    assert!(upstream.requests().is_empty());
}

#[tokio::test]
async fn test_line_upstream_error_carries_status_and_body() {
    let upstream = MockUpstream::start().await;
    upstream.respond(
        "/v2/bot/message/777/content",
        401,
        "application/json",
        br#"{"message":"Authentication failed"}"#.to_vec(),
    );
    let gateway = gateway(&config_for(&upstream), secrets(None, Some("stale"), None));

    let error = expect_failure(gateway.handle(line_request(Some("777"))).await);

    assert!(error.starts_with("LINE API Error"), "{}", error);
    assert!(error.contains("401"));
    assert!(error.contains("Authentication failed"));
}

#[tokio::test]
async fn test_chatwork_with_url_skips_metadata_lookup() {
    let upstream = MockUpstream::start().await;
    upstream.respond_image("/download/photo.png", png_rgba_fixture(40, 30));
    let gateway = gateway(&config_for(&upstream), secrets(None, None, Some("cw-token")));

    let request = ImageRequest {
        source: Some("chatwork".to_string()),
        url: Some(upstream.url("/download/photo.png")),
        id: Some("999".to_string()),
        ..Default::default()
    };
    let (data_uri, _) = expect_success(gateway.handle(request).await);

    assert_eq!(data_uri_dimensions(&data_uri), (40, 30));
    let requests = upstream.requests();
    assert_eq!(upstream.targets(), vec!["/download/photo.png".to_string()]);
    assert_eq!(requests[0].header("x-chatworktoken"), None);
}

#[tokio::test]
async fn test_chatwork_with_id_resolves_download_url() {
    let upstream = MockUpstream::start().await;
    upstream.respond_json(
        "/v2/files/42",
        serde_json::json!({
            "file_id": 42,
            "filename": "photo.jpg",
            "download_url": upstream.url("/dl/42"),
        }),
    );
    upstream.respond_image("/dl/42", jpeg_fixture(32, 32));
    let gateway = gateway(&config_for(&upstream), secrets(None, None, Some("cw-token")));

    let request = ImageRequest {
        source: Some("chatwork".to_string()),
        id: Some("42".to_string()),
        ..Default::default()
    };
    expect_success(gateway.handle(request).await);

    let requests = upstream.requests();
    assert_eq!(upstream.targets(), vec!["/v2/files/42", "/dl/42"]);
    assert_eq!(requests[0].header("x-chatworktoken"), Some("cw-token"));
    assert_eq!(requests[1].header("x-chatworktoken"), None);
}

#[tokio::test]
async fn test_chatwork_room_scoped_lookup() {
    let upstream = MockUpstream::start().await;
    upstream.respond_json(
        "/v2/rooms/1001/files/42?create_download_url=1",
        serde_json::json!({ "download_url": upstream.url("/dl/42") }),
    );
    upstream.respond_image("/dl/42", jpeg_fixture(16, 16));
    let gateway = gateway(&config_for(&upstream), secrets(None, None, Some("cw-token")));

    let request: ImageRequest = serde_json::from_value(serde_json::json!({
        "source": "chatwork",
        "id": 42,
        "room_id": 1001,
    }))
    .unwrap();
    expect_success(gateway.handle(request).await);

    assert_eq!(
        upstream.targets(),
        vec!["/v2/rooms/1001/files/42?create_download_url=1", "/dl/42"]
    );
}

#[tokio::test]
async fn test_chatwork_metadata_without_download_url() {
    let upstream = MockUpstream::start().await;
    upstream.respond_json("/v2/files/42", serde_json::json!({ "file_id": 42 }));
    let gateway = gateway(&config_for(&upstream), secrets(None, None, Some("cw-token")));

    let request = ImageRequest {
        source: Some("chatwork".to_string()),
        id: Some("42".to_string()),
        ..Default::default()
    };
    let error = expect_failure(gateway.handle(request).await);

    assert!(error.starts_with("Chatwork Link Error"), "{}", error);
    assert_eq!(upstream.targets(), vec!["/v2/files/42"]);
}

#[tokio::test]
async fn test_chatwork_metadata_lookup_rejected() {
    let upstream = MockUpstream::start().await;
    upstream.respond(
        "/v2/files/42",
        403,
        "application/json",
        br#"{"errors":["You don't have permission to get this file"]}"#.to_vec(),
    );
    let gateway = gateway(&config_for(&upstream), secrets(None, None, Some("cw-token")));

    let request = ImageRequest {
        source: Some("chatwork".to_string()),
        id: Some("42".to_string()),
        ..Default::default()
    };
    let error = expect_failure(gateway.handle(request).await);

    assert!(error.starts_with("Chatwork Link Error: HTTP 403"), "{}", error);
    assert!(error.contains("permission"));
    assert_eq!(upstream.targets(), vec!["/v2/files/42"]);
}

#[tokio::test]
async fn test_chatwork_download_failure() {
    let upstream = MockUpstream::start().await;
    let gateway = gateway(&config_for(&upstream), secrets(None, None, None));

    let request = ImageRequest {
        source: Some("chatwork".to_string()),
        url: Some(upstream.url("/expired")),
        ..Default::default()
    };
    let error = expect_failure(gateway.handle(request).await);

    assert!(error.starts_with("Chatwork Download Error"), "{}", error);
    assert!(error.contains("404"));
}

#[tokio::test]
async fn test_direct_url_404_reports_status() {
    let upstream = MockUpstream::start().await;
    let gateway = gateway(&config_for(&upstream), secrets(None, None, None));

    let error = expect_failure(gateway.handle(direct_request(upstream.url("/missing.jpg"))).await);

    assert!(error.contains("404"), "{}", error);
    assert!(error.starts_with("Failed to download image"));
}

#[tokio::test]
async fn test_direct_url_empty_body() {
    let upstream = MockUpstream::start().await;
    upstream.respond_image("/empty.jpg", Vec::new());
    let gateway = gateway(&config_for(&upstream), secrets(None, None, None));

    let error = expect_failure(gateway.handle(direct_request(upstream.url("/empty.jpg"))).await);

    assert_eq!(error, "Image data is empty.");
}

#[tokio::test]
async fn test_direct_url_not_an_image() {
    let upstream = MockUpstream::start().await;
    upstream.respond("/page.html", 200, "text/html", b"<html>nope</html>".to_vec());
    let gateway = gateway(&config_for(&upstream), secrets(None, None, None));

    let error = expect_failure(gateway.handle(direct_request(upstream.url("/page.html"))).await);

    assert!(error.starts_with("Failed to decode image"), "{}", error);
}

#[tokio::test]
async fn test_direct_url_timeout() {
    let upstream = MockUpstream::start().await;
    upstream.stall("/slow.jpg");
    let mut config = config_for(&upstream);
    config.providers.direct.timeout_secs = 1;
    let gateway = gateway(&config, secrets(None, None, None));

    let started = Instant::now();
    let error = expect_failure(gateway.handle(direct_request(upstream.url("/slow.jpg"))).await);
    let elapsed = started.elapsed();

    assert!(error.starts_with("Failed to download image"), "{}", error);
    assert!(elapsed >= Duration::from_millis(900), "{:?}", elapsed);
    assert!(elapsed < Duration::from_secs(3), "{:?}", elapsed);
}

#[rstest]
#[case::undeclared_length(false)]
#[case::declared_length(true)]
#[tokio::test]
async fn test_oversized_download_is_abandoned(#[case] declare_length: bool) {
    const STREAMED: usize = 64 * 1024 * 1024;

    let upstream = MockUpstream::start().await;
    upstream.respond_stream("/huge.jpg", STREAMED, declare_length);
    let mut config = config_for(&upstream);
    config.image.max_source_bytes = 1024;
    let gateway = gateway(&config, secrets(None, None, None));

    let error = expect_failure(gateway.handle(direct_request(upstream.url("/huge.jpg"))).await);
    assert!(error.starts_with("File size"), "{}", error);
    assert!(error.contains("exceeds maximum 1024 bytes"), "{}", error);

    // Let the mock notice the closed connection
    tokio::time::sleep(Duration::from_millis(200)).await;
    // Only socket buffers' worth may have been accepted
    let written = upstream.body_bytes_written();
    assert!(written < STREAMED / 4, "upstream wrote {} bytes", written);
}

#[tokio::test]
async fn test_large_image_is_downscaled_preserving_aspect() {
    let upstream = MockUpstream::start().await;
    upstream.respond_image("/wide.jpg", jpeg_fixture(3000, 1500));
    let gateway = gateway(&config_for(&upstream), secrets(None, None, None));

    let (data_uri, _) =
        expect_success(gateway.handle(direct_request(upstream.url("/wide.jpg"))).await);

    assert_eq!(data_uri_dimensions(&data_uri), (2048, 1024));
}

#[tokio::test]
async fn test_payload_too_large() {
    let upstream = MockUpstream::start().await;
    upstream.respond_image("/photo.jpg", jpeg_fixture(256, 256));
    let mut config = config_for(&upstream);
    config.image.max_payload_chars = 100;
    let gateway = gateway(&config, secrets(None, None, None));

    let response = gateway.handle(direct_request(upstream.url("/photo.jpg"))).await;
    let json: serde_json::Value = serde_json::from_slice(&response.to_json().unwrap()).unwrap();

    assert_eq!(json["status"], "failed");
    assert!(json["error"].as_str().unwrap().contains("Payload Too Large"));
    assert!(json.get("base64_image").is_none());
}

#[rstest]
#[case::matching(Some("S"), true)]
#[case::mismatched(Some("X"), false)]
#[case::absent(None, true)]
#[tokio::test]
async fn test_auth_policy(#[case] presented: Option<&str>, #[case] proceeds: bool) {
    let upstream = MockUpstream::start().await;
    upstream.respond_image("/photo.jpg", jpeg_fixture(8, 8));
    let gateway = gateway(&config_for(&upstream), secrets(Some("S"), None, None));

    let mut request = direct_request(upstream.url("/photo.jpg"));
    request.auth_token = presented.map(str::to_string);
    let response = gateway.handle(request).await;

    if proceeds {
        expect_success(response);
        assert_eq!(upstream.requests().len(), 1);
    } else {
        assert_eq!(expect_failure(response), "Unauthorized");
        assert!(upstream.requests().is_empty());
    }
}
