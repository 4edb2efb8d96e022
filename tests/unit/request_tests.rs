// Request parsing and source resolution tests

use hato::fetcher::Provider;
use hato::request::{ChatworkTarget, ImageRequest, ImageSource};
use rstest::rstest;

fn parse(json: serde_json::Value) -> ImageRequest {
    serde_json::from_value(json).expect("request parses")
}

#[test]
fn test_extra_fields_are_ignored() {
    let request = parse(serde_json::json!({
        "source": "line",
        "id": "123",
        "user": "U0001",
    }));
    assert_eq!(
        request.resolve().unwrap(),
        ImageSource::Line {
            message_id: "123".to_string()
        }
    );
}

#[test]
fn test_numeric_ids_are_accepted() {
    let request = parse(serde_json::json!({ "source": "chatwork", "id": 42, "room_id": 7 }));
    assert_eq!(
        request.resolve().unwrap(),
        ImageSource::Chatwork(ChatworkTarget::File {
            file_id: "42".to_string(),
            room_id: Some("7".to_string()),
        })
    );
}

#[test]
fn test_source_beats_image_url() {
    let request = parse(serde_json::json!({
        "source": "chatwork",
        "url": "https://dl.example/a",
        "image_url": "https://other.example/b.jpg",
    }));
    assert_eq!(
        request.resolve().unwrap(),
        ImageSource::Chatwork(ChatworkTarget::DownloadUrl("https://dl.example/a".to_string()))
    );
}

#[rstest]
#[case::line_without_id(serde_json::json!({"source": "line"}), "Missing 'id' for LINE")]
#[case::line_empty_id(serde_json::json!({"source": "line", "id": ""}), "Missing 'id' for LINE")]
#[case::chatwork_without_target(serde_json::json!({"source": "chatwork"}), "Missing 'url' or 'id' for Chatwork")]
#[case::nothing(serde_json::json!({}), "Invalid source or missing image parameters")]
#[case::unknown_source(serde_json::json!({"source": "slack"}), "Invalid source or missing image parameters")]
fn test_resolution_errors(#[case] json: serde_json::Value, #[case] message: &str) {
    let err = parse(json).resolve().unwrap_err();
    assert_eq!(err.to_string(), message);
}

#[rstest]
#[case::unknown_source_falls_back(serde_json::json!({"source": "slack", "image_url": "https://x/y.png"}), Provider::DirectUrl)]
#[case::line(serde_json::json!({"source": "line", "id": "1"}), Provider::Line)]
#[case::chatwork(serde_json::json!({"source": "chatwork", "url": "https://x"}), Provider::Chatwork)]
fn test_resolved_provider(#[case] json: serde_json::Value, #[case] provider: Provider) {
    assert_eq!(parse(json).resolve().unwrap().provider(), provider);
}

#[test]
fn test_invalid_id_type_is_rejected() {
    let result: Result<ImageRequest, _> =
        serde_json::from_value(serde_json::json!({ "source": "line", "id": [1, 2] }));
    assert!(result.is_err());
}
