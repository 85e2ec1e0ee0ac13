//! Remote client integration tests.
//!
//! A throwaway HTTP responder on localhost stands in for the restoration API,
//! so these tests exercise the real request path (headers, JSON body,
//! response decoding and classification) without leaving the machine.

use std::sync::Arc;

use serde_json::{json, Value};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::Mutex;

use rekindle_core::{
    testing::fixtures, ApiKey, CredentialResolver, GeminiClient, RemoteConfig,
    RestorationClient, RestorationError, RestorationMode,
};

/// One request as seen by the stub server.
#[derive(Debug, Clone)]
struct CapturedRequest {
    head: String,
    body: Value,
}

/// Serve exactly one request with the given status and JSON body.
async fn serve_once(status: u16, body: Value) -> (String, Arc<Mutex<Option<CapturedRequest>>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let captured = Arc::new(Mutex::new(None));
    let sink = Arc::clone(&captured);

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = Vec::new();
        let mut chunk = [0u8; 8192];

        // Read headers, then as much body as Content-Length announces.
        let (head, body_start) = loop {
            let n = socket.read(&mut chunk).await.unwrap();
            buf.extend_from_slice(&chunk[..n]);
            if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                break (String::from_utf8_lossy(&buf[..pos]).to_string(), pos + 4);
            }
        };
        let length = head
            .lines()
            .find_map(|line| {
                let (name, value) = line.split_once(':')?;
                name.eq_ignore_ascii_case("content-length")
                    .then(|| value.trim().parse::<usize>().ok())
                    .flatten()
            })
            .unwrap_or(0);
        while buf.len() < body_start + length {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
        }
        let request_body =
            serde_json::from_slice(&buf[body_start..body_start + length]).unwrap_or(Value::Null);
        *sink.lock().await = Some(CapturedRequest {
            head,
            body: request_body,
        });

        let payload = body.to_string();
        let response = format!(
            "HTTP/1.1 {} Stub\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
            status,
            payload.len(),
            payload
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.ok();
    });

    (format!("http://{}", addr), captured)
}

fn client_for(api_base: String, key: Option<&str>) -> GeminiClient {
    let config = RemoteConfig {
        api_base,
        ..Default::default()
    };
    let credentials = CredentialResolver::new().with_platform_key(key.and_then(ApiKey::new));
    GeminiClient::new(&config, credentials)
}

#[tokio::test]
async fn test_image_part_is_returned() {
    let restored = fixtures::png_payload().encode();
    let (base, captured) = serve_once(
        200,
        json!({
            "candidates": [{
                "content": {"parts": [
                    {"text": "Here you go"},
                    {"inlineData": {"mimeType": "image/png", "data": restored.data}}
                ]},
                "finishReason": "STOP"
            }]
        }),
    )
    .await;

    let client = client_for(base, Some("test-key"));
    let result = client
        .restore(&fixtures::jpeg_payload().encode(), RestorationMode::Standard)
        .await
        .unwrap();
    assert_eq!(result.image, fixtures::png_payload());
    assert_eq!(result.model, "gemini-2.5-flash-image");

    let request = captured.lock().await.clone().unwrap();
    let head = request.head.to_lowercase();
    assert!(head.starts_with("post /v1beta/models/gemini-2.5-flash-image:generatecontent"));
    assert!(head.contains("x-goog-api-key: test-key"));
    assert_eq!(
        request.body["contents"][0]["parts"][0]["inlineData"]["mimeType"],
        "image/jpeg"
    );
    assert!(request.body.get("generationConfig").is_none());
}

#[tokio::test]
async fn test_ultra_request_targets_ultra_model() {
    let (base, captured) = serve_once(
        200,
        json!({
            "candidates": [{
                "content": {"parts": [
                    {"inlineData": {"mimeType": "image/png", "data": fixtures::png_payload().encode().data}}
                ]}
            }]
        }),
    )
    .await;

    let client = client_for(base, Some("test-key"));
    let result = client
        .restore(&fixtures::jpeg_payload().encode(), RestorationMode::Ultra)
        .await
        .unwrap();
    assert_eq!(result.mode, RestorationMode::Ultra);

    let request = captured.lock().await.clone().unwrap();
    assert!(request.head.contains("gemini-3-pro-image-preview"));
    assert_eq!(
        request.body["generationConfig"]["imageConfig"]["imageSize"],
        "4K"
    );
    assert_eq!(
        request.body["generationConfig"]["imageConfig"]["aspectRatio"],
        "1:1"
    );
}

#[tokio::test]
async fn test_no_candidates_is_empty_response() {
    let (base, _) = serve_once(200, json!({"candidates": []})).await;
    let client = client_for(base, Some("test-key"));

    let err = client
        .restore(&fixtures::jpeg_payload().encode(), RestorationMode::Standard)
        .await
        .unwrap_err();
    assert!(matches!(err, RestorationError::EmptyResponse(_)));
}

#[tokio::test]
async fn test_text_only_is_model_refusal() {
    let (base, _) = serve_once(
        200,
        json!({
            "candidates": [{
                "content": {"parts": [{"text": "I cannot edit this image."}]},
                "finishReason": "STOP"
            }]
        }),
    )
    .await;
    let client = client_for(base, Some("test-key"));

    let err = client
        .restore(&fixtures::jpeg_payload().encode(), RestorationMode::Standard)
        .await
        .unwrap_err();
    assert_eq!(
        err,
        RestorationError::ModelRefusedText("I cannot edit this image.".to_string())
    );
}

#[tokio::test]
async fn test_quota_status_is_classified() {
    let (base, _) = serve_once(
        429,
        json!({"error": {"code": 429, "message": "Resource has been exhausted", "status": "RESOURCE_EXHAUSTED"}}),
    )
    .await;
    let client = client_for(base, Some("test-key"));

    let err = client
        .restore(&fixtures::jpeg_payload().encode(), RestorationMode::Standard)
        .await
        .unwrap_err();
    assert!(matches!(err, RestorationError::Quota(_)));
}

#[tokio::test]
async fn test_entity_not_found_is_auth() {
    let (base, _) = serve_once(
        404,
        json!({"error": {"code": 404, "message": "Requested entity was not found.", "status": "NOT_FOUND"}}),
    )
    .await;
    let client = client_for(base, Some("test-key"));

    let err = client
        .restore(&fixtures::jpeg_payload().encode(), RestorationMode::Standard)
        .await
        .unwrap_err();
    assert!(matches!(err, RestorationError::Auth(_)));
}

#[tokio::test]
async fn test_missing_key_fails_before_network() {
    // Nothing listens here; a request would surface as a network error.
    let client = client_for("http://127.0.0.1:9".to_string(), None);

    let err = client
        .restore(&fixtures::jpeg_payload().encode(), RestorationMode::Standard)
        .await
        .unwrap_err();
    assert!(matches!(err, RestorationError::Auth(_)));
}

#[tokio::test]
async fn test_unreachable_service_is_network_error() {
    // Nothing listens on the discard port.
    let client = client_for("http://127.0.0.1:9".to_string(), Some("test-key"));

    let err = client
        .restore(&fixtures::jpeg_payload().encode(), RestorationMode::Standard)
        .await
        .unwrap_err();
    assert!(matches!(err, RestorationError::Network(_)), "got {:?}", err);
}
