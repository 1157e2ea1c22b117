use std::sync::{Arc, Mutex};

use axum::extract::Path;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};

use super::*;
use crate::imagegen::config::ImageTimeouts;

fn make_response(parts: serde_json::Value) -> String {
    serde_json::json!({
        "candidates": [
            { "content": { "role": "model", "parts": parts }, "finishReason": "STOP" }
        ],
        "modelVersion": "gemini-3-pro-image-preview"
    })
    .to_string()
}

fn config_for(base_url: &str) -> ImageGenConfig {
    ImageGenConfig {
        api_key: "test-key".into(),
        model: "gemini-test".into(),
        base_url: base_url.into(),
        max_images: 2,
        timeouts: ImageTimeouts { request_secs: 5, connect_secs: 1 },
    }
}

// =============================================================================
// build_request
// =============================================================================

#[test]
fn request_with_image_config() {
    let opts = ImageOptions { count: 1, aspect_ratio: Some("16:9".into()), image_size: Some("1K".into()) };
    let value = serde_json::to_value(build_request("a cat", &opts)).unwrap();
    assert_eq!(
        value,
        serde_json::json!({
            "contents": [{ "role": "user", "parts": [{ "text": "a cat" }] }],
            "generationConfig": {
                "responseModalities": ["IMAGE"],
                "imageConfig": { "aspectRatio": "16:9", "imageSize": "1K" }
            }
        })
    );
}

#[test]
fn request_without_image_config_omits_it() {
    let opts = ImageOptions::default();
    let value = serde_json::to_value(build_request("a cat", &opts)).unwrap();
    assert!(value["generationConfig"].get("imageConfig").is_none());
}

#[test]
fn request_with_partial_image_config() {
    let opts = ImageOptions { count: 1, aspect_ratio: None, image_size: Some("2K".into()) };
    let value = serde_json::to_value(build_request("a cat", &opts)).unwrap();
    assert_eq!(value["generationConfig"]["imageConfig"], serde_json::json!({ "imageSize": "2K" }));
}

// =============================================================================
// parse_response
// =============================================================================

#[test]
fn parse_inline_image() {
    let json = make_response(serde_json::json!([
        { "inlineData": { "mimeType": "image/png", "data": "iVBORw0KGgo=" } }
    ]));
    let images = parse_response(&json).unwrap();
    assert_eq!(images, vec!["data:image/png;base64,iVBORw0KGgo=".to_string()]);
}

#[test]
fn parse_skips_text_parts() {
    let json = make_response(serde_json::json!([
        { "text": "Here is your image" },
        { "inlineData": { "mimeType": "image/jpeg", "data": "/9j/4AAQ" } }
    ]));
    let images = parse_response(&json).unwrap();
    assert_eq!(images, vec!["data:image/jpeg;base64,/9j/4AAQ".to_string()]);
}

#[test]
fn parse_text_only_is_no_image() {
    let json = make_response(serde_json::json!([{ "text": "I can't draw that" }]));
    assert!(matches!(parse_response(&json), Err(ImageGenError::NoImage)));
}

#[test]
fn parse_blocked_prompt_is_no_image() {
    let json = serde_json::json!({ "promptFeedback": { "blockReason": "SAFETY" } }).to_string();
    assert!(matches!(parse_response(&json), Err(ImageGenError::NoImage)));
}

#[test]
fn parse_invalid_json() {
    assert!(matches!(parse_response("not json"), Err(ImageGenError::ApiParse(_))));
}

// =============================================================================
// Against a fake provider
// =============================================================================

type Seen = Arc<Mutex<Vec<(String, Option<String>, serde_json::Value)>>>;

async fn spawn_provider(status: StatusCode, body: String) -> (String, Seen) {
    let seen: Seen = Arc::new(Mutex::new(Vec::new()));
    let seen_in_handler = seen.clone();
    let router = Router::new().route(
        "/v1beta/models/{call}",
        post(move |Path(call): Path<String>, headers: HeaderMap, Json(req): Json<serde_json::Value>| {
            let seen = seen_in_handler.clone();
            let body = body.clone();
            async move {
                let key = headers
                    .get("x-goog-api-key")
                    .and_then(|v| v.to_str().ok())
                    .map(str::to_string);
                seen.lock().unwrap().push((call, key, req));
                (status, body)
            }
        }),
    );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    (format!("http://{addr}/v1beta"), seen)
}

#[tokio::test]
async fn generate_calls_provider_once_per_image() {
    let body = make_response(serde_json::json!([{ "inlineData": { "mimeType": "image/png", "data": "AAAA" } }]));
    let (base_url, seen) = spawn_provider(StatusCode::OK, body).await;
    let client = GeminiClient::new(config_for(&base_url)).unwrap();

    let opts = ImageOptions { count: 2, aspect_ratio: Some("16:9".into()), image_size: None };
    let images = client.generate("  a cat  ", &opts).await.unwrap();
    assert_eq!(images.len(), 2);
    assert!(images.iter().all(|u| u == "data:image/png;base64,AAAA"));

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 2);
    let (call, key, req) = &seen[0];
    assert_eq!(call, "gemini-test:generateContent");
    assert_eq!(key.as_deref(), Some("test-key"));
    assert_eq!(req["contents"][0]["parts"][0]["text"], "a cat");
}

#[tokio::test]
async fn generate_clamps_count_to_max() {
    let body = make_response(serde_json::json!([{ "inlineData": { "mimeType": "image/png", "data": "AAAA" } }]));
    let (base_url, seen) = spawn_provider(StatusCode::OK, body).await;
    let client = GeminiClient::new(config_for(&base_url)).unwrap();

    let opts = ImageOptions { count: 10, ..ImageOptions::default() };
    let images = client.generate("a cat", &opts).await.unwrap();
    assert_eq!(images.len(), 2);
    assert_eq!(seen.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn generate_never_returns_more_than_requested() {
    let body = make_response(serde_json::json!([
        { "inlineData": { "mimeType": "image/png", "data": "AAAA" } },
        { "inlineData": { "mimeType": "image/png", "data": "BBBB" } },
        { "inlineData": { "mimeType": "image/png", "data": "CCCC" } }
    ]));
    let (base_url, seen) = spawn_provider(StatusCode::OK, body).await;
    let client = GeminiClient::new(config_for(&base_url)).unwrap();

    let images = client.generate("a cat", &ImageOptions::default()).await.unwrap();
    assert_eq!(images, vec!["data:image/png;base64,AAAA".to_string()]);

    let opts = ImageOptions { count: 2, ..ImageOptions::default() };
    let images = client.generate("a cat", &opts).await.unwrap();
    assert_eq!(images.len(), 2);
    // The first response already covered both images.
    assert_eq!(seen.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn generate_surfaces_provider_status() {
    let (base_url, _seen) =
        spawn_provider(StatusCode::SERVICE_UNAVAILABLE, "503 Service Unavailable".into()).await;
    let client = GeminiClient::new(config_for(&base_url)).unwrap();

    let err = client.generate("a cat", &ImageOptions::default()).await.unwrap_err();
    assert!(matches!(err, ImageGenError::ApiResponse { status: 503, ref body } if body == "503 Service Unavailable"));
    assert!(err.to_string().contains("503 Service Unavailable"));
}

#[tokio::test]
async fn generate_rejects_empty_prompt_without_calling() {
    let (base_url, seen) = spawn_provider(StatusCode::OK, String::new()).await;
    let client = GeminiClient::new(config_for(&base_url)).unwrap();

    let err = client.generate("   ", &ImageOptions::default()).await.unwrap_err();
    assert!(matches!(err, ImageGenError::EmptyPrompt));
    assert!(seen.lock().unwrap().is_empty());
    assert_eq!(client.model(), "gemini-test");
}
