use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
    response::Response,
};
use serde_json::{Value, json};
use tower::ServiceExt; // for oneshot

use axum::response::IntoResponse;

use super::handlers::{ApiError, SynthesizeResponse};
use super::{AppState, routes};
use crate::audio::Transcoder;
use crate::error::StudioError;
use crate::tts::{FakeEngine, Synthesizer};

fn app() -> Router {
    app_with_engine(FakeEngine::new(2400))
}

fn app_with_engine(engine: FakeEngine) -> Router {
    let synthesizer = Synthesizer::new(Box::new(engine), 1.0);
    // MP3 conversion always fails so the tests do not depend on ffmpeg
    let transcoder = Transcoder::new("kokoro-studio-no-such-ffmpeg", "192k");
    routes::create_router(AppState::new(synthesizer, transcoder, "af_bella"))
}

async fn get(app: &Router, uri: &str) -> Response {
    app.clone().oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap()).await.unwrap()
}

async fn post_json(app: &Router, uri: &str, body: Value) -> Response {
    app.clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("Content-Type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap()
}

async fn body_bytes(response: Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap().to_vec()
}

async fn body_json(response: Response) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

#[tokio::test]
async fn test_health_check() {
    let response = get(&app(), "/health").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({ "status": "ok" }));
}

#[tokio::test]
async fn test_index_page() {
    let response = get(&app(), "/").await;
    assert_eq!(response.status(), StatusCode::OK);

    let html = String::from_utf8(body_bytes(response).await).unwrap();
    assert!(html.contains("Kokoro TTS - Text to Speech"));
    assert!(html.contains("<option value=\"af_bella\" selected>"));
}

#[tokio::test]
async fn test_list_voices() {
    let body = body_json(get(&app(), "/api/voices").await).await;
    assert_eq!(body["default"], "af_bella");

    let voices = body["voices"].as_array().unwrap();
    assert_eq!(voices.len(), 53);
    assert_eq!(voices[0]["name"], "af_alloy");
    assert_eq!(voices[0]["language"], "American English");
}

#[tokio::test]
async fn test_synthesize_then_download_wav() {
    let app = app();

    let response = post_json(&app, "/api/synthesize", json!({ "text": "Hello world. Second sentence!", "voice": "bm_george" })).await;
    assert_eq!(response.status(), StatusCode::OK);

    let clip: SynthesizeResponse = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(clip.voice, "bm_george");
    assert_eq!(clip.sample_rate, 24000);
    assert_eq!(clip.duration_secs, 0.2); // two sentences of 2400 samples
    assert!(clip.mp3_url.is_none());
    assert!(clip.mp3_error.unwrap().contains("FFmpeg"));

    let response = get(&app, &clip.wav_url).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "audio/wav");
    let disposition = response.headers()[header::CONTENT_DISPOSITION].to_str().unwrap().to_string();
    assert!(disposition.starts_with("attachment; filename=\"kokoro_bm_george.wav\""));

    let wav = body_bytes(response).await;
    assert_eq!(&wav[..4], b"RIFF");
    assert_eq!(wav.len(), 44 + 4800 * 2);

    // The player streams the same bytes without the attachment header
    let response = get(&app, &format!("{}?inline=true", clip.wav_url)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().get(header::CONTENT_DISPOSITION).is_none());
}

#[tokio::test]
async fn test_default_voice_used_when_omitted() {
    let response = post_json(&app(), "/api/synthesize", json!({ "text": "Hi" })).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["voice"], "af_bella");
}

#[tokio::test]
async fn test_mp3_unavailable_download() {
    let app = app();
    let clip = body_json(post_json(&app, "/api/synthesize", json!({ "text": "Hi" })).await).await;

    let response = get(&app, &format!("/api/clips/{}/mp3", clip["id"].as_str().unwrap())).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_new_synthesis_replaces_previous_clip() {
    let app = app();

    let first = body_json(post_json(&app, "/api/synthesize", json!({ "text": "First." })).await).await;
    let second = body_json(post_json(&app, "/api/synthesize", json!({ "text": "Second." })).await).await;
    assert_ne!(first["id"], second["id"]);

    let response = get(&app, first["wav_url"].as_str().unwrap()).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(body_json(response).await["error"].as_str().unwrap().contains("expired"));

    let response = get(&app, second["wav_url"].as_str().unwrap()).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_empty_text_rejected() {
    let response = post_json(&app(), "/api/synthesize", json!({ "text": "   ", "voice": "af_bella" })).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "Please enter some text.");
}

#[tokio::test]
async fn test_unknown_voice_rejected() {
    let response = post_json(&app(), "/api/synthesize", json!({ "text": "Hello", "voice": "xx_nobody" })).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_json(response).await["error"].as_str().unwrap().contains("xx_nobody"));
}

#[tokio::test]
async fn test_unknown_format() {
    let app = app();
    let clip = body_json(post_json(&app, "/api/synthesize", json!({ "text": "Hi" })).await).await;

    let response = get(&app, &format!("/api/clips/{}/ogg", clip["id"].as_str().unwrap())).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_malformed_clip_id_answers_json() {
    let response = get(&app(), "/api/clips/not-a-clip/wav").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(body_json(response).await["error"].as_str().unwrap().contains("expired"));
}

#[tokio::test]
async fn test_silent_engine_is_unprocessable() {
    let app = app_with_engine(FakeEngine::new(0));
    let response = post_json(&app, "/api/synthesize", json!({ "text": "Hello there." })).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body_json(response).await["error"], "Model did not generate any audio output.");
}

#[tokio::test]
async fn test_missing_dependency_is_unavailable() {
    let response = ApiError::Studio(StudioError::TranscoderMissing("ffmpeg".into())).into_response();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert!(body_json(response).await["error"].as_str().unwrap().contains("ffmpeg"));

    let response = ApiError::from(StudioError::PhonemizerMissing("/m/espeak-ng-data".into())).into_response();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}
