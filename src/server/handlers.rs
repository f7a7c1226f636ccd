use axum::{
    Json,
    body::Body,
    extract::{Path, Query, State},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{Html, IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tracing::{error, info};
use uuid::Uuid;

use crate::config::voices;
use crate::error::StudioError;
use crate::render::RenderedClip;
use crate::server::page;
use crate::server::state::AppState;

/// Error answered to the browser as `{"error": "..."}`.
#[derive(Debug)]
pub enum ApiError {
    Studio(StudioError),
    NotFound(String),
    Internal(String),
}

impl From<StudioError> for ApiError {
    fn from(e: StudioError) -> Self {
        ApiError::Studio(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Studio(e) => {
                let status = if e.is_user_error() {
                    StatusCode::BAD_REQUEST
                } else if e.is_missing_dependency() {
                    StatusCode::SERVICE_UNAVAILABLE
                } else if matches!(e, StudioError::NoAudio) {
                    StatusCode::UNPROCESSABLE_ENTITY
                } else {
                    StatusCode::INTERNAL_SERVER_ERROR
                };
                (status, e.to_string())
            }
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        if status.is_server_error() {
            error!("❌ {}", message);
        }
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

pub async fn index(State(state): State<AppState>) -> Html<String> {
    Html(page::render(&state.default_voice))
}

#[derive(Serialize)]
pub struct HealthResponse {
    status: String,
}

pub async fn health_check() -> impl IntoResponse {
    Json(HealthResponse { status: "ok".to_string() })
}

#[derive(Serialize)]
pub struct VoiceEntry {
    name: &'static str,
    speaker_id: i32,
    language: &'static str,
}

#[derive(Serialize)]
pub struct VoicesResponse {
    default: String,
    voices: Vec<VoiceEntry>,
}

pub async fn list_voices(State(state): State<AppState>) -> Json<VoicesResponse> {
    let voices = voices::all()
        .map(|(name, voice)| VoiceEntry { name, speaker_id: voice.speaker_id, language: voice.language })
        .collect();
    Json(VoicesResponse { default: state.default_voice.to_string(), voices })
}

#[derive(Deserialize)]
pub struct SynthesizeRequest {
    text: String,
    voice: Option<String>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct SynthesizeResponse {
    pub id: Uuid,
    pub voice: String,
    pub sample_rate: u32,
    pub duration_secs: f32,
    pub wav_url: String,
    pub mp3_url: Option<String>,
    pub mp3_error: Option<String>,
}

impl SynthesizeResponse {
    fn for_clip(clip: &RenderedClip) -> Self {
        let (mp3_url, mp3_error) = match &clip.mp3 {
            Ok(_) => (Some(format!("/api/clips/{}/mp3", clip.id)), None),
            Err(e) => (None, Some(e.clone())),
        };
        Self {
            id: clip.id,
            voice: clip.voice.clone(),
            sample_rate: clip.sample_rate,
            duration_secs: clip.duration_secs,
            wav_url: format!("/api/clips/{}/wav", clip.id),
            mp3_url,
            mp3_error,
        }
    }
}

pub async fn synthesize(State(state): State<AppState>, Json(payload): Json<SynthesizeRequest>) -> Result<Json<SynthesizeResponse>, ApiError> {
    let voice = payload.voice.unwrap_or_else(|| state.default_voice.to_string());

    // A new request invalidates whatever was generated before
    state.discard_latest();

    let synthesizer = state.synthesizer.clone();
    let transcoder = state.transcoder.clone();

    // Synthesis is CPU-bound; the synthesizer lock keeps it to one request at a time
    let clip = tokio::task::spawn_blocking(move || {
        let clip = synthesizer.lock().synthesize(&payload.text, &voice)?;
        RenderedClip::render(&clip, Some(&transcoder))
    })
    .await
    .map_err(|e| ApiError::Internal(format!("Synthesis task failed: {}", e)))??;

    info!("✅ Speech generated successfully with voice {}", clip.voice);
    let clip = state.store_latest(clip);
    Ok(Json(SynthesizeResponse::for_clip(&clip)))
}

#[derive(Deserialize, Default)]
pub struct DownloadQuery {
    #[serde(default)]
    inline: bool,
}

pub async fn download(
    State(state): State<AppState>,
    Path((id, format)): Path<(String, String)>,
    Query(query): Query<DownloadQuery>,
) -> Result<Response, ApiError> {
    // Malformed ids get the same JSON answer as expired ones
    let clip = Uuid::parse_str(&id).ok().and_then(|id| state.clip(&id)).ok_or_else(|| ApiError::NotFound("Clip expired. Generate speech again to download it.".to_string()))?;

    let (bytes, mime) = match format.as_str() {
        "wav" => (clip.wav.clone(), "audio/wav"),
        "mp3" => match &clip.mp3 {
            Ok(bytes) => (bytes.clone(), "audio/mpeg"),
            Err(e) => return Err(ApiError::NotFound(e.clone())),
        },
        _ => return Err(ApiError::NotFound(format!("Unknown format '{}'", format))),
    };

    let mut headers = HeaderMap::new();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(mime));
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    if !query.inline {
        headers.insert(header::CONTENT_DISPOSITION, content_disposition(&clip.file_name(&format)));
    }

    Ok((StatusCode::OK, headers, Body::from(bytes)).into_response())
}

fn content_disposition(file_name: &str) -> HeaderValue {
    let value = format!("attachment; filename=\"{}\"; filename*=UTF-8''{}", file_name, urlencoding::encode(file_name));
    HeaderValue::from_str(&value).unwrap_or_else(|_| HeaderValue::from_static("attachment"))
}
