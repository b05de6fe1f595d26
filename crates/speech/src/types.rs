use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Voice tuning forwarded to the provider
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VoiceSettings {
    pub stability: f32,
    pub similarity_boost: f32,
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self {
            stability: 0.5,
            similarity_boost: 0.75,
        }
    }
}

/// Provider-neutral synthesis request
#[derive(Debug, Clone)]
pub struct SynthesisRequest {
    /// Text to speak
    pub text: String,
    /// Provider voice identifier
    pub voice_id: String,
    /// Model override; the configured model is used when `None`
    pub model: Option<String>,
    pub settings: VoiceSettings,
}

/// Raw audio returned by a provider
#[derive(Debug, Clone)]
pub struct SynthesizedAudio {
    pub audio: Bytes,
    /// Content type reported by the provider (e.g. "audio/mpeg")
    pub content_type: String,
}

impl SynthesizedAudio {
    /// Build a download response with a fixed `audio/mpeg` content type
    pub fn into_attachment(self, filename: &str) -> Response {
        attachment(self.audio, "audio/mpeg", filename)
    }
}

/// Binary audio response with `Content-Disposition: attachment`
pub fn attachment(audio: Bytes, content_type: &str, filename: &str) -> Response {
    let disposition = format!("attachment; filename=\"{filename}\"");

    (
        [
            (http::header::CONTENT_TYPE, content_type.to_owned()),
            (http::header::CONTENT_DISPOSITION, disposition),
        ],
        audio,
    )
        .into_response()
}

/// Body of `POST /api/tts`
///
/// Covers both request variants: `{text, voice_id}` and
/// `{text, stability?, similarity_boost?}`.
#[derive(Debug, Deserialize)]
pub struct TtsPayload {
    pub text: Option<String>,
    pub voice_id: Option<String>,
    pub stability: Option<f32>,
    pub similarity_boost: Option<f32>,
}

/// Body of `POST /api/generate-audio`
#[derive(Debug, Deserialize)]
pub struct GenerateAudioPayload {
    pub text: Option<String>,
    pub voice_id: Option<String>,
}
