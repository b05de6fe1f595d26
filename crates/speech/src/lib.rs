//! Speech synthesis for Stockast
//!
//! Voice catalog, provider abstraction, and the `/api/voices`, `/api/tts`
//! and `/api/generate-audio` routes.

#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

mod error;
mod provider;
mod synthesizer;
mod types;
pub mod voices;

use std::sync::Arc;

use axum::extract::State;
use axum::response::Response;
use axum::routing::{get, post};
use axum::{Json, Router};
use stockast_core::{JsonPayload, required};

pub use error::{Result, SpeechError};
pub use provider::SpeechProvider;
pub use synthesizer::Synthesizer;
pub use types::{
    GenerateAudioPayload, SynthesisRequest, SynthesizedAudio, TtsPayload, VoiceSettings, attachment,
};
pub use voices::{DEFAULT_VOICE_ID, Gender, VoiceProfile};

/// Build the synthesizer from configuration
pub fn build_synthesizer(config: &stockast_config::Config) -> Arc<Synthesizer> {
    Arc::new(Synthesizer::from_config(config.speech.as_ref()))
}

/// Create the endpoint router for speech routes
pub fn endpoint_router() -> Router<Arc<Synthesizer>> {
    Router::new()
        .route("/api/voices", get(list_voices))
        .route("/api/tts", post(text_to_speech))
        .route("/api/generate-audio", post(generate_audio))
}

/// Handle `GET /api/voices`
async fn list_voices() -> Json<&'static [VoiceProfile]> {
    Json(voices::catalog())
}

/// Handle `POST /api/tts`
async fn text_to_speech(
    State(synthesizer): State<Arc<Synthesizer>>,
    JsonPayload(payload): JsonPayload<TtsPayload>,
) -> Result<Response> {
    let text = required("text", payload.text.as_deref())?;

    let defaults = VoiceSettings::default();
    let settings = VoiceSettings {
        stability: payload.stability.unwrap_or(defaults.stability),
        similarity_boost: payload.similarity_boost.unwrap_or(defaults.similarity_boost),
    };

    let audio = synthesizer
        .speak(text, payload.voice_id.as_deref(), Some(settings))
        .await?;

    Ok(audio.into_attachment("tts-output.mp3"))
}

/// Handle `POST /api/generate-audio`
async fn generate_audio(
    State(synthesizer): State<Arc<Synthesizer>>,
    JsonPayload(payload): JsonPayload<GenerateAudioPayload>,
) -> Result<Response> {
    let text = required("text", payload.text.as_deref())?;

    tracing::debug!(input_len = text.len(), "generating podcast audio");

    let audio = synthesizer.speak(text, payload.voice_id.as_deref(), None).await?;

    Ok(audio.into_attachment("output.mp3"))
}
