use std::time::Instant;

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use stockast_core::http_client;
use stockast_telemetry::metrics;

use super::SpeechProvider;
use crate::error::SpeechError;
use crate::types::{SynthesisRequest, SynthesizedAudio, VoiceSettings};

const DEFAULT_ELEVENLABS_API_URL: &str = "https://api.elevenlabs.io/v1";

/// `ElevenLabs` text-to-speech provider
pub struct ElevenLabsProvider {
    client: Client,
    base_url: String,
    api_key: SecretString,
    model: String,
}

impl ElevenLabsProvider {
    pub fn new(api_key: SecretString, base_url: Option<String>, model: String) -> Self {
        let base_url = base_url.unwrap_or_else(|| DEFAULT_ELEVENLABS_API_URL.to_string());

        Self {
            client: http_client(),
            base_url: base_url.trim_end_matches('/').to_owned(),
            api_key,
            model,
        }
    }
}

#[derive(serde::Serialize)]
struct ElevenLabsRequest<'a> {
    text: &'a str,
    model_id: &'a str,
    voice_settings: VoiceSettings,
}

#[async_trait]
impl SpeechProvider for ElevenLabsProvider {
    async fn synthesize(&self, request: SynthesisRequest) -> crate::error::Result<SynthesizedAudio> {
        let started = Instant::now();
        let result = self.send(&request).await;
        metrics::observe("speech", started, &result);
        result
    }

    fn name(&self) -> &str {
        "elevenlabs"
    }
}

impl ElevenLabsProvider {
    async fn send(&self, request: &SynthesisRequest) -> crate::error::Result<SynthesizedAudio> {
        let url = format!("{}/text-to-speech/{}", self.base_url, request.voice_id);
        let model = request.model.as_deref().unwrap_or(&self.model);

        tracing::debug!(
            model,
            voice = %request.voice_id,
            input_len = request.text.len(),
            "ElevenLabs TTS request"
        );

        let body = ElevenLabsRequest {
            text: &request.text,
            model_id: model,
            voice_settings: request.settings,
        };

        let response = self
            .client
            .post(&url)
            .header("xi-api-key", self.api_key.expose_secret())
            .header(http::header::ACCEPT, "audio/mpeg")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("ElevenLabs request failed: {e}");
                SpeechError::ConnectionError(e.to_string())
            })?;

        let status = response.status();

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());

            tracing::error!("ElevenLabs API error ({status}): {error_text}");

            return Err(match status.as_u16() {
                401 => SpeechError::AuthenticationFailed(error_text),
                code => SpeechError::ProviderApiError {
                    status: code,
                    message: error_text,
                },
            });
        }

        let content_type = response
            .headers()
            .get(http::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("audio/mpeg")
            .to_string();

        let audio = response.bytes().await.map_err(|e| {
            tracing::error!("Failed to read ElevenLabs response body: {e}");
            SpeechError::InvalidResponse(e.to_string())
        })?;

        if audio.is_empty() {
            return Err(SpeechError::InvalidResponse("empty audio body".to_owned()));
        }

        tracing::debug!("ElevenLabs TTS synthesis complete, {} bytes", audio.len());

        Ok(SynthesizedAudio { audio, content_type })
    }
}
