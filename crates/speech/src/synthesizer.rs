use stockast_config::{SpeechConfig, SpeechProviderType};

use crate::error::SpeechError;
use crate::provider::{SpeechProvider, elevenlabs::ElevenLabsProvider};
use crate::types::{SynthesisRequest, SynthesizedAudio, VoiceSettings};
use crate::voices::{self, DEFAULT_VOICE_ID};

/// Entry point for speech synthesis, shared by every route that speaks
pub struct Synthesizer {
    provider: Option<Box<dyn SpeechProvider>>,
    default_voice_id: String,
}

impl Synthesizer {
    /// Build from the optional `[speech]` section
    pub fn from_config(config: Option<&SpeechConfig>) -> Self {
        let Some(config) = config else {
            tracing::debug!("No speech provider configured");
            return Self {
                provider: None,
                default_voice_id: DEFAULT_VOICE_ID.to_owned(),
            };
        };

        let provider: Box<dyn SpeechProvider> = match config.provider_type {
            SpeechProviderType::Elevenlabs => Box::new(ElevenLabsProvider::new(
                config.api_key.clone(),
                config.base_url.clone(),
                config.model.clone(),
            )),
        };

        tracing::debug!("Speech synthesis initialized with provider {}", provider.name());

        Self {
            provider: Some(provider),
            default_voice_id: config.voice_id.clone(),
        }
    }

    /// Construct around an explicit provider
    pub fn with_provider(provider: Box<dyn SpeechProvider>, default_voice_id: impl Into<String>) -> Self {
        Self {
            provider: Some(provider),
            default_voice_id: default_voice_id.into(),
        }
    }

    /// Voice used when the caller does not name one
    pub fn default_voice_id(&self) -> &str {
        &self.default_voice_id
    }

    /// Voice a request will be spoken with
    ///
    /// Blank ids fall back to the default. Ids outside the catalog are passed
    /// through to the provider unchanged.
    pub fn resolve_voice<'a>(&'a self, voice_id: Option<&'a str>) -> &'a str {
        let voice_id = voice_id
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .unwrap_or(&self.default_voice_id);

        match voices::find(voice_id) {
            Some(voice) => tracing::debug!(voice = voice.name, "using cataloged voice"),
            None => tracing::debug!(voice_id, "voice is not in the catalog, passing it through"),
        }

        voice_id
    }

    /// Synthesize `text`, falling back to the default voice and settings
    pub async fn speak(
        &self,
        text: &str,
        voice_id: Option<&str>,
        settings: Option<VoiceSettings>,
    ) -> crate::error::Result<SynthesizedAudio> {
        let provider = self.provider.as_ref().ok_or(SpeechError::NotConfigured)?;

        let voice_id = self.resolve_voice(voice_id);

        provider
            .synthesize(SynthesisRequest {
                text: text.to_owned(),
                voice_id: voice_id.to_owned(),
                model: None,
                settings: settings.unwrap_or_default(),
            })
            .await
    }
}
