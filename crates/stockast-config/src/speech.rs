use secrecy::SecretString;
use serde::Deserialize;

/// Speech synthesis provider configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SpeechConfig {
    /// Provider type
    #[serde(rename = "type", default)]
    pub provider_type: SpeechProviderType,
    /// API key
    pub api_key: SecretString,
    /// Base URL override
    #[serde(default)]
    pub base_url: Option<String>,
    /// Voice used when a request does not name one
    #[serde(default = "default_voice_id")]
    pub voice_id: String,
    /// Synthesis model identifier
    #[serde(default = "default_model")]
    pub model: String,
}

/// Supported speech synthesis providers
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SpeechProviderType {
    /// `ElevenLabs`
    #[default]
    Elevenlabs,
}

fn default_voice_id() -> String {
    "21m00Tcm4TlvDq8ikWAM".to_owned()
}

fn default_model() -> String {
    "eleven_monolingual_v1".to_owned()
}
