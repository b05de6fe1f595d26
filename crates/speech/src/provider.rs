pub mod elevenlabs;

use async_trait::async_trait;

use crate::types::{SynthesisRequest, SynthesizedAudio};

/// Trait for speech synthesis provider implementations
#[async_trait]
pub trait SpeechProvider: Send + Sync {
    /// Synthesize text to speech
    async fn synthesize(&self, request: SynthesisRequest) -> crate::error::Result<SynthesizedAudio>;

    /// Get the provider name
    fn name(&self) -> &str;
}
