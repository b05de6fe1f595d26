//! Consumer side of the script generation stream
//!
//! [`PodcastConsumer`] drives one session: it reads the frame stream,
//! tracks progress, extracts the script, then requests audio. The
//! [`PodcastApi`] trait is the seam to the server; [`PodcastClient`] is the
//! HTTP implementation.

mod audio;
mod consumer;
mod error;
mod transport;

use std::pin::Pin;

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::Stream;

pub use audio::AudioHandle;
pub use consumer::{AUDIO_FAILED, AttemptOutcome, Generation, LogEntry, PodcastConsumer, SCRIPT_FAILED};
pub use error::{ClientError, Result};
pub use transport::{PodcastClient, decode_events};

use crate::protocol::StreamEvent;

/// Decoded frames of one script generation
pub type EventStream = Pin<Box<dyn Stream<Item = Result<StreamEvent>> + Send>>;

/// Server operations used by the consumer
#[async_trait]
pub trait PodcastApi: Send + Sync {
    /// Start script generation and return its frames
    async fn script_events(&self, text: &str, voice_id: &str) -> Result<EventStream>;

    /// Synthesize the final script
    async fn generate_audio(&self, text: &str, voice_id: &str) -> Result<Bytes>;
}
