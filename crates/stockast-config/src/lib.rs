#![allow(clippy::must_use_candidate)]

pub mod agent;
pub mod completion;
pub mod cors;
mod env;
pub mod health;
mod loader;
pub mod market;
pub mod podcast;
pub mod server;
pub mod speech;
pub mod store;
pub mod telemetry;

use serde::Deserialize;

pub use agent::*;
pub use completion::*;
pub use cors::*;
pub use health::*;
pub use market::*;
pub use podcast::*;
pub use server::*;
pub use speech::*;
pub use store::*;
pub use telemetry::TelemetryConfig;

/// Top-level Stockast configuration
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Agent (query) service used by the chat pipeline
    #[serde(default)]
    pub agent: Option<AgentConfig>,
    /// Chat-completion service used for summaries and scripts
    #[serde(default)]
    pub completion: Option<CompletionConfig>,
    /// Speech synthesis provider
    #[serde(default)]
    pub speech: Option<SpeechConfig>,
    /// Podcast script generation
    #[serde(default)]
    pub podcast: PodcastConfig,
    /// Ticker listing and live quotes
    #[serde(default)]
    pub market: MarketConfig,
    /// Chat log persistence
    #[serde(default)]
    pub store: Option<StoreConfig>,
    /// Telemetry configuration
    #[serde(default)]
    pub telemetry: Option<TelemetryConfig>,
}
