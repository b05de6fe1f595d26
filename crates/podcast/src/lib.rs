//! Podcast script generation for Stockast
//!
//! Server side: `/api/generate-podcast-text` relays or generates a stream of
//! progress frames ending in a script, and `/api/process-text` turns text
//! into audio in one call. Client side: a consumer for that stream with
//! progress tracking, a session store, and playback helpers.

#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

pub mod client;
mod error;
mod generator;
pub mod playback;
pub mod progress;
pub mod protocol;
pub mod reveal;
mod routes;
pub mod script;
pub mod session;

use std::sync::Arc;

use chat::CompletionClient;
use market::MarketClient;
use speech::Synthesizer;

pub use error::{Operation, PodcastError, Result};
pub use routes::{PodcastState, endpoint_router, with_stream_timeout};

/// Build the podcast route state from configuration
///
/// `market` is only kept when `podcast.market_briefing` is on.
pub fn build_state(
    config: &stockast_config::Config,
    synthesizer: Arc<Synthesizer>,
    completion: Option<Arc<CompletionClient>>,
    market: Arc<MarketClient>,
) -> anyhow::Result<Arc<PodcastState>> {
    let stream_timeout = config.podcast.stream_timeout()?;
    let market = config.podcast.market_briefing.then_some(market);

    match (&config.podcast.backend_url, &completion) {
        (Some(url), _) => tracing::debug!(backend = %url, "podcast scripts relayed from backend"),
        (None, Some(_)) => tracing::debug!("podcast scripts generated in-process"),
        (None, None) => tracing::warn!("no podcast backend or completion service; podcast routes will answer 500"),
    }

    Ok(Arc::new(PodcastState::new(
        config.podcast.backend_url.clone(),
        completion,
        market,
        synthesizer,
        stream_timeout,
    )))
}
