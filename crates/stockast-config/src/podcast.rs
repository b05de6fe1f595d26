use serde::Deserialize;
use url::Url;

/// Podcast script generation
///
/// With `backend_url` set, script generation and text processing are proxied
/// to that backend. Without it, scripts are generated in-process through the
/// completion service.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PodcastConfig {
    /// Script generation backend
    #[serde(default)]
    pub backend_url: Option<Url>,
    /// Maximum silence between two chunks of a proxied stream (e.g. "90s")
    #[serde(default = "default_stream_timeout")]
    pub stream_timeout: String,
    /// Look up quotes and price history for the tickers a request names and
    /// hand them to in-process script generation
    #[serde(default = "default_market_briefing")]
    pub market_briefing: bool,
}

impl Default for PodcastConfig {
    fn default() -> Self {
        Self {
            backend_url: None,
            stream_timeout: default_stream_timeout(),
            market_briefing: default_market_briefing(),
        }
    }
}

impl PodcastConfig {
    /// Parsed stream timeout
    ///
    /// # Errors
    ///
    /// Returns an error if `stream_timeout` is not a valid duration string
    pub fn stream_timeout(&self) -> anyhow::Result<std::time::Duration> {
        duration_str::parse(&self.stream_timeout)
            .map_err(|e| anyhow::anyhow!("invalid podcast.stream_timeout '{}': {e}", self.stream_timeout))
    }
}

fn default_stream_timeout() -> String {
    "120s".to_owned()
}

const fn default_market_briefing() -> bool {
    true
}
