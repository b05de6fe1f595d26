//! Programmatic configuration builder for integration tests

use std::net::SocketAddr;

use secrecy::SecretString;
use stockast_config::{
    AgentConfig, CompletionConfig, Config, CorsConfig, HealthConfig, MarketConfig, PodcastConfig, ServerConfig,
    SpeechConfig, SpeechProviderType, StoreConfig,
};

use super::mock_upstream::MockUpstream;

/// Builder for constructing test configurations
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new builder with minimal defaults
    pub fn new() -> Self {
        Self {
            config: Config {
                server: ServerConfig {
                    listen_address: Some(SocketAddr::from(([127, 0, 0, 1], 0))),
                    health: HealthConfig {
                        enabled: true,
                        ..HealthConfig::default()
                    },
                    ..ServerConfig::default()
                },
                // Market sources stay off the network until `with_market`
                podcast: PodcastConfig {
                    market_briefing: false,
                    ..PodcastConfig::default()
                },
                ..Config::default()
            },
        }
    }

    /// Speech synthesis against the mock
    pub fn with_speech(mut self, mock: &MockUpstream) -> Self {
        self.config.speech = Some(SpeechConfig {
            provider_type: SpeechProviderType::Elevenlabs,
            api_key: SecretString::from("xi-test"),
            base_url: Some(mock.url("/v1")),
            voice_id: "21m00Tcm4TlvDq8ikWAM".to_owned(),
            model: "eleven_monolingual_v1".to_owned(),
        });
        self
    }

    /// Agent and completion services against the mock
    pub fn with_chat(mut self, mock: &MockUpstream) -> Self {
        self.config.agent = Some(AgentConfig {
            base_url: mock.base_url(),
            agent_id: "finance-agent".to_owned(),
            api_key: SecretString::from("aci-test"),
        });
        self.config.completion = Some(CompletionConfig {
            base_url: mock.base_url().join("v1").expect("valid URL"),
            api_key: SecretString::from("mistral-test"),
            summary_model: "mistral-medium".to_owned(),
            chat_model: "mistral-tiny".to_owned(),
        });
        self
    }

    /// Chat log store against the mock
    pub fn with_store(mut self, mock: &MockUpstream) -> Self {
        self.config.store = Some(StoreConfig {
            enabled: true,
            url: mock.base_url(),
            api_key: SecretString::from("supabase-test"),
            table: "chat_logs".to_owned(),
        });
        self
    }

    /// Relay podcast scripts to the mock backend
    pub fn with_podcast_backend(mut self, mock: &MockUpstream) -> Self {
        self.config.podcast.backend_url = Some(mock.base_url());
        self
    }

    /// Podcast stream stall timeout
    pub fn with_stream_timeout(mut self, timeout: &str) -> Self {
        timeout.clone_into(&mut self.config.podcast.stream_timeout);
        self
    }

    /// Ticker listing, quotes and price history against the mock
    ///
    /// Also turns on the market briefing for in-process scripts.
    pub fn with_market(mut self, mock: &MockUpstream) -> Self {
        self.config.market = MarketConfig {
            listing_url: mock.base_url().join("nasdaqlisted.txt").expect("valid URL"),
            quote_url: mock.base_url().join("v7/finance/quote").expect("valid URL"),
            chart_url: mock.base_url().join("v8/finance/chart/").expect("valid URL"),
            ..MarketConfig::default()
        };
        self.config.podcast.market_briefing = true;
        self
    }

    /// Set CORS configuration
    pub fn with_cors(mut self, config: CorsConfig) -> Self {
        self.config.server.cors = Some(config);
        self
    }

    /// Disable health endpoint
    pub fn without_health(mut self) -> Self {
        self.config.server.health.enabled = false;
        self
    }

    /// Build the final config
    pub fn build(self) -> Config {
        self.config
    }
}
