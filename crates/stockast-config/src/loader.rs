use std::path::Path;

use secrecy::ExposeSecret;

use crate::Config;

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Reads the file, expands `{{ env.VAR }}` placeholders, then
    /// deserializes and validates the result.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, environment variable
    /// expansion fails, TOML parsing fails, or validation fails
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read config file {}: {e}", path.display()))?;

        Self::from_toml(&raw)
    }

    /// Parse and validate configuration from TOML text
    ///
    /// # Errors
    ///
    /// Returns an error if expansion, parsing, or validation fails
    pub fn from_toml(raw: &str) -> anyhow::Result<Self> {
        let expanded =
            crate::env::expand_env(raw).map_err(|e| anyhow::anyhow!("config variable expansion failed: {e}"))?;

        let config: Self = toml::from_str(&expanded).map_err(|e| anyhow::anyhow!("failed to parse config: {e}"))?;

        config.validate()?;

        Ok(config)
    }

    /// Validate that the configuration is internally consistent
    ///
    /// # Errors
    ///
    /// Returns an error if no upstream is configured or a section holds
    /// unusable values
    pub fn validate(&self) -> anyhow::Result<()> {
        self.validate_has_upstreams()?;
        self.validate_podcast_config()?;
        self.validate_store_config()?;
        self.validate_speech_config()?;
        Ok(())
    }

    /// Ensure there is something to proxy to
    fn validate_has_upstreams(&self) -> anyhow::Result<()> {
        let has_agent = self.agent.is_some();
        let has_completion = self.completion.is_some();
        let has_speech = self.speech.is_some();
        let has_backend = self.podcast.backend_url.is_some();

        if !has_agent && !has_completion && !has_speech && !has_backend {
            anyhow::bail!(
                "at least one upstream must be configured (agent, completion, speech, or podcast backend)"
            );
        }

        if has_agent && !(has_completion && has_speech) {
            tracing::warn!("agent configured without completion and speech; /api/chat will answer 500");
        }

        Ok(())
    }

    fn validate_podcast_config(&self) -> anyhow::Result<()> {
        if self.podcast.stream_timeout()?.is_zero() {
            anyhow::bail!("podcast.stream_timeout must be greater than 0");
        }

        Ok(())
    }

    fn validate_store_config(&self) -> anyhow::Result<()> {
        let Some(ref store) = self.store else {
            return Ok(());
        };

        if store.table.trim().is_empty() {
            anyhow::bail!("store.table must not be empty");
        }

        if store.enabled && store.api_key.expose_secret().is_empty() {
            anyhow::bail!("store.api_key must not be empty when the store is enabled");
        }

        Ok(())
    }

    fn validate_speech_config(&self) -> anyhow::Result<()> {
        let Some(ref speech) = self.speech else {
            return Ok(());
        };

        if speech.voice_id.trim().is_empty() {
            anyhow::bail!("speech.voice_id must not be empty");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use indoc::indoc;

    use crate::{Config, SpeechProviderType};

    #[test]
    fn minimal_speech_only_config() {
        let config = Config::from_toml(indoc! {r#"
            [speech]
            api_key = "xi-test"
        "#})
        .unwrap();

        let speech = config.speech.unwrap();
        assert_eq!(speech.provider_type, SpeechProviderType::Elevenlabs);
        assert_eq!(speech.voice_id, "21m00Tcm4TlvDq8ikWAM");
        assert_eq!(speech.model, "eleven_monolingual_v1");
        assert!(config.server.health.enabled);
        assert_eq!(config.market.top_tickers.len(), 5);
        assert_eq!(config.podcast.stream_timeout().unwrap().as_secs(), 120);
        assert!(config.podcast.market_briefing);
        assert_eq!(
            config.market.chart_url.as_str(),
            "https://query1.finance.yahoo.com/v8/finance/chart/"
        );
    }

    #[test]
    fn full_config_parses() {
        let config = Config::from_toml(indoc! {r#"
            [server]
            listen_address = "127.0.0.1:4000"

            [server.cors]
            origins = ["http://localhost:3000"]
            expose_headers = ["content-disposition"]

            [agent]
            agent_id = "agent-1"
            api_key = "aci"

            [completion]
            base_url = "http://localhost:9000/v1"
            api_key = "mistral"

            [speech]
            api_key = "xi"
            voice_id = "ErXwobaYiN019PkySvjV"

            [podcast]
            backend_url = "http://127.0.0.1:8000"
            stream_timeout = "90s"
            market_briefing = false

            [market]
            top_tickers = ["AAPL"]
            chart_url = "http://localhost:9100/chart"

            [store]
            url = "https://project.supabase.co"
            api_key = "service"
        "#})
        .unwrap();

        assert_eq!(config.server.listen_address.unwrap().port(), 4000);
        assert_eq!(config.agent.unwrap().base_url.as_str(), "https://api.aci.dev/");
        assert_eq!(config.completion.unwrap().summary_model, "mistral-medium");
        assert_eq!(config.podcast.stream_timeout().unwrap().as_secs(), 90);
        assert_eq!(config.market.top_tickers, vec!["AAPL".to_owned()]);
        assert!(!config.podcast.market_briefing);
        assert_eq!(config.market.chart_url.as_str(), "http://localhost:9100/chart");
        let store = config.store.unwrap();
        assert!(store.enabled);
        assert_eq!(store.table, "chat_logs");
    }

    #[test]
    fn empty_config_is_rejected() {
        let err = Config::from_toml("").unwrap_err();
        assert!(err.to_string().contains("at least one upstream"));
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let err = Config::from_toml(indoc! {r#"
            [speech]
            api_key = "xi"
            stability = 0.5
        "#})
        .unwrap_err();
        assert!(err.to_string().contains("failed to parse config"));
    }

    #[test]
    fn invalid_stream_timeout_is_rejected() {
        let err = Config::from_toml(indoc! {r#"
            [podcast]
            backend_url = "http://127.0.0.1:8000"
            stream_timeout = "soon"
        "#})
        .unwrap_err();
        assert!(err.to_string().contains("stream_timeout"));
    }

    #[test]
    fn disabled_store_may_omit_key() {
        let config = Config::from_toml(indoc! {r#"
            [speech]
            api_key = "xi"

            [store]
            enabled = false
            url = "https://project.supabase.co"
            api_key = ""
        "#})
        .unwrap();
        assert!(!config.store.unwrap().enabled);
    }

    #[test]
    fn env_placeholders_are_expanded() {
        temp_env::with_var("STOCKAST_LOADER_KEY", Some("from-env"), || {
            let config = Config::from_toml(indoc! {r#"
                [speech]
                api_key = "{{ env.STOCKAST_LOADER_KEY }}"
            "#})
            .unwrap();
            use secrecy::ExposeSecret;
            assert_eq!(config.speech.unwrap().api_key.expose_secret(), "from-env");
        });
    }
}
