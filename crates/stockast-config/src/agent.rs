use secrecy::SecretString;
use serde::Deserialize;
use url::Url;

/// Agent query service (retrieval + analysis over a free-text query)
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Base URL of the agent API
    #[serde(default = "default_base_url")]
    pub base_url: Url,
    /// Agent identifier, substituted into `/agents/{id}/query`
    pub agent_id: String,
    /// Bearer token
    pub api_key: SecretString,
}

fn default_base_url() -> Url {
    Url::parse("https://api.aci.dev/").expect("valid default URL")
}
