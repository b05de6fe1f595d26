use secrecy::SecretString;
use serde::Deserialize;
use url::Url;

/// Chat-completion service speaking the `/chat/completions` wire format
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CompletionConfig {
    /// Base URL, including the version segment (e.g. `https://api.mistral.ai/v1`)
    #[serde(default = "default_base_url")]
    pub base_url: Url,
    /// Bearer token
    pub api_key: SecretString,
    /// Model used to summarize agent answers
    #[serde(default = "default_summary_model")]
    pub summary_model: String,
    /// Model used for free-form completions and script generation
    #[serde(default = "default_chat_model")]
    pub chat_model: String,
}

fn default_base_url() -> Url {
    Url::parse("https://api.mistral.ai/v1").expect("valid default URL")
}

fn default_summary_model() -> String {
    "mistral-medium".to_owned()
}

fn default_chat_model() -> String {
    "mistral-tiny".to_owned()
}
