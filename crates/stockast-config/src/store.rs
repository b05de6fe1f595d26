use secrecy::SecretString;
use serde::Deserialize;
use url::Url;

/// Chat log persistence (PostgREST-compatible REST endpoint)
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoreConfig {
    /// Whether writes are accepted; when false `/api/save-chat` answers 501
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Project URL; rows are posted to `{url}/rest/v1/{table}`
    pub url: Url,
    /// Service key sent as `apikey` and bearer token
    pub api_key: SecretString,
    /// Table receiving chat logs
    #[serde(default = "default_table")]
    pub table: String,
}

#[allow(clippy::missing_const_for_fn)]
fn default_enabled() -> bool {
    true
}

fn default_table() -> String {
    "chat_logs".to_owned()
}
