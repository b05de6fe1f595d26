use std::{sync::OnceLock, time::Duration};

use reqwest::Client;

/// Shared client for request/response upstream calls
///
/// Whole-request timeout applies, so it must not be used for streams.
pub fn http_client() -> Client {
    static CLIENT: OnceLock<Client> = OnceLock::new();

    CLIENT
        .get_or_init(|| {
            builder()
                .timeout(Duration::from_secs(120))
                .build()
                .expect("Failed to build default HTTP client")
        })
        .clone()
}

/// Shared client for long-lived streamed responses
///
/// Only the connect phase is bounded; per-chunk silence is enforced by the
/// caller.
pub fn streaming_client() -> Client {
    static CLIENT: OnceLock<Client> = OnceLock::new();

    CLIENT
        .get_or_init(|| builder().build().expect("Failed to build streaming HTTP client"))
        .clone()
}

fn builder() -> reqwest::ClientBuilder {
    let mut headers = http::HeaderMap::new();
    headers.insert(http::header::CONNECTION, http::HeaderValue::from_static("keep-alive"));

    Client::builder()
        .connect_timeout(Duration::from_secs(10))
        .pool_idle_timeout(Some(Duration::from_secs(5)))
        .tcp_nodelay(true)
        .tcp_keepalive(Some(Duration::from_secs(60)))
        .default_headers(headers)
}
