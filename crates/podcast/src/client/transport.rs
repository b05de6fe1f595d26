use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::{Stream, StreamExt, stream};
use reqwest::Client;
use serde::Serialize;
use stockast_core::{ErrorBody, http_client, streaming_client};
use url::Url;

use super::error::{ClientError, Result};
use super::{EventStream, PodcastApi};
use crate::protocol::{FrameDecoder, StreamEvent};

/// HTTP client for a Stockast server
pub struct PodcastClient {
    base_url: Url,
    http: Client,
    streaming: Client,
}

#[derive(Serialize)]
struct TextRequest<'a> {
    text: &'a str,
    voice_id: &'a str,
}

impl PodcastClient {
    /// Client for the server at `base_url` (e.g. `http://127.0.0.1:3000`)
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            http: http_client(),
            streaming: streaming_client(),
        }
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(self.base_url.join(path)?)
    }
}

#[async_trait]
impl PodcastApi for PodcastClient {
    async fn script_events(&self, text: &str, voice_id: &str) -> Result<EventStream> {
        let response = self
            .streaming
            .post(self.endpoint("api/generate-podcast-text")?)
            .json(&TextRequest { text, voice_id })
            .send()
            .await?;

        let response = check_status(response).await?;

        Ok(Box::pin(decode_events(response.bytes_stream())))
    }

    async fn generate_audio(&self, text: &str, voice_id: &str) -> Result<Bytes> {
        let response = self
            .http
            .post(self.endpoint("api/generate-audio")?)
            .timeout(Duration::from_secs(300))
            .json(&TextRequest { text, voice_id })
            .send()
            .await?;

        Ok(check_status(response).await?.bytes().await?)
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&body).map_or(body, |e| e.error);

    Err(ClientError::Api {
        status: status.as_u16(),
        message,
    })
}

/// Decode a raw response body into stream events
///
/// Malformed frames are skipped. A transport error is yielded once and
/// ends the stream.
pub fn decode_events<S>(bytes: S) -> impl Stream<Item = Result<StreamEvent>> + Send + 'static
where
    S: Stream<Item = reqwest::Result<Bytes>> + Send + 'static,
{
    stream::unfold(
        Some((Box::pin(bytes), FrameDecoder::new())),
        |state| async move {
            let (mut bytes, mut decoder) = state?;

            let (batch, next) = match bytes.next().await {
                Some(Ok(chunk)) => {
                    let events = decoder.push(&chunk).into_iter().map(Ok).collect();
                    (events, Some((bytes, decoder)))
                }
                Some(Err(e)) => (vec![Err(ClientError::Http(e))], None),
                None => (decoder.finish().into_iter().map(Ok).collect(), None),
            };

            Some((stream::iter(batch), next))
        },
    )
    .flatten()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn chunks_are_decoded_in_order() {
        let chunks = [
            "data: {\"type\":\"log\",\"message\":\"Analyzing Market Trends...\"}\n\nda",
            "ta: {\"type\":\"log\",\"message\":\"checking volume\"}\n\n",
            "data: {\"type\":\"script\",\"content\":\"[Final Podcast Script]hi[End of Podcast Script]\"}",
        ];
        let body = stream::iter(chunks.map(|c| Ok::<_, reqwest::Error>(Bytes::from_static(c.as_bytes()))));

        let events: Vec<_> = decode_events(body).map(|e| e.unwrap()).collect().await;

        assert_eq!(
            events,
            vec![
                StreamEvent::log("Analyzing Market Trends..."),
                StreamEvent::log("checking volume"),
                StreamEvent::script("[Final Podcast Script]hi[End of Podcast Script]"),
            ]
        );
    }

    #[test]
    fn endpoints_resolve_against_base() {
        let client = PodcastClient::new(Url::parse("http://127.0.0.1:3000").unwrap());
        assert_eq!(
            client.endpoint("api/generate-audio").unwrap().as_str(),
            "http://127.0.0.1:3000/api/generate-audio"
        );
    }
}
