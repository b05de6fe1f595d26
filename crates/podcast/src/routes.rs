//! `/api/generate-podcast-text` and `/api/process-text`

use std::convert::Infallible;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::body::Body;
use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use bytes::Bytes;
use chat::CompletionClient;
use futures_util::{Stream, StreamExt, stream};
use market::MarketClient;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use speech::Synthesizer;
use stockast_core::{JsonPayload, http_client, required, streaming_client};
use stockast_telemetry::metrics;
use url::Url;

use crate::error::{Operation, PodcastError, Result};
use crate::generator::{self, frame};
use crate::protocol::{FrameDecoder, StreamEvent};
use crate::script::parse_script;

const STREAM_TIMED_OUT: &str = "Podcast generation timed out. Please try again.";
const STREAM_INTERRUPTED: &str = "Podcast generation was interrupted. Please try again.";

/// Shared state for podcast routes
pub struct PodcastState {
    backend: Option<Url>,
    completion: Option<Arc<CompletionClient>>,
    market: Option<Arc<MarketClient>>,
    synthesizer: Arc<Synthesizer>,
    stream_timeout: Duration,
    http: Client,
    streaming: Client,
}

impl PodcastState {
    pub fn new(
        backend: Option<Url>,
        completion: Option<Arc<CompletionClient>>,
        market: Option<Arc<MarketClient>>,
        synthesizer: Arc<Synthesizer>,
        stream_timeout: Duration,
    ) -> Self {
        Self {
            backend,
            completion,
            market,
            synthesizer,
            stream_timeout,
            http: http_client(),
            streaming: streaming_client(),
        }
    }

    fn backend_url(&self, path: &str) -> Option<String> {
        self.backend
            .as_ref()
            .map(|base| format!("{}/{path}", base.as_str().trim_end_matches('/')))
    }
}

/// Create the endpoint router for podcast routes
pub fn endpoint_router() -> Router<Arc<PodcastState>> {
    Router::new()
        .route(
            "/api/generate-podcast-text",
            get(generate_script_from_query).post(generate_script),
        )
        .route("/api/process-text", post(process_text))
}

#[derive(Debug, Deserialize)]
struct ScriptQuery {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ScriptPayload {
    text: Option<String>,
    voice_id: Option<String>,
}

#[derive(Serialize)]
struct BackendRequest<'a> {
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    voice_id: Option<&'a str>,
}

/// Handle `GET /api/generate-podcast-text?text=...`
async fn generate_script_from_query(
    State(state): State<Arc<PodcastState>>,
    Query(query): Query<ScriptQuery>,
) -> Result<Response> {
    let text = required("text", query.text.as_deref())?;

    let upstream = state
        .backend_url("generate-podcast-text")
        .map(|url| state.streaming.get(url).query(&[("text", text)]));

    script_response(&state, text, upstream).await
}

/// Handle `POST /api/generate-podcast-text`
async fn generate_script(
    State(state): State<Arc<PodcastState>>,
    JsonPayload(payload): JsonPayload<ScriptPayload>,
) -> Result<Response> {
    let text = required("text", payload.text.as_deref())?;
    let voice_id = payload.voice_id.as_deref().map(str::trim).filter(|v| !v.is_empty());

    let upstream = state
        .backend_url("generate-podcast-text")
        .map(|url| state.streaming.post(url).json(&BackendRequest { text, voice_id }));

    script_response(&state, text, upstream).await
}

/// Stream frames from the backend, or generate them in-process
async fn script_response(
    state: &PodcastState,
    text: &str,
    upstream: Option<reqwest::RequestBuilder>,
) -> Result<Response> {
    let body = if let Some(request) = upstream {
        let started = Instant::now();
        let response = send_to_backend(request, Operation::GenerateScript).await;
        metrics::observe("podcast_backend", started, &response);

        tracing::debug!("relaying podcast script stream");
        Body::from_stream(with_stream_timeout(response?.bytes_stream(), state.stream_timeout))
    } else {
        let completion = state
            .completion
            .clone()
            .ok_or(PodcastError::NotConfigured(Operation::GenerateScript))?;

        tracing::debug!("generating podcast script in-process");
        Body::from_stream(with_stream_timeout(
            generator::script_frames(completion, state.market.clone(), text.to_owned()),
            state.stream_timeout,
        ))
    };

    Ok(event_stream_response(body))
}

fn event_stream_response(body: Body) -> Response {
    use http::header;

    (
        [
            (header::CONTENT_TYPE, "text/event-stream"),
            (header::CACHE_CONTROL, "no-cache"),
            (header::CONNECTION, "keep-alive"),
        ],
        body,
    )
        .into_response()
}

async fn send_to_backend(request: reqwest::RequestBuilder, operation: Operation) -> Result<reqwest::Response> {
    let response = request.send().await.map_err(|e| {
        tracing::error!(error = %e, "podcast backend request failed");
        PodcastError::Upstream {
            operation,
            message: e.to_string(),
        }
    })?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        tracing::error!(%status, %body, "podcast backend returned error");
        return Err(PodcastError::Upstream {
            operation,
            message: format!("status {status}"),
        });
    }

    Ok(response)
}

/// Relay a byte stream, ending it with an `error` frame when the source
/// stalls for longer than `timeout` or fails mid-stream
///
/// The relay stops after the chunk that completes a terminal frame, so a
/// source that goes quiet after its `script` or `error` frame never gets a
/// second terminal frame appended. The error frame starts with a newline so
/// it is decodable even when the source stopped in the middle of a line.
pub fn with_stream_timeout<S, E>(
    source: S,
    timeout: Duration,
) -> impl Stream<Item = std::result::Result<Bytes, Infallible>> + Send + 'static
where
    S: Stream<Item = std::result::Result<Bytes, E>> + Send + 'static,
    E: std::fmt::Display + Send + 'static,
{
    let relay = Relay {
        source: Box::pin(source),
        frames: FrameDecoder::new(),
    };

    stream::unfold(Some(relay), move |relay| async move {
        let mut relay = relay?;

        match tokio::time::timeout(timeout, relay.source.next()).await {
            Ok(Some(Ok(chunk))) => {
                if relay.frames.push(&chunk).iter().any(StreamEvent::is_terminal) {
                    tracing::debug!("terminal frame relayed");
                    return Some((Ok(chunk), None));
                }
                Some((Ok(chunk), Some(relay)))
            }
            Ok(Some(Err(e))) => {
                tracing::warn!(error = %e, "podcast stream failed mid-stream");
                Some((Ok(terminal_error(STREAM_INTERRUPTED)), None))
            }
            Ok(None) => None,
            Err(_) => {
                tracing::warn!(timeout_secs = timeout.as_secs(), "podcast stream timed out");
                Some((Ok(terminal_error(STREAM_TIMED_OUT)), None))
            }
        }
    })
}

struct Relay<S> {
    source: std::pin::Pin<Box<S>>,
    frames: FrameDecoder,
}

fn terminal_error(message: &str) -> Bytes {
    let mut bytes = b"\n".to_vec();
    bytes.extend_from_slice(&frame(&StreamEvent::error(message)));
    Bytes::from(bytes)
}

#[derive(Debug, Deserialize)]
struct ProcessTextPayload {
    text: Option<String>,
    voice_id: Option<String>,
}

/// Handle `POST /api/process-text`
///
/// Audio answers are relayed as an attachment and anything else as JSON.
async fn process_text(
    State(state): State<Arc<PodcastState>>,
    JsonPayload(payload): JsonPayload<ProcessTextPayload>,
) -> Result<Response> {
    let text = required("text", payload.text.as_deref())?;
    let voice_id = payload
        .voice_id
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| state.synthesizer.default_voice_id());

    match state.backend_url("process-text") {
        Some(url) => relay_process_text(&state, &url, text, voice_id).await,
        None => process_text_in_process(&state, text, voice_id).await,
    }
}

async fn relay_process_text(state: &PodcastState, url: &str, text: &str, voice_id: &str) -> Result<Response> {
    let request = state
        .http
        .post(url)
        .timeout(state.stream_timeout)
        .json(&BackendRequest {
            text,
            voice_id: Some(voice_id),
        });

    let started = Instant::now();
    let result: Result<(String, Bytes)> = async {
        let response = send_to_backend(request, Operation::ProcessText).await?;

        let content_type = response
            .headers()
            .get(http::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_owned();

        let body = response.bytes().await.map_err(|e| PodcastError::Upstream {
            operation: Operation::ProcessText,
            message: e.to_string(),
        })?;

        Ok((content_type, body))
    }
    .await;
    metrics::observe("podcast_backend", started, &result);

    let (content_type, body) = result?;

    if content_type.starts_with("audio/") {
        tracing::debug!(bytes = body.len(), %content_type, "relaying processed audio");
        return Ok(speech::attachment(body, &content_type, "output.mp3"));
    }

    let json: serde_json::Value = serde_json::from_slice(&body).map_err(|e| PodcastError::InvalidResponse {
        operation: Operation::ProcessText,
        message: e.to_string(),
    })?;

    Ok(Json(json).into_response())
}

async fn process_text_in_process(state: &PodcastState, text: &str, voice_id: &str) -> Result<Response> {
    let completion = state
        .completion
        .as_deref()
        .ok_or(PodcastError::NotConfigured(Operation::ProcessText))?;

    let briefing = generator::research(state.market.as_deref(), text).await;
    let content = generator::generate_script(completion, text, &briefing).await?;
    let parsed = parse_script(&content);

    if parsed.script.is_empty() {
        return Err(PodcastError::InvalidResponse {
            operation: Operation::ProcessText,
            message: "generated script is empty".to_owned(),
        });
    }

    let audio = state.synthesizer.speak(&parsed.script, Some(voice_id), None).await?;

    Ok(audio.into_attachment("output.mp3"))
}
