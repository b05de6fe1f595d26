//! Mock upstream services for integration tests
//!
//! One server stands in for the agent, completion, speech, store, podcast
//! backend, and market services, returning canned responses and recording
//! what it was sent.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::extract::{Path, Query, Request, State};
use axum::http::{StatusCode, header};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router, routing};
use bytes::Bytes;
use futures_util::{StreamExt, stream};
use serde::Deserialize;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Raw answer of the agent service
pub const AGENT_ANSWER: &str = "Apple reported quarterly revenue of $94.9 billion, up 6 percent year over year, \
with services revenue reaching an all-time high.";

/// Summary returned for summarization prompts
pub const SUMMARY: &str = "Apple beat estimates on record services revenue.";

/// Reply returned for plain chat completions
pub const CHAT_REPLY: &str = "Markets open in ten minutes.";

/// Script returned for podcast prompts
pub const SCRIPT_REPLY: &str = "<think>\nThe listener wants an earnings recap.\nLead with revenue, then services.\n</think>\n\
[Final Podcast Script]\nHost A: Welcome back to the market minute.\nHost B: Apple beat estimates this quarter.\n\n\
Host A: Services hit a record.\nHost B: That is all for today.\n[End of Podcast Script]";

/// Bytes served as synthesized audio
pub const MP3_BYTES: &[u8] = b"ID3\x04\x00mock-mp3-frames";

/// Symbol whose chart is too short for a technical read
pub const SHORT_HISTORY_SYMBOL: &str = "NEWCO";

const LISTING: &str = "Symbol|Security Name|Market Category|Test Issue|Financial Status|Round Lot Size|ETF|NextShares\n\
AAPL|Apple Inc. - Common Stock|Q|N|N|100|N|N\n\
MSFT|Microsoft Corporation - Common Stock|Q|N|N|100|N|N\n\
NVDA|NVIDIA Corporation - Common Stock|Q|N|N|100|N|N\n\
File Creation Time: 0601202512:00|||||||\n";

/// What the podcast backend answers to `/process-text`
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ProcessTextReply {
    /// `audio/mpeg` with [`MP3_BYTES`]
    #[default]
    Audio,
    /// `application/json` with [`PROCESS_TEXT_JSON`]
    Json,
    /// `text/plain` that is not JSON
    Garbage,
}

/// JSON answer of the process-text backend in [`ProcessTextReply::Json`] mode
pub const PROCESS_TEXT_JSON: &str = r#"{"status":"queued","position":3}"#;

/// Mock upstream that returns predictable responses
pub struct MockUpstream {
    addr: SocketAddr,
    shutdown: CancellationToken,
    state: Arc<MockState>,
}

#[derive(Default)]
struct MockState {
    /// Answer every request with 500
    failing: AtomicBool,
    /// Podcast backend sends one frame and then goes silent
    stalling: AtomicBool,
    /// Store inserts answer 500
    store_failing: AtomicBool,
    process_text_reply: Mutex<ProcessTextReply>,
    completion_count: AtomicU32,
    completion_requests: Mutex<Vec<String>>,
    chart_symbols: Mutex<Vec<String>>,
    agent_queries: Mutex<Vec<String>>,
    tts_voices: Mutex<Vec<String>>,
    stored_rows: Mutex<Vec<serde_json::Value>>,
    backend_requests: Mutex<Vec<serde_json::Value>>,
    quote_symbols: Mutex<Vec<String>>,
}

impl MockUpstream {
    /// Start the mock server, returning immediately
    pub async fn start() -> anyhow::Result<Self> {
        Self::start_inner(MockState::default()).await
    }

    /// Start a mock server that answers every request with 500
    pub async fn start_failing() -> anyhow::Result<Self> {
        let state = MockState::default();
        state.failing.store(true, Ordering::Relaxed);
        Self::start_inner(state).await
    }

    /// Start a mock whose podcast backend stalls after its first frame
    pub async fn start_stalling() -> anyhow::Result<Self> {
        let state = MockState::default();
        state.stalling.store(true, Ordering::Relaxed);
        Self::start_inner(state).await
    }

    /// Start a mock whose chat log store rejects every insert
    pub async fn start_with_failing_store() -> anyhow::Result<Self> {
        let state = MockState::default();
        state.store_failing.store(true, Ordering::Relaxed);
        Self::start_inner(state).await
    }

    /// Start a mock whose podcast backend answers `/process-text` with `reply`
    pub async fn start_with_process_text_reply(reply: ProcessTextReply) -> anyhow::Result<Self> {
        let state = MockState {
            process_text_reply: Mutex::new(reply),
            ..MockState::default()
        };
        Self::start_inner(state).await
    }

    async fn start_inner(state: MockState) -> anyhow::Result<Self> {
        let state = Arc::new(state);

        let app = Router::new()
            .route("/agents/{agent_id}/query", routing::post(handle_agent_query))
            .route("/v1/chat/completions", routing::post(handle_completions))
            .route("/v1/text-to-speech/{voice_id}", routing::post(handle_tts))
            .route("/rest/v1/{table}", routing::post(handle_store_insert))
            .route(
                "/generate-podcast-text",
                routing::get(handle_script_query).post(handle_script_post),
            )
            .route("/process-text", routing::post(handle_process_text))
            .route("/nasdaqlisted.txt", routing::get(handle_listing))
            .route("/v7/finance/quote", routing::get(handle_quotes))
            .route("/v8/finance/chart/{symbol}", routing::get(handle_chart))
            .layer(middleware::from_fn_with_state(Arc::clone(&state), fail_switch))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let shutdown = CancellationToken::new();
        let shutdown_clone = shutdown.clone();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    shutdown_clone.cancelled().await;
                })
                .await
                .ok();
        });

        Ok(Self { addr, shutdown, state })
    }

    /// Root URL of the mock, with a trailing slash
    pub fn base_url(&self) -> Url {
        Url::parse(&format!("http://{}/", self.addr)).expect("valid URL")
    }

    /// Absolute URL of `path` on the mock
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    /// Number of completion requests received
    pub fn completion_count(&self) -> u32 {
        self.state.completion_count.load(Ordering::Relaxed)
    }

    /// Last user message of every completion request
    pub fn completion_requests(&self) -> Vec<String> {
        self.state.completion_requests.lock().unwrap().clone()
    }

    /// Symbols whose price history was requested
    pub fn chart_symbols(&self) -> Vec<String> {
        self.state.chart_symbols.lock().unwrap().clone()
    }

    /// Queries sent to the agent service
    pub fn agent_queries(&self) -> Vec<String> {
        self.state.agent_queries.lock().unwrap().clone()
    }

    /// Voice ids of speech requests, in arrival order
    pub fn tts_voices(&self) -> Vec<String> {
        self.state.tts_voices.lock().unwrap().clone()
    }

    /// Rows inserted into the store
    pub fn stored_rows(&self) -> Vec<serde_json::Value> {
        self.state.stored_rows.lock().unwrap().clone()
    }

    /// Bodies (or query parameters) received by the podcast backend
    pub fn backend_requests(&self) -> Vec<serde_json::Value> {
        self.state.backend_requests.lock().unwrap().clone()
    }

    /// `symbols` parameters received by the quote service
    pub fn quote_symbols(&self) -> Vec<String> {
        self.state.quote_symbols.lock().unwrap().clone()
    }
}

impl Drop for MockUpstream {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

async fn fail_switch(State(state): State<Arc<MockState>>, request: Request, next: Next) -> Response {
    if state.failing.load(Ordering::Relaxed) {
        return (StatusCode::INTERNAL_SERVER_ERROR, "mock failure").into_response();
    }
    next.run(request).await
}

#[derive(Deserialize)]
struct AgentQuery {
    query: String,
}

async fn handle_agent_query(
    State(state): State<Arc<MockState>>,
    Path(_agent_id): Path<String>,
    Json(body): Json<AgentQuery>,
) -> Json<serde_json::Value> {
    state.agent_queries.lock().unwrap().push(body.query);
    Json(serde_json::json!({ "result": AGENT_ANSWER }))
}

async fn handle_completions(
    State(state): State<Arc<MockState>>,
    Json(body): Json<serde_json::Value>,
) -> Json<serde_json::Value> {
    state.completion_count.fetch_add(1, Ordering::Relaxed);
    if let Some(user) = body["messages"]
        .as_array()
        .and_then(|messages| messages.last())
        .and_then(|message| message["content"].as_str())
    {
        state.completion_requests.lock().unwrap().push(user.to_owned());
    }

    let system = body["messages"][0]["content"].as_str().unwrap_or_default();
    let content = if system.contains("podcast") {
        SCRIPT_REPLY
    } else if system.starts_with("Summarize") {
        SUMMARY
    } else {
        CHAT_REPLY
    };

    Json(serde_json::json!({
        "id": "cmpl-mock",
        "model": body["model"],
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": content },
            "finish_reason": "stop"
        }]
    }))
}

async fn handle_tts(State(state): State<Arc<MockState>>, Path(voice_id): Path<String>) -> impl IntoResponse {
    state.tts_voices.lock().unwrap().push(voice_id);
    ([(header::CONTENT_TYPE, "audio/mpeg")], MP3_BYTES)
}

async fn handle_store_insert(
    State(state): State<Arc<MockState>>,
    Path(_table): Path<String>,
    Json(rows): Json<Vec<serde_json::Value>>,
) -> Response {
    if state.store_failing.load(Ordering::Relaxed) {
        return (StatusCode::INTERNAL_SERVER_ERROR, Json(serde_json::json!({ "message": "relation is locked" })))
            .into_response();
    }

    let mut stored = state.stored_rows.lock().unwrap();
    let inserted: Vec<_> = rows
        .into_iter()
        .map(|mut row| {
            row["id"] = serde_json::json!(stored.len() + 1);
            stored.push(row.clone());
            row
        })
        .collect();

    (StatusCode::CREATED, Json(inserted)).into_response()
}

#[derive(Deserialize)]
struct ScriptQuery {
    text: String,
}

async fn handle_script_query(State(state): State<Arc<MockState>>, Query(query): Query<ScriptQuery>) -> Response {
    state
        .backend_requests
        .lock()
        .unwrap()
        .push(serde_json::json!({ "text": query.text }));
    script_stream(&state)
}

async fn handle_script_post(State(state): State<Arc<MockState>>, Json(body): Json<serde_json::Value>) -> Response {
    state.backend_requests.lock().unwrap().push(body);
    script_stream(&state)
}

fn sse_frame(event: &serde_json::Value) -> Result<Bytes, Infallible> {
    Ok(Bytes::from(format!("data: {event}\n\n")))
}

fn script_stream(state: &MockState) -> Response {
    let first = sse_frame(&serde_json::json!({ "type": "log", "message": "Analyzing Market Trends..." }));

    let body = if state.stalling.load(Ordering::Relaxed) {
        Body::from_stream(stream::iter([first]).chain(stream::pending()))
    } else {
        let rest = [
            "Gathering Financial Data...",
            "Checking the earnings calendar",
            "Generating Comprehensive Analysis...",
            "Structuring Podcast Content...",
            "Generating Podcast Script...",
        ]
        .map(|message| sse_frame(&serde_json::json!({ "type": "log", "message": message })));
        let script = sse_frame(&serde_json::json!({ "type": "script", "content": SCRIPT_REPLY }));

        Body::from_stream(stream::iter([first]).chain(stream::iter(rest)).chain(stream::iter([script])))
    };

    ([(header::CONTENT_TYPE, "text/event-stream")], body).into_response()
}

async fn handle_process_text(
    State(state): State<Arc<MockState>>,
    Json(body): Json<serde_json::Value>,
) -> Response {
    state.backend_requests.lock().unwrap().push(body);

    let reply = *state.process_text_reply.lock().unwrap();
    match reply {
        ProcessTextReply::Audio => ([(header::CONTENT_TYPE, "audio/mpeg")], MP3_BYTES).into_response(),
        ProcessTextReply::Json => ([(header::CONTENT_TYPE, "application/json")], PROCESS_TEXT_JSON).into_response(),
        ProcessTextReply::Garbage => ([(header::CONTENT_TYPE, "text/plain")], "upstream busy").into_response(),
    }
}

async fn handle_listing() -> &'static str {
    LISTING
}

#[derive(Deserialize)]
struct QuoteQuery {
    symbols: String,
}

async fn handle_quotes(State(state): State<Arc<MockState>>, Query(query): Query<QuoteQuery>) -> Json<serde_json::Value> {
    state.quote_symbols.lock().unwrap().push(query.symbols.clone());

    let result: Vec<_> = query
        .symbols
        .split(',')
        .enumerate()
        .map(|(i, symbol)| {
            let price = 100.0 + f64::from(u32::try_from(i).unwrap_or_default()) * 10.0;
            serde_json::json!({
                "symbol": symbol,
                "longName": format!("{symbol} Holdings"),
                "regularMarketPrice": price,
                "regularMarketChangePercent": 1.25,
                "regularMarketPreviousClose": price - 1.0,
            })
        })
        .collect();

    Json(serde_json::json!({ "quoteResponse": { "result": result, "error": null } }))
}

/// Forty rising daily closes, or ten for [`SHORT_HISTORY_SYMBOL`]
async fn handle_chart(State(state): State<Arc<MockState>>, Path(symbol): Path<String>) -> Json<serde_json::Value> {
    state.chart_symbols.lock().unwrap().push(symbol.clone());

    let days: u32 = if symbol == SHORT_HISTORY_SYMBOL { 10 } else { 40 };
    let closes: Vec<serde_json::Value> = (0..days)
        .map(|day| {
            if day == 3 {
                serde_json::Value::Null
            } else {
                serde_json::json!(150.0 + f64::from(day))
            }
        })
        .collect();

    Json(serde_json::json!({
        "chart": {
            "result": [{
                "meta": { "symbol": symbol },
                "indicators": { "quote": [{ "close": closes }] }
            }],
            "error": null
        }
    }))
}
