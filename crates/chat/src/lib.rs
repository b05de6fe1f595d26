//! Chat pipeline for Stockast
//!
//! `/api/chat` asks the agent service, summarizes the answer with the
//! completion service, speaks the summary, and logs the turn.
//! `/api/save-chat` and `/api/completions` expose the store and the
//! completion service on their own.

#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

mod agent;
mod completion;
mod error;
mod store;

use std::sync::Arc;

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use base64::Engine;
use serde::{Deserialize, Serialize};
use speech::Synthesizer;
use stockast_core::{JsonPayload, required};

pub use agent::AgentClient;
pub use completion::{ChatMessage, CompletionClient};
pub use error::{ChatError, Result};
pub use store::{ChatLogRecord, ChatLogStore, RestChatLogStore, StoreError};

/// Shared state for chat routes
#[derive(Clone)]
pub struct ChatState {
    agent: Option<Arc<AgentClient>>,
    completion: Option<Arc<CompletionClient>>,
    synthesizer: Arc<Synthesizer>,
    store: Option<Arc<dyn ChatLogStore>>,
}

impl ChatState {
    pub fn new(
        agent: Option<Arc<AgentClient>>,
        completion: Option<Arc<CompletionClient>>,
        synthesizer: Arc<Synthesizer>,
        store: Option<Arc<dyn ChatLogStore>>,
    ) -> Self {
        Self {
            agent,
            completion,
            synthesizer,
            store,
        }
    }

    fn completion(&self) -> Result<&CompletionClient> {
        self.completion.as_deref().ok_or(ChatError::NotConfigured("completion"))
    }
}

/// Build the chat state from configuration
pub fn build_state(config: &stockast_config::Config, synthesizer: Arc<Synthesizer>) -> Result<ChatState> {
    let agent = config.agent.as_ref().map(AgentClient::new).transpose()?.map(Arc::new);
    let completion = build_completion(config);

    let store = match config.store {
        Some(ref store) if store.enabled => {
            let store = RestChatLogStore::new(store)
                .map_err(|e| ChatError::upstream("store", format!("invalid store URL: {e}")))?;
            Some(Arc::new(store) as Arc<dyn ChatLogStore>)
        }
        Some(_) => {
            tracing::debug!("chat log store disabled");
            None
        }
        None => None,
    };

    Ok(ChatState::new(agent, completion, synthesizer, store))
}

/// Build the completion client if `[completion]` is configured
pub fn build_completion(config: &stockast_config::Config) -> Option<Arc<CompletionClient>> {
    config.completion.as_ref().map(|c| Arc::new(CompletionClient::new(c)))
}

/// Create the endpoint router for chat routes
pub fn endpoint_router() -> Router<ChatState> {
    Router::new()
        .route("/api/chat", post(chat))
        .route("/api/save-chat", post(save_chat))
        .route("/api/completions", post(completions))
}

#[derive(Debug, Deserialize)]
struct ChatPayload {
    query: Option<String>,
}

#[derive(Debug, Serialize)]
struct ChatReply {
    reply: String,
    #[serde(rename = "audioBase64")]
    audio_base64: String,
}

/// Handle `POST /api/chat`
async fn chat(State(state): State<ChatState>, JsonPayload(payload): JsonPayload<ChatPayload>) -> Result<Json<ChatReply>> {
    let query = required("query", payload.query.as_deref())?;

    let agent = state.agent.as_deref().ok_or(ChatError::NotConfigured("agent"))?;
    let raw = agent.query(query).await?;

    let summary = state.completion()?.summarize(&raw).await?;

    let audio = state.synthesizer.speak(&summary, None, None).await?;
    let audio_base64 = base64::engine::general_purpose::STANDARD.encode(&audio.audio);

    if let Some(ref store) = state.store {
        let record = ChatLogRecord::new(query, summary.as_str());
        if let Err(e) = store.append(&record).await {
            tracing::warn!(error = %e, "failed to persist chat log");
        }
    }

    Ok(Json(ChatReply {
        reply: summary,
        audio_base64,
    }))
}

#[derive(Debug, Deserialize)]
struct SaveChatPayload {
    question: Option<String>,
    answer: Option<String>,
}

#[derive(Debug, Serialize)]
struct SaveChatReply {
    message: &'static str,
    data: serde_json::Value,
}

/// Handle `POST /api/save-chat`
async fn save_chat(
    State(state): State<ChatState>,
    JsonPayload(payload): JsonPayload<SaveChatPayload>,
) -> Result<Json<SaveChatReply>> {
    let store = state
        .store
        .as_ref()
        .ok_or(ChatError::Disabled("Chat log saving is disabled."))?;

    let question = required("question", payload.question.as_deref())?;
    let answer = required("answer", payload.answer.as_deref())?;

    let data = store
        .append(&ChatLogRecord::new(question, answer))
        .await
        .map_err(|e| ChatError::upstream("store", e.to_string()))?;

    Ok(Json(SaveChatReply {
        message: "Chat saved",
        data,
    }))
}

#[derive(Debug, Deserialize)]
struct CompletionsPayload {
    #[serde(default)]
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Serialize)]
struct CompletionsReply {
    response: ChatMessage,
}

/// Handle `POST /api/completions`
async fn completions(
    State(state): State<ChatState>,
    JsonPayload(payload): JsonPayload<CompletionsPayload>,
) -> Result<Json<CompletionsReply>> {
    if payload.messages.is_empty() {
        return Err(stockast_core::ValidationError { field: "messages" }.into());
    }

    let completion = state.completion()?;
    let response = completion.complete(completion.chat_model(), &payload.messages).await?;

    Ok(Json(CompletionsReply { response }))
}
