use axum::response::{IntoResponse, Response};
use chat::ChatError;
use http::StatusCode;
use speech::SpeechError;
use stockast_core::{HttpError, ValidationError};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PodcastError>;

/// Route that produced a [`PodcastError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    GenerateScript,
    ProcessText,
}

impl Operation {
    const fn failure_message(self) -> &'static str {
        match self {
            Self::GenerateScript => "Failed to generate podcast text",
            Self::ProcessText => "Failed to process text. Please try again.",
        }
    }
}

/// Failures of the podcast routes before a response starts streaming
#[derive(Debug, Error)]
pub enum PodcastError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Neither a backend nor an in-process generator is available
    #[error("no podcast backend or completion service configured")]
    NotConfigured(Operation),

    /// Backend request failed or answered non-2xx
    #[error("podcast backend request failed: {message}")]
    Upstream { operation: Operation, message: String },

    /// Backend answered with an unreadable body
    #[error("podcast backend returned an invalid response: {message}")]
    InvalidResponse { operation: Operation, message: String },

    /// In-process generation failed at the completion step
    #[error("script generation failed: {0}")]
    Completion(#[from] ChatError),

    /// In-process generation failed at the speech step
    #[error("speech synthesis failed: {0}")]
    Speech(#[from] SpeechError),
}

impl PodcastError {
    const fn operation(&self) -> Operation {
        match self {
            Self::NotConfigured(operation)
            | Self::Upstream { operation, .. }
            | Self::InvalidResponse { operation, .. } => *operation,
            Self::Validation(_) | Self::Completion(_) | Self::Speech(_) => Operation::ProcessText,
        }
    }
}

impl HttpError for PodcastError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_type(&self) -> &str {
        match self {
            Self::Validation(_) => "validation_error",
            Self::NotConfigured(_) => "configuration_error",
            _ => "upstream_error",
        }
    }

    fn client_message(&self) -> String {
        match self {
            Self::Validation(e) => e.to_string(),
            _ => self.operation().failure_message().to_owned(),
        }
    }
}

impl IntoResponse for PodcastError {
    fn into_response(self) -> Response {
        stockast_core::error_response(&self)
    }
}
