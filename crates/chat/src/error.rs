use axum::response::{IntoResponse, Response};
use http::StatusCode;
use speech::SpeechError;
use stockast_core::{HttpError, ValidationError};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ChatError>;

/// Errors from the chat pipeline and its upstream clients
#[derive(Debug, Error)]
pub enum ChatError {
    /// A required field was missing or blank
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// An upstream needed by this route is not configured
    #[error("{0} is not configured")]
    NotConfigured(&'static str),

    /// Endpoint switched off by configuration
    #[error("{0}")]
    Disabled(&'static str),

    /// Upstream returned a non-success status or could not be reached
    #[error("{service} request failed: {message}")]
    Upstream { service: &'static str, message: String },

    /// Upstream answered with a body that does not match its schema
    #[error("{service} returned an invalid response: {message}")]
    InvalidResponse { service: &'static str, message: String },

    /// Speech synthesis step failed
    #[error(transparent)]
    Speech(#[from] SpeechError),
}

impl ChatError {
    pub(crate) fn upstream(service: &'static str, message: impl Into<String>) -> Self {
        Self::Upstream {
            service,
            message: message.into(),
        }
    }

    pub(crate) fn invalid(service: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidResponse {
            service,
            message: message.into(),
        }
    }
}

impl HttpError for ChatError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Disabled(_) => StatusCode::NOT_IMPLEMENTED,
            Self::Speech(e) => e.status_code(),
            Self::NotConfigured(_) | Self::Upstream { .. } | Self::InvalidResponse { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_type(&self) -> &str {
        match self {
            Self::Validation(_) => "validation_error",
            Self::Disabled(_) => "disabled",
            Self::NotConfigured(_) => "configuration_error",
            Self::Upstream { .. } | Self::InvalidResponse { .. } => "upstream_error",
            Self::Speech(e) => e.error_type(),
        }
    }

    fn client_message(&self) -> String {
        match self {
            Self::Validation(e) => e.to_string(),
            Self::Disabled(message) => (*message).to_owned(),
            _ => "Internal Server Error. Please try again.".to_owned(),
        }
    }
}

impl IntoResponse for ChatError {
    fn into_response(self) -> Response {
        stockast_core::error_response(&self)
    }
}
