use axum::response::{IntoResponse, Response};
use http::StatusCode;
use stockast_core::{HttpError, ValidationError};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SpeechError>;

/// Speech synthesis errors
#[derive(Debug, Error)]
pub enum SpeechError {
    /// A required field was missing or blank
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// No synthesis provider is configured
    #[error("speech synthesis is not configured")]
    NotConfigured,

    /// Provider rejected the credentials
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Provider API returned an error
    #[error("provider API error ({status}): {message}")]
    ProviderApiError { status: u16, message: String },

    /// Network or connection error
    #[error("connection error: {0}")]
    ConnectionError(String),

    /// Provider answered but the body could not be read
    #[error("invalid provider response: {0}")]
    InvalidResponse(String),
}

impl HttpError for SpeechError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_type(&self) -> &str {
        match self {
            Self::Validation(_) => "validation_error",
            Self::NotConfigured => "configuration_error",
            Self::AuthenticationFailed(_)
            | Self::ProviderApiError { .. }
            | Self::ConnectionError(_)
            | Self::InvalidResponse(_) => "upstream_error",
        }
    }

    fn client_message(&self) -> String {
        match self {
            Self::Validation(e) => e.to_string(),
            _ => "Failed to convert text to speech. Please try again.".to_owned(),
        }
    }
}

impl IntoResponse for SpeechError {
    fn into_response(self) -> Response {
        stockast_core::error_response(&self)
    }
}
