use http::StatusCode;
use serde::{Deserialize, Serialize};

/// Trait for domain errors that can be converted to HTTP responses
///
/// Implemented by each feature crate's error type. Feature crates convert
/// these into axum responses with [`ErrorBody`], keeping the wire shape
/// identical across routes.
pub trait HttpError: std::error::Error {
    /// HTTP status code for this error
    fn status_code(&self) -> StatusCode;

    /// Machine-readable error type, used for logging only
    fn error_type(&self) -> &str;

    /// Message safe to expose to API consumers
    fn client_message(&self) -> String;

    /// JSON body sent to the client
    fn body(&self) -> ErrorBody {
        ErrorBody {
            error: self.client_message(),
        }
    }
}

/// Error payload returned by every route: `{"error": "..."}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Convert a domain error into an axum response with an [`ErrorBody`]
pub fn error_response<E: HttpError + ?Sized>(error: &E) -> axum::response::Response {
    use axum::response::IntoResponse;

    let status = error.status_code();
    if status.is_server_error() {
        tracing::error!(error_type = error.error_type(), "{error}");
    } else {
        tracing::debug!(error_type = error.error_type(), "{error}");
    }

    (status, axum::Json(error.body())).into_response()
}
