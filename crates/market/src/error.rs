use axum::response::{IntoResponse, Response};
use http::StatusCode;
use stockast_core::HttpError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, MarketError>;

/// Failures while fetching market data
#[derive(Debug, Error)]
pub enum MarketError {
    /// Listing, quote or history source could not be reached or answered non-2xx
    #[error("{source_name} request failed: {message}")]
    Upstream { source_name: &'static str, message: String },

    /// Listing, quote or history body did not have the expected shape
    #[error("{source_name} returned an invalid response: {message}")]
    InvalidResponse { source_name: &'static str, message: String },
}

impl HttpError for MarketError {
    fn status_code(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }

    fn error_type(&self) -> &str {
        "upstream_error"
    }

    fn client_message(&self) -> String {
        "Failed to fetch NASDAQ tickers".to_owned()
    }
}

impl IntoResponse for MarketError {
    fn into_response(self) -> Response {
        stockast_core::error_response(&self)
    }
}
