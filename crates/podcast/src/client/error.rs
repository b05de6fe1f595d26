pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors from talking to a Stockast server
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// HTTP transport error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with an error status
    #[error("server returned {status}: {message}")]
    Api { status: u16, message: String },

    /// Endpoint URL could not be built
    #[error("invalid server URL: {0}")]
    Url(#[from] url::ParseError),
}
