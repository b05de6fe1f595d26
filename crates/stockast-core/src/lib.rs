//! Shared building blocks for Stockast feature crates
//!
//! Feature crates keep their own error enums; this crate defines how those
//! errors become HTTP responses, the shared upstream HTTP clients, the JSON
//! body extractor, and the input validation rules every route applies.

mod error;
mod http_client;
mod payload;
mod validate;

pub use error::{ErrorBody, HttpError, error_response};
pub use http_client::{http_client, streaming_client};
pub use payload::JsonPayload;
pub use validate::{ValidationError, required};
