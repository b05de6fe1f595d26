use axum::body::Body;
use axum::response::{IntoResponse, Response};
use http::StatusCode;
use serde::de::DeserializeOwned;

use crate::ErrorBody;

/// Body limit for JSON requests (1 MiB)
const BODY_LIMIT_BYTES: usize = 1 << 20;

/// Extractor for JSON request bodies
///
/// Unlike `axum::Json`, every rejection is a `400`/`413`/`415` with the
/// shared `{"error": ...}` body. Field presence is not checked here: payload
/// types use `Option` fields and handlers validate with [`crate::required`].
pub struct JsonPayload<T>(pub T);

impl<S, T: DeserializeOwned> axum::extract::FromRequest<S> for JsonPayload<T>
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(request: http::Request<Body>, _state: &S) -> Result<Self, Self::Rejection> {
        let (parts, body) = request.into_parts();

        let is_json = parts
            .headers
            .get(http::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.trim_start().starts_with("application/json"));

        if !is_json {
            return Err(reject(
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                "Unsupported Content-Type, expected: 'Content-Type: application/json'".to_owned(),
            ));
        }

        let bytes = axum::body::to_bytes(body, BODY_LIMIT_BYTES).await.map_err(|err| {
            if std::error::Error::source(&err).is_some_and(|source| source.is::<http_body_util::LengthLimitError>()) {
                reject(
                    StatusCode::PAYLOAD_TOO_LARGE,
                    format!("Request body is too large, limit is {BODY_LIMIT_BYTES} bytes"),
                )
            } else {
                reject(StatusCode::BAD_REQUEST, format!("Failed to read request body: {err}"))
            }
        })?;

        serde_json::from_slice::<T>(&bytes).map(Self).map_err(|e| {
            tracing::debug!("rejecting malformed JSON body: {e}");
            reject(StatusCode::BAD_REQUEST, "Request body must be a JSON object".to_owned())
        })
    }
}

fn reject(status: StatusCode, error: String) -> Response {
    (status, axum::Json(ErrorBody { error })).into_response()
}

#[cfg(test)]
mod tests {
    use axum::extract::FromRequest;
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, Deserialize)]
    struct Payload {
        text: Option<String>,
    }

    fn request(content_type: Option<&str>, body: &'static str) -> http::Request<Body> {
        let mut builder = http::Request::builder().method("POST").uri("/");
        if let Some(content_type) = content_type {
            builder = builder.header(http::header::CONTENT_TYPE, content_type);
        }
        builder.body(Body::from(body)).unwrap()
    }

    #[tokio::test]
    async fn accepts_json_with_charset() {
        let req = request(Some("application/json; charset=utf-8"), r#"{"text":"hi"}"#);
        let JsonPayload(payload) = JsonPayload::<Payload>::from_request(req, &()).await.unwrap();
        assert_eq!(payload.text.as_deref(), Some("hi"));
    }

    #[tokio::test]
    async fn missing_field_is_left_to_the_handler() {
        let req = request(Some("application/json"), "{}");
        let JsonPayload(payload) = JsonPayload::<Payload>::from_request(req, &()).await.unwrap();
        assert!(payload.text.is_none());
    }

    #[tokio::test]
    async fn rejects_other_content_types() {
        let req = request(Some("text/plain"), "hello");
        let Err(response) = JsonPayload::<Payload>::from_request(req, &()).await else {
            panic!("expected rejection");
        };
        assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    }

    #[tokio::test]
    async fn rejects_malformed_json() {
        let req = request(Some("application/json"), "{text:");
        let Err(response) = JsonPayload::<Payload>::from_request(req, &()).await else {
            panic!("expected rejection");
        };
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
