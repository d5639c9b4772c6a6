//! JSON request bodies with the status codes clients rely on.

use axum::body::Bytes;
use axum::extract::{FromRequest, Request};
use axum::http::StatusCode;
use serde::de::DeserializeOwned;

use super::error::{HandlerError, error_response};

/// Like `axum::Json`, but distinguishes the failure modes:
/// empty body and undecodable JSON are 400, a schema mismatch is 422.
#[derive(Debug)]
pub struct JsonBody<T>(pub T);

impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = HandlerError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| error_response(StatusCode::BAD_REQUEST, e.body_text()))?;

        parse(&bytes).map(JsonBody)
    }
}

pub(crate) fn parse<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, HandlerError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Err(error_response(StatusCode::BAD_REQUEST, "Empty request body"));
    }

    let value: serde_json::Value = serde_json::from_slice(bytes)
        .map_err(|_| error_response(StatusCode::BAD_REQUEST, "Invalid JSON"))?;

    serde_json::from_value(value)
        .map_err(|e| error_response(StatusCode::UNPROCESSABLE_ENTITY, e.to_string()))
}
