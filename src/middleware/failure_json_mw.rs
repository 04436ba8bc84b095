use axum::response::{IntoResponse, Response};
use http::{header, StatusCode};
use crate::error::errors::Error;

/// Rewrites the plain 408 and 413 replies produced by the timeout and body limit layers
/// into the JSON failure shape. JSON responses from handlers pass through untouched.
pub async fn failure_json_mw(response: Response) -> Response {
    let is_json = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.starts_with(mime::APPLICATION_JSON.as_ref()))
        .unwrap_or(false);
    if is_json {
        return response;
    }

    match response.status() {
        StatusCode::REQUEST_TIMEOUT => Error::timeout().into_response(),
        StatusCode::PAYLOAD_TOO_LARGE => Error::payload_too_large().into_response(),
        _ => response,
    }
}
