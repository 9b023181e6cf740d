//! Single-response encoder.

use axum::body::Body;
use axum::response::{IntoResponse, Response};
use http::header::CONTENT_TYPE;
use http::{HeaderName, HeaderValue, StatusCode};
use tracing::error;

use gqlwire_core::{DispatchError, DispatchResult, SingleResponse};

const INTERNAL_ERROR_BODY: &str = r#"{"errors":[{"message":"Internal server error"}]}"#;

/// Encode a complete response: status, headers in the given order, payload.
///
/// An invalid status or header degrades to a 500 with a generic JSON body.
pub fn encode_single(single: SingleResponse) -> Response {
    match build(single) {
        Ok(response) => response,
        Err(e) => {
            error!(error = %e, "failed to encode single response");
            internal_error()
        }
    }
}

/// Encode a dispatch error as a GraphQL-shaped JSON error response.
pub fn error_response(err: &DispatchError) -> Response {
    encode_single(SingleResponse::error(err.status(), &err.client_message()))
}

fn build(single: SingleResponse) -> DispatchResult<Response> {
    let status = StatusCode::from_u16(single.status)
        .map_err(|_| DispatchError::Encoding(format!("invalid status code {}", single.status)))?;

    let mut response = Response::new(Body::from(single.payload));
    *response.status_mut() = status;

    let headers = response.headers_mut();
    for (name, value) in &single.headers {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| DispatchError::Encoding(format!("invalid header name {name:?}")))?;
        let value = HeaderValue::from_str(value)
            .map_err(|_| DispatchError::Encoding(format!("invalid value for header {name}")))?;
        headers.append(name, value);
    }

    Ok(response)
}

fn internal_error() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        [(CONTENT_TYPE, "application/json")],
        INTERNAL_ERROR_BODY,
    )
        .into_response()
}
